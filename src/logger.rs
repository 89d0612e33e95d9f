//! 진단 로그 설정. 계산 결과 출력(stdout)과 섞이지 않도록 로그는 stderr로만 보낸다.

use log::LevelFilter;
use std::sync::OnceLock;

/// `--verbose`가 없을 때의 기본 로그 수준
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

static LOGGER_INIT: OnceLock<LevelFilter> = OnceLock::new();

/// 로거 초기화 오류.
#[derive(Debug)]
pub enum LoggerError {
    /// 이미 다른 로거가 설치됨
    AlreadySet(log::SetLoggerError),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::AlreadySet(e) => write!(f, "로거 초기화 실패: {e}"),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<log::SetLoggerError> for LoggerError {
    fn from(value: log::SetLoggerError) -> Self {
        LoggerError::AlreadySet(value)
    }
}

/// `-v` 횟수를 로그 수준으로 바꾼다.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => DEFAULT_LOG_LEVEL,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// fern 디스패처를 설치한다. 두 번째 호출은 아무것도 하지 않는다.
pub fn init(verbose: u8) -> Result<(), LoggerError> {
    if is_logger_initialised() {
        return Ok(());
    }
    let level = level_for_verbosity(verbose);
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    let _ = LOGGER_INIT.set(level);
    Ok(())
}

/// 로거가 설치되었는지 확인한다.
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Info);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }
}
