use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::EngineError;
use crate::scenario::ScenarioConfig;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// 출력 언어 코드(ko/en/auto). 없으면 시스템 로케일을 따른다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub scenario: ScenarioConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            scenario: ScenarioConfig::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 역직렬화 오류
    Parse(toml::de::Error),
    /// TOML 직렬화 오류
    Serialize(toml::ser::Error),
    /// 값 검증 실패
    Invalid(EngineError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "파일 입출력 오류: {e}"),
            ConfigError::Parse(e) => write!(f, "설정 파싱 오류: {e}"),
            ConfigError::Serialize(e) => write!(f, "설정 직렬화 오류: {e}"),
            ConfigError::Invalid(e) => write!(f, "설정 검증 오류: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        ConfigError::Serialize(value)
    }
}

impl From<EngineError> for ConfigError {
    fn from(value: EngineError) -> Self {
        ConfigError::Invalid(value)
    }
}

/// TOML 문자열을 파싱하고 검증한다.
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(content)?;
    cfg.scenario.validate()?;
    Ok(cfg)
}

/// 설정 파일을 읽어 검증한다.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg = parse(&content)?;
    log::info!("설정 로드: {}", path.display());
    Ok(cfg)
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load(path)
    } else {
        let cfg = Config::default();
        save(&cfg, path)?;
        log::info!("기본 설정 생성: {}", path.display());
        Ok(cfg)
    }
}

/// 설정을 TOML로 저장한다.
pub fn save(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 지정한 경로에 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save(self, path)
    }
}
