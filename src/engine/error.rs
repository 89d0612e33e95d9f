/// 엔진 계산 오류를 표현한다.
///
/// 구성(입력) 자체가 잘못된 경우만 오류로 취급한다. 인원 0명 티어나 용량 0 같은
/// 퇴화된 입력은 오류가 아니라 0으로 대체해 계속 계산한다.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 잘못된 비율, 0 단가, 미정의 에너지원 키, 0으로 나누게 되는 할인율 등
    Configuration(String),
}

impl EngineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Configuration(msg) => write!(f, "구성 오류: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// 0~1 범위의 비율 값인지 확인한다.
pub(crate) fn check_fraction(value: f64, label: &str) -> Result<(), EngineError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::config(format!(
            "{label} 값 {value}은(는) 0~1 범위여야 합니다."
        )));
    }
    Ok(())
}

/// 0보다 큰 유한값인지 확인한다.
pub(crate) fn check_positive(value: f64, label: &str) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::config(format!(
            "{label} 값 {value}은(는) 0보다 커야 합니다."
        )));
    }
    Ok(())
}

/// 0 이상 유한값인지 확인한다.
pub(crate) fn check_non_negative(value: f64, label: &str) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::config(format!(
            "{label} 값 {value}은(는) 0 이상이어야 합니다."
        )));
    }
    Ok(())
}

/// 분모가 0(또는 비정상)이면 0을 돌려주는 나눗셈.
///
/// 인원 0명 티어, 용량 0 시나리오처럼 정상적인 퇴화 입력에서만 사용한다.
pub(crate) fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        log::debug!("0 분모 보호: {numerator} / {denominator} -> 0");
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
