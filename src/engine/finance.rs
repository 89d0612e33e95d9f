//! 할인·연금·자본회수 계수 등 공통 재무 함수.

use super::error::EngineError;

/// 연간 시간 수 [h]
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// 할인율이 계산 가능한 범위(-1 초과, 유한값)인지 확인한다.
pub fn check_rate(rate: f64, label: &str) -> Result<(), EngineError> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(EngineError::config(format!(
            "{label} 값 {rate}은(는) -1보다 커야 합니다."
        )));
    }
    Ok(())
}

/// `year`년 시점 금액의 할인 계수 1/(1+r)^t.
pub fn discount_factor(rate: f64, year: u32) -> f64 {
    1.0 / (1.0 + rate).powi(year as i32)
}

/// `year`년 시점 명목 금액을 현재가치로 환산한다.
pub fn present_value(amount: f64, rate: f64, year: u32) -> f64 {
    amount * discount_factor(rate, year)
}

/// 1년차 기준 금액을 `year`년차 명목 금액으로 상승시킨다.
pub fn escalate(base: f64, rate: f64, year: u32) -> f64 {
    if year <= 1 {
        return base;
    }
    base * (1.0 + rate).powi(year as i32 - 1)
}

/// 연금 현가 계수(PVAF): 1~N년 말 1원씩 받는 흐름의 현재가치.
///
/// 할인율 0이면 단순 평균(N)을 사용한다. 계수가 0이 되는 경우(N=0)는 구성 오류다.
pub fn annuity_factor(rate: f64, years: u32) -> Result<f64, EngineError> {
    check_rate(rate, "할인율")?;
    let factor = if rate == 0.0 {
        years as f64
    } else {
        (1.0 - (1.0 + rate).powi(-(years as i32))) / rate
    };
    if factor <= 0.0 || !factor.is_finite() {
        return Err(EngineError::config(format!(
            "연금 현가 계수가 0입니다 (할인율 {rate}, 기간 {years}년)."
        )));
    }
    Ok(factor)
}

/// 자본회수계수(CRF) r(1+r)^L / ((1+r)^L - 1).
///
/// 수명 0은 0, 할인율 0은 1/L을 돌려준다.
pub fn capital_recovery_factor(rate: f64, lifetime: u32) -> f64 {
    if lifetime == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return 1.0 / lifetime as f64;
    }
    let factor = (1.0 + rate).powi(lifetime as i32);
    rate * factor / (factor - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_annuity_is_year_count() {
        assert_eq!(annuity_factor(0.0, 10).unwrap(), 10.0);
    }

    #[test]
    fn zero_year_annuity_is_rejected() {
        assert!(annuity_factor(0.08, 0).is_err());
        assert!(annuity_factor(0.0, 0).is_err());
    }

    #[test]
    fn crf_is_reciprocal_of_annuity_factor() {
        let crf = capital_recovery_factor(0.07, 20);
        let pvaf = annuity_factor(0.07, 20).unwrap();
        assert!((crf * pvaf - 1.0).abs() < 1e-12);
    }

    #[test]
    fn escalation_starts_at_year_one() {
        assert_eq!(escalate(100.0, 0.1, 1), 100.0);
        assert!((escalate(100.0, 0.1, 3) - 121.0).abs() < 1e-9);
    }
}
