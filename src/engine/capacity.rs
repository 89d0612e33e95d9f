use super::error::{check_fraction, check_non_negative, check_positive, EngineError};
use super::finance::HOURS_PER_YEAR;
use crate::scenario::HardwareSpec;

/// 용량 산정 입력.
#[derive(Debug, Clone)]
pub struct CapacityInput<'a> {
    /// 하드웨어 총예산 [$]
    pub budget: f64,
    /// 고성능 장비 예산 비율(0~1)
    pub high_performance_ratio: f64,
    pub high_performance: &'a HardwareSpec,
    pub standard: &'a HardwareSpec,
    /// 가동률(0~1)
    pub utilization: f64,
    /// 아키텍처 효율 배수 (미적용 시 1.0)
    pub efficiency: f64,
    pub pue: f64,
    /// 장비 소비전력이 없을 때 사용하는 시설 IT 부하 [MW]
    pub facility_size_mw: f64,
}

/// 용량 산정 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityResult {
    pub high_performance_units: u64,
    pub standard_units: u64,
    /// 실제 구매한 장비 금액 [$]
    pub hardware_capex: f64,
    /// 연간 처리 용량 [작업 단위/년]
    pub annual_capacity: f64,
    /// 가동률 반영 처리량 [작업 단위/년]
    pub serviced_throughput: f64,
    /// 시설 전력 (PUE 포함) [MW]
    pub power_draw_mw: f64,
}

impl CapacityResult {
    /// "H:n / S:m" 형태의 장비 구성 문자열.
    pub fn mix_label(&self) -> String {
        format!("H:{} / S:{}", self.high_performance_units, self.standard_units)
    }
}

/// 예산을 등급별로 나눠 장비 수, 처리량, 전력을 계산한다.
///
/// 장비 수는 분할 예산을 단가로 나눈 값의 내림이다(소수 대수는 구매하지 않음).
pub fn size_capacity(input: &CapacityInput<'_>) -> Result<CapacityResult, EngineError> {
    check_fraction(input.high_performance_ratio, "고성능 장비 비율")?;
    check_fraction(input.utilization, "가동률")?;
    check_non_negative(input.budget, "하드웨어 예산")?;
    check_positive(input.efficiency, "아키텍처 효율")?;
    for hw in [input.high_performance, input.standard] {
        if hw.unit_cost <= 0.0 || !hw.unit_cost.is_finite() {
            return Err(EngineError::config(format!(
                "장비 '{}'의 단가가 0 이하입니다.",
                hw.name
            )));
        }
    }

    let high_budget = input.budget * input.high_performance_ratio;
    let standard_budget = input.budget * (1.0 - input.high_performance_ratio);
    let high_units = (high_budget / input.high_performance.unit_cost).floor() as u64;
    let standard_units = (standard_budget / input.standard.unit_cost).floor() as u64;

    let hardware_capex = high_units as f64 * input.high_performance.unit_cost
        + standard_units as f64 * input.standard.unit_cost;
    let hourly = high_units as f64 * input.high_performance.throughput_per_hour
        + standard_units as f64 * input.standard.throughput_per_hour;
    let annual_capacity = hourly * HOURS_PER_YEAR * input.efficiency;
    let serviced_throughput = annual_capacity * input.utilization;

    let it_load_mw = match (
        input.high_performance.power_watts,
        input.standard.power_watts,
    ) {
        (Some(high_w), Some(std_w)) => {
            (high_units as f64 * high_w + standard_units as f64 * std_w) / 1e6
        }
        _ => input.facility_size_mw,
    };
    let power_draw_mw = it_load_mw * input.utilization * input.pue;

    log::debug!(
        "용량: H {high_units}대, S {standard_units}대, 연간 {annual_capacity:.3e} 단위, 전력 {power_draw_mw:.2} MW"
    );
    Ok(CapacityResult {
        high_performance_units: high_units,
        standard_units,
        hardware_capex,
        annual_capacity,
        serviced_throughput,
        power_draw_mw,
    })
}
