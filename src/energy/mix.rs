//! 다중 전력원 포트폴리오 정의와 연도별 구성(단계 전환, 수요, 설비 용량) 계산.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::error::{check_fraction, check_non_negative, check_positive, EngineError};
use crate::engine::finance::{check_rate, HOURS_PER_YEAR};
use crate::scenario::RATIO_TOLERANCE;

/// 전력원 기술 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 계통 전력 구매 (설비 투자 없음)
    Grid,
    Solar,
    Wind,
    /// 연료전지 (스택 주기 교체)
    FuelCell,
    /// 디젤 등 연소식 발전기
    Combustion,
}

impl SourceKind {
    /// 구매 전력이 아닌 자가 설비인지 여부.
    pub fn is_onsite(self) -> bool {
        !matches!(self, SourceKind::Grid)
    }
}

/// 전력원 하나의 기술·경제 속성.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergySourceSpec {
    pub kind: SourceKind,
    /// 계통 구매 단가 [$/kWh]
    #[serde(default)]
    pub price_per_kwh: f64,
    /// 설비 CAPEX [$/kW]
    #[serde(default)]
    pub capex_per_kw: f64,
    /// 이용률(0~1]
    #[serde(default = "one")]
    pub capacity_factor: f64,
    /// 연간 O&M (CAPEX 대비 비율)
    #[serde(default)]
    pub om_rate: f64,
    /// 연료 단가 [$/kWh 연료 투입 기준]
    #[serde(default)]
    pub fuel_price_per_kwh: f64,
    /// 연료 -> 전력 변환 효율(0~1]
    #[serde(default = "one")]
    pub efficiency: f64,
    /// 배출계수 [kg CO₂/kWh 공급 전력]
    #[serde(default)]
    pub emission_factor: f64,
    /// 설비 수명 [년] (연금화 LCOE의 CRF에 사용)
    #[serde(default = "default_lifetime")]
    pub lifetime_years: u32,
    /// 스택 교체 주기 [년]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_lifetime_years: Option<u32>,
    /// 교체 시 원 CAPEX 대비 비용 비율
    #[serde(default)]
    pub replacement_fraction: f64,
}

fn one() -> f64 {
    1.0
}

fn default_lifetime() -> u32 {
    20
}

/// 탄소세. `start_year`부터 모든 배출량에 부과한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarbonTax {
    /// [$/t CO₂]
    pub per_tonne: f64,
    pub start_year: u32,
}

/// `start_year`부터 적용되는 전력원 구성비.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixPhase {
    pub start_year: u32,
    /// 전력원 키 -> 공급 에너지 비율
    pub shares: BTreeMap<String, f64>,
}

/// 다중 전력원 포트폴리오.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyPortfolio {
    pub discount_rate: f64,
    pub horizon_years: u32,
    /// 설비 용량 산정용 최대 수요 [MW]. 없으면 1년차 평균 부하를 사용한다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_demand_mw: Option<f64>,
    /// 1년차 수요 [MWh]. 없으면 호출자가 넘긴 시설 수요를 사용한다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_demand_mwh: Option<f64>,
    #[serde(default)]
    pub demand_growth_rate: f64,
    /// 연도별 수요 [MWh]. 주어지면 위 두 값보다 우선한다.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demand_profile_mwh: Vec<f64>,
    #[serde(default)]
    pub grid_price_escalation: f64,
    #[serde(default)]
    pub fuel_price_escalation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_tax: Option<CarbonTax>,
    pub sources: BTreeMap<String, EnergySourceSpec>,
    pub phases: Vec<MixPhase>,
}

impl EnergyPortfolio {
    /// 포트폴리오 구성을 검증한다.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_rate(self.discount_rate, "energy.discount_rate")?;
        check_rate(self.demand_growth_rate, "energy.demand_growth_rate")?;
        check_rate(self.grid_price_escalation, "energy.grid_price_escalation")?;
        check_rate(self.fuel_price_escalation, "energy.fuel_price_escalation")?;
        if self.horizon_years == 0 {
            return Err(EngineError::config("energy.horizon_years는 1 이상이어야 합니다."));
        }
        if let Some(peak) = self.peak_demand_mw {
            check_positive(peak, "energy.peak_demand_mw")?;
        }
        if let Some(demand) = self.annual_demand_mwh {
            check_non_negative(demand, "energy.annual_demand_mwh")?;
        }
        if !self.demand_profile_mwh.is_empty()
            && self.demand_profile_mwh.len() < self.horizon_years as usize
        {
            return Err(EngineError::config(format!(
                "energy.demand_profile_mwh 길이({})가 분석 기간({}년)보다 짧습니다.",
                self.demand_profile_mwh.len(),
                self.horizon_years
            )));
        }
        for (i, d) in self.demand_profile_mwh.iter().enumerate() {
            check_non_negative(*d, &format!("energy.demand_profile_mwh[{i}]"))?;
        }
        if let Some(tax) = &self.carbon_tax {
            check_non_negative(tax.per_tonne, "energy.carbon_tax.per_tonne")?;
        }

        for (key, src) in &self.sources {
            check_non_negative(src.price_per_kwh, &format!("energy.{key}.price_per_kwh"))?;
            check_non_negative(src.capex_per_kw, &format!("energy.{key}.capex_per_kw"))?;
            check_positive(src.capacity_factor, &format!("energy.{key}.capacity_factor"))?;
            check_fraction(src.capacity_factor, &format!("energy.{key}.capacity_factor"))?;
            check_non_negative(src.om_rate, &format!("energy.{key}.om_rate"))?;
            check_non_negative(
                src.fuel_price_per_kwh,
                &format!("energy.{key}.fuel_price_per_kwh"),
            )?;
            check_positive(src.efficiency, &format!("energy.{key}.efficiency"))?;
            check_fraction(src.efficiency, &format!("energy.{key}.efficiency"))?;
            check_non_negative(src.emission_factor, &format!("energy.{key}.emission_factor"))?;
            check_non_negative(
                src.replacement_fraction,
                &format!("energy.{key}.replacement_fraction"),
            )?;
            if src.kind.is_onsite() && src.lifetime_years == 0 {
                return Err(EngineError::config(format!(
                    "energy.{key}.lifetime_years는 1 이상이어야 합니다."
                )));
            }
            if src.stack_lifetime_years == Some(0) {
                return Err(EngineError::config(format!(
                    "energy.{key}.stack_lifetime_years는 1 이상이어야 합니다."
                )));
            }
        }

        let Some(first) = self.phases.first() else {
            return Err(EngineError::config("energy.phases가 비어 있습니다."));
        };
        if first.start_year != 1 {
            return Err(EngineError::config("첫 번째 에너지 단계는 1년차에 시작해야 합니다."));
        }
        for pair in self.phases.windows(2) {
            if pair[1].start_year <= pair[0].start_year {
                return Err(EngineError::config(
                    "에너지 단계 시작 연도는 오름차순이어야 합니다.",
                ));
            }
        }
        for phase in &self.phases {
            let mut sum = 0.0;
            for (key, share) in &phase.shares {
                if !self.sources.contains_key(key) {
                    return Err(EngineError::config(format!(
                        "알 수 없는 에너지원 키: '{key}'"
                    )));
                }
                check_fraction(*share, &format!("energy.phase{}.{key}", phase.start_year))?;
                sum += share;
            }
            if (sum - 1.0).abs() > RATIO_TOLERANCE {
                return Err(EngineError::config(format!(
                    "{}년차 단계의 전력원 비율 합계가 1이 아닙니다: {sum}",
                    phase.start_year
                )));
            }
        }
        Ok(())
    }

    /// 해당 연도에 적용되는 단계.
    pub fn phase_for_year(&self, year: u32) -> Option<&MixPhase> {
        self.phases.iter().rev().find(|p| p.start_year <= year)
    }

    /// 해당 연도의 전력원 비율. 단계에 없는 전력원은 0.
    pub fn share(&self, key: &str, year: u32) -> f64 {
        self.phase_for_year(year)
            .and_then(|p| p.shares.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    /// 전력원이 처음 사용되는 연도(설비 투자 연도).
    pub fn install_year(&self, key: &str) -> Option<u32> {
        self.phases
            .iter()
            .find(|p| p.shares.get(key).is_some_and(|s| *s > 0.0))
            .map(|p| p.start_year)
    }

    /// 전 기간 중 최대 비율.
    pub fn max_share(&self, key: &str) -> f64 {
        self.phases
            .iter()
            .filter_map(|p| p.shares.get(key))
            .fold(0.0, |acc, s| acc.max(*s))
    }

    /// 연도별 수요 [MWh]. 우선순위: 연도별 프로필 > 1년차 수요 + 증가율 > `fallback_mwh`.
    pub fn demand_schedule(&self, fallback_mwh: Option<f64>) -> Result<Vec<f64>, EngineError> {
        let years = self.horizon_years as usize;
        if !self.demand_profile_mwh.is_empty() {
            return Ok(self.demand_profile_mwh[..years].to_vec());
        }
        let base = self.annual_demand_mwh.or(fallback_mwh).ok_or_else(|| {
            EngineError::config("에너지 포트폴리오의 수요(annual_demand_mwh)가 지정되지 않았습니다.")
        })?;
        check_non_negative(base, "energy 수요")?;
        Ok((1..=self.horizon_years)
            .map(|year| base * (1.0 + self.demand_growth_rate).powi(year as i32 - 1))
            .collect())
    }

    /// 설비 용량 산정용 최대 수요 [kW].
    pub fn peak_demand_kw(&self, first_year_mwh: f64) -> f64 {
        match self.peak_demand_mw {
            Some(mw) => mw * 1000.0,
            None => first_year_mwh * 1000.0 / HOURS_PER_YEAR,
        }
    }

    /// 자가 설비별 설치 용량 [kW]: 최대 수요 × 최대 비율 / 이용률.
    pub fn installed_capacity_kw(&self, peak_kw: f64) -> BTreeMap<String, f64> {
        self.sources
            .iter()
            .filter(|(_, src)| src.kind.is_onsite())
            .map(|(key, src)| {
                let kw = peak_kw * self.max_share(key) / src.capacity_factor;
                (key.clone(), kw)
            })
            .filter(|(_, kw)| *kw > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_phase() -> EnergyPortfolio {
        let grid = EnergySourceSpec {
            kind: SourceKind::Grid,
            price_per_kwh: 0.1,
            capex_per_kw: 0.0,
            capacity_factor: 1.0,
            om_rate: 0.0,
            fuel_price_per_kwh: 0.0,
            efficiency: 1.0,
            emission_factor: 0.4,
            lifetime_years: 20,
            stack_lifetime_years: None,
            replacement_fraction: 0.0,
        };
        let solar = EnergySourceSpec {
            kind: SourceKind::Solar,
            capex_per_kw: 1000.0,
            capacity_factor: 0.25,
            emission_factor: 0.0,
            price_per_kwh: 0.0,
            ..grid.clone()
        };
        EnergyPortfolio {
            discount_rate: 0.05,
            horizon_years: 5,
            peak_demand_mw: None,
            annual_demand_mwh: Some(8760.0),
            demand_growth_rate: 0.0,
            demand_profile_mwh: Vec::new(),
            grid_price_escalation: 0.0,
            fuel_price_escalation: 0.0,
            carbon_tax: None,
            sources: BTreeMap::from([("grid".into(), grid), ("solar".into(), solar)]),
            phases: vec![
                MixPhase {
                    start_year: 1,
                    shares: BTreeMap::from([("grid".into(), 1.0)]),
                },
                MixPhase {
                    start_year: 3,
                    shares: BTreeMap::from([("grid".into(), 0.5), ("solar".into(), 0.5)]),
                },
            ],
        }
    }

    #[test]
    fn phase_switch_changes_shares() {
        let p = two_phase();
        assert!(p.validate().is_ok());
        assert_eq!(p.share("solar", 2), 0.0);
        assert_eq!(p.share("solar", 3), 0.5);
        assert_eq!(p.install_year("solar"), Some(3));
    }

    #[test]
    fn onsite_capacity_scales_with_capacity_factor() {
        let p = two_phase();
        // 8760 MWh/년 -> 평균 1 MW
        let cap = p.installed_capacity_kw(p.peak_demand_kw(8760.0));
        assert!((cap["solar"] - 2000.0).abs() < 1e-9);
        assert!(!cap.contains_key("grid"));
    }

    #[test]
    fn unknown_source_key_is_rejected() {
        let mut p = two_phase();
        p.phases[0].shares = BTreeMap::from([("hydro".into(), 1.0)]);
        assert!(matches!(p.validate(), Err(EngineError::Configuration(_))));
    }
}
