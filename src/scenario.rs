//! 시나리오 입력 레코드. 설정 파일(TOML)에서 그대로 역직렬화되며,
//! 로드 시 한 번 `validate`로 검증한 뒤 엔진에 넘긴다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::energy::mix::{CarbonTax, EnergyPortfolio, EnergySourceSpec, MixPhase, SourceKind};
use crate::engine::cash_flow::SgaSolveMode;
use crate::engine::error::{check_fraction, check_non_negative, check_positive, EngineError};
use crate::engine::finance::check_rate;
use crate::engine::revenue::PricingMode;

/// 티어 비율 합계 허용 오차
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// 한 번의 평가에 필요한 모든 입력을 묶는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub facility: FacilitySpec,
    pub hardware: HardwareMix,
    pub operating: OperatingCosts,
    pub research: ResearchPool,
    pub market: MarketSpec,
    pub finance: FinanceSpec,
    pub power: PowerSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyPortfolio>,
}

/// 시설 규모와 투자 단가.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilitySpec {
    /// 시설 규모 [MW, IT 부하 기준]
    pub size_mw: f64,
    /// 건설 CAPEX [$/MW]
    pub construction_capex_per_mw: f64,
    /// 하드웨어 예산 [$/MW]
    pub hardware_budget_per_mw: f64,
    /// 전력 사용 효율(PUE, 1 이상)
    pub pue: f64,
}

/// 연산 장비 한 등급의 속성.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareSpec {
    pub name: String,
    /// 대당 취득가 [$]
    pub unit_cost: f64,
    /// 대당 처리량 [작업 단위/h]
    pub throughput_per_hour: f64,
    /// 대당 소비전력 [W]. 모든 등급에 주어지면 전력 산정에 사용한다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_watts: Option<f64>,
}

/// 고성능/저가 장비 구성과 아키텍처 효율 계수.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareMix {
    pub high_performance: HardwareSpec,
    pub standard: HardwareSpec,
    /// 고급 워크로드 아키텍처 적용 시 처리량 배수
    pub architecture_efficiency: f64,
}

/// 운영비 단가.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatingCosts {
    /// 유지보수·냉각비 [$/MW/년]
    pub maintenance_per_mw: f64,
    /// 하드웨어 CAPEX 대비 연간 유지보수 비율(0~1)
    #[serde(default)]
    pub maintenance_rate_of_hardware: f64,
    /// 인건비 및 기타 [$/MW/년]
    pub personnel_per_mw: f64,
    /// 매출 대비 판관비 비율(0~1 미만)
    pub sga_rate: f64,
    /// 현금 운영비 연간 상승률
    #[serde(default)]
    pub escalation_rate: f64,
}

/// 여러 시설이 나눠 부담하는 모델 개발(R&D) 비용.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchPool {
    /// 총 모델 개발비 [$]
    pub total_cost: f64,
    /// 비용을 배분할 시설 수
    pub facility_count: u32,
    /// 상각 기간 [년]
    pub amortization_years: u32,
}

/// 사용자 규모, 사용량 단가, 티어 정의.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSpec {
    /// MW당 사용자 수
    pub users_per_mw: f64,
    /// 사용량 과금 단가 [$/백만 작업 단위]
    pub price_per_million_units: f64,
    pub tiers: Vec<TierSpec>,
}

/// 수요 티어.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierSpec {
    pub name: String,
    /// 전체 사용자 중 비율
    pub population_ratio: f64,
    /// 사용자당 월 사용량 [작업 단위, 상대값]
    pub usage_intensity: f64,
    /// 사용자당 월 정액 요금 [$]
    #[serde(default)]
    pub monthly_fee: f64,
    /// 사용량 과금 대상 여부 (무료 티어는 false)
    #[serde(default = "default_true")]
    pub usage_billed: bool,
    /// 수용 가능한 최대 월 요금 [$]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_acceptable_fee: Option<f64>,
}

fn default_true() -> bool {
    true
}

fn default_refresh_fraction() -> f64 {
    1.0
}

/// 목표 수익률, 분석 기간, 세율, 자산 수명.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinanceSpec {
    /// 목표 IRR (할인율로도 사용)
    pub target_irr: f64,
    /// 분석 기간 [년]
    pub horizon_years: u32,
    /// 법인세율(0~1 미만)
    pub tax_rate: f64,
    /// 건물 감가상각 기간 [년]
    pub building_life_years: u32,
    /// 하드웨어 감가상각 기간 [년]
    pub hardware_life_years: u32,
    /// 하드웨어 교체 투자 연도
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_refresh_year: Option<u32>,
    /// 교체 투자액 (원 하드웨어 CAPEX 대비 비율)
    #[serde(default = "default_refresh_fraction")]
    pub hardware_refresh_fraction: f64,
    /// 분석 종료 시 잔존가치 회수 여부
    #[serde(default = "default_true")]
    pub salvage: bool,
}

/// 전력원별 구매 단가.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerSpec {
    /// 기본 전력원 키
    pub default_source: String,
    /// 전력원 키 -> 단가 [$/kWh]
    pub sources: BTreeMap<String, f64>,
}

/// 호출마다 바뀌는 시나리오 조정값.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOverrides {
    /// 고성능 장비 예산 비율(0~1)
    pub high_performance_ratio: f64,
    /// 가동률(0~1)
    pub utilization: f64,
    pub power: PowerChoice,
    /// 고급 워크로드 아키텍처 적용 여부
    pub architecture_optimised: bool,
    pub pricing: PricingMode,
    pub sga_mode: SgaSolveMode,
    /// 티어 이름 -> 월 정액 요금 재정의
    pub fee_overrides: BTreeMap<String, f64>,
}

impl Default for ScenarioOverrides {
    fn default() -> Self {
        Self {
            high_performance_ratio: 1.0,
            utilization: 0.7,
            power: PowerChoice::Configured,
            architecture_optimised: false,
            pricing: PricingMode::UsageBased,
            sga_mode: SgaSolveMode::RevenueBasis,
            fee_overrides: BTreeMap::new(),
        }
    }
}

/// 전력 단가를 어디서 가져올지 선택한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerChoice {
    /// `power.default_source`
    Configured,
    /// `power.sources`의 특정 키
    Source(String),
    /// 에너지 포트폴리오 LCOE
    Portfolio,
}

impl ScenarioConfig {
    /// 로드 시점에 한 번 수행하는 구성 검증.
    pub fn validate(&self) -> Result<(), EngineError> {
        let f = &self.facility;
        check_positive(f.size_mw, "facility.size_mw")?;
        check_non_negative(f.construction_capex_per_mw, "facility.construction_capex_per_mw")?;
        check_non_negative(f.hardware_budget_per_mw, "facility.hardware_budget_per_mw")?;
        if !f.pue.is_finite() || f.pue < 1.0 {
            return Err(EngineError::config(format!(
                "facility.pue 값 {}은(는) 1 이상이어야 합니다.",
                f.pue
            )));
        }

        for hw in [&self.hardware.high_performance, &self.hardware.standard] {
            check_positive(hw.unit_cost, &format!("hardware.{}.unit_cost", hw.name))?;
            check_non_negative(
                hw.throughput_per_hour,
                &format!("hardware.{}.throughput_per_hour", hw.name),
            )?;
            if let Some(w) = hw.power_watts {
                check_non_negative(w, &format!("hardware.{}.power_watts", hw.name))?;
            }
        }
        check_positive(
            self.hardware.architecture_efficiency,
            "hardware.architecture_efficiency",
        )?;

        let op = &self.operating;
        check_non_negative(op.maintenance_per_mw, "operating.maintenance_per_mw")?;
        check_fraction(op.maintenance_rate_of_hardware, "operating.maintenance_rate_of_hardware")?;
        check_non_negative(op.personnel_per_mw, "operating.personnel_per_mw")?;
        check_fraction(op.sga_rate, "operating.sga_rate")?;
        if op.sga_rate >= 1.0 {
            return Err(EngineError::config("operating.sga_rate는 1 미만이어야 합니다."));
        }
        check_rate(op.escalation_rate, "operating.escalation_rate")?;

        let rd = &self.research;
        check_non_negative(rd.total_cost, "research.total_cost")?;
        if rd.facility_count == 0 {
            return Err(EngineError::config("research.facility_count는 1 이상이어야 합니다."));
        }
        if rd.amortization_years == 0 {
            return Err(EngineError::config(
                "research.amortization_years는 1 이상이어야 합니다.",
            ));
        }

        self.validate_market()?;

        let fin = &self.finance;
        check_rate(fin.target_irr, "finance.target_irr")?;
        if fin.horizon_years == 0 {
            return Err(EngineError::config("finance.horizon_years는 1 이상이어야 합니다."));
        }
        check_fraction(fin.tax_rate, "finance.tax_rate")?;
        if fin.tax_rate >= 1.0 {
            return Err(EngineError::config("finance.tax_rate는 1 미만이어야 합니다."));
        }
        if fin.building_life_years == 0 || fin.hardware_life_years == 0 {
            return Err(EngineError::config("자산 감가상각 기간은 1년 이상이어야 합니다."));
        }
        if fin.hardware_refresh_year == Some(0) {
            return Err(EngineError::config(
                "finance.hardware_refresh_year는 1 이상이어야 합니다.",
            ));
        }
        check_non_negative(fin.hardware_refresh_fraction, "finance.hardware_refresh_fraction")?;

        if !self.power.sources.contains_key(&self.power.default_source) {
            return Err(EngineError::config(format!(
                "power.default_source '{}'이(가) power.sources에 없습니다.",
                self.power.default_source
            )));
        }
        for (key, price) in &self.power.sources {
            check_non_negative(*price, &format!("power.sources.{key}"))?;
        }

        if let Some(energy) = &self.energy {
            energy.validate()?;
        }
        Ok(())
    }

    fn validate_market(&self) -> Result<(), EngineError> {
        let m = &self.market;
        check_positive(m.users_per_mw, "market.users_per_mw")?;
        check_non_negative(m.price_per_million_units, "market.price_per_million_units")?;
        if m.tiers.is_empty() {
            return Err(EngineError::config("market.tiers가 비어 있습니다."));
        }
        let mut ratio_sum = 0.0;
        for (i, tier) in m.tiers.iter().enumerate() {
            if m.tiers[..i].iter().any(|t| t.name == tier.name) {
                return Err(EngineError::config(format!(
                    "티어 이름 '{}'이(가) 중복됩니다.",
                    tier.name
                )));
            }
            check_fraction(tier.population_ratio, &format!("tier.{}.population_ratio", tier.name))?;
            check_non_negative(tier.usage_intensity, &format!("tier.{}.usage_intensity", tier.name))?;
            check_non_negative(tier.monthly_fee, &format!("tier.{}.monthly_fee", tier.name))?;
            ratio_sum += tier.population_ratio;
        }
        if (ratio_sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(EngineError::config(format!(
                "티어 비율 합계가 1이 아닙니다: {ratio_sum}"
            )));
        }
        Ok(())
    }

    /// 건설 CAPEX [$]
    pub fn construction_capex(&self) -> f64 {
        self.facility.construction_capex_per_mw * self.facility.size_mw
    }

    /// 하드웨어 예산 [$]
    pub fn hardware_budget(&self) -> f64 {
        self.facility.hardware_budget_per_mw * self.facility.size_mw
    }

    /// 전체 사용자 수
    pub fn total_users(&self) -> f64 {
        self.market.users_per_mw * self.facility.size_mw
    }
}

impl Default for ScenarioConfig {
    /// 100 MW AI 데이터센터 기준 사례.
    fn default() -> Self {
        Self {
            facility: FacilitySpec {
                size_mw: 100.0,
                construction_capex_per_mw: 10_000_000.0,
                hardware_budget_per_mw: 30_000_000.0,
                pue: 1.3,
            },
            hardware: HardwareMix {
                high_performance: HardwareSpec {
                    name: "high_perf_gpu".into(),
                    unit_cost: 30_000.0,
                    throughput_per_hour: 1_800_000.0,
                    power_watts: Some(700.0),
                },
                standard: HardwareSpec {
                    name: "standard_gpu".into(),
                    unit_cost: 10_000.0,
                    throughput_per_hour: 500_000.0,
                    power_watts: Some(350.0),
                },
                architecture_efficiency: 1.5,
            },
            operating: OperatingCosts {
                maintenance_per_mw: 500_000.0,
                maintenance_rate_of_hardware: 0.0,
                personnel_per_mw: 300_000.0,
                sga_rate: 0.15,
                escalation_rate: 0.02,
            },
            research: ResearchPool {
                total_cost: 1_000_000_000.0,
                facility_count: 10,
                amortization_years: 5,
            },
            market: MarketSpec {
                users_per_mw: 100_000.0,
                price_per_million_units: 2.0,
                tiers: vec![
                    TierSpec {
                        name: "free".into(),
                        population_ratio: 0.7,
                        usage_intensity: 5.0,
                        monthly_fee: 0.0,
                        usage_billed: false,
                        max_acceptable_fee: None,
                    },
                    TierSpec {
                        name: "standard".into(),
                        population_ratio: 0.25,
                        usage_intensity: 30.0,
                        monthly_fee: 20.0,
                        usage_billed: true,
                        max_acceptable_fee: Some(100.0),
                    },
                    TierSpec {
                        name: "premium".into(),
                        population_ratio: 0.05,
                        usage_intensity: 200.0,
                        monthly_fee: 200.0,
                        usage_billed: true,
                        max_acceptable_fee: Some(500.0),
                    },
                ],
            },
            finance: FinanceSpec {
                target_irr: 0.08,
                horizon_years: 10,
                tax_rate: 0.22,
                building_life_years: 20,
                hardware_life_years: 5,
                hardware_refresh_year: Some(5),
                hardware_refresh_fraction: 1.0,
                salvage: true,
            },
            power: PowerSpec {
                default_source: "grid".into(),
                sources: BTreeMap::from([
                    ("grid".to_string(), 0.12),
                    ("renewable".to_string(), 0.18),
                ]),
            },
            energy: Some(default_portfolio()),
        }
    }
}

/// 초기(NG 연료전지 + 계통) -> 전환(재생 + 수소 연료전지 + 디젤) 2단계 포트폴리오.
fn default_portfolio() -> EnergyPortfolio {
    let source = |kind: SourceKind| EnergySourceSpec {
        kind,
        price_per_kwh: 0.0,
        capex_per_kw: 0.0,
        capacity_factor: 1.0,
        om_rate: 0.0,
        fuel_price_per_kwh: 0.0,
        efficiency: 1.0,
        emission_factor: 0.0,
        lifetime_years: 20,
        stack_lifetime_years: None,
        replacement_fraction: 0.0,
    };
    let sources = BTreeMap::from([
        (
            "grid".to_string(),
            EnergySourceSpec {
                price_per_kwh: 0.12,
                emission_factor: 0.45,
                ..source(SourceKind::Grid)
            },
        ),
        (
            "ng_sofc".to_string(),
            EnergySourceSpec {
                capex_per_kw: 2_500.0,
                capacity_factor: 0.9,
                om_rate: 0.03,
                fuel_price_per_kwh: 0.035,
                efficiency: 0.6,
                emission_factor: 0.35,
                stack_lifetime_years: Some(5),
                replacement_fraction: 0.3,
                ..source(SourceKind::FuelCell)
            },
        ),
        (
            "solar".to_string(),
            EnergySourceSpec {
                capex_per_kw: 1_000.0,
                capacity_factor: 0.2,
                om_rate: 0.015,
                lifetime_years: 25,
                ..source(SourceKind::Solar)
            },
        ),
        (
            "wind".to_string(),
            EnergySourceSpec {
                capex_per_kw: 1_500.0,
                capacity_factor: 0.3,
                om_rate: 0.02,
                ..source(SourceKind::Wind)
            },
        ),
        (
            "h2_sofc".to_string(),
            EnergySourceSpec {
                capex_per_kw: 3_000.0,
                capacity_factor: 0.9,
                om_rate: 0.03,
                fuel_price_per_kwh: 0.06,
                efficiency: 0.42,
                stack_lifetime_years: Some(5),
                replacement_fraction: 0.3,
                ..source(SourceKind::FuelCell)
            },
        ),
        (
            "diesel".to_string(),
            EnergySourceSpec {
                capex_per_kw: 500.0,
                capacity_factor: 0.9,
                om_rate: 0.05,
                fuel_price_per_kwh: 0.25,
                emission_factor: 0.7,
                lifetime_years: 15,
                ..source(SourceKind::Combustion)
            },
        ),
    ]);
    EnergyPortfolio {
        discount_rate: 0.07,
        horizon_years: 20,
        peak_demand_mw: None,
        annual_demand_mwh: None,
        demand_growth_rate: 0.0,
        demand_profile_mwh: Vec::new(),
        grid_price_escalation: 0.02,
        fuel_price_escalation: 0.03,
        carbon_tax: Some(CarbonTax {
            per_tonne: 50.0,
            start_year: 4,
        }),
        sources,
        phases: vec![
            MixPhase {
                start_year: 1,
                shares: BTreeMap::from([
                    ("ng_sofc".to_string(), 0.7),
                    ("grid".to_string(), 0.3),
                ]),
            },
            MixPhase {
                start_year: 3,
                shares: BTreeMap::from([
                    ("solar".to_string(), 0.25),
                    ("wind".to_string(), 0.25),
                    ("h2_sofc".to_string(), 0.4),
                    ("diesel".to_string(), 0.1),
                ]),
            },
        ],
    }
}
