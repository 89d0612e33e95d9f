//! 기술·경제 타당성 엔진.
//!
//! 용량 산정 -> 비용 계산 -> 티어 배분 -> 현금흐름 순으로 계산한다. 모든 함수는 입력만
//! 읽고 결과를 새로 만들어 돌려주므로, 여러 시나리오를 서로 다른 스레드에서 동시에
//! 평가해도 된다.

pub mod capacity;
pub mod cash_flow;
pub mod cost;
pub mod error;
pub mod finance;
pub mod revenue;

pub use capacity::{size_capacity, CapacityInput, CapacityResult};
pub use cash_flow::{CashFlowModel, CashFlowYear, HardwareRefresh, Payback, SgaSolveMode};
pub use cost::{CostBreakdown, CostKind, CostLineItem};
pub use error::EngineError;
pub use revenue::{
    break_even_users, BreakEven, PricingMode, RecommendedFee, TierAllocator, TierEconomics,
};

use crate::energy::{evaluate_portfolio, LcoeResult};
use crate::scenario::{PowerChoice, ScenarioConfig, ScenarioOverrides};
use error::guarded_div;
use finance::HOURS_PER_YEAR;

/// 연간 손익.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualPnl {
    pub revenue: f64,
    pub cost_of_revenue: f64,
    pub gross_profit: f64,
    pub sga: f64,
    /// 건물 + 하드웨어 감가상각
    pub depreciation: f64,
    pub hardware_depreciation: f64,
    pub research_amortization: f64,
    pub operating_profit: f64,
    pub items: Vec<CostLineItem>,
}

/// 목표 IRR 기준 사업 타당성.
#[derive(Debug, Clone, PartialEq)]
pub struct Viability {
    pub target_irr: f64,
    pub sga_mode: SgaSolveMode,
    pub required_annual_revenue: f64,
    /// 과금 처리량 기준 필요 단가 [$/백만 작업 단위]
    pub price_per_million_units: f64,
    /// 과금 사용자 1인당 필요 월 요금 [$]
    pub monthly_fee_per_user: f64,
    pub recommended_fees: Vec<RecommendedFee>,
    /// 모든 권장 요금이 티어 상한 이내인지
    pub achievable: bool,
    /// 대표 매출 기준 손익분기 사용자 수
    pub break_even_users: BreakEven,
}

/// 계산 전제 요약.
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub high_performance_ratio: f64,
    pub utilization: f64,
    pub architecture_optimised: bool,
    pub pricing: PricingMode,
    pub electricity_price_per_kwh: f64,
    pub capacity: CapacityResult,
}

/// 엔진의 유일한 출력.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub assumptions: Assumptions,
    pub total_investment: f64,
    pub investment_per_mw: f64,
    pub pnl: AnnualPnl,
    pub tiers: Vec<TierEconomics>,
    pub viability: Viability,
    /// 대표 매출을 가정했을 때의 회수기간
    pub payback: Payback,
    /// 대표 매출 현금흐름의 목표 IRR 기준 NPV
    pub npv_at_target: f64,
    /// 포트폴리오 전력을 쓴 경우의 에너지 결과
    pub energy: Option<LcoeResult>,
}

/// 시나리오 하나를 평가한다.
///
/// `config`는 로드 시 검증된 구성이어야 한다. 호출마다 바뀌는 비율·가동률은 여기서
/// 계산 전에 검증한다.
pub fn evaluate(
    config: &ScenarioConfig,
    overrides: &ScenarioOverrides,
) -> Result<ResultSummary, EngineError> {
    let capacity = facility_capacity(config, overrides)?;
    let (electricity_price, energy) = resolve_power_price(config, overrides, &capacity)?;

    let allocator = TierAllocator::new(
        &config.market.tiers,
        &overrides.fee_overrides,
        config.total_users(),
        capacity.serviced_throughput,
        config.market.price_per_million_units,
    )?;
    let revenue = allocator.revenue(overrides.pricing);

    let cost_input = cost::CostInput {
        size_mw: config.facility.size_mw,
        construction_capex: config.construction_capex(),
        hardware_capex: capacity.hardware_capex,
        power_draw_mw: capacity.power_draw_mw,
        electricity_price_per_kwh: electricity_price,
        operating: &config.operating,
        research: &config.research,
        building_life_years: config.finance.building_life_years,
        hardware_life_years: config.finance.hardware_life_years,
    };
    let costs = cost::account(&cost_input, revenue)?;
    let tiers = allocator.allocate(overrides.pricing, costs.total_annual_cost);

    let fin = &config.finance;
    let refresh = fin.hardware_refresh_year.map(|year| HardwareRefresh {
        year,
        amount: capacity.hardware_capex * fin.hardware_refresh_fraction,
    });
    if let Some(year) = fin.hardware_refresh_year {
        if year > fin.horizon_years {
            log::warn!(
                "하드웨어 교체 연도({year})가 분석 기간({}년)을 넘어 반영하지 않습니다.",
                fin.horizon_years
            );
        }
    }
    let model = CashFlowModel {
        horizon_years: fin.horizon_years,
        construction_capex: config.construction_capex(),
        hardware_capex: capacity.hardware_capex,
        operating_cost: costs.cost_of_revenue,
        escalation_rate: config.operating.escalation_rate,
        research_charge: costs.research_amortization,
        research_years: config.research.amortization_years,
        sga_rate: config.operating.sga_rate,
        tax_rate: fin.tax_rate,
        building_life_years: fin.building_life_years,
        hardware_life_years: fin.hardware_life_years,
        refresh,
        salvage: fin.salvage,
    };
    let required = model.required_revenue(fin.target_irr, overrides.sga_mode)?;
    let payback = model.payback(revenue);
    let npv_at_target = model.npv(revenue, fin.target_irr)?;

    let recommended_fees = allocator.recommend_fees(required.required_revenue);
    let viability = Viability {
        target_irr: fin.target_irr,
        sga_mode: overrides.sga_mode,
        required_annual_revenue: required.required_revenue,
        price_per_million_units: guarded_div(
            required.required_revenue,
            allocator.billed_throughput(),
        ) * 1e6,
        monthly_fee_per_user: guarded_div(required.required_revenue, allocator.paying_users())
            / 12.0,
        achievable: recommended_fees.iter().all(|fee| fee.achievable),
        recommended_fees,
        break_even_users: break_even_users(
            costs.total_before_sga(),
            revenue,
            config.total_users(),
            config.operating.sga_rate,
        ),
    };

    let gross_profit = revenue - costs.cost_of_revenue;
    let pnl = AnnualPnl {
        revenue,
        cost_of_revenue: costs.cost_of_revenue,
        gross_profit,
        sga: costs.sga,
        depreciation: costs.depreciation,
        hardware_depreciation: costs.amount(CostKind::HardwareDepreciation),
        research_amortization: costs.research_amortization,
        operating_profit: revenue - costs.total_annual_cost,
        items: costs.items,
    };

    let total_investment = model.initial_investment();
    Ok(ResultSummary {
        assumptions: Assumptions {
            high_performance_ratio: overrides.high_performance_ratio,
            utilization: overrides.utilization,
            architecture_optimised: overrides.architecture_optimised,
            pricing: overrides.pricing,
            electricity_price_per_kwh: electricity_price,
            capacity,
        },
        total_investment,
        investment_per_mw: total_investment / config.facility.size_mw,
        pnl,
        tiers,
        viability,
        payback,
        npv_at_target,
        energy,
    })
}

/// 시나리오 조정값을 반영한 시설 용량.
pub fn facility_capacity(
    config: &ScenarioConfig,
    overrides: &ScenarioOverrides,
) -> Result<CapacityResult, EngineError> {
    let efficiency = if overrides.architecture_optimised {
        config.hardware.architecture_efficiency
    } else {
        1.0
    };
    size_capacity(&CapacityInput {
        budget: config.hardware_budget(),
        high_performance_ratio: overrides.high_performance_ratio,
        high_performance: &config.hardware.high_performance,
        standard: &config.hardware.standard,
        utilization: overrides.utilization,
        efficiency,
        pue: config.facility.pue,
        facility_size_mw: config.facility.size_mw,
    })
}

/// 시설 연간 전력 수요 [MWh].
pub fn facility_demand_mwh(capacity: &CapacityResult) -> f64 {
    capacity.power_draw_mw * HOURS_PER_YEAR
}

fn resolve_power_price(
    config: &ScenarioConfig,
    overrides: &ScenarioOverrides,
    capacity: &CapacityResult,
) -> Result<(f64, Option<LcoeResult>), EngineError> {
    let key = match &overrides.power {
        PowerChoice::Configured => &config.power.default_source,
        PowerChoice::Source(key) => key,
        PowerChoice::Portfolio => {
            let portfolio = config.energy.as_ref().ok_or_else(|| {
                EngineError::config("에너지 포트폴리오가 구성되지 않았습니다.")
            })?;
            let lcoe = evaluate_portfolio(portfolio, Some(facility_demand_mwh(capacity)))?;
            return Ok((lcoe.price_per_kwh(), Some(lcoe)));
        }
    };
    let price = config
        .power
        .sources
        .get(key)
        .copied()
        .ok_or_else(|| EngineError::config(format!("알 수 없는 전력원 키: '{key}'")))?;
    Ok((price, None))
}

/// 표준 비교 전략 하나의 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub architecture_optimised: bool,
    pub high_performance_ratio: f64,
    pub summary: ResultSummary,
}

/// {아키텍처 미적용/적용} × {고성능 100%/저가 100%} 네 가지 표준 전략을 평가한다.
///
/// 나머지 조정값은 `base`를 그대로 쓴다.
pub fn benchmark(
    config: &ScenarioConfig,
    base: &ScenarioOverrides,
) -> Result<Vec<StrategyOutcome>, EngineError> {
    let mut outcomes = Vec::with_capacity(4);
    for architecture_optimised in [false, true] {
        for high_performance_ratio in [1.0, 0.0] {
            let overrides = ScenarioOverrides {
                architecture_optimised,
                high_performance_ratio,
                ..base.clone()
            };
            outcomes.push(StrategyOutcome {
                architecture_optimised,
                high_performance_ratio,
                summary: evaluate(config, &overrides)?,
            });
        }
    }
    Ok(outcomes)
}
