//! 다중 전력원 포트폴리오의 다년도 할인 TCO와 균등화 발전원가(LCOE).
//!
//! LCOE는 두 가지를 별도 이름으로 낸다.
//! - `lcoe_pv_ratio`: 할인 총비용 / 할인 총수요
//! - `lcoe_annuitized`: 초기 CAPEX를 설비 수명 CRF로 연금화한 값 + 연금화 운영비, 연금화 수요로 나눔

use std::collections::BTreeMap;

use super::mix::EnergyPortfolio;
use crate::engine::error::{guarded_div, EngineError};
use crate::engine::finance::{capital_recovery_factor, discount_factor, escalate};

/// 한 해의 에너지 비용·배출 내역.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyYear {
    pub year: u32,
    pub demand_mwh: f64,
    /// 전력원 키 -> 공급량 [MWh]
    pub supply_mwh: BTreeMap<String, f64>,
    /// 신규 설비 CAPEX [$]
    pub capex: f64,
    /// 스택 교체 CAPEX [$]
    pub replacement_capex: f64,
    pub grid_cost: f64,
    pub om_cost: f64,
    pub fuel_cost: f64,
    pub carbon_tax: f64,
    /// 배출량 [t CO₂]
    pub emissions_t: f64,
    /// 배출계수 [kg/kWh]
    pub emission_factor: f64,
    pub discount_factor: f64,
}

impl EnergyYear {
    /// 연간 운영비 합계 [$]
    pub fn opex(&self) -> f64 {
        self.grid_cost + self.om_cost + self.fuel_cost + self.carbon_tax
    }

    /// 연간 CAPEX 합계 [$] (신규 + 교체)
    pub fn total_capex(&self) -> f64 {
        self.capex + self.replacement_capex
    }

    /// 명목 총비용을 공급량으로 나눈 연간 단가 [$/MWh]
    pub fn cost_per_mwh(&self) -> f64 {
        guarded_div(self.opex() + self.total_capex(), self.demand_mwh)
    }
}

/// 포트폴리오 평가 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct LcoeResult {
    pub years: Vec<EnergyYear>,
    /// 전력원 키 -> 설치 용량 [kW]
    pub installed_capacity_kw: BTreeMap<String, f64>,
    pub pv_capex: f64,
    pub pv_opex: f64,
    pub pv_demand_mwh: f64,
    /// 할인 총소유비용 [$]
    pub total_cost_of_ownership: f64,
    /// 할인 총비용 / 할인 총수요 [$/MWh]
    pub lcoe_pv_ratio: f64,
    /// CRF 연금화 방식 [$/MWh]
    pub lcoe_annuitized: f64,
    pub total_emissions_t: f64,
}

impl LcoeResult {
    /// 엔진 비용 계산용 전력 단가 [$/kWh] (PV 비율 방식 기준).
    pub fn price_per_kwh(&self) -> f64 {
        self.lcoe_pv_ratio / 1000.0
    }
}

/// 포트폴리오의 다년도 TCO와 LCOE를 계산한다.
///
/// `fallback_demand_mwh`는 포트폴리오에 수요가 지정되지 않았을 때 사용할 1년차 수요다.
pub fn evaluate_portfolio(
    portfolio: &EnergyPortfolio,
    fallback_demand_mwh: Option<f64>,
) -> Result<LcoeResult, EngineError> {
    portfolio.validate()?;
    let rate = portfolio.discount_rate;
    let horizon = portfolio.horizon_years;
    let demand = portfolio.demand_schedule(fallback_demand_mwh)?;

    let peak_kw = portfolio.peak_demand_kw(demand.first().copied().unwrap_or(0.0));
    let installed = portfolio.installed_capacity_kw(peak_kw);
    let initial_capex: BTreeMap<&str, f64> = installed
        .iter()
        .map(|(key, kw)| (key.as_str(), kw * portfolio.sources[key].capex_per_kw))
        .collect();

    let mut years = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let demand_mwh = demand[year as usize - 1];
        let df = discount_factor(rate, year);
        let mut row = EnergyYear {
            year,
            demand_mwh,
            supply_mwh: BTreeMap::new(),
            capex: 0.0,
            replacement_capex: 0.0,
            grid_cost: 0.0,
            om_cost: 0.0,
            fuel_cost: 0.0,
            carbon_tax: 0.0,
            emissions_t: 0.0,
            emission_factor: 0.0,
            discount_factor: df,
        };

        for (key, src) in &portfolio.sources {
            let supplied_mwh = demand_mwh * portfolio.share(key, year);
            let supplied_kwh = supplied_mwh * 1000.0;

            if let (Some(&capex), Some(install)) =
                (initial_capex.get(key.as_str()), portfolio.install_year(key))
            {
                if year == install {
                    row.capex += capex;
                }
                // 단계에서 빠진 설비는 퇴역으로 보고 O&M과 스택 교체를 멈춘다.
                if year >= install && portfolio.share(key, year) > 0.0 {
                    row.om_cost += src.om_rate * capex;
                    if let Some(stack) = src.stack_lifetime_years {
                        let age = year - install;
                        if age > 0 && age % stack == 0 {
                            row.replacement_capex += capex * src.replacement_fraction;
                        }
                    }
                }
            }

            if supplied_kwh <= 0.0 {
                continue;
            }
            row.supply_mwh.insert(key.clone(), supplied_mwh);
            row.grid_cost += supplied_kwh
                * escalate(src.price_per_kwh, portfolio.grid_price_escalation, year);
            row.fuel_cost += supplied_kwh / src.efficiency
                * escalate(src.fuel_price_per_kwh, portfolio.fuel_price_escalation, year);
            row.emissions_t += supplied_kwh * src.emission_factor / 1000.0;
        }

        if let Some(tax) = &portfolio.carbon_tax {
            if year >= tax.start_year {
                row.carbon_tax = row.emissions_t * tax.per_tonne;
            }
        }
        row.emission_factor = guarded_div(row.emissions_t * 1000.0, demand_mwh * 1000.0);
        years.push(row);
    }

    let pv_capex: f64 = years.iter().map(|y| y.total_capex() * y.discount_factor).sum();
    let pv_opex: f64 = years.iter().map(|y| y.opex() * y.discount_factor).sum();
    let pv_demand_mwh: f64 = years.iter().map(|y| y.demand_mwh * y.discount_factor).sum();
    let pv_replacement: f64 = years
        .iter()
        .map(|y| y.replacement_capex * y.discount_factor)
        .sum();
    let total_cost_of_ownership = pv_capex + pv_opex;
    let lcoe_pv_ratio = guarded_div(total_cost_of_ownership, pv_demand_mwh);

    let horizon_crf = capital_recovery_factor(rate, horizon);
    let annualized_capex: f64 = initial_capex
        .iter()
        .map(|(key, capex)| {
            let src = &portfolio.sources[*key];
            let install = portfolio.install_year(key).unwrap_or(1);
            capex
                * discount_factor(rate, install)
                * capital_recovery_factor(rate, src.lifetime_years)
        })
        .sum();
    let annualized_running = horizon_crf * (pv_opex + pv_replacement);
    let lcoe_annuitized = guarded_div(
        annualized_capex + annualized_running,
        horizon_crf * pv_demand_mwh,
    );

    let total_emissions_t = years.iter().map(|y| y.emissions_t).sum();
    log::info!(
        "에너지 포트폴리오: TCO ${total_cost_of_ownership:.0}, LCOE {lcoe_pv_ratio:.2} $/MWh (PV 비율), {lcoe_annuitized:.2} $/MWh (연금화)"
    );

    Ok(LcoeResult {
        years,
        installed_capacity_kw: installed,
        pv_capex,
        pv_opex,
        pv_demand_mwh,
        total_cost_of_ownership,
        lcoe_pv_ratio,
        lcoe_annuitized,
        total_emissions_t,
    })
}
