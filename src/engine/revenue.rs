//! 티어별 매출·비용 배분.
//!
//! 비용은 인원 비율이 아니라 사용량 비율(인원 비율 × 사용 강도)로 배분한다.
//! 사용량 과금과 정액 요금 두 방식의 매출을 항상 함께 계산하고, 요금 방식은 어느 쪽을
//! 대표 매출로 쓸지만 정한다.

use std::collections::BTreeMap;

use super::error::{check_non_negative, guarded_div, EngineError};
use crate::scenario::TierSpec;

/// 대표 매출 산정 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// 사용량 × 단가
    UsageBased,
    /// 월 정액 × 인원 × 12
    FixedFee,
}

impl PricingMode {
    pub fn key(self) -> &'static str {
        match self {
            PricingMode::UsageBased => "usage",
            PricingMode::FixedFee => "fixed",
        }
    }
}

/// 티어 하나의 단위 경제성. 금액은 연간, `_per_user_month`는 사용자당 월 기준.
#[derive(Debug, Clone, PartialEq)]
pub struct TierEconomics {
    pub name: String,
    pub population: f64,
    pub usage_share: f64,
    pub usage_revenue: f64,
    pub fee_revenue: f64,
    /// 요금 방식에 따른 대표 매출
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub monthly_fee: f64,
    pub revenue_per_user_month: f64,
    pub cost_per_user_month: f64,
    pub profit_per_user_month: f64,
    /// 정액 요금 - 사용자당 월 비용
    pub fee_margin_per_user_month: f64,
    /// 사용량 기준 사용자당 월 매출 - 정액 요금
    pub opportunity_cost_per_user_month: f64,
}

/// 목표 매출을 맞추기 위한 티어별 권장 월 요금.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedFee {
    pub tier: String,
    pub monthly_fee: f64,
    pub max_acceptable_fee: Option<f64>,
    /// 상한이 없거나 상한 이내인지
    pub achievable: bool,
}

#[derive(Debug, Clone)]
struct TierLine<'a> {
    spec: &'a TierSpec,
    population: f64,
    usage_share: f64,
    usage_revenue: f64,
    fee_revenue: f64,
    monthly_fee: f64,
}

impl TierLine<'_> {
    fn revenue(&self, mode: PricingMode) -> f64 {
        match mode {
            PricingMode::UsageBased => self.usage_revenue,
            PricingMode::FixedFee => self.fee_revenue,
        }
    }
}

/// 전체 처리량과 비용을 티어별로 나누는 배분기.
#[derive(Debug, Clone)]
pub struct TierAllocator<'a> {
    lines: Vec<TierLine<'a>>,
    serviced_throughput: f64,
}

impl<'a> TierAllocator<'a> {
    /// 사용량 비율과 두 방식의 매출을 미리 계산한다.
    ///
    /// `fee_overrides`의 키가 정의되지 않은 티어를 가리키면 구성 오류다.
    pub fn new(
        tiers: &'a [TierSpec],
        fee_overrides: &BTreeMap<String, f64>,
        total_users: f64,
        serviced_throughput: f64,
        price_per_million_units: f64,
    ) -> Result<Self, EngineError> {
        for (name, fee) in fee_overrides {
            if !tiers.iter().any(|t| &t.name == name) {
                return Err(EngineError::config(format!("알 수 없는 티어: '{name}'")));
            }
            check_non_negative(*fee, &format!("{name} 요금"))?;
        }

        let weighted_usage: f64 = tiers
            .iter()
            .map(|t| t.population_ratio * t.usage_intensity)
            .sum();
        let lines: Vec<TierLine<'a>> = tiers
            .iter()
            .map(|spec| {
                let usage_share = if weighted_usage > 0.0 {
                    spec.population_ratio * spec.usage_intensity / weighted_usage
                } else {
                    // 사용 강도가 모두 0이면 인원 비율로 대신한다.
                    spec.population_ratio
                };
                let population = total_users * spec.population_ratio;
                let monthly_fee = fee_overrides
                    .get(&spec.name)
                    .copied()
                    .unwrap_or(spec.monthly_fee);
                let usage_revenue = if spec.usage_billed {
                    usage_share * serviced_throughput / 1e6 * price_per_million_units
                } else {
                    0.0
                };
                TierLine {
                    spec,
                    population,
                    usage_share,
                    usage_revenue,
                    fee_revenue: monthly_fee * population * 12.0,
                    monthly_fee,
                }
            })
            .collect();

        for line in lines.iter().filter(|line| line.population <= 0.0) {
            log::debug!("인원 0명 티어 '{}'는 매출·비용 집계에서 제외", line.spec.name);
        }
        Ok(Self {
            lines,
            serviced_throughput,
        })
    }

    /// 인원이 있는 티어. 모든 합계와 티어 표는 이 줄들에서만 나온다.
    fn populated(&self) -> impl Iterator<Item = &TierLine<'a>> + '_ {
        self.lines.iter().filter(|line| line.population > 0.0)
    }

    /// 요금 방식별 총매출 (티어 매출 합계).
    pub fn revenue(&self, mode: PricingMode) -> f64 {
        self.populated().map(|line| line.revenue(mode)).sum()
    }

    /// 과금 대상 티어가 소비하는 처리량 [작업 단위/년].
    pub fn billed_throughput(&self) -> f64 {
        self.populated()
            .filter(|line| line.spec.usage_billed)
            .map(|line| line.usage_share * self.serviced_throughput)
            .sum()
    }

    /// 과금 대상 티어의 사용자 수.
    pub fn paying_users(&self) -> f64 {
        self.populated()
            .filter(|line| line.spec.usage_billed)
            .map(|line| line.population)
            .sum()
    }

    /// 티어별 매출·비용·이익과 사용자당 지표. 인원 0명 티어는 건너뛴다.
    pub fn allocate(&self, mode: PricingMode, total_annual_cost: f64) -> Vec<TierEconomics> {
        self.populated()
            .map(|line| {
                let revenue = line.revenue(mode);
                let cost = line.usage_share * total_annual_cost;
                let per_user_month = |annual: f64| guarded_div(annual, line.population) / 12.0;
                let cost_per_user_month = per_user_month(cost);
                let usage_per_user_month = per_user_month(line.usage_revenue);
                TierEconomics {
                    name: line.spec.name.clone(),
                    population: line.population,
                    usage_share: line.usage_share,
                    usage_revenue: line.usage_revenue,
                    fee_revenue: line.fee_revenue,
                    revenue,
                    cost,
                    profit: revenue - cost,
                    monthly_fee: line.monthly_fee,
                    revenue_per_user_month: per_user_month(revenue),
                    cost_per_user_month,
                    profit_per_user_month: per_user_month(revenue - cost),
                    fee_margin_per_user_month: line.monthly_fee - cost_per_user_month,
                    opportunity_cost_per_user_month: usage_per_user_month - line.monthly_fee,
                }
            })
            .collect()
    }

    /// 목표 연매출을 과금 티어에 사용량 매출 비중대로 나눠 사용자당 월 요금으로 환산한다.
    pub fn recommend_fees(&self, required_revenue: f64) -> Vec<RecommendedFee> {
        let billed: Vec<&TierLine<'_>> = self
            .populated()
            .filter(|line| line.spec.usage_billed)
            .collect();
        let usage_total: f64 = billed.iter().map(|line| line.usage_revenue).sum();
        let population_total: f64 = billed.iter().map(|line| line.population).sum();

        billed
            .into_iter()
            .map(|line| {
                let weight = if usage_total > 0.0 {
                    line.usage_revenue / usage_total
                } else {
                    guarded_div(line.population, population_total)
                };
                let monthly_fee = guarded_div(required_revenue * weight, line.population) / 12.0;
                let max = line.spec.max_acceptable_fee;
                RecommendedFee {
                    tier: line.spec.name.clone(),
                    monthly_fee,
                    max_acceptable_fee: max,
                    achievable: max.map_or(true, |cap| monthly_fee <= cap),
                }
            })
            .collect()
    }
}

/// 손익분기 사용자 수. 사용자당 순매출이 0 이하이면 도달할 수 없다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakEven {
    Users(f64),
    Unreachable,
}

impl BreakEven {
    pub fn users(self) -> Option<f64> {
        match self {
            BreakEven::Users(n) => Some(n),
            BreakEven::Unreachable => None,
        }
    }
}

/// 현재 티어 구성과 사용자당 매출이 유지된다고 보고, 판관비 차감 후 매출이
/// 판관비 외 연간 비용을 덮는 사용자 수를 구한다.
pub fn break_even_users(
    cost_before_sga: f64,
    revenue: f64,
    total_users: f64,
    sga_rate: f64,
) -> BreakEven {
    let net_per_user = guarded_div(revenue, total_users) * (1.0 - sga_rate);
    if net_per_user <= 0.0 {
        return BreakEven::Unreachable;
    }
    BreakEven::Users((cost_before_sga.max(0.0) / net_per_user).ceil())
}
