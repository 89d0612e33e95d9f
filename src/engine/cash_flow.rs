//! 다년도 현금흐름, 목표 IRR 필요 매출(폐형해), 회수기간.
//!
//! 세금은 과세소득(매출 - 판관비 - 현금 운영비 - 감가상각)에 세율을 곱한 값이다.
//! 과세소득이 음수면 세금도 음수(세액 공제)로 두어 필요 매출 식이 선형을 유지하게 한다.

use super::error::{check_fraction, check_non_negative, EngineError};
use super::finance::{annuity_factor, check_rate, discount_factor, escalate};

/// 판관비(매출 비례)와 필요 매출의 순환 관계를 푸는 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgaSolveMode {
    /// 판관비를 제외하고 필요 매출을 구한 뒤 그 매출에 대한 판관비를 더한다.
    CostBasis,
    /// 매출 = 고정비 기준 필요 매출 / (1 - 판관비율) 로 동시에 푼다.
    RevenueBasis,
}

impl SgaSolveMode {
    pub fn key(self) -> &'static str {
        match self {
            SgaSolveMode::CostBasis => "cost_basis",
            SgaSolveMode::RevenueBasis => "revenue_basis",
        }
    }
}

/// 하드웨어 교체 투자.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareRefresh {
    pub year: u32,
    pub amount: f64,
}

/// 현금흐름 모델 입력. 금액은 명목 기준.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowModel {
    pub horizon_years: u32,
    pub construction_capex: f64,
    pub hardware_capex: f64,
    /// 1년차 현금 운영비(전력 + 유지보수 + 인건비)
    pub operating_cost: f64,
    pub escalation_rate: f64,
    /// R&D 풀에 내는 연간 분담금
    pub research_charge: f64,
    pub research_years: u32,
    pub sga_rate: f64,
    pub tax_rate: f64,
    pub building_life_years: u32,
    pub hardware_life_years: u32,
    pub refresh: Option<HardwareRefresh>,
    pub salvage: bool,
}

/// 한 해의 현금흐름.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlowYear {
    pub year: u32,
    pub outflow: f64,
    pub inflow: f64,
    pub tax: f64,
    pub net: f64,
    pub cumulative: f64,
}

/// 회수기간. 분석 기간 안에 회수되지 않으면 `Unrecoverable`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payback {
    Years(f64),
    Unrecoverable,
}

impl Payback {
    pub fn years(self) -> Option<f64> {
        match self {
            Payback::Years(y) => Some(y),
            Payback::Unrecoverable => None,
        }
    }

    pub fn is_recoverable(self) -> bool {
        matches!(self, Payback::Years(_))
    }
}

/// 목표 IRR 필요 매출 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequiredRevenue {
    pub mode: SgaSolveMode,
    /// 판관비 포함 필요 연매출
    pub required_revenue: f64,
    /// 필요 매출에 대한 판관비
    pub sga: f64,
    /// 목표 IRR로 할인한 세후 지출 현재가치 (초기 투자 포함, 잔존가치 차감)
    pub discounted_outflow: f64,
    /// 연금 현가 계수
    pub annuity_factor: f64,
}

impl CashFlowModel {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.horizon_years == 0 {
            return Err(EngineError::config("분석 기간은 1년 이상이어야 합니다."));
        }
        check_non_negative(self.construction_capex, "건설 CAPEX")?;
        check_non_negative(self.hardware_capex, "하드웨어 CAPEX")?;
        check_non_negative(self.operating_cost, "운영비")?;
        check_non_negative(self.research_charge, "R&D 분담금")?;
        check_rate(self.escalation_rate, "운영비 상승률")?;
        check_fraction(self.sga_rate, "판관비율")?;
        check_fraction(self.tax_rate, "세율")?;
        if self.sga_rate >= 1.0 || self.tax_rate >= 1.0 {
            return Err(EngineError::config("판관비율과 세율은 1 미만이어야 합니다."));
        }
        if self.building_life_years == 0 || self.hardware_life_years == 0 {
            return Err(EngineError::config("감가상각 기간은 1년 이상이어야 합니다."));
        }
        if let Some(refresh) = &self.refresh {
            check_non_negative(refresh.amount, "교체 투자액")?;
        }
        Ok(())
    }

    /// 0년차 초기 투자.
    pub fn initial_investment(&self) -> f64 {
        self.construction_capex + self.hardware_capex
    }

    fn active_refresh(&self) -> Option<HardwareRefresh> {
        self.refresh
            .filter(|r| r.year >= 1 && r.year <= self.horizon_years)
    }

    /// 해당 연도 감가상각(건물 + 최초 하드웨어 + 교체 하드웨어).
    pub fn depreciation(&self, year: u32) -> f64 {
        let mut dep = 0.0;
        if year <= self.building_life_years {
            dep += self.construction_capex / self.building_life_years as f64;
        }
        if year <= self.hardware_life_years {
            dep += self.hardware_capex / self.hardware_life_years as f64;
        }
        if let Some(refresh) = self.active_refresh() {
            if year > refresh.year && year <= refresh.year + self.hardware_life_years {
                dep += refresh.amount / self.hardware_life_years as f64;
            }
        }
        dep
    }

    /// 해당 연도 교체 투자 지출.
    pub fn reinvestment(&self, year: u32) -> f64 {
        match self.active_refresh() {
            Some(refresh) if refresh.year == year => refresh.amount,
            _ => 0.0,
        }
    }

    /// 분석 종료 시점의 미상각 장부가 합계.
    pub fn salvage_value(&self) -> f64 {
        if !self.salvage {
            return 0.0;
        }
        let n = self.horizon_years;
        let remaining = |cost: f64, life: u32, used: u32| -> f64 {
            cost * life.saturating_sub(used) as f64 / life as f64
        };
        let mut value = remaining(self.construction_capex, self.building_life_years, n)
            + remaining(self.hardware_capex, self.hardware_life_years, n);
        if let Some(refresh) = self.active_refresh() {
            value += remaining(refresh.amount, self.hardware_life_years, n - refresh.year);
        }
        value
    }

    /// 판관비를 제외한 해당 연도 현금 운영비 (상승률 + R&D 분담금 반영).
    pub fn operating_outflow(&self, year: u32) -> f64 {
        let research = if year <= self.research_years {
            self.research_charge
        } else {
            0.0
        };
        escalate(self.operating_cost, self.escalation_rate, year) + research
    }

    fn build(&self, revenue: f64, include_salvage: bool) -> Vec<CashFlowYear> {
        let initial = self.initial_investment();
        let mut rows = Vec::with_capacity(self.horizon_years as usize + 1);
        rows.push(CashFlowYear {
            year: 0,
            outflow: initial,
            inflow: 0.0,
            tax: 0.0,
            net: -initial,
            cumulative: -initial,
        });
        let mut cumulative = -initial;
        for year in 1..=self.horizon_years {
            let opex = self.operating_outflow(year);
            let sga = revenue * self.sga_rate;
            let taxable = revenue - sga - opex - self.depreciation(year);
            let tax = taxable * self.tax_rate;
            let salvage = if include_salvage && year == self.horizon_years {
                self.salvage_value()
            } else {
                0.0
            };
            let outflow = opex + sga + self.reinvestment(year);
            let inflow = revenue + salvage;
            let net = inflow - outflow - tax;
            cumulative += net;
            rows.push(CashFlowYear {
                year,
                outflow,
                inflow,
                tax,
                net,
                cumulative,
            });
        }
        rows
    }

    /// 가정 매출에 대한 0~N년 현금흐름 (마지막 해 잔존가치 포함).
    pub fn timeline(&self, revenue: f64) -> Vec<CashFlowYear> {
        self.build(revenue, true)
    }

    /// 가정 매출 현금흐름의 순현재가치.
    pub fn npv(&self, revenue: f64, rate: f64) -> Result<f64, EngineError> {
        check_rate(rate, "할인율")?;
        Ok(self
            .timeline(revenue)
            .iter()
            .map(|row| row.net * discount_factor(rate, row.year))
            .sum())
    }

    /// 목표 IRR을 정확히 달성하는 균등 연매출을 폐형해로 구한다.
    ///
    /// P = 초기투자 + Σ v^t [(1-세율)·운영비 - 세율·감가상각 + 교체투자 - 잔존가치]
    /// R = P / ((1-세율)·PVAF) 에 판관비 처리 방식을 적용한다.
    pub fn required_revenue(
        &self,
        target_irr: f64,
        mode: SgaSolveMode,
    ) -> Result<RequiredRevenue, EngineError> {
        self.validate()?;
        let pvaf = annuity_factor(target_irr, self.horizon_years)?;
        let keep = 1.0 - self.tax_rate;

        let mut discounted_outflow = self.initial_investment();
        for year in 1..=self.horizon_years {
            let mut flow = keep * self.operating_outflow(year)
                - self.tax_rate * self.depreciation(year)
                + self.reinvestment(year);
            if year == self.horizon_years {
                flow -= self.salvage_value();
            }
            discounted_outflow += flow * discount_factor(target_irr, year);
        }

        let base = discounted_outflow / (keep * pvaf);
        let (required_revenue, sga) = match mode {
            SgaSolveMode::CostBasis => {
                let sga = base * self.sga_rate;
                (base + sga, sga)
            }
            SgaSolveMode::RevenueBasis => {
                let revenue = base / (1.0 - self.sga_rate);
                (revenue, revenue * self.sga_rate)
            }
        };
        log::info!(
            "필요 매출 ({}): ${required_revenue:.0}/년 (IRR {:.2}%, {}년)",
            mode.key(),
            target_irr * 100.0,
            self.horizon_years
        );
        Ok(RequiredRevenue {
            mode,
            required_revenue,
            sga,
            discounted_outflow,
            annuity_factor: pvaf,
        })
    }

    /// 가정 매출로 누적 현금흐름이 0을 넘는 시점을 찾는다.
    ///
    /// 교차한 해 안에서는 선형 보간한다. 잔존가치는 회수 계산에 넣지 않는다.
    pub fn payback(&self, revenue: f64) -> Payback {
        let rows = self.build(revenue, false);
        if self.initial_investment() <= 0.0 {
            return Payback::Years(0.0);
        }
        for pair in rows.windows(2) {
            let (prev, row) = (pair[0], pair[1]);
            if prev.cumulative < 0.0 && row.cumulative >= 0.0 && row.net > 0.0 {
                let fraction = -prev.cumulative / row.net;
                return Payback::Years((row.year - 1) as f64 + fraction);
            }
        }
        log::info!("분석 기간 {}년 안에 투자금이 회수되지 않습니다.", self.horizon_years);
        Payback::Unrecoverable
    }
}
