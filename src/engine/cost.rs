use super::error::{check_non_negative, EngineError};
use super::finance::HOURS_PER_YEAR;
use crate::scenario::{OperatingCosts, ResearchPool};

/// 비용 항목 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CostKind {
    Electricity,
    Maintenance,
    Personnel,
    BuildingDepreciation,
    HardwareDepreciation,
    ResearchAmortization,
    Sga,
}

impl CostKind {
    /// 번역 키 접미사로도 쓰는 고정 식별자.
    pub fn key(self) -> &'static str {
        match self {
            CostKind::Electricity => "electricity",
            CostKind::Maintenance => "maintenance",
            CostKind::Personnel => "personnel",
            CostKind::BuildingDepreciation => "building_depreciation",
            CostKind::HardwareDepreciation => "hardware_depreciation",
            CostKind::ResearchAmortization => "research_amortization",
            CostKind::Sga => "sga",
        }
    }

    /// 매출원가 항목 여부.
    pub fn is_cost_of_revenue(self) -> bool {
        matches!(
            self,
            CostKind::Electricity | CostKind::Maintenance | CostKind::Personnel
        )
    }
}

/// 이름 붙은 연간 비용.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostLineItem {
    pub kind: CostKind,
    pub amount: f64,
}

/// 비용 계산 입력.
#[derive(Debug, Clone)]
pub struct CostInput<'a> {
    pub size_mw: f64,
    pub construction_capex: f64,
    pub hardware_capex: f64,
    /// 시설 전력 (PUE 포함) [MW]
    pub power_draw_mw: f64,
    pub electricity_price_per_kwh: f64,
    pub operating: &'a OperatingCosts,
    pub research: &'a ResearchPool,
    pub building_life_years: u32,
    pub hardware_life_years: u32,
}

impl CostInput<'_> {
    /// 시설당 배분된 R&D 비용의 연간 상각액.
    pub fn research_amortization(&self) -> f64 {
        let per_facility = self.research.total_cost / self.research.facility_count as f64;
        per_facility / self.research.amortization_years as f64
    }

    fn validate(&self) -> Result<(), EngineError> {
        check_non_negative(self.electricity_price_per_kwh, "전력 단가")?;
        check_non_negative(self.power_draw_mw, "전력 부하")?;
        if self.research.facility_count == 0 || self.research.amortization_years == 0 {
            return Err(EngineError::config(
                "R&D 배분 시설 수와 상각 기간은 1 이상이어야 합니다.",
            ));
        }
        if self.building_life_years == 0 || self.hardware_life_years == 0 {
            return Err(EngineError::config("감가상각 기간은 1년 이상이어야 합니다."));
        }
        Ok(())
    }
}

/// 연간 비용 내역.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub items: Vec<CostLineItem>,
    /// 전력 + 유지보수 + 인건비
    pub cost_of_revenue: f64,
    /// 건물 + 하드웨어 감가상각
    pub depreciation: f64,
    pub research_amortization: f64,
    pub sga: f64,
    /// 판관비·상각 포함 총 연간 비용
    pub total_annual_cost: f64,
}

impl CostBreakdown {
    /// 항목 금액. 없으면 0.
    pub fn amount(&self, kind: CostKind) -> f64 {
        self.items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.amount)
            .sum()
    }

    /// 판관비를 제외한 총 비용.
    pub fn total_before_sga(&self) -> f64 {
        self.total_annual_cost - self.sga
    }
}

/// 1년차 기준 연간 비용을 계산한다.
///
/// 판관비는 이미 알려진 매출(`revenue`)에 비율을 곱해 구한다. 매출 자체를 풀어야 하는
/// 경우는 현금흐름 계산기의 `SgaSolveMode`가 따로 처리한다.
pub fn account(input: &CostInput<'_>, revenue: f64) -> Result<CostBreakdown, EngineError> {
    input.validate()?;
    let op = input.operating;

    let electricity =
        input.power_draw_mw * 1000.0 * HOURS_PER_YEAR * input.electricity_price_per_kwh;
    let maintenance = op.maintenance_per_mw * input.size_mw
        + op.maintenance_rate_of_hardware * input.hardware_capex;
    let personnel = op.personnel_per_mw * input.size_mw;
    let building_dep = input.construction_capex / input.building_life_years as f64;
    let hardware_dep = input.hardware_capex / input.hardware_life_years as f64;
    let research_amortization = input.research_amortization();
    let sga = revenue.max(0.0) * op.sga_rate;

    let items = vec![
        CostLineItem {
            kind: CostKind::Electricity,
            amount: electricity,
        },
        CostLineItem {
            kind: CostKind::Maintenance,
            amount: maintenance,
        },
        CostLineItem {
            kind: CostKind::Personnel,
            amount: personnel,
        },
        CostLineItem {
            kind: CostKind::BuildingDepreciation,
            amount: building_dep,
        },
        CostLineItem {
            kind: CostKind::HardwareDepreciation,
            amount: hardware_dep,
        },
        CostLineItem {
            kind: CostKind::ResearchAmortization,
            amount: research_amortization,
        },
        CostLineItem {
            kind: CostKind::Sga,
            amount: sga,
        },
    ];
    let cost_of_revenue = electricity + maintenance + personnel;
    let depreciation = building_dep + hardware_dep;
    let total_annual_cost = items.iter().map(|item| item.amount).sum();

    Ok(CostBreakdown {
        items,
        cost_of_revenue,
        depreciation,
        research_amortization,
        sga,
        total_annual_cost,
    })
}
