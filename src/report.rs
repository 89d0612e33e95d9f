//! 평가 결과와 표준 전략 비교를 바탕으로 서술형 분석 리포트를 만든다.

use std::fmt::Write as _;

use crate::engine::{ResultSummary, StrategyOutcome};
use crate::i18n::{keys, Translator};

/// 고성능 비율이 이 값을 넘으면 고성능 중심 전략
pub const HIGH_PERFORMANCE_THRESHOLD: f64 = 0.8;
/// 고성능 비율이 이 값보다 작으면 저가 장비 중심 전략
pub const LOW_COST_THRESHOLD: f64 = 0.2;

/// 하드웨어 구성 전략 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareStrategy {
    HighPerformance,
    LowCost,
    Hybrid,
}

impl HardwareStrategy {
    /// 고성능 장비 예산 비율(0..1)로 전략을 분류한다.
    pub fn classify(high_performance_ratio: f64) -> Self {
        if high_performance_ratio > HIGH_PERFORMANCE_THRESHOLD {
            HardwareStrategy::HighPerformance
        } else if high_performance_ratio < LOW_COST_THRESHOLD {
            HardwareStrategy::LowCost
        } else {
            HardwareStrategy::Hybrid
        }
    }

    /// 단일 장비 구성만 순수 전략으로 본다. 권장 문구는 이 분류를 쓰고,
    /// 요약 표의 전략 이름은 `classify`를 쓴다.
    pub fn classify_pure(high_performance_ratio: f64) -> Self {
        if high_performance_ratio >= 1.0 {
            HardwareStrategy::HighPerformance
        } else if high_performance_ratio <= 0.0 {
            HardwareStrategy::LowCost
        } else {
            HardwareStrategy::Hybrid
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            HardwareStrategy::HighPerformance => keys::HW_HIGH,
            HardwareStrategy::LowCost => keys::HW_LOW,
            HardwareStrategy::Hybrid => keys::HW_HYBRID,
        }
    }
}

/// 전략 이름 (예: "아키텍처 적용 + 고성능 중심").
pub fn strategy_label(tr: &Translator, architecture_optimised: bool, ratio: f64) -> String {
    let arch = if architecture_optimised {
        keys::ARCH_ON
    } else {
        keys::ARCH_OFF
    };
    format!(
        "{} + {}",
        tr.t(arch),
        tr.t(HardwareStrategy::classify(ratio).label_key())
    )
}

/// 필요 단가가 가장 낮은 표준 전략.
pub fn cheapest_strategy(outcomes: &[StrategyOutcome]) -> Option<&StrategyOutcome> {
    outcomes.iter().min_by(|a, b| {
        a.summary
            .viability
            .price_per_million_units
            .total_cmp(&b.summary.viability.price_per_million_units)
    })
}

fn benchmark_price(outcomes: &[StrategyOutcome], architecture_optimised: bool) -> Option<f64> {
    outcomes
        .iter()
        .find(|o| {
            o.architecture_optimised == architecture_optimised && o.high_performance_ratio >= 1.0
        })
        .map(|o| o.summary.viability.price_per_million_units)
}

/// 권장 문구 키.
pub fn recommendation_key(
    architecture_optimised: bool,
    high_performance_ratio: f64,
) -> &'static str {
    if !architecture_optimised {
        return keys::REC_NO_ARCH;
    }
    match HardwareStrategy::classify_pure(high_performance_ratio) {
        HardwareStrategy::HighPerformance => keys::REC_ARCH_HIGH,
        HardwareStrategy::LowCost => keys::REC_ARCH_LOW,
        HardwareStrategy::Hybrid => keys::REC_ARCH_HYBRID,
    }
}

/// 서술형 리포트를 만든다. `benchmark`가 비어 있으면 비교 문장은 생략한다.
pub fn narrative(
    summary: &ResultSummary,
    benchmark: &[StrategyOutcome],
    tr: &Translator,
) -> String {
    let a = &summary.assumptions;
    let v = &summary.viability;
    let mut out = String::new();

    let _ = writeln!(out, "{}", tr.t(keys::NARRATIVE_TITLE));

    let _ = writeln!(out, "[{}]", tr.t(keys::NARRATIVE_CHOICE));
    let _ = writeln!(
        out,
        "  {} ({}: ${:.2} M)",
        strategy_label(tr, a.architecture_optimised, a.high_performance_ratio),
        tr.t(keys::SUMMARY_INVESTMENT_PER_MW),
        summary.investment_per_mw / 1e6
    );

    let _ = writeln!(out, "[{}]", tr.t(keys::NARRATIVE_DRIVER));
    let driver = if a.architecture_optimised {
        keys::NARRATIVE_DRIVER_ON
    } else {
        keys::NARRATIVE_DRIVER_OFF
    };
    let _ = writeln!(out, "  {}", tr.t(driver));
    if let Some(price) = benchmark_price(benchmark, a.architecture_optimised) {
        let _ = writeln!(
            out,
            "  - {}: ${price:.4}",
            strategy_label(tr, a.architecture_optimised, 1.0)
        );
    }

    let _ = writeln!(out, "[{}]", tr.t(keys::NARRATIVE_VIABILITY));
    let _ = writeln!(
        out,
        "  {} {:.1}%: {} ${:.0}, {} ${:.4}, {} ${:.2}",
        tr.t(keys::VIABILITY_TARGET_IRR),
        v.target_irr * 100.0,
        tr.t(keys::VIABILITY_REQUIRED_REVENUE),
        v.required_annual_revenue,
        tr.t(keys::VIABILITY_UNIT_PRICE),
        v.price_per_million_units,
        tr.t(keys::VIABILITY_MONTHLY_FEE),
        v.monthly_fee_per_user
    );

    let _ = writeln!(out, "[{}]", tr.t(keys::NARRATIVE_RECOMMENDATION));
    let rec = recommendation_key(a.architecture_optimised, a.high_performance_ratio);
    let _ = writeln!(out, "  {}", tr.t(rec));
    if !v.achievable {
        let _ = writeln!(out, "  - {}", tr.t(keys::REC_PRICING));
    }
    if let Some(best) = cheapest_strategy(benchmark) {
        let _ = writeln!(
            out,
            "  - {}: {} (${:.4})",
            tr.t(keys::REC_BEST),
            strategy_label(tr, best.architecture_optimised, best.high_performance_ratio),
            best.summary.viability.price_per_million_units
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(HardwareStrategy::classify(1.0), HardwareStrategy::HighPerformance);
        assert_eq!(HardwareStrategy::classify(0.8), HardwareStrategy::Hybrid);
        assert_eq!(HardwareStrategy::classify(0.2), HardwareStrategy::Hybrid);
        assert_eq!(HardwareStrategy::classify(0.0), HardwareStrategy::LowCost);
    }

    #[test]
    fn recommendation_needs_a_pure_mix() {
        assert_eq!(recommendation_key(true, 1.0), keys::REC_ARCH_HIGH);
        assert_eq!(recommendation_key(true, 0.0), keys::REC_ARCH_LOW);
        assert_eq!(recommendation_key(true, 0.9), keys::REC_ARCH_HYBRID);
        assert_eq!(recommendation_key(true, 0.1), keys::REC_ARCH_HYBRID);
        assert_eq!(recommendation_key(false, 1.0), keys::REC_NO_ARCH);
        // 이름표는 여전히 80% 기준
        assert_eq!(HardwareStrategy::classify(0.9), HardwareStrategy::HighPerformance);
    }
}
