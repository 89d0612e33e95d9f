//! 계산 결과를 터미널 표로 출력한다.

use crate::energy::LcoeResult;
use crate::engine::{
    BreakEven, Payback, PricingMode, ResultSummary, SgaSolveMode, StrategyOutcome,
};
use crate::i18n::{keys, Translator};
use crate::report;

/// 회수기간 표기. 회수 불가는 번역된 문구로 표시한다.
pub fn format_payback(payback: Payback, tr: &Translator) -> String {
    match payback {
        Payback::Years(years) => format!("{years:.2} {}", tr.t(keys::PAYBACK_YEARS)),
        Payback::Unrecoverable => tr.t(keys::PAYBACK_UNRECOVERABLE).to_string(),
    }
}

/// 손익분기 사용자 수 표기.
pub fn format_break_even(break_even: BreakEven, tr: &Translator) -> String {
    match break_even {
        BreakEven::Users(n) => format!(
            "{} {}",
            format_money(n).trim_start_matches('$'),
            tr.t(keys::BREAK_EVEN_USERS)
        ),
        BreakEven::Unreachable => tr.t(keys::BREAK_EVEN_UNREACHABLE).to_string(),
    }
}

/// 금액을 천 단위 구분 기호와 함께 표시한다.
pub fn format_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let whole = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

fn pricing_label(mode: PricingMode, tr: &Translator) -> &str {
    match mode {
        PricingMode::UsageBased => tr.t(keys::PRICING_USAGE),
        PricingMode::FixedFee => tr.t(keys::PRICING_FIXED),
    }
}

fn sga_mode_label(mode: SgaSolveMode, tr: &Translator) -> &str {
    match mode {
        SgaSolveMode::CostBasis => tr.t(keys::MODE_COST_BASIS),
        SgaSolveMode::RevenueBasis => tr.t(keys::MODE_REVENUE_BASIS),
    }
}

/// 시나리오 평가 결과 전체를 출력한다.
pub fn print_summary(summary: &ResultSummary, tr: &Translator) {
    let a = &summary.assumptions;
    println!("{}", tr.t(keys::SUMMARY_TITLE));
    println!(
        "{}: {}",
        tr.t(keys::SUMMARY_INVESTMENT),
        format_money(summary.total_investment)
    );
    println!(
        "{}: {}",
        tr.t(keys::SUMMARY_INVESTMENT_PER_MW),
        format_money(summary.investment_per_mw)
    );
    println!(
        "{}: {} ({})",
        tr.t(keys::SUMMARY_HARDWARE_MIX),
        a.capacity.mix_label(),
        report::strategy_label(tr, a.architecture_optimised, a.high_performance_ratio)
    );
    println!("{}: {:.1}%", tr.t(keys::SUMMARY_UTILIZATION), a.utilization * 100.0);
    println!(
        "{}: {:.3e}",
        tr.t(keys::SUMMARY_SERVICED),
        a.capacity.serviced_throughput
    );
    println!("{}: {:.2} MW", tr.t(keys::SUMMARY_POWER), a.capacity.power_draw_mw);
    println!(
        "{}: ${:.4}/kWh",
        tr.t(keys::SUMMARY_ELECTRICITY_PRICE),
        a.electricity_price_per_kwh
    );
    println!("{}: {}", tr.t(keys::SUMMARY_PRICING), pricing_label(a.pricing, tr));

    print_pnl(summary, tr);
    print_tiers(summary, tr);
    print_viability(summary, tr);
    if let Some(energy) = &summary.energy {
        print_energy(energy, tr);
    }
}

fn print_pnl(summary: &ResultSummary, tr: &Translator) {
    let p = &summary.pnl;
    println!("{}", tr.t(keys::PNL_TITLE));
    let rows = [
        (keys::PNL_REVENUE, p.revenue),
        (keys::PNL_COST_OF_REVENUE, p.cost_of_revenue),
        (keys::PNL_GROSS_PROFIT, p.gross_profit),
        (keys::PNL_SGA, p.sga),
        (keys::PNL_DEPRECIATION, p.depreciation),
        (keys::PNL_RESEARCH, p.research_amortization),
        (keys::PNL_OPERATING_PROFIT, p.operating_profit),
    ];
    for (key, value) in rows {
        println!("  {:<24} {:>20}", tr.t(key), format_money(value));
    }
    println!("  [{}]", tr.t(keys::PNL_LINE_ITEMS));
    for item in &p.items {
        let key = format!("cost.{}", item.kind.key());
        println!("    {:<22} {:>20}", tr.t(&key), format_money(item.amount));
    }
}

fn print_tiers(summary: &ResultSummary, tr: &Translator) {
    println!("{}", tr.t(keys::TIERS_TITLE));
    println!("{}", tr.t(keys::TIERS_HEADER));
    for tier in &summary.tiers {
        println!(
            "{:<10} {:>12.0} {:>12.2} {:>11.2} {:>11.2}",
            tier.name,
            tier.population,
            tier.revenue_per_user_month,
            tier.cost_per_user_month,
            tier.profit_per_user_month
        );
    }
    println!("{}", tr.t(keys::TIERS_WHAT_IF_TITLE));
    println!("{}", tr.t(keys::TIERS_WHAT_IF_HEADER));
    for tier in &summary.tiers {
        println!(
            "{:<10} {:>12.2} {:>13.2} {:>15.2}",
            tier.name,
            tier.monthly_fee,
            tier.fee_margin_per_user_month,
            tier.opportunity_cost_per_user_month
        );
    }
}

fn print_viability(summary: &ResultSummary, tr: &Translator) {
    let v = &summary.viability;
    println!("{}", tr.t(keys::VIABILITY_TITLE));
    println!("{}: {:.2}%", tr.t(keys::VIABILITY_TARGET_IRR), v.target_irr * 100.0);
    println!("{}: {}", tr.t(keys::VIABILITY_MODE), sga_mode_label(v.sga_mode, tr));
    println!(
        "{}: {}",
        tr.t(keys::VIABILITY_REQUIRED_REVENUE),
        format_money(v.required_annual_revenue)
    );
    println!(
        "{}: ${:.4}",
        tr.t(keys::VIABILITY_UNIT_PRICE),
        v.price_per_million_units
    );
    println!(
        "{}: ${:.2}",
        tr.t(keys::VIABILITY_MONTHLY_FEE),
        v.monthly_fee_per_user
    );
    for fee in &v.recommended_fees {
        let status = if fee.achievable {
            tr.t(keys::VIABILITY_ACHIEVABLE)
        } else {
            tr.t(keys::VIABILITY_NOT_ACHIEVABLE)
        };
        match fee.max_acceptable_fee {
            Some(max) => println!(
                "  {} [{}]: ${:.2} (max ${max:.2}, {status})",
                tr.t(keys::VIABILITY_RECOMMENDED),
                fee.tier,
                fee.monthly_fee
            ),
            None => println!(
                "  {} [{}]: ${:.2}",
                tr.t(keys::VIABILITY_RECOMMENDED),
                fee.tier,
                fee.monthly_fee
            ),
        }
    }
    println!("{}: {}", tr.t(keys::PAYBACK), format_payback(summary.payback, tr));
    println!("{}: {}", tr.t(keys::NPV), format_money(summary.npv_at_target));
    println!(
        "{}: {}",
        tr.t(keys::BREAK_EVEN),
        format_break_even(v.break_even_users, tr)
    );
}

/// 표준 전략 비교 표를 출력한다.
pub fn print_benchmark(outcomes: &[StrategyOutcome], tr: &Translator) {
    println!("{}", tr.t(keys::BENCHMARK_TITLE));
    println!("{}", tr.t(keys::BENCHMARK_HEADER));
    for outcome in outcomes {
        let s = &outcome.summary;
        println!(
            "{:<30} {:>14} {:>12.4}  {}",
            report::strategy_label(
                tr,
                outcome.architecture_optimised,
                outcome.high_performance_ratio
            ),
            format_money(s.investment_per_mw),
            s.viability.price_per_million_units,
            format_payback(s.payback, tr)
        );
    }
}

/// 에너지 포트폴리오 연도별 표와 LCOE를 출력한다.
pub fn print_energy(result: &LcoeResult, tr: &Translator) {
    println!("{}", tr.t(keys::ENERGY_TITLE));
    println!("{}:", tr.t(keys::ENERGY_CAPACITY));
    for (key, kw) in &result.installed_capacity_kw {
        println!("  {key:<12} {:>12.0} kW", kw);
    }
    println!("{}", tr.t(keys::ENERGY_HEADER));
    for y in &result.years {
        println!(
            "{:<4} {:>13.0} {:>12} {:>12} {:>11.1} {:>10.4}",
            y.year,
            y.demand_mwh,
            format_money(y.total_capex()),
            format_money(y.opex()),
            y.emissions_t,
            y.emission_factor
        );
    }
    println!(
        "{}: {}",
        tr.t(keys::ENERGY_TCO),
        format_money(result.total_cost_of_ownership)
    );
    println!(
        "{}: ${:.2}/MWh",
        tr.t(keys::ENERGY_LCOE_RATIO),
        result.lcoe_pv_ratio
    );
    println!(
        "{}: ${:.2}/MWh",
        tr.t(keys::ENERGY_LCOE_ANNUITIZED),
        result.lcoe_annuitized
    );
    println!(
        "{}: {:.0} t CO2",
        tr.t(keys::ENERGY_EMISSIONS),
        result.total_emissions_t
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_is_grouped() {
        assert_eq!(format_money(1234567.4), "$1,234,567");
        assert_eq!(format_money(-999.0), "-$999");
        assert_eq!(format_money(0.0), "$0");
    }

    #[test]
    fn break_even_is_counted_in_users() {
        let tr = Translator::new("en");
        assert_eq!(format_break_even(BreakEven::Users(12345.0), &tr), "12,345 users");
        assert_eq!(
            format_break_even(BreakEven::Unreachable, &tr),
            "unreachable (no net revenue per user)"
        );
    }

    #[test]
    fn unrecoverable_payback_is_a_label() {
        let tr = Translator::new("en");
        let text = format_payback(Payback::Unrecoverable, &tr);
        assert!(!text.contains("inf"));
        assert_eq!(text, "not recoverable within horizon");
    }
}
