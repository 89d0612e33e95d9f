mod common;

use common::assert_close;
use dc_viability::engine::{
    self, BreakEven, CostKind, EngineError, PricingMode, SgaSolveMode,
};
use dc_viability::i18n::{keys, Translator};
use dc_viability::report::{self, HardwareStrategy};
use dc_viability::scenario::{PowerChoice, ScenarioConfig, ScenarioOverrides};
use rstest::rstest;
use std::collections::BTreeMap;

#[test]
fn evaluation_is_idempotent() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides::default();
    let first = engine::evaluate(&cfg, &overrides).expect("evaluate");
    let second = engine::evaluate(&cfg, &overrides).expect("evaluate");
    assert_eq!(first, second);
}

#[test]
fn reference_case_sizes_the_fleet() {
    let cfg = ScenarioConfig::default();
    let summary = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("evaluate");
    let cap = &summary.assumptions.capacity;
    // 100 MW × $30M/MW = $3B, 고성능 $30,000/대
    assert_eq!(cap.high_performance_units, 100_000);
    assert_eq!(cap.standard_units, 0);
    assert_close("capex", cap.hardware_capex, 3e9, 1e-12);
    assert_close("investment", summary.total_investment, 4e9, 1e-12);
    assert_close("per MW", summary.investment_per_mw, 4e7, 1e-12);
}

#[test]
fn pnl_line_items_add_up() {
    let cfg = ScenarioConfig::default();
    let summary = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("evaluate");
    let p = &summary.pnl;
    let items: f64 = p.items.iter().map(|i| i.amount).sum();
    assert_close("operating profit", p.operating_profit, p.revenue - items, 1e-9);
    assert_close("gross", p.gross_profit, p.revenue - p.cost_of_revenue, 1e-12);
    let sga = p.items.iter().find(|i| i.kind == CostKind::Sga).unwrap().amount;
    assert_close("sga", sga, p.revenue * cfg.operating.sga_rate, 1e-12);
    let tier_cost: f64 = summary.tiers.iter().map(|t| t.cost).sum();
    assert_close("tier costs", tier_cost, items, 1e-9);
}

#[test]
fn break_even_users_cover_costs_before_sga() {
    let cfg = ScenarioConfig::default();
    let summary = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("evaluate");
    let p = &summary.pnl;
    let sga = p.items.iter().find(|i| i.kind == CostKind::Sga).unwrap().amount;
    let items: f64 = p.items.iter().map(|i| i.amount).sum();
    let cost_before_sga = items - sga;
    let net_per_user = p.revenue / cfg.total_users() * (1.0 - cfg.operating.sga_rate);

    let BreakEven::Users(users) = summary.viability.break_even_users else {
        panic!("default case earns revenue per user");
    };
    assert_eq!(users, users.floor());
    assert!(users * net_per_user >= cost_before_sga * (1.0 - 1e-12));
    assert!((users - 1.0) * net_per_user < cost_before_sga * (1.0 + 1e-12));
}

#[test]
fn break_even_is_unreachable_without_revenue() {
    let mut cfg = ScenarioConfig::default();
    cfg.market.price_per_million_units = 0.0;
    let summary = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("evaluate");
    assert_eq!(summary.pnl.revenue, 0.0);
    assert_eq!(summary.viability.break_even_users, BreakEven::Unreachable);
}

#[test]
fn architecture_lowers_required_unit_price() {
    let cfg = ScenarioConfig::default();
    let off = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("off");
    let on = engine::evaluate(
        &cfg,
        &ScenarioOverrides {
            architecture_optimised: true,
            ..ScenarioOverrides::default()
        },
    )
    .expect("on");
    assert!(on.viability.price_per_million_units < off.viability.price_per_million_units);
    assert_close(
        "throughput",
        on.assumptions.capacity.serviced_throughput,
        off.assumptions.capacity.serviced_throughput * cfg.hardware.architecture_efficiency,
        1e-12,
    );
}

#[test]
fn higher_target_irr_needs_more_revenue() {
    let mut cfg = ScenarioConfig::default();
    let mut last = 0.0;
    for irr in [0.02, 0.06, 0.1, 0.15] {
        cfg.finance.target_irr = irr;
        let summary = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("evaluate");
        assert!(summary.viability.required_annual_revenue > last);
        last = summary.viability.required_annual_revenue;
    }
}

#[rstest]
#[case(1.2, 0.7)]
#[case(-0.5, 0.7)]
#[case(0.5, 1.01)]
fn out_of_range_overrides_are_rejected(#[case] ratio: f64, #[case] utilization: f64) {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        high_performance_ratio: ratio,
        utilization,
        ..ScenarioOverrides::default()
    };
    assert!(matches!(
        engine::evaluate(&cfg, &overrides),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn zero_unit_cost_surfaces_as_error() {
    let mut cfg = ScenarioConfig::default();
    cfg.hardware.standard.unit_cost = 0.0;
    assert!(engine::evaluate(&cfg, &ScenarioOverrides::default()).is_err());
}

#[test]
fn unknown_power_source_is_rejected() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        power: PowerChoice::Source("fusion".into()),
        ..ScenarioOverrides::default()
    };
    assert!(engine::evaluate(&cfg, &overrides).is_err());
}

#[test]
fn named_power_source_sets_tariff() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        power: PowerChoice::Source("renewable".into()),
        ..ScenarioOverrides::default()
    };
    let summary = engine::evaluate(&cfg, &overrides).expect("evaluate");
    assert_eq!(summary.assumptions.electricity_price_per_kwh, 0.18);
    assert!(summary.energy.is_none());
}

#[test]
fn portfolio_power_uses_lcoe() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        power: PowerChoice::Portfolio,
        ..ScenarioOverrides::default()
    };
    let summary = engine::evaluate(&cfg, &overrides).expect("evaluate");
    let energy = summary.energy.as_ref().expect("energy result");
    assert_close(
        "price",
        summary.assumptions.electricity_price_per_kwh,
        energy.lcoe_pv_ratio / 1000.0,
        1e-12,
    );
    assert_eq!(energy.years.len(), 20);

    let mut no_energy = cfg.clone();
    no_energy.energy = None;
    assert!(engine::evaluate(&no_energy, &overrides).is_err());
}

#[test]
fn fixed_fee_pricing_changes_revenue_only() {
    let cfg = ScenarioConfig::default();
    let usage = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("usage");
    let fixed = engine::evaluate(
        &cfg,
        &ScenarioOverrides {
            pricing: PricingMode::FixedFee,
            ..ScenarioOverrides::default()
        },
    )
    .expect("fixed");
    assert_eq!(
        usage.viability.required_annual_revenue,
        fixed.viability.required_annual_revenue
    );
    let fee_revenue: f64 = fixed.tiers.iter().map(|t| t.fee_revenue).sum();
    assert_close("fixed revenue", fixed.pnl.revenue, fee_revenue, 1e-12);
}

#[test]
fn cost_basis_needs_less_revenue_than_revenue_basis() {
    let cfg = ScenarioConfig::default();
    let revenue_basis = engine::evaluate(&cfg, &ScenarioOverrides::default()).expect("revenue");
    let cost_basis = engine::evaluate(
        &cfg,
        &ScenarioOverrides {
            sga_mode: SgaSolveMode::CostBasis,
            ..ScenarioOverrides::default()
        },
    )
    .expect("cost");
    assert!(
        cost_basis.viability.required_annual_revenue
            < revenue_basis.viability.required_annual_revenue
    );
}

#[test]
fn unknown_fee_override_is_rejected() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        fee_overrides: BTreeMap::from([("platinum".to_string(), 999.0)]),
        ..ScenarioOverrides::default()
    };
    assert!(engine::evaluate(&cfg, &overrides).is_err());
}

#[test]
fn benchmark_covers_four_strategies_in_order() {
    let cfg = ScenarioConfig::default();
    let outcomes = engine::benchmark(&cfg, &ScenarioOverrides::default()).expect("benchmark");
    let keys: Vec<(bool, f64)> = outcomes
        .iter()
        .map(|o| (o.architecture_optimised, o.high_performance_ratio))
        .collect();
    assert_eq!(
        keys,
        vec![(false, 1.0), (false, 0.0), (true, 1.0), (true, 0.0)]
    );
    for o in &outcomes {
        assert_eq!(
            o.summary.assumptions.architecture_optimised,
            o.architecture_optimised
        );
    }
}

#[test]
fn narrative_names_strategy_and_recommendation() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        architecture_optimised: true,
        high_performance_ratio: 0.0,
        ..ScenarioOverrides::default()
    };
    let summary = engine::evaluate(&cfg, &overrides).expect("evaluate");
    let outcomes = engine::benchmark(&cfg, &overrides).expect("benchmark");
    let tr = Translator::new("en");
    let text = report::narrative(&summary, &outcomes, &tr);
    assert!(text.contains("architecture on + low-cost"));
    assert!(text.contains("Lowest required price"));
    assert_eq!(
        HardwareStrategy::classify(summary.assumptions.high_performance_ratio),
        HardwareStrategy::LowCost
    );
}

#[test]
fn near_pure_mix_is_labelled_high_but_recommended_as_hybrid() {
    let cfg = ScenarioConfig::default();
    let overrides = ScenarioOverrides {
        architecture_optimised: true,
        high_performance_ratio: 0.9,
        ..ScenarioOverrides::default()
    };
    let summary = engine::evaluate(&cfg, &overrides).expect("evaluate");
    let tr = Translator::new("en");
    let text = report::narrative(&summary, &[], &tr);
    assert!(text.contains("architecture on + high-performance"));
    assert!(text.contains(tr.t(keys::REC_ARCH_HYBRID)));
    assert!(!text.contains(tr.t(keys::REC_ARCH_HIGH)));
}
