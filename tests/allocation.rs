mod common;

use common::assert_close;
use dc_viability::engine::{PricingMode, TierAllocator};
use dc_viability::scenario::{ScenarioConfig, TierSpec};
use rstest::rstest;
use std::collections::BTreeMap;

fn tiers() -> Vec<TierSpec> {
    ScenarioConfig::default().market.tiers
}

#[rstest]
#[case(PricingMode::UsageBased)]
#[case(PricingMode::FixedFee)]
fn costs_and_revenue_are_conserved(#[case] mode: PricingMode) {
    let tiers = tiers();
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 1_000_000.0, 5e12, 2.0).unwrap();
    let total_cost = 123_456_789.0;
    let table = alloc.allocate(mode, total_cost);
    assert_eq!(table.len(), 3);
    let cost_sum: f64 = table.iter().map(|t| t.cost).sum();
    let revenue_sum: f64 = table.iter().map(|t| t.revenue).sum();
    assert_close("cost", cost_sum, total_cost, 1e-12);
    assert_close("revenue", revenue_sum, alloc.revenue(mode), 1e-12);
    let share_sum: f64 = table.iter().map(|t| t.usage_share).sum();
    assert_close("shares", share_sum, 1.0, 1e-12);
}

#[test]
fn usage_share_weights_population_by_intensity() {
    let tiers = tiers();
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 100.0, 1e6, 1.0).unwrap();
    let table = alloc.allocate(PricingMode::UsageBased, 0.0);
    // 0.7×5 : 0.25×30 : 0.05×200 = 3.5 : 7.5 : 10
    assert_close("free", table[0].usage_share, 3.5 / 21.0, 1e-12);
    assert_close("standard", table[1].usage_share, 7.5 / 21.0, 1e-12);
    assert_close("premium", table[2].usage_share, 10.0 / 21.0, 1e-12);
}

#[test]
fn fixed_fee_revenue_is_fee_times_users_times_twelve() {
    let tiers = tiers();
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 1000.0, 1e6, 1.0).unwrap();
    // standard 250명 × $20 + premium 50명 × $200, 12개월
    let expected = (250.0 * 20.0 + 50.0 * 200.0) * 12.0;
    assert_close("fixed", alloc.revenue(PricingMode::FixedFee), expected, 1e-12);
    assert_close("paying", alloc.paying_users(), 300.0, 1e-12);
}

#[test]
fn fee_override_replaces_configured_fee() {
    let tiers = tiers();
    let overrides = BTreeMap::from([("standard".to_string(), 40.0)]);
    let alloc = TierAllocator::new(&tiers, &overrides, 1000.0, 1e6, 1.0).unwrap();
    let table = alloc.allocate(PricingMode::FixedFee, 0.0);
    assert_eq!(table[1].monthly_fee, 40.0);
    assert_close("fee revenue", table[1].fee_revenue, 250.0 * 40.0 * 12.0, 1e-12);
}

#[test]
fn what_if_margins_follow_definitions() {
    let tiers = tiers();
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 1000.0, 1e9, 2.0).unwrap();
    let table = alloc.allocate(PricingMode::UsageBased, 1_000_000.0);
    for t in &table {
        assert_close(
            "margin",
            t.fee_margin_per_user_month,
            t.monthly_fee - t.cost_per_user_month,
            1e-12,
        );
        let usage_per_user_month = t.usage_revenue / t.population / 12.0;
        assert_close(
            "opportunity",
            t.opportunity_cost_per_user_month,
            usage_per_user_month - t.monthly_fee,
            1e-9,
        );
        assert_close(
            "profit",
            t.profit_per_user_month,
            t.revenue_per_user_month - t.cost_per_user_month,
            1e-9,
        );
    }
}

#[test]
fn recommended_fees_recover_required_revenue() {
    let tiers = tiers();
    let users = 1000.0;
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), users, 1e9, 2.0).unwrap();
    let required = 600_000.0;
    let fees = alloc.recommend_fees(required);
    assert_eq!(fees.len(), 2, "free tier gets no recommendation");
    let recovered: f64 = fees
        .iter()
        .map(|fee| {
            let ratio = tiers.iter().find(|t| t.name == fee.tier).unwrap().population_ratio;
            fee.monthly_fee * users * ratio * 12.0
        })
        .sum();
    assert_close("recovered", recovered, required, 1e-9);
    for fee in &fees {
        let cap = fee.max_acceptable_fee.unwrap();
        assert_eq!(fee.achievable, fee.monthly_fee <= cap);
    }
}

#[test]
fn zero_intensity_falls_back_to_population_share() {
    let mut tiers = tiers();
    for t in &mut tiers {
        t.usage_intensity = 0.0;
    }
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 100.0, 1e6, 1.0).unwrap();
    let table = alloc.allocate(PricingMode::UsageBased, 100.0);
    assert_close("free cost", table[0].cost, 70.0, 1e-12);
}

#[test]
fn empty_market_books_no_revenue() {
    let tiers = tiers();
    let alloc = TierAllocator::new(&tiers, &BTreeMap::new(), 0.0, 5e12, 2.0).unwrap();
    for mode in [PricingMode::UsageBased, PricingMode::FixedFee] {
        assert_eq!(alloc.revenue(mode), 0.0);
        assert!(alloc.allocate(mode, 1_000_000.0).is_empty());
    }
    assert_eq!(alloc.billed_throughput(), 0.0);
    assert_eq!(alloc.paying_users(), 0.0);
}
