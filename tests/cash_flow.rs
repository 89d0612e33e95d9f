mod common;

use common::{assert_close, plain_model};
use dc_viability::engine::finance::annuity_factor;
use dc_viability::engine::{Payback, SgaSolveMode};
use float_cmp::approx_eq;
use rstest::rstest;

#[test]
fn required_revenue_times_annuity_recovers_outflows() {
    let model = plain_model();
    let req = model
        .required_revenue(0.08, SgaSolveMode::RevenueBasis)
        .expect("solve");
    let pvaf = annuity_factor(0.08, 10).expect("pvaf");
    assert_close("pvaf", req.annuity_factor, pvaf, 1e-12);
    assert_close(
        "R x PVAF",
        req.required_revenue * pvaf,
        req.discounted_outflow,
        1e-9,
    );
}

#[test]
fn required_revenue_hits_target_npv_with_tax_and_sga() {
    let mut model = plain_model();
    model.tax_rate = 0.22;
    model.sga_rate = 0.15;
    model.escalation_rate = 0.03;
    model.research_charge = 40.0;
    model.research_years = 4;
    let req = model
        .required_revenue(0.08, SgaSolveMode::RevenueBasis)
        .expect("solve");
    let npv = model.npv(req.required_revenue, 0.08).expect("npv");
    assert!(
        approx_eq!(f64, npv, 0.0, epsilon = 1e-6),
        "npv at target should vanish, got {npv}"
    );
    assert_close("sga", req.sga, req.required_revenue * 0.15, 1e-12);
}

#[test]
fn sga_modes_agree_without_sga() {
    let model = plain_model();
    let cost = model.required_revenue(0.08, SgaSolveMode::CostBasis).expect("cost");
    let revenue = model
        .required_revenue(0.08, SgaSolveMode::RevenueBasis)
        .expect("revenue");
    assert_close("modes", cost.required_revenue, revenue.required_revenue, 1e-12);
}

#[test]
fn revenue_basis_needs_more_than_cost_basis() {
    let mut model = plain_model();
    model.sga_rate = 0.2;
    let cost = model.required_revenue(0.08, SgaSolveMode::CostBasis).expect("cost");
    let revenue = model
        .required_revenue(0.08, SgaSolveMode::RevenueBasis)
        .expect("revenue");
    // 1/(1-s) > 1+s
    assert!(revenue.required_revenue > cost.required_revenue);
}

#[test]
fn required_revenue_rises_with_target_irr() {
    let model = plain_model();
    let revenues: Vec<f64> = [0.0, 0.04, 0.08, 0.12, 0.2]
        .iter()
        .map(|irr| {
            model
                .required_revenue(*irr, SgaSolveMode::RevenueBasis)
                .expect("solve")
                .required_revenue
        })
        .collect();
    for pair in revenues.windows(2) {
        assert!(pair[1] > pair[0], "{revenues:?}");
    }
}

#[test]
fn zero_rate_required_revenue_is_plain_average() {
    let mut model = plain_model();
    model.salvage = false;
    model.refresh = None;
    let req = model
        .required_revenue(0.0, SgaSolveMode::RevenueBasis)
        .expect("solve");
    // (1500 + 10 × 100) / 10
    assert_close("R", req.required_revenue, 250.0, 1e-12);
}

#[test]
fn payback_is_interpolated_on_crossing() {
    let model = plain_model();
    // 매년 순현금 500, 5년차는 교체 투자로 0. 3년차 말에 정확히 회수
    assert_eq!(model.payback(600.0), Payback::Years(3.0));

    let payback = model.payback(850.0).years().expect("recoverable");
    // 연 750: 2년차 말 누적 0
    assert_close("payback", payback, 2.0, 1e-12);
}

#[rstest]
#[case(0.0)]
#[case(100.0)]
#[case(150.0)]
fn payback_is_unrecoverable_when_cash_never_turns(#[case] revenue: f64) {
    let model = plain_model();
    assert_eq!(model.payback(revenue), Payback::Unrecoverable);
    assert!(!model.payback(revenue).is_recoverable());
}

#[test]
fn payback_shrinks_as_revenue_grows() {
    let model = plain_model();
    let mut last = f64::INFINITY;
    for revenue in [400.0, 600.0, 900.0, 1500.0, 5000.0] {
        let years = model.payback(revenue).years().expect("recoverable");
        assert!(years >= 0.0);
        assert!(years <= last, "revenue {revenue}: {years} > {last}");
        last = years;
    }
}

#[test]
fn timeline_has_initial_outflow_and_salvage() {
    let model = plain_model();
    let rows = model.timeline(600.0);
    assert_eq!(rows.len(), 11);
    assert_close("year0", rows[0].net, -1500.0, 1e-12);
    // 마지막 해: 매출 600 + 건물 잔존가치 500
    assert_close("inflow", rows[10].inflow, 1100.0, 1e-12);
    assert_close("cumulative", rows[10].cumulative, rows.iter().map(|r| r.net).sum(), 1e-9);
}

#[test]
fn negative_irr_below_minus_one_is_rejected() {
    let model = plain_model();
    assert!(model
        .required_revenue(-1.0, SgaSolveMode::RevenueBasis)
        .is_err());
}
