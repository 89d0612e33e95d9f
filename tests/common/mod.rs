#![allow(dead_code)]

use dc_viability::engine::{CashFlowModel, HardwareRefresh};
use dc_viability::scenario::HardwareSpec;

pub fn assert_close(label: &str, actual: f64, expected: f64, rel_tol: f64) {
    let denom = expected.abs().max(1.0);
    let diff = (actual - expected).abs();
    assert!(
        diff <= rel_tol * denom,
        "{label} expected {expected:.6} got {actual:.6} (diff {diff:.6}, tol {rel_tol})"
    );
}

pub fn gpu(name: &str, unit_cost: f64, throughput_per_hour: f64) -> HardwareSpec {
    HardwareSpec {
        name: name.into(),
        unit_cost,
        throughput_per_hour,
        power_watts: None,
    }
}

/// 세금·판관비·상승률이 없는 10년 모델.
pub fn plain_model() -> CashFlowModel {
    CashFlowModel {
        horizon_years: 10,
        construction_capex: 1000.0,
        hardware_capex: 500.0,
        operating_cost: 100.0,
        escalation_rate: 0.0,
        research_charge: 0.0,
        research_years: 0,
        sga_rate: 0.0,
        tax_rate: 0.0,
        building_life_years: 20,
        hardware_life_years: 5,
        refresh: Some(HardwareRefresh {
            year: 5,
            amount: 500.0,
        }),
        salvage: true,
    }
}
