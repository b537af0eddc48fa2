//! Router Decision
//!
//! Hard-coded safety thresholds that decide whether the risk model has to
//! be consulted. Pure: no state, no I/O, no failure mode.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Dark below this illuminance (lux). 500 itself is not dark.
pub const DARKNESS_LUX: f64 = 500.0;

/// Black ice needs a water film above this depth (µm)
pub const BLACK_ICE_WATER_UM: f64 = 1000.0;

/// ... and a temperature below this (°C)
pub const BLACK_ICE_TEMPERATURE_C: f64 = 0.0;

pub const SAFE_REASON: &str = "Conditions are safe (sufficient light, no black ice)";

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterVerdict {
    pub requires_risk_model: bool,
    pub reason: String,
}

/// Route a weather snapshot
pub fn decide(illuminance_lux: f64, water_depth_um: f64, temperature_c: f64) -> RouterVerdict {
    let mut reasons: Vec<String> = Vec::with_capacity(2);

    if is_dark(illuminance_lux) {
        reasons.push(format!(
            "Darkness detected ({} lux < {})",
            illuminance_lux, DARKNESS_LUX
        ));
    }

    if is_black_ice(water_depth_um, temperature_c) {
        reasons.push("Black ice danger detected".to_string());
    }

    if reasons.is_empty() {
        RouterVerdict {
            requires_risk_model: false,
            reason: SAFE_REASON.to_string(),
        }
    } else {
        RouterVerdict {
            requires_risk_model: true,
            reason: reasons.join(" & "),
        }
    }
}

pub fn is_dark(illuminance_lux: f64) -> bool {
    illuminance_lux < DARKNESS_LUX
}

pub fn is_black_ice(water_depth_um: f64, temperature_c: f64) -> bool {
    water_depth_um > BLACK_ICE_WATER_UM && temperature_c < BLACK_ICE_TEMPERATURE_C
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darkness_boundary() {
        assert!(decide(499.0, 0.0, 15.0).requires_risk_model);
        assert!(!decide(500.0, 0.0, 15.0).requires_risk_model);
        assert!(!decide(501.0, 0.0, 15.0).requires_risk_model);
    }

    #[test]
    fn test_black_ice_requires_both_conditions() {
        assert!(decide(10_000.0, 2000.0, -5.0).requires_risk_model);
        assert!(!decide(10_000.0, 2000.0, 5.0).requires_risk_model);
        assert!(!decide(10_000.0, 100.0, -5.0).requires_risk_model);
    }

    #[test]
    fn test_black_ice_boundaries_are_strict() {
        assert!(!decide(10_000.0, 1000.0, -5.0).requires_risk_model);
        assert!(!decide(10_000.0, 2000.0, 0.0).requires_risk_model);
        assert!(decide(10_000.0, 1000.1, -0.1).requires_risk_model);
    }

    #[test]
    fn test_safe_reason() {
        let verdict = decide(50_000.0, 0.0, 25.0);
        assert!(!verdict.requires_risk_model);
        assert_eq!(verdict.reason, SAFE_REASON);
    }

    #[test]
    fn test_reason_order_darkness_first() {
        let verdict = decide(120.0, 2000.0, -5.0);
        assert!(verdict.requires_risk_model);
        assert_eq!(
            verdict.reason,
            "Darkness detected (120 lux < 500) & Black ice danger detected"
        );
    }

    #[test]
    fn test_single_rule_reason() {
        let verdict = decide(1000.0, 2000.0, -5.0);
        assert_eq!(verdict.reason, "Black ice danger detected");
    }

    #[test]
    fn test_grid_matches_rules() {
        for temp in [-10.0, 0.0, 10.0] {
            for water in [0.0, 2000.0] {
                for lux in [0.0, 600.0, 50_000.0] {
                    let expected = lux < 500.0 || (temp < 0.0 && water > 1000.0);
                    assert_eq!(
                        decide(lux, water, temp).requires_risk_model,
                        expected,
                        "T={} W={} L={}",
                        temp,
                        water,
                        lux
                    );
                }
            }
        }
    }
}
