use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact international avoirdupois pound.
pub const KG_PER_LB: f64 = 0.453_592_37;

/// Maximum drift allowed when converting a value to the other unit and back.
pub const ROUND_TRIP_TOLERANCE_LB: f64 = 0.1;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            WeightUnit::Kg => WeightUnit::Lb,
            WeightUnit::Lb => WeightUnit::Kg,
        }
    }

    /// Round-trip tolerance expressed in this unit.
    #[must_use]
    pub fn round_trip_tolerance(self) -> f64 {
        match self {
            WeightUnit::Kg => ROUND_TRIP_TOLERANCE_LB * KG_PER_LB,
            WeightUnit::Lb => ROUND_TRIP_TOLERANCE_LB,
        }
    }
}

#[must_use]
pub fn to_canonical_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lb => value * KG_PER_LB,
    }
}

#[must_use]
pub fn to_unit(kg: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => kg,
        WeightUnit::Lb => kg / KG_PER_LB,
    }
}

#[must_use]
pub fn convert(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    to_unit(to_canonical_kg(value, from), to)
}

/// Round a value given in `unit` to the granularity shown to the user.
///
/// Kilograms are shown in steps of 0.5, pounds in whole numbers. Halfway
/// values round away from zero, so 10.25 kg is shown as 10.5 kg.
#[must_use]
pub fn round_for_display(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => (value * 2.0).round() / 2.0,
        WeightUnit::Lb => value.round(),
    }
}

/// Render a canonical weight in `primary` with a hint in the other unit.
///
/// The hint is left out if both rounded numbers are the same.
#[must_use]
pub fn format_dual(kg: f64, primary: WeightUnit) -> String {
    let secondary = primary.other();
    let value = round_for_display(to_unit(kg, primary), primary);
    let hint = round_for_display(to_unit(kg, secondary), secondary);

    if (value - hint).abs() < f64::EPSILON {
        format!("{value} {primary}")
    } else {
        format!("{value} {primary} ({hint} {secondary})")
    }
}

/// A weight as entered, before it is converted to canonical kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Mass {
    #[must_use]
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    #[must_use]
    pub fn kg(value: f64) -> Self {
        Self::new(value, WeightUnit::Kg)
    }

    #[must_use]
    pub fn lb(value: f64) -> Self {
        Self::new(value, WeightUnit::Lb)
    }

    #[must_use]
    pub fn to_kg(self) -> f64 {
        to_canonical_kg(self.value, self.unit)
    }
}

impl fmt::Display for Mass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(100.0, WeightUnit::Kg, 100.0)]
    #[case(1.0, WeightUnit::Lb, 0.453_592_37)]
    #[case(45.0, WeightUnit::Lb, 20.411_656_65)]
    #[case(0.0, WeightUnit::Lb, 0.0)]
    fn test_to_canonical_kg(#[case] value: f64, #[case] unit: WeightUnit, #[case] expected: f64) {
        assert_approx_eq!(to_canonical_kg(value, unit), expected, 1e-9);
    }

    #[rstest]
    #[case(20.0, WeightUnit::Kg, 20.0)]
    #[case(0.453_592_37, WeightUnit::Lb, 1.0)]
    #[case(100.0, WeightUnit::Lb, 220.462_262_18)]
    fn test_to_unit(#[case] kg: f64, #[case] unit: WeightUnit, #[case] expected: f64) {
        assert_approx_eq!(to_unit(kg, unit), expected, 1e-6);
    }

    #[rstest]
    #[case(0.0)]
    #[case(2.5)]
    #[case(61.25)]
    #[case(142.5)]
    #[case(317.5)]
    fn test_round_trip(#[case] value: f64) {
        for unit in [WeightUnit::Kg, WeightUnit::Lb] {
            let there = convert(value, unit, unit.other());
            let back = convert(there, unit.other(), unit);
            assert!((back - value).abs() <= unit.round_trip_tolerance());
        }
    }

    #[rstest]
    #[case(10.0, WeightUnit::Kg, 10.0)]
    #[case(10.2, WeightUnit::Kg, 10.0)]
    #[case(10.25, WeightUnit::Kg, 10.5)]
    #[case(10.74, WeightUnit::Kg, 10.5)]
    #[case(10.75, WeightUnit::Kg, 11.0)]
    #[case(220.462, WeightUnit::Lb, 220.0)]
    #[case(220.5, WeightUnit::Lb, 221.0)]
    #[case(44.49, WeightUnit::Lb, 44.0)]
    fn test_round_for_display(#[case] value: f64, #[case] unit: WeightUnit, #[case] expected: f64) {
        assert_approx_eq!(round_for_display(value, unit), expected);
    }

    #[rstest]
    #[case(100.0, WeightUnit::Kg, "100 kg (220 lb)")]
    #[case(20.411_656_65, WeightUnit::Lb, "45 lb (20.5 kg)")]
    #[case(102.5, WeightUnit::Kg, "102.5 kg (226 lb)")]
    #[case(0.0, WeightUnit::Kg, "0 kg")]
    fn test_format_dual(#[case] kg: f64, #[case] primary: WeightUnit, #[case] expected: &str) {
        assert_eq!(format_dual(kg, primary), expected);
    }

    #[rstest]
    #[case(WeightUnit::Kg, "kg")]
    #[case(WeightUnit::Lb, "lb")]
    fn test_weight_unit_label(#[case] unit: WeightUnit, #[case] label: &str) {
        assert_eq!(unit.to_string(), label);
        assert_eq!(label.parse::<WeightUnit>(), Ok(unit));
    }

    #[test]
    fn test_mass() {
        assert_approx_eq!(Mass::lb(2.5).to_kg(), 1.133_980_925, 1e-9);
        assert_approx_eq!(Mass::kg(2.5).to_kg(), 2.5);
        assert_eq!(Mass::lb(45.0).to_string(), "45 lb");
    }
}
