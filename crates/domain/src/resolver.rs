use std::{cmp::Reverse, collections::BTreeMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError, Equipment, EquipmentProfile,
    equipment::{PlateLoaded, Quanta, Selectable, TOLERANCE, kilograms, quanta},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadSource {
    Exact,
    RoundedUp,
    RoundedDown,
    ClampedToMin,
    ClampedToMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLoad {
    pub total_kg: f64,
    /// Requested minus achieved, positive if more was requested than is possible.
    pub residual_kg: f64,
    pub source: LoadSource,
}

impl ResolvedLoad {
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.source == LoadSource::Exact
    }

    #[must_use]
    pub fn is_clamped(&self) -> bool {
        matches!(
            self.source,
            LoadSource::ClampedToMin | LoadSource::ClampedToMax
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Closest producible load, the lighter one on a tie.
    #[default]
    Nearest,
    /// Heaviest producible load not above the request.
    Down,
    /// Lightest producible load not below the request.
    Up,
}

/// Snap a desired total load to the nearest load the equipment can produce.
pub fn resolve(
    desired_kg: f64,
    profile: &EquipmentProfile,
) -> Result<ResolvedLoad, ConfigurationError> {
    Ok(profile.validate()?.resolve(desired_kg))
}

/// Producible loads adjacent to a request.
struct Bracket {
    below: Option<Quanta>,
    above: Option<Quanta>,
}

impl Equipment {
    #[must_use]
    pub fn resolve(&self, desired_kg: f64) -> ResolvedLoad {
        self.resolve_with(desired_kg, Rounding::Nearest)
    }

    #[must_use]
    pub fn resolve_with(&self, desired_kg: f64, rounding: Rounding) -> ResolvedLoad {
        let desired = quanta(desired_kg);
        let floor = desired + TOLERANCE;
        let ceil = desired - TOLERANCE;

        let bracket = match self {
            Equipment::DualLoad(plates) => plates.bracket(floor, ceil),
            Equipment::SingleLoad(loads) | Equipment::Stack(loads) => loads.bracket(floor, ceil),
        };

        let (total, clamped) = match (bracket.below, bracket.above) {
            (None, Some(min)) => (min, Some(LoadSource::ClampedToMin)),
            (Some(max), None) => (max, Some(LoadSource::ClampedToMax)),
            (Some(below), Some(above)) => {
                let total = match rounding {
                    Rounding::Down => below,
                    Rounding::Up => above,
                    Rounding::Nearest => {
                        if above - desired < desired - below {
                            above
                        } else {
                            below
                        }
                    }
                };
                (total, None)
            }
            (None, None) => unreachable!("every implement produces at least one load"),
        };

        let total_kg = kilograms(total);
        let residual_kg = desired_kg - total_kg;
        let source = clamped.unwrap_or(if (total - desired).abs() <= TOLERANCE {
            LoadSource::Exact
        } else if total > desired {
            LoadSource::RoundedUp
        } else {
            LoadSource::RoundedDown
        });

        if clamped.is_some() {
            debug!("clamped requested load of {desired_kg} kg to {total_kg} kg ({source})");
        }

        ResolvedLoad {
            total_kg,
            residual_kg,
            source,
        }
    }

    #[must_use]
    pub fn is_producible(&self, kg: f64) -> bool {
        self.resolve(kg).is_exact()
    }

    /// Plates to put on each side of the bar for a producible total.
    ///
    /// The returned list uses as few plates as possible, heaviest first. Only
    /// dual load implements have plates.
    #[must_use]
    pub fn plate_breakdown(&self, total_kg: f64) -> Option<Vec<f64>> {
        let Equipment::DualLoad(plates) = self else {
            return None;
        };
        let resolved = self.resolve(total_kg);
        if !resolved.is_exact() {
            return None;
        }
        plates.breakdown(quanta(resolved.total_kg))
    }
}

impl Selectable {
    fn bracket(&self, floor: Quanta, ceil: Quanta) -> Bracket {
        let below = self.loads.partition_point(|l| *l <= floor);
        let above = self.loads.partition_point(|l| *l < ceil);
        Bracket {
            below: below.checked_sub(1).map(|i| self.loads[i]),
            above: self.loads.get(above).copied(),
        }
    }
}

impl PlateLoaded {
    fn bracket(&self, floor: Quanta, ceil: Quanta) -> Bracket {
        let sums = SideSums::new(&self.plates);
        let side_cap = self.max_total.map(|max| (max - self.bar) / 2);

        let below = (floor >= self.bar).then(|| {
            let side = (floor - self.bar) / 2;
            let side = side_cap.map_or(side, |cap| side.min(cap));
            self.bar + 2 * sums.floor(side)
        });

        let side = ((ceil - self.bar).max(0) + 1) / 2;
        let side = sums.ceil(side);
        let above = match side_cap {
            Some(cap) if side > cap => None,
            _ => Some(self.bar + 2 * side),
        };

        Bracket { below, above }
    }

    pub(crate) fn max_reachable(&self) -> Option<Quanta> {
        self.max_total
            .map(|max| self.bar + 2 * SideSums::new(&self.plates).floor((max - self.bar) / 2))
    }

    fn breakdown(&self, total: Quanta) -> Option<Vec<f64>> {
        let load = total - self.bar;
        if load < 0 || load % 2 != 0 || self.max_total.is_some_and(|max| total > max) {
            return None;
        }
        SideSums::new(&self.plates)
            .plates_for(load / 2)
            .map(|plates| plates.into_iter().map(kilograms).collect())
    }
}

/// Sums of plates that can be loaded on one side of a bar.
///
/// Plates are reduced by their greatest common divisor. Any number of plates
/// of each denomination may be used, so every multiple of the divisor above
/// Schur's bound `(u_min - 1)(u_max - 1)` is reachable and only smaller sums
/// are enumerated. Plates in a single unit system have small reduced values
/// and a low bound. Mixed kilogram and pound plates share only a tiny divisor,
/// so their sums are enumerated sparsely up to the requested load.
struct SideSums<'a> {
    plates: &'a [Quanta],
    divisor: Quanta,
    units: Vec<u64>,
    bound: u64,
}

impl<'a> SideSums<'a> {
    fn new(plates: &'a [Quanta]) -> Self {
        let divisor = plates.iter().copied().fold(0, gcd);
        #[allow(clippy::cast_sign_loss)]
        let units = plates
            .iter()
            .map(|p| (p / divisor) as u64)
            .collect::<Vec<_>>();
        let smallest = units[0];
        let largest = units[units.len() - 1];
        Self {
            plates,
            divisor,
            units,
            bound: (smallest - 1).saturating_mul(largest - 1),
        }
    }

    /// Heaviest reachable side load not above `side`.
    fn floor(&self, side: Quanta) -> Quanta {
        #[allow(clippy::cast_sign_loss)]
        let target = (side.max(0) / self.divisor) as u64;
        if target >= self.bound {
            return self.quanta(target);
        }
        let reached = self
            .table(target)
            .range(..=target)
            .next_back()
            .map_or(0, |(sum, _)| *sum);
        self.quanta(reached)
    }

    /// Lightest reachable side load not below `side`.
    fn ceil(&self, side: Quanta) -> Quanta {
        let side = side.max(0);
        #[allow(clippy::cast_sign_loss)]
        let target = ((side + self.divisor - 1) / self.divisor) as u64;
        if target >= self.bound {
            return self.quanta(target);
        }
        // A multiple of the smallest plate is always within reach.
        let limit = target + self.units[0];
        let reached = self
            .table(limit)
            .range(target..)
            .next()
            .map_or(limit, |(sum, _)| *sum);
        self.quanta(reached)
    }

    fn plates_for(&self, side: Quanta) -> Option<Vec<Quanta>> {
        if side % self.divisor != 0 {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let mut remaining = (side / self.divisor) as u64;
        let table = self.table(remaining);

        let mut plates = vec![];
        while remaining > 0 {
            let (_, index) = table.get(&remaining)?;
            plates.push(self.plates[*index]);
            remaining -= self.units[*index];
        }
        plates.sort_unstable_by(|a, b| b.cmp(a));
        Some(plates)
    }

    /// Every reachable unit sum up to `limit`, mapped to the fewest plates
    /// reaching it and the last plate used.
    ///
    /// Sums are visited in ascending order, so each one is final before it is
    /// extended.
    fn table(&self, limit: u64) -> BTreeMap<u64, (u32, usize)> {
        let mut table = BTreeMap::from([(0, (0, 0))]);
        let mut next = Some((0, 0));
        while let Some((sum, count)) = next {
            for (index, unit) in self.units.iter().enumerate() {
                let reached = sum + unit;
                if reached > limit {
                    continue;
                }
                let candidate = (count + 1, index);
                table
                    .entry(reached)
                    .and_modify(|best: &mut (u32, usize)| {
                        if (candidate.0, Reverse(candidate.1)) < (best.0, Reverse(best.1)) {
                            *best = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
            next = table
                .range(sum + 1..)
                .next()
                .map(|(sum, (count, _))| (*sum, *count));
        }
        table
    }

    #[allow(clippy::cast_possible_wrap)]
    fn quanta(&self, units: u64) -> Quanta {
        units as Quanta * self.divisor
    }
}

fn gcd(a: Quanta, b: Quanta) -> Quanta {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{LoadType, Mass};

    fn barbell() -> EquipmentProfile {
        EquipmentProfile::dual_load(20.0, [1.25, 2.5, 5.0, 10.0])
    }

    fn dumbbells() -> EquipmentProfile {
        EquipmentProfile::single_load([2.0, 4.0, 6.0, 8.0, 10.0, 12.5, 15.0])
    }

    #[rstest]
    #[case::bar_only(barbell(), 20.0, 20.0, LoadSource::Exact)]
    #[case::exact(barbell(), 40.0, 40.0, LoadSource::Exact)]
    #[case::exact_small_plate(barbell(), 82.5, 82.5, LoadSource::Exact)]
    #[case::nearest_below(barbell(), 81.0, 80.0, LoadSource::RoundedDown)]
    #[case::tie_toward_lower(barbell(), 81.25, 80.0, LoadSource::RoundedDown)]
    #[case::nearest_above(barbell(), 82.0, 82.5, LoadSource::RoundedUp)]
    #[case::below_bar(barbell(), 15.0, 20.0, LoadSource::ClampedToMin)]
    #[case::negative(barbell(), -10.0, 20.0, LoadSource::ClampedToMin)]
    #[case::unbounded(barbell(), 301.0, 300.0, LoadSource::RoundedDown)]
    #[case::above_capacity(barbell().with_max_total(101.0), 150.0, 100.0, LoadSource::ClampedToMax)]
    #[case::at_capacity(barbell().with_max_total(100.0), 100.0, 100.0, LoadSource::Exact)]
    #[case::gap_tie(
        EquipmentProfile::dual_load(20.0, [15.0, 20.0]),
        70.0,
        60.0,
        LoadSource::RoundedDown
    )]
    #[case::gap_above(
        EquipmentProfile::dual_load(20.0, [15.0, 20.0]),
        72.0,
        80.0,
        LoadSource::RoundedUp
    )]
    #[case::micro(barbell().with_micro_increment(0.5), 81.0, 81.0, LoadSource::Exact)]
    #[case::dumbbell_exact(dumbbells(), 12.5, 12.5, LoadSource::Exact)]
    #[case::dumbbell_tie(dumbbells(), 5.0, 4.0, LoadSource::RoundedDown)]
    #[case::dumbbell_above(dumbbells(), 5.1, 6.0, LoadSource::RoundedUp)]
    #[case::dumbbell_min(dumbbells(), 1.0, 2.0, LoadSource::ClampedToMin)]
    #[case::dumbbell_max(dumbbells(), 50.0, 15.0, LoadSource::ClampedToMax)]
    #[case::stack_micro(
        EquipmentProfile::stack([5.0, 10.0, 15.0]).with_micro_increment(2.5),
        12.0,
        12.5,
        LoadSource::RoundedUp
    )]
    fn test_resolve(
        #[case] profile: EquipmentProfile,
        #[case] desired_kg: f64,
        #[case] total_kg: f64,
        #[case] source: LoadSource,
    ) {
        let resolved = resolve(desired_kg, &profile).unwrap();
        assert_approx_eq!(resolved.total_kg, total_kg);
        assert_approx_eq!(resolved.residual_kg, desired_kg - total_kg);
        assert_eq!(resolved.source, source);
    }

    #[test]
    fn test_resolve_invalid_profile() {
        assert_eq!(
            resolve(50.0, &EquipmentProfile::dual_load(20.0, Vec::new())),
            Err(ConfigurationError::NoIncrements)
        );
    }

    #[rstest]
    #[case(Rounding::Nearest, 80.0)]
    #[case(Rounding::Down, 80.0)]
    #[case(Rounding::Up, 82.5)]
    fn test_resolve_with(#[case] rounding: Rounding, #[case] expected: f64) {
        let equipment = barbell().validate().unwrap();
        assert_approx_eq!(equipment.resolve_with(80.5, rounding).total_kg, expected);
    }

    #[test]
    fn test_resolve_with_directed_rounding_clamps() {
        let equipment = dumbbells().validate().unwrap();
        assert_eq!(
            equipment.resolve_with(1.0, Rounding::Down).source,
            LoadSource::ClampedToMin
        );
        assert_eq!(
            equipment.resolve_with(16.0, Rounding::Up).source,
            LoadSource::ClampedToMax
        );
    }

    fn pound_barbell() -> EquipmentProfile {
        EquipmentProfile::from_masses(
            LoadType::DualLoad,
            Some(Mass::lb(45.0)),
            &[2.5, 5.0, 10.0, 25.0, 45.0].map(Mass::lb),
        )
    }

    fn mixed_barbell() -> EquipmentProfile {
        EquipmentProfile::from_masses(
            LoadType::DualLoad,
            Some(Mass::kg(20.0)),
            &[Mass::kg(1.25), Mass::lb(2.5), Mass::kg(5.0), Mass::lb(10.0)],
        )
    }

    #[test]
    fn test_resolve_mixed_unit_plates() {
        let resolved = resolve(22.3, &mixed_barbell()).unwrap();
        assert_approx_eq!(resolved.total_kg, 22.267_961_85, 1e-9);
        assert_eq!(resolved.source, LoadSource::RoundedDown);
    }

    #[test]
    fn test_resolve_mixed_unit_total_is_exact() {
        let total_kg = 20.0 + 2.0 * (Mass::lb(10.0).to_kg() + Mass::kg(1.25).to_kg());
        let resolved = resolve(total_kg, &mixed_barbell()).unwrap();
        assert_approx_eq!(resolved.total_kg, total_kg, 1e-9);
        assert_eq!(resolved.source, LoadSource::Exact);
    }

    #[rstest]
    #[case::bar_only(45.0, 45.0, LoadSource::Exact)]
    #[case::one_pair(135.0, 135.0, LoadSource::Exact)]
    #[case::small_plates(150.0, 150.0, LoadSource::Exact)]
    #[case::between(137.0, 135.0, LoadSource::RoundedDown)]
    #[case::below_bar(40.0, 45.0, LoadSource::ClampedToMin)]
    fn test_resolve_pound_plates(
        #[case] desired_lb: f64,
        #[case] total_lb: f64,
        #[case] source: LoadSource,
    ) {
        let resolved = resolve(Mass::lb(desired_lb).to_kg(), &pound_barbell()).unwrap();
        assert_approx_eq!(resolved.total_kg, Mass::lb(total_lb).to_kg(), 1e-9);
        assert_eq!(resolved.source, source);
    }

    #[rstest]
    #[case(Rounding::Nearest)]
    #[case(Rounding::Down)]
    #[case(Rounding::Up)]
    fn test_resolve_with_pound_plates_keeps_producible_load(#[case] rounding: Rounding) {
        let equipment = pound_barbell().validate().unwrap();
        let kg = Mass::lb(135.0).to_kg();
        let resolved = equipment.resolve_with(kg, rounding);
        assert_approx_eq!(resolved.total_kg, kg, 1e-9);
        assert!(resolved.is_exact());
    }

    #[test]
    fn test_pound_plates_producible_and_breakdown() {
        let equipment = pound_barbell().validate().unwrap();
        assert!(equipment.is_producible(Mass::lb(135.0).to_kg()));
        assert!(!equipment.is_producible(Mass::lb(137.0).to_kg()));

        let plates = equipment.plate_breakdown(Mass::lb(185.0).to_kg()).unwrap();
        let expected = [45.0, 25.0].map(|lb| Mass::lb(lb).to_kg());
        assert_eq!(plates.len(), expected.len());
        for (plate, expected) in plates.iter().zip(expected) {
            assert_approx_eq!(*plate, expected, 1e-9);
        }
    }

    #[rstest]
    #[case(barbell(), 40.0, true)]
    #[case(barbell(), 41.0, false)]
    #[case(barbell(), 10.0, false)]
    #[case(dumbbells(), 12.5, true)]
    #[case(dumbbells(), 11.0, false)]
    fn test_is_producible(
        #[case] profile: EquipmentProfile,
        #[case] kg: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(profile.validate().unwrap().is_producible(kg), expected);
    }

    #[rstest]
    #[case(20.0, Some(vec![]))]
    #[case(100.0, Some(vec![10.0, 10.0, 10.0, 10.0]))]
    #[case(62.5, Some(vec![10.0, 10.0, 1.25]))]
    #[case(67.5, Some(vec![10.0, 10.0, 2.5, 1.25]))]
    #[case(61.0, None)]
    #[case(10.0, None)]
    fn test_plate_breakdown(#[case] total_kg: f64, #[case] expected: Option<Vec<f64>>) {
        assert_eq!(
            barbell().validate().unwrap().plate_breakdown(total_kg),
            expected
        );
    }

    #[test]
    fn test_plate_breakdown_selectable() {
        assert_eq!(dumbbells().validate().unwrap().plate_breakdown(10.0), None);
    }

    #[test]
    fn test_plate_breakdown_above_capacity() {
        let equipment = barbell().with_max_total(60.0).validate().unwrap();
        assert_eq!(equipment.plate_breakdown(60.0), Some(vec![10.0, 10.0]));
        assert_eq!(equipment.plate_breakdown(62.5), None);
    }

    #[test]
    fn test_resolve_monotonic() {
        let equipment = EquipmentProfile::dual_load(20.0, [15.0, 20.0])
            .validate()
            .unwrap();
        let mut previous = 0.0;
        for step in 0..200 {
            let desired = f64::from(step) * 0.5;
            let total = equipment.resolve(desired).total_kg;
            assert!(total >= previous, "{desired} kg resolved to {total} kg < {previous} kg");
            previous = total;
        }
    }

    #[test]
    fn test_resolved_load_flags() {
        let equipment = dumbbells().validate().unwrap();
        assert!(equipment.resolve(4.0).is_exact());
        assert!(!equipment.resolve(4.0).is_clamped());
        assert!(equipment.resolve(40.0).is_clamped());
    }

    #[rstest]
    #[case(LoadSource::Exact, "exact")]
    #[case(LoadSource::RoundedUp, "rounded_up")]
    #[case(LoadSource::ClampedToMax, "clamped_to_max")]
    fn test_load_source_display(#[case] source: LoadSource, #[case] expected: &str) {
        assert_eq!(source.to_string(), expected);
    }
}
