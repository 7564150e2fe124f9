use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Mass};

/// Loads are held as integer multiples of 1e-10 kg.
///
/// Kilogram values with up to ten decimals and pound values with up to two
/// decimals are both exact on this grid, so sums of mixed plates compare
/// exactly.
pub(crate) type Quanta = i64;

const QUANTA_PER_KG: f64 = 1e10;

/// Largest load in kilograms that is represented without overflow.
pub(crate) const LOAD_LIMIT_KG: f64 = 1e7;

/// Distance in quanta (1 mg) within which a request hits a producible load.
pub(crate) const TOLERANCE: Quanta = 10_000;

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn quanta(kg: f64) -> Quanta {
    (kg.clamp(-LOAD_LIMIT_KG, LOAD_LIMIT_KG) * QUANTA_PER_KG).round() as Quanta
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn kilograms(quanta: Quanta) -> f64 {
    quanta as f64 / QUANTA_PER_KG
}

#[derive(
    Debug,
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
pub enum LoadType {
    /// Barbell with symmetric plates on two sides.
    DualLoad,
    /// Fixed dumbbell or kettlebell sizes.
    SingleLoad,
    /// Selectorized machine.
    Stack,
}

/// Description of one loadable implement in canonical kilograms.
///
/// For `DualLoad` the increments are the plate denominations available per
/// side, for `SingleLoad` and `Stack` they are the selectable loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentProfile {
    pub load_type: LoadType,
    pub bar_weight_kg: Option<f64>,
    pub available_increments_kg: Vec<f64>,
    pub micro_increment_kg: Option<f64>,
    pub max_total_kg: Option<f64>,
}

impl EquipmentProfile {
    #[must_use]
    pub fn dual_load(bar_weight_kg: f64, plates_kg: impl Into<Vec<f64>>) -> Self {
        Self {
            load_type: LoadType::DualLoad,
            bar_weight_kg: Some(bar_weight_kg),
            available_increments_kg: plates_kg.into(),
            micro_increment_kg: None,
            max_total_kg: None,
        }
    }

    #[must_use]
    pub fn single_load(sizes_kg: impl Into<Vec<f64>>) -> Self {
        Self {
            load_type: LoadType::SingleLoad,
            bar_weight_kg: None,
            available_increments_kg: sizes_kg.into(),
            micro_increment_kg: None,
            max_total_kg: None,
        }
    }

    #[must_use]
    pub fn stack(positions_kg: impl Into<Vec<f64>>) -> Self {
        Self {
            load_type: LoadType::Stack,
            bar_weight_kg: None,
            available_increments_kg: positions_kg.into(),
            micro_increment_kg: None,
            max_total_kg: None,
        }
    }

    /// Build a profile from an inventory whose items are labelled in mixed units.
    ///
    /// Increments are converted to kilograms, sorted and merged where two items
    /// weigh exactly the same.
    #[must_use]
    pub fn from_masses(load_type: LoadType, bar_weight: Option<Mass>, increments: &[Mass]) -> Self {
        let mut increments_kg = increments.iter().map(|m| m.to_kg()).collect::<Vec<_>>();
        increments_kg.sort_by(f64::total_cmp);
        increments_kg.dedup_by(|a, b| quanta(*a) == quanta(*b));

        Self {
            load_type,
            bar_weight_kg: bar_weight.map(Mass::to_kg),
            available_increments_kg: increments_kg,
            micro_increment_kg: None,
            max_total_kg: None,
        }
    }

    #[must_use]
    pub fn with_micro_increment(mut self, micro_increment_kg: f64) -> Self {
        self.micro_increment_kg = Some(micro_increment_kg);
        self
    }

    #[must_use]
    pub fn with_max_total(mut self, max_total_kg: f64) -> Self {
        self.max_total_kg = Some(max_total_kg);
        self
    }

    #[must_use]
    pub fn has_micro_increment(&self) -> bool {
        self.micro_increment_kg.is_some()
    }

    pub fn validate(&self) -> Result<Equipment, ConfigurationError> {
        if self.available_increments_kg.is_empty() {
            return Err(ConfigurationError::NoIncrements);
        }

        let mut increments = Vec::with_capacity(self.available_increments_kg.len());
        for &value in &self.available_increments_kg {
            if value.is_nan() || value <= 0.0 || quanta(value) == 0 {
                return Err(ConfigurationError::NonPositiveIncrement(value));
            }
            increments.push(quanta(value));
        }
        increments.sort_unstable();
        increments.dedup();

        let micro = match self.micro_increment_kg {
            Some(value) if value.is_nan() || value <= 0.0 || quanta(value) == 0 => {
                return Err(ConfigurationError::NonPositiveMicroIncrement(value));
            }
            Some(value) => Some(quanta(value)),
            None => None,
        };

        let max_total = self.max_total_kg.map(quanta);

        match self.load_type {
            LoadType::DualLoad => {
                let bar_weight_kg = self
                    .bar_weight_kg
                    .ok_or(ConfigurationError::MissingBarWeight)?;
                if bar_weight_kg.is_nan() || bar_weight_kg < 0.0 {
                    return Err(ConfigurationError::NegativeBarWeight(bar_weight_kg));
                }
                let bar = quanta(bar_weight_kg);
                if let Some(max) = max_total {
                    if max < bar {
                        return Err(ConfigurationError::MaxBelowMinimum {
                            max: kilograms(max),
                            min: kilograms(bar),
                        });
                    }
                }
                Ok(Equipment::DualLoad(PlateLoaded::new(
                    bar, increments, micro, max_total,
                )))
            }
            LoadType::SingleLoad => Ok(Equipment::SingleLoad(Selectable::new(
                &increments,
                micro,
                max_total,
            )?)),
            LoadType::Stack => Ok(Equipment::Stack(Selectable::new(
                &increments,
                micro,
                max_total,
            )?)),
        }
    }
}

/// Finest achievable change of the total load.
pub fn smallest_total_jump_kg(profile: &EquipmentProfile) -> Result<f64, ConfigurationError> {
    Ok(profile.validate()?.smallest_total_jump_kg())
}

/// A validated implement, dispatched by load type.
#[derive(Debug, Clone, PartialEq)]
pub enum Equipment {
    DualLoad(PlateLoaded),
    SingleLoad(Selectable),
    Stack(Selectable),
}

impl Equipment {
    #[must_use]
    pub fn load_type(&self) -> LoadType {
        match self {
            Equipment::DualLoad(_) => LoadType::DualLoad,
            Equipment::SingleLoad(_) => LoadType::SingleLoad,
            Equipment::Stack(_) => LoadType::Stack,
        }
    }

    /// Both sides of a bar move together, so the per-side step is doubled.
    #[must_use]
    pub fn smallest_total_jump_kg(&self) -> f64 {
        kilograms(self.smallest_total_jump())
    }

    pub(crate) fn smallest_total_jump(&self) -> Quanta {
        match self {
            Equipment::DualLoad(plates) => 2 * plates.smallest_plate,
            Equipment::SingleLoad(loads) | Equipment::Stack(loads) => loads.smallest_step,
        }
    }

    #[must_use]
    pub fn min_load_kg(&self) -> f64 {
        match self {
            Equipment::DualLoad(plates) => kilograms(plates.bar),
            Equipment::SingleLoad(loads) | Equipment::Stack(loads) => kilograms(loads.min()),
        }
    }

    /// Heaviest producible load, `None` if plates can be added without limit.
    #[must_use]
    pub fn max_load_kg(&self) -> Option<f64> {
        match self {
            Equipment::DualLoad(plates) => plates.max_reachable().map(kilograms),
            Equipment::SingleLoad(loads) | Equipment::Stack(loads) => {
                Some(kilograms(loads.max()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlateLoaded {
    pub(crate) bar: Quanta,
    /// Per-side denominations in ascending order, micro plate included.
    pub(crate) plates: Vec<Quanta>,
    pub(crate) smallest_plate: Quanta,
    pub(crate) max_total: Option<Quanta>,
}

impl PlateLoaded {
    fn new(
        bar: Quanta,
        mut plates: Vec<Quanta>,
        micro: Option<Quanta>,
        max_total: Option<Quanta>,
    ) -> Self {
        if let Some(micro) = micro {
            plates.push(micro);
            plates.sort_unstable();
            plates.dedup();
        }
        let smallest_plate = plates[0];
        Self {
            bar,
            plates,
            smallest_plate,
            max_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selectable {
    /// Every producible load in ascending order.
    pub(crate) loads: Vec<Quanta>,
    pub(crate) smallest_step: Quanta,
}

impl Selectable {
    fn new(
        values: &[Quanta],
        micro: Option<Quanta>,
        max_total: Option<Quanta>,
    ) -> Result<Self, ConfigurationError> {
        let mut loads = values.to_vec();
        if let Some(micro) = micro {
            loads.extend(values.iter().map(|v| v + micro));
        }
        loads.sort_unstable();
        loads.dedup();

        if let Some(max) = max_total {
            loads.retain(|l| *l <= max);
            if loads.is_empty() {
                return Err(ConfigurationError::MaxBelowMinimum {
                    max: kilograms(max),
                    min: kilograms(values[0]),
                });
            }
        }

        let smallest_step = micro.map_or(values[0], |m| m.min(values[0]));

        Ok(Self {
            loads,
            smallest_step,
        })
    }

    pub(crate) fn min(&self) -> Quanta {
        self.loads[0]
    }

    pub(crate) fn max(&self) -> Quanta {
        self.loads[self.loads.len() - 1]
    }
}
