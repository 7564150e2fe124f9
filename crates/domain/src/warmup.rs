use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError, Equipment, EquipmentProfile, MuscleID, MuscleWarmthState, ResolvedLoad,
    Warmth,
};

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
pub enum WarmupFeedback {
    TooLittle,
    Excellent,
    TooMuch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Auto,
    Feedback(WarmupFeedback),
    Manual,
}

impl From<Option<WarmupFeedback>> for PlanSource {
    fn from(value: Option<WarmupFeedback>) -> Self {
        match value {
            None | Some(WarmupFeedback::Excellent) => PlanSource::Auto,
            Some(feedback) => PlanSource::Feedback(feedback),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    min: u32,
    max: u32,
}

impl RepRange {
    pub fn new(min: u32, max: u32) -> Result<Self, RepRangeError> {
        if min == 0 {
            return Err(RepRangeError::Empty);
        }

        if min > max {
            return Err(RepRangeError::Inverted(min, max));
        }

        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepRangeError {
    #[error("Rep range must include at least one rep")]
    Empty,
    #[error("Lower end of rep range must not exceed upper end ({0} > {1})")]
    Inverted(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmupStep {
    /// Share of the working weight in percent.
    pub percentage: u8,
    pub load: ResolvedLoad,
    pub reps: u32,
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupPlan {
    pub steps: Vec<WarmupStep>,
    pub source: PlanSource,
    pub generated_at: NaiveDateTime,
}

impl WarmupPlan {
    /// Build a plan from steps chosen by the user.
    ///
    /// Loads are still snapped to the equipment and reps never fall below the
    /// configured minimum.
    pub fn manual(
        steps: &[ManualStep],
        working_weight_kg: f64,
        equipment: &EquipmentProfile,
        config: &WarmupConfig,
        generated_at: NaiveDateTime,
    ) -> Result<Self, ConfigurationError> {
        let equipment = equipment.validate()?;
        Ok(Self {
            steps: steps
                .iter()
                .map(|s| WarmupStep {
                    percentage: s.percentage,
                    load: snap(&equipment, s.percentage, working_weight_kg),
                    reps: s.reps.max(config.min_reps),
                    rest_seconds: s.rest_seconds,
                })
                .collect(),
            source: PlanSource::Manual,
            generated_at,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualStep {
    pub percentage: u8,
    pub reps: u32,
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// Working weights at or below this need no warm-up.
    pub trivial_threshold_kg: f64,
    pub feedback_shift_percent: u8,
    pub min_percent: u8,
    pub max_percent: u8,
    pub feedback_rep_delta: u32,
    pub min_reps: u32,
    pub rest_seconds: u32,
    pub heavy_percent: u8,
    pub heavy_rest_seconds: u32,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            trivial_threshold_kg: 0.0,
            feedback_shift_percent: 5,
            min_percent: 20,
            max_percent: 90,
            feedback_rep_delta: 2,
            min_reps: 3,
            rest_seconds: 60,
            heavy_percent: 85,
            heavy_rest_seconds: 90,
        }
    }
}

/// Rule that determines the shape of the ladder.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum WarmupPolicy {
    /// Fewer steps the warmer the trained muscles already are.
    #[default]
    MuscleWarmth,
    /// More steps the closer the working weight is to the one-rep max.
    RelativeIntensity { one_rep_max_kg: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WarmupRequest<'a, M = MuscleID> {
    pub working_weight_kg: f64,
    pub rep_range: RepRange,
    pub primary_muscles: &'a [M],
    pub secondary_muscles: &'a [M],
    pub feedback: Option<WarmupFeedback>,
    pub policy: WarmupPolicy,
    pub equipment: &'a EquipmentProfile,
    pub generated_at: NaiveDateTime,
}

const COLD_LADDER: &[u8] = &[40, 60, 80];
const WARM_LADDER: &[u8] = &[55, 75];
const HOT_LADDER: &[u8] = &[70];

/// Generate a complete warm-up plan for the first working set of an exercise.
///
/// Each call produces a new plan that replaces any previous one. An empty plan
/// is returned if the working weight is trivial, e.g. an empty bar.
pub fn generate_warmup<M: Ord + Copy>(
    request: &WarmupRequest<'_, M>,
    warmth: &MuscleWarmthState<M>,
    config: &WarmupConfig,
) -> Result<WarmupPlan, ConfigurationError> {
    let equipment = request.equipment.validate()?;
    let source = PlanSource::from(request.feedback);

    let trivial_kg = config.trivial_threshold_kg.max(equipment.min_load_kg());
    if request.working_weight_kg <= trivial_kg {
        debug!(
            "no warm-up needed for {} kg (trivial up to {trivial_kg} kg)",
            request.working_weight_kg
        );
        return Ok(WarmupPlan {
            steps: vec![],
            source,
            generated_at: request.generated_at,
        });
    }

    let ladder = match request.policy {
        WarmupPolicy::MuscleWarmth => {
            let warmth =
                warmth.effective_warmth(request.primary_muscles, request.secondary_muscles);
            warmth_ladder(warmth)
        }
        WarmupPolicy::RelativeIntensity { one_rep_max_kg } => {
            intensity_ladder(request.working_weight_kg, one_rep_max_kg)
        }
    };

    let steps = ladder
        .iter()
        .map(|base| {
            let percentage = shift_percentage(*base, request.feedback, config);
            WarmupStep {
                percentage,
                load: snap(&equipment, percentage, request.working_weight_kg),
                reps: reps(percentage, request.rep_range, request.feedback, config),
                rest_seconds: if percentage >= config.heavy_percent {
                    config.heavy_rest_seconds
                } else {
                    config.rest_seconds
                },
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "generated {source:?} warm-up with {} steps for {} kg",
        steps.len(),
        request.working_weight_kg
    );

    Ok(WarmupPlan {
        steps,
        source,
        generated_at: request.generated_at,
    })
}

fn warmth_ladder(warmth: Warmth) -> &'static [u8] {
    if warmth >= Warmth::MAX {
        HOT_LADDER
    } else if warmth >= Warmth::WARM {
        WARM_LADDER
    } else {
        COLD_LADDER
    }
}

fn intensity_ladder(working_weight_kg: f64, one_rep_max_kg: f64) -> &'static [u8] {
    if one_rep_max_kg <= 0.0 {
        return COLD_LADDER;
    }
    let intensity = working_weight_kg / one_rep_max_kg;
    if intensity < 0.65 {
        &[60]
    } else if intensity < 0.8 {
        &[50, 75]
    } else {
        COLD_LADDER
    }
}

fn shift_percentage(base: u8, feedback: Option<WarmupFeedback>, config: &WarmupConfig) -> u8 {
    match feedback {
        Some(WarmupFeedback::TooLittle) => base
            .saturating_add(config.feedback_shift_percent)
            .min(config.max_percent),
        Some(WarmupFeedback::TooMuch) => base
            .saturating_sub(config.feedback_shift_percent)
            .max(config.min_percent),
        Some(WarmupFeedback::Excellent) | None => base,
    }
}

/// Heavier steps get fewer reps, scaled by the top of the working rep range.
///
/// `round(max × (1.8 − 1.5 × p))`, i.e. 12, 9 and 6 reps at 40, 60 and 80 %
/// for a range ending at 10.
fn reps(
    percentage: u8,
    rep_range: RepRange,
    feedback: Option<WarmupFeedback>,
    config: &WarmupConfig,
) -> u32 {
    let scaled = rep_range.max * 360_u32.saturating_sub(3 * u32::from(percentage));
    let reps = (scaled + 100) / 200;
    let reps = match feedback {
        Some(WarmupFeedback::TooLittle) => reps + config.feedback_rep_delta,
        Some(WarmupFeedback::TooMuch) => reps.saturating_sub(config.feedback_rep_delta),
        Some(WarmupFeedback::Excellent) | None => reps,
    };
    reps.max(config.min_reps)
}

fn snap(equipment: &Equipment, percentage: u8, working_weight_kg: f64) -> ResolvedLoad {
    equipment.resolve(f64::from(percentage) / 100.0 * working_weight_kg)
}
