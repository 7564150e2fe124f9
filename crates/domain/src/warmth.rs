use std::collections::BTreeMap;

use derive_more::{Display, Into};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MuscleID {
    Neck,
    Pecs,
    Traps,
    Lats,
    FrontDelts,
    SideDelts,
    RearDelts,
    Biceps,
    Triceps,
    Forearms,
    Abs,
    ErectorSpinae,
    Glutes,
    Abductors,
    Quads,
    Hamstrings,
    Adductors,
    Calves,
}

/// How prepared a muscle group is within the current session.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Warmth(f32);

impl Warmth {
    pub const COLD: Warmth = Warmth(0.0);
    pub const WARM: Warmth = Warmth(1.0);
    pub const MAX: Warmth = Warmth(2.0);

    /// Values outside of [0, 2] are clamped.
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::COLD.0, Self::MAX.0))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    /// Main or heavy lift.
    #[default]
    Main,
    Accessory,
}

impl SetKind {
    fn primary_gain(self) -> f32 {
        match self {
            SetKind::Main => 2.0,
            SetKind::Accessory => 1.0,
        }
    }
}

const SECONDARY_GAIN: f32 = 1.0;

/// Warmth of each muscle group during one training session.
///
/// Created empty when the session starts and discarded when it ends. The
/// state is owned by the caller and must not be shared between sessions.
/// Muscles without any warmth are not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MuscleWarmthState<M = MuscleID> {
    warmth: BTreeMap<M, Warmth>,
    sets_recorded: u32,
}

impl<M> Default for MuscleWarmthState<M> {
    fn default() -> Self {
        Self {
            warmth: BTreeMap::new(),
            sets_recorded: 0,
        }
    }
}

impl<M: Ord + Copy> MuscleWarmthState<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a completed working set.
    ///
    /// A muscle listed as both primary and secondary receives only the primary
    /// gain.
    pub fn record_working_set(&mut self, primary: &[M], secondary: &[M], kind: SetKind) {
        let mut gains: BTreeMap<M, f32> = secondary.iter().map(|m| (*m, SECONDARY_GAIN)).collect();
        for muscle in primary {
            let gain = gains.entry(*muscle).or_insert(0.0);
            *gain = gain.max(kind.primary_gain());
        }

        for (muscle, gain) in gains {
            let warmth = self.warmth.entry(muscle).or_default();
            *warmth = Warmth::new(warmth.0 + gain);
        }

        self.sets_recorded += 1;
    }

    #[must_use]
    pub fn warmth_of(&self, muscle: M) -> Warmth {
        self.warmth.get(&muscle).copied().unwrap_or_default()
    }

    /// Warmth that determines the warm-up need of an exercise.
    ///
    /// Secondary muscles contribute half of their warmth.
    #[must_use]
    pub fn effective_warmth(&self, primary: &[M], secondary: &[M]) -> Warmth {
        let warmest = |muscles: &[M]| {
            muscles
                .iter()
                .map(|m| self.warmth_of(*m).0)
                .fold(0.0, f32::max)
        };
        Warmth::new(warmest(primary).max(warmest(secondary) / 2.0))
    }

    /// Reduce the warmth of all muscles, e.g. after a long rest.
    pub fn decay(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let before = self.warmth.len();
        for warmth in self.warmth.values_mut() {
            *warmth = Warmth::new(warmth.0 - amount);
        }
        self.warmth.retain(|_, w| w.0 > 0.0);
        if self.warmth.len() < before {
            debug!(
                "{} muscle groups cooled down completely",
                before - self.warmth.len()
            );
        }
    }

    /// Clear all warmth at the start of a session.
    pub fn reset(&mut self) {
        self.warmth.clear();
        self.sets_recorded = 0;
    }

    /// Number of working sets recorded since the last reset.
    ///
    /// Counts sets rather than exercises, so it only ever increases within a
    /// session.
    #[must_use]
    pub fn sets_recorded(&self) -> u32 {
        self.sets_recorded
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warmth.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (M, Warmth)> + '_ {
        self.warmth.iter().map(|(m, w)| (*m, *w))
    }
}
