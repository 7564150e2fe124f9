use std::fmt;

use derive_more::Into;
use serde::{Deserialize, Serialize};

/// Rating of perceived exertion in steps of 0.5, stored in tenths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RPE(u8);

impl RPE {
    pub const ZERO: RPE = RPE(0);
    pub const SIX: RPE = RPE(60);
    pub const SEVEN: RPE = RPE(70);
    pub const EIGHT: RPE = RPE(80);
    pub const NINE: RPE = RPE(90);
    pub const TEN: RPE = RPE(100);

    pub fn new(value: f32) -> Result<Self, RPEError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (value * 10.0).round() as u8;

        if v % 5 != 0 {
            return Err(RPEError::InvalidResolution);
        }

        Ok(Self(v))
    }
}

impl From<RPE> for f32 {
    fn from(value: RPE) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<&str> for RPE {
    type Error = RPEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => RPE::new(parsed_value),
            Err(_) => Err(RPEError::ParseError),
        }
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 0.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
    #[error("RPE must be a decimal")]
    ParseError,
}

/// How hard a completed set felt, from hardest to easiest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Effort {
    Failed,
    Struggled,
    Solid,
    Easy,
    TooEasy,
}

impl Effort {
    #[must_use]
    pub fn could_do_more(self) -> bool {
        self >= Effort::Easy
    }

    #[must_use]
    pub fn struggled(self) -> bool {
        self <= Effort::Struggled
    }
}

impl From<RPE> for Effort {
    fn from(value: RPE) -> Self {
        match value.0 {
            0..=60 => Effort::TooEasy,
            61..=75 => Effort::Easy,
            76..=90 => Effort::Solid,
            91..=99 => Effort::Struggled,
            _ => Effort::Failed,
        }
    }
}

/// Readiness to train, normalized to [0, 1].
#[derive(Debug, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Readiness(f32);

impl Readiness {
    pub fn new(value: f32) -> Result<Self, ReadinessError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ReadinessError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Readiness given as a score from 0 to 100.
    pub fn from_percent(value: f32) -> Result<Self, ReadinessError> {
        if !(0.0..=100.0).contains(&value) {
            return Err(ReadinessError::OutOfRange);
        }

        Ok(Self(value / 100.0))
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} %", self.0 * 100.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ReadinessError {
    #[error("Readiness must be in the range 0 to 100 %")]
    OutOfRange,
}
