#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! Load computations for strength training.
//!
//! Converts weights between units, snaps desired loads to what a piece of
//! equipment can produce, tracks muscle warmth during a session, builds
//! warm-up ladders and proposes the next working weight. Every operation is
//! a pure function of its inputs, apart from the caller-owned
//! [`MuscleWarmthState`].

mod effort;
mod equipment;
mod error;
mod progression;
mod resolver;
mod unit;
mod warmth;
mod warmup;

pub use effort::*;
pub use equipment::{
    Equipment, EquipmentProfile, LoadType, PlateLoaded, Selectable, smallest_total_jump_kg,
};
pub use error::*;
pub use progression::*;
pub use resolver::*;
pub use unit::*;
pub use warmth::*;
pub use warmup::*;
