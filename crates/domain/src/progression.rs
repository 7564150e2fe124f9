use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError, Effort, Equipment, EquipmentProfile, Readiness, ResolvedLoad, Rounding,
};

/// The last completed working set of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub weight_kg: f64,
    pub reps: u32,
    pub effort: Effort,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub target_weight_kg: Option<f64>,
    pub target_reps: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProposalRequest<'a> {
    /// `None` if the exercise has never been performed with this setup.
    pub last: Option<Performance>,
    pub stored_estimate_kg: Option<f64>,
    pub template: Template,
    pub readiness: Option<Readiness>,
    pub equipment: &'a EquipmentProfile,
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
pub enum ProposalBranch {
    Progression,
    Regression,
    Hold,
    FirstTimeEstimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetProposal {
    pub proposed_weight_kg: f64,
    pub proposed_reps: u32,
    pub branch: ProposalBranch,
    pub load: ResolvedLoad,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// First-time weight if neither an estimate nor a template weight exists.
    pub default_weight_kg: f64,
    pub default_reps: u32,
    /// Reps above target that justify a double increment.
    pub wide_margin_reps: u32,
    /// Below this readiness no increase is proposed.
    pub low_readiness: f32,
    /// Below this readiness an increase is limited to a single jump.
    pub moderate_readiness: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            default_weight_kg: 20.0,
            default_reps: 10,
            wide_margin_reps: 3,
            low_readiness: 0.4,
            moderate_readiness: 0.7,
        }
    }
}

/// Propose weight and reps for the next session of an exercise.
///
/// The effort of the last set decides the direction, readiness can only
/// reduce the size of an increase. The proposed weight is always producible
/// by the equipment.
pub fn propose_target(
    request: &ProposalRequest<'_>,
    config: &ProgressionConfig,
) -> Result<TargetProposal, ConfigurationError> {
    let equipment = request.equipment.validate()?;

    let Some(last) = request.last else {
        let weight_kg = request
            .stored_estimate_kg
            .or(request.template.target_weight_kg)
            .unwrap_or(config.default_weight_kg);
        let reps = request.template.target_reps.unwrap_or(config.default_reps);
        debug!("proposing first-time target of {weight_kg} kg x {reps}");
        return Ok(proposal(
            equipment.resolve(weight_kg),
            reps,
            ProposalBranch::FirstTimeEstimate,
        ));
    };

    let target_reps = request.template.target_reps.unwrap_or(last.reps);
    let jumps = jumps(&last, target_reps, request.readiness, config);
    let branch = match jumps {
        1.. => ProposalBranch::Progression,
        0 => ProposalBranch::Hold,
        _ => ProposalBranch::Regression,
    };

    let load = snap(&equipment, &last, jumps);
    debug!(
        "proposing {branch} from {} kg x {} ({}) to {} kg x {target_reps}",
        last.weight_kg, last.reps, last.effort, load.total_kg
    );

    Ok(proposal(load, target_reps, branch))
}

/// Number of smallest jumps to move the weight by, negative for a decrease.
fn jumps(
    last: &Performance,
    target_reps: u32,
    readiness: Option<Readiness>,
    config: &ProgressionConfig,
) -> i32 {
    let reps_met = last.reps >= target_reps;

    if last.effort.could_do_more() {
        if !reps_met {
            return 0;
        }
        let jumps = if last.reps >= target_reps + config.wide_margin_reps {
            2
        } else {
            1
        };
        return match readiness.map(f32::from) {
            Some(r) if r < config.low_readiness => {
                debug!("suppressing increase due to low readiness ({r})");
                0
            }
            Some(r) if r < config.moderate_readiness => jumps.min(1),
            _ => jumps,
        };
    }

    match last.effort {
        Effort::Failed => -2,
        Effort::Struggled if !reps_met => -1,
        _ => 0,
    }
}

fn snap(equipment: &Equipment, last: &Performance, jumps: i32) -> ResolvedLoad {
    let desired_kg = last.weight_kg + f64::from(jumps) * equipment.smallest_total_jump_kg();
    let load = equipment.resolve(desired_kg);

    if last.effort.could_do_more() && load.total_kg < last.weight_kg {
        return equipment.resolve_with(last.weight_kg, Rounding::Up);
    }

    if last.effort.struggled() && load.total_kg > last.weight_kg {
        return equipment.resolve_with(last.weight_kg, Rounding::Down);
    }

    load
}

fn proposal(load: ResolvedLoad, reps: u32, branch: ProposalBranch) -> TargetProposal {
    TargetProposal {
        proposed_weight_kg: load.total_kg,
        proposed_reps: reps,
        branch,
        load,
    }
}

/// Estimated one-repetition maximum after Epley.
///
/// Returns `None` for a set without any completed rep.
#[must_use]
pub fn estimate_one_rep_max(weight_kg: f64, reps: u32) -> Option<f64> {
    match reps {
        0 => None,
        1 => Some(weight_kg),
        _ => Some(weight_kg * (1.0 + f64::from(reps) / 30.0)),
    }
}
