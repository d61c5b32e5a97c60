use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::ZERO_SQUARE;
use crate::motion::{is_codirectional, ClassifiedMotion};
use crate::pose::Pose;

// How the player's tracked root is synced back to the simulated character
// after every tick
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationMode {
    // The player is put exactly where the character ended up, so a head stuck
    // into a wall is pushed back out of it
    Strict,
    // Lateral motion is merged through the case table below and only the
    // vertical axis is forced; the player can lean through thin obstacles
    // while still walking up slopes and stairs
    Graceful,
    // The player moves independently from the character
    Disabled,
}

// The outcome of comparing character, headset and stick motion along the
// character's direction of travel. "Agreeing" means headset and stick point
// the same way relative to the character's motion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CollinearCase {
    // both follow the character, which went further than the headset did
    AgreeingCharacterAhead,
    // both follow the character and the headset already covered its motion
    AgreeingHeadsetCaughtUp,
    // both oppose the character's motion
    AgreeingOpposed,
    // the headset leads the stick and the character went at least as far
    HeadsetLeadsCharacterAhead,
    // the headset leads; the character fell short of it but covered more than
    // what the stick doesn't account for
    HeadsetLeadsPartialCatchUp,
    // the headset leads and the character only covered the stick's share
    HeadsetLeadsStickOnly,
    // the headset leads against the character's motion
    HeadsetLeadsOpposed,
    // the stick leads and disagrees with the headset
    StickLeads,
}

impl CollinearCase {
    pub fn select(classified: &ClassifiedMotion) -> CollinearCase {
        let character = classified.character_magnitude;
        let headset = &classified.headset;
        let input = &classified.velocity_input;
        let head = headset.collinear_magnitude;
        let stick = input.collinear_magnitude;

        let agreeing = headset.codirectional == input.codirectional;
        let headset_leads = head >= stick;

        match (agreeing, headset.codirectional, headset_leads) {
            (true, true, _) if character > head => CollinearCase::AgreeingCharacterAhead,
            (true, true, _) => CollinearCase::AgreeingHeadsetCaughtUp,
            (true, false, _) => CollinearCase::AgreeingOpposed,
            (false, true, true) if character >= head => CollinearCase::HeadsetLeadsCharacterAhead,
            (false, true, true) if character > head - stick => {
                CollinearCase::HeadsetLeadsPartialCatchUp
            }
            (false, true, true) => CollinearCase::HeadsetLeadsStickOnly,
            (false, false, true) => CollinearCase::HeadsetLeadsOpposed,
            (false, _, false) => CollinearCase::StickLeads,
        }
    }

    pub fn correction(&self, classified: &ClassifiedMotion) -> DVec3 {
        let character = classified.character;
        let headset = classified.headset.collinear;
        let stick = classified.velocity_input.collinear;

        match self {
            CollinearCase::AgreeingCharacterAhead
            | CollinearCase::HeadsetLeadsCharacterAhead
            | CollinearCase::HeadsetLeadsPartialCatchUp
            | CollinearCase::StickLeads => character - headset,
            CollinearCase::AgreeingHeadsetCaughtUp => DVec3::ZERO,
            CollinearCase::AgreeingOpposed => character,
            CollinearCase::HeadsetLeadsStickOnly => stick,
            CollinearCase::HeadsetLeadsOpposed => character + stick,
        }
    }
}

// Sideways drift of the stick is only kept where the headset doesn't already
// account for it
pub fn orthogonal_correction(classified: &ClassifiedMotion) -> DVec3 {
    let headset = &classified.headset;
    let stick = &classified.velocity_input;

    if headset.orthogonal.length_squared() <= ZERO_SQUARE {
        return stick.orthogonal;
    }

    let headset_direction = headset.orthogonal.normalize();
    if is_codirectional(stick.orthogonal.dot(headset_direction)) {
        DVec3::ZERO
    } else {
        stick.orthogonal.normalize_or_zero()
            * stick
                .orthogonal_magnitude
                .clamp(0.0, headset.orthogonal_magnitude)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct LateralCorrection {
    pub case: CollinearCase,
    pub collinear: DVec3,
    pub orthogonal: DVec3,
}

impl LateralCorrection {
    pub fn total(&self) -> DVec3 {
        self.collinear + self.orthogonal
    }
}

pub fn solve_lateral(classified: &ClassifiedMotion) -> LateralCorrection {
    let case = CollinearCase::select(classified);
    let correction = LateralCorrection {
        case,
        collinear: case.correction(classified),
        orthogonal: orthogonal_correction(classified),
    };
    trace!(
        ?case,
        collinear = ?correction.collinear,
        orthogonal = ?correction.orthogonal,
        "lateral reconciliation"
    );
    correction
}

// Everything the solver needs to know about the tick that just finished
#[derive(Copy, Clone, Debug)]
pub struct ReconciliationFrame<'a> {
    pub mode: ReconciliationMode,
    pub up: DVec3,
    pub character_position: DVec3, // after the simulation step
    pub character_rotation: DQuat,
    pub player_root: Pose, // before this tick's correction
    pub classified: &'a ClassifiedMotion,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Reconciliation {
    pub pose: Pose,
    // only present when the case table was consulted
    pub lateral: Option<LateralCorrection>,
    pub vertical: DVec3,
}

impl Reconciliation {
    pub fn correction(&self, player_root: &Pose) -> DVec3 {
        self.pose.position - player_root.position
    }
}

pub fn reconcile(frame: &ReconciliationFrame) -> Reconciliation {
    match frame.mode {
        ReconciliationMode::Graceful => {
            let lateral = solve_lateral(frame.classified);
            let player_to_character = frame.character_position - frame.player_root.position;
            let vertical = frame.up * player_to_character.dot(frame.up);

            Reconciliation {
                pose: Pose {
                    position: frame.player_root.position + lateral.total() + vertical,
                    rotation: frame.character_rotation,
                },
                lateral: Some(lateral),
                vertical,
            }
        }
        ReconciliationMode::Strict => {
            let player_to_character = frame.character_position - frame.player_root.position;
            Reconciliation {
                // player rotation stays the player's own in strict mode
                pose: Pose {
                    position: frame.character_position,
                    rotation: frame.player_root.rotation,
                },
                lateral: None,
                vertical: frame.up * player_to_character.dot(frame.up),
            }
        }
        ReconciliationMode::Disabled => Reconciliation {
            pose: frame.player_root,
            lateral: None,
            vertical: DVec3::ZERO,
        },
    }
}
