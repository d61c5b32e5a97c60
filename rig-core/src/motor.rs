use std::collections::HashSet;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

pub type ColliderId = u64;
pub type OwnerId = u64;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapsuleDimensions {
    pub radius: f64,
    pub height: f64,
    // height of the capsule's center above the character's feet
    pub y_offset: f64,
}

impl CapsuleDimensions {
    // capsule standing on the character's feet
    pub fn standing(radius: f64, height: f64) -> CapsuleDimensions {
        CapsuleDimensions {
            radius,
            height,
            y_offset: height / 2.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundingStatus {
    pub is_stable_on_ground: bool,
    pub found_any_ground: bool,
    pub ground_normal: DVec3,
}

impl Default for GroundingStatus {
    fn default() -> Self {
        GroundingStatus {
            is_stable_on_ground: false,
            found_any_ground: false,
            ground_normal: DVec3::Y,
        }
    }
}

// The kinematic motor that owns the character capsule. It reports where the
// capsule was before and after this tick's move and answers overlap queries;
// the controller only ever reads from it, except for resizing the capsule.
pub trait CharacterMotor {
    fn character_up(&self) -> DVec3;
    fn grounding_status(&self) -> GroundingStatus;
    // position at the start of this tick's simulation
    fn initial_simulation_position(&self) -> DVec3;
    // position (and rotation) as simulated so far this tick
    fn transient_position(&self) -> DVec3;
    fn transient_rotation(&self) -> DQuat;
    fn capsule(&self) -> CapsuleDimensions;
    fn set_capsule_dimensions(&mut self, radius: f64, height: f64, y_offset: f64);
    // whether the capsule, at its current dimensions, would overlap anything
    // when placed at the given pose
    fn character_overlaps(&self, position: DVec3, rotation: DQuat) -> bool;
}

// Snapshot of what the motor exposes for a tick
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub up: DVec3,
    pub grounding: GroundingStatus,
    pub capsule: CapsuleDimensions,
    pub initial_position: DVec3,
    pub transient_position: DVec3,
    pub transient_rotation: DQuat,
}

impl SimulationState {
    pub fn capture(motor: &dyn CharacterMotor) -> SimulationState {
        SimulationState {
            up: motor.character_up(),
            grounding: motor.grounding_status(),
            capsule: motor.capsule(),
            initial_position: motor.initial_simulation_position(),
            transient_position: motor.transient_position(),
            transient_rotation: motor.transient_rotation(),
        }
    }

    pub fn displacement(&self) -> DVec3 {
        self.transient_position - self.initial_position
    }
}

// Receives the pose the player's tracked root should be moved to
pub trait PoseSink {
    fn apply_pose(&mut self, pose: Pose);
}

impl<F> PoseSink for F
where
    F: FnMut(Pose),
{
    fn apply_pose(&mut self, pose: Pose) {
        self(pose)
    }
}

// The per-tick callbacks the motor invokes, in this order, once per fixed
// tick: before_character_update, update_rotation, update_velocity, (the motor
// moves the capsule), after_character_update
pub trait CharacterController {
    fn before_character_update(&mut self, motor: &mut dyn CharacterMotor, delta_time: f64);
    fn update_rotation(
        &mut self,
        motor: &dyn CharacterMotor,
        current_rotation: DQuat,
        delta_time: f64,
    ) -> DQuat;
    fn update_velocity(
        &mut self,
        motor: &dyn CharacterMotor,
        current_velocity: DVec3,
        delta_time: f64,
    ) -> DVec3;
    fn after_character_update(&mut self, motor: &mut dyn CharacterMotor, delta_time: f64);
    fn is_collider_valid_for_collisions(&self, collider: &ColliderHandle) -> bool;
}

// A collider as the motor sees it: its own id and the ids of the objects it
// hangs under, nearest first
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColliderHandle {
    pub id: ColliderId,
    pub owners: Vec<OwnerId>,
}

#[derive(Clone, Debug, Default)]
pub struct CollisionFilter {
    ignored_colliders: HashSet<ColliderId>,
    ignored_owners: HashSet<OwnerId>,
}

impl CollisionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_collider(&mut self, collider: ColliderId) {
        self.ignored_colliders.insert(collider);
    }

    // ignores every collider hanging anywhere under this owner
    pub fn ignore_owner(&mut self, owner: OwnerId) {
        self.ignored_owners.insert(owner);
    }

    pub fn allows(&self, collider: &ColliderHandle) -> bool {
        if self.ignored_colliders.contains(&collider.id) {
            return false;
        }
        !collider
            .owners
            .iter()
            .any(|owner| self.ignored_owners.contains(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_rejects_ignored_colliders_and_their_children() {
        let mut filter = CollisionFilter::new();
        filter.ignore_collider(7);
        filter.ignore_owner(100);

        assert!(!filter.allows(&ColliderHandle {
            id: 7,
            owners: vec![],
        }));
        assert!(!filter.allows(&ColliderHandle {
            id: 8,
            owners: vec![42, 100],
        }));
        assert!(filter.allows(&ColliderHandle {
            id: 8,
            owners: vec![42],
        }));
    }

    #[test]
    fn standing_capsule_is_centered_at_half_height() {
        let capsule = CapsuleDimensions::standing(0.3, 1.7);
        assert_eq!(capsule.y_offset, 0.85);
    }
}
