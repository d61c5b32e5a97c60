use glam::{DQuat, DVec3};
use rig_core::motor::{CapsuleDimensions, CharacterController, CharacterMotor, GroundingStatus};
use tracing::trace;

use crate::physics::bounding_box::BoundingBox;
use crate::physics::constants::{CAPSULE_HEIGHT_PADDING, FLOOR_HEIGHT, GROUNDING_DISTANCE};
use crate::physics::obstacle::Obstacle;

// Moves an upright capsule over a flat floor, axis by axis, stopping at any
// obstacle the controller considers solid
pub struct KinematicMotor {
    position: DVec3,
    initial_position: DVec3,
    rotation: DQuat,
    velocity: DVec3,
    capsule: CapsuleDimensions,
    grounding: GroundingStatus,
    obstacles: Vec<Obstacle>,
    // which obstacles collide this tick, as decided by the controller
    solid: Vec<bool>,
}

impl KinematicMotor {
    pub fn new(position: DVec3, capsule: CapsuleDimensions, obstacles: Vec<Obstacle>) -> Self {
        for obstacle in &obstacles {
            trace!(name = %obstacle.name, center = ?obstacle.bounds.pos(), "adding obstacle");
        }
        let solid = vec![true; obstacles.len()];
        let mut motor = KinematicMotor {
            position,
            initial_position: position,
            rotation: DQuat::IDENTITY,
            velocity: DVec3::ZERO,
            capsule,
            grounding: GroundingStatus::default(),
            obstacles,
            solid,
        };
        motor.probe_ground();
        motor
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    // Runs one fixed tick: the controller's four phases around the move
    pub fn simulate(&mut self, controller: &mut dyn CharacterController, delta_time: f64) {
        self.initial_position = self.position;
        self.solid = self
            .obstacles
            .iter()
            .map(|obstacle| controller.is_collider_valid_for_collisions(&obstacle.collider))
            .collect();
        self.probe_ground();

        controller.before_character_update(self, delta_time);

        let current_rotation = self.rotation;
        self.rotation = controller.update_rotation(&*self, current_rotation, delta_time);
        let current_velocity = self.velocity;
        self.velocity = controller.update_velocity(&*self, current_velocity, delta_time);

        self.move_character(delta_time);

        controller.after_character_update(self, delta_time);
    }

    fn overlaps_at(&self, feet: DVec3) -> bool {
        let bounds = BoundingBox::around_capsule(feet, &self.capsule);
        self.obstacles
            .iter()
            .zip(self.solid.iter())
            .any(|(obstacle, solid)| *solid && bounds.is_colliding(&obstacle.bounds))
    }

    fn move_character(&mut self, delta_time: f64) {
        let displacement = self.velocity * delta_time;

        // vertical first so landing resolves before the lateral sweep
        for axis in [DVec3::Y, DVec3::X, DVec3::Z] {
            let step = axis * displacement.dot(axis);
            if step == DVec3::ZERO {
                continue;
            }

            let mut candidate = self.position + step;
            if candidate.y < FLOOR_HEIGHT {
                candidate.y = FLOOR_HEIGHT;
                self.velocity.y = self.velocity.y.max(0.0);
            }

            // a capsule that's already stuck inside something may move freely to get out
            if self.overlaps_at(candidate) && !self.overlaps_at(self.position) {
                trace!(?axis, "movement blocked");
                self.velocity -= axis * self.velocity.dot(axis);
                continue;
            }
            self.position = candidate;
        }
    }

    fn probe_ground(&mut self) {
        let on_floor = self.position.y - FLOOR_HEIGHT <= GROUNDING_DISTANCE;
        if on_floor {
            self.position.y = FLOOR_HEIGHT;
        }
        self.grounding = GroundingStatus {
            is_stable_on_ground: on_floor,
            found_any_ground: on_floor,
            ground_normal: DVec3::Y,
        };
    }
}

impl CharacterMotor for KinematicMotor {
    fn character_up(&self) -> DVec3 {
        DVec3::Y
    }

    fn grounding_status(&self) -> GroundingStatus {
        self.grounding
    }

    fn initial_simulation_position(&self) -> DVec3 {
        self.initial_position
    }

    fn transient_position(&self) -> DVec3 {
        self.position
    }

    fn transient_rotation(&self) -> DQuat {
        self.rotation
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    // the center always sits at half the height that was actually applied
    fn set_capsule_dimensions(&mut self, radius: f64, height: f64, _y_offset: f64) {
        let height = height.max(radius * 2.0 + CAPSULE_HEIGHT_PADDING);
        self.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset: height / 2.0,
        };
    }

    fn character_overlaps(&self, position: DVec3, _rotation: DQuat) -> bool {
        self.overlaps_at(position)
    }
}
