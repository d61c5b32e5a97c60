use tracing::{debug, trace};

use crate::motor::CharacterMotor;

// Keeps the capsule as tall as the player's head is above the play area floor.
// Shrinking happens before the motor moves the character so a crouch registers
// right away; growing waits until after the move and only sticks if the taller
// capsule fits where the character ended up.
#[derive(Copy, Clone, Debug, Default)]
pub struct CharacterVerticalAdapter {
    headset_altitude: f64,
    blocked: bool,
}

impl CharacterVerticalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headset_altitude(&self) -> f64 {
        self.headset_altitude
    }

    // whether the last attempt to stand back up hit something
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    // Returns the capsule height the character has for this tick's move, which
    // may be taller than the headset altitude if the motor enforces a minimum
    pub fn adjust_before_step(
        &mut self,
        headset_altitude: f64,
        motor: &mut dyn CharacterMotor,
    ) -> f64 {
        self.headset_altitude = headset_altitude;
        let capsule = motor.capsule();

        if headset_altitude < capsule.height {
            trace!(from = capsule.height, to = headset_altitude, "shrinking capsule");
            motor.set_capsule_dimensions(capsule.radius, headset_altitude, headset_altitude / 2.0);
        }
        motor.capsule().height
    }

    // Returns the capsule height the character keeps after this tick
    pub fn adjust_after_step(&mut self, motor: &mut dyn CharacterMotor) -> f64 {
        let capsule = motor.capsule();
        let target = self.headset_altitude;
        if target <= capsule.height {
            self.blocked = false;
            return capsule.height;
        }

        motor.set_capsule_dimensions(capsule.radius, target, target / 2.0);
        if motor.character_overlaps(motor.transient_position(), motor.transient_rotation()) {
            // stay crouched for now, growing is attempted again next tick
            motor.set_capsule_dimensions(capsule.radius, capsule.height, capsule.height / 2.0);
            if !self.blocked {
                debug!(height = capsule.height, target, "capsule can't grow, obstructed");
            }
            self.blocked = true;
            return capsule.height;
        }

        trace!(from = capsule.height, to = target, "growing capsule");
        self.blocked = false;
        motor.capsule().height
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::motor::{CapsuleDimensions, GroundingStatus};
    use std::cell::Cell;
    use glam::{DQuat, DVec3};

    // Motor stand-in: a ceiling at a fixed height above the character's feet,
    // the capsule overlaps anything taller
    pub(crate) struct StubMotor {
        pub capsule: CapsuleDimensions,
        pub ceiling: f64,
        pub initial_position: DVec3,
        pub position: DVec3,
        pub rotation: DQuat,
        pub grounding: GroundingStatus,
        pub overlap_queries: Cell<usize>,
    }

    impl StubMotor {
        pub(crate) fn new(height: f64) -> StubMotor {
            StubMotor {
                capsule: CapsuleDimensions::standing(0.25, height),
                ceiling: f64::INFINITY,
                initial_position: DVec3::ZERO,
                position: DVec3::ZERO,
                rotation: DQuat::IDENTITY,
                grounding: GroundingStatus {
                    is_stable_on_ground: true,
                    found_any_ground: true,
                    ground_normal: DVec3::Y,
                },
                overlap_queries: Cell::new(0),
            }
        }
    }

    impl CharacterMotor for StubMotor {
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

        fn set_capsule_dimensions(&mut self, radius: f64, height: f64, y_offset: f64) {
            self.capsule = CapsuleDimensions {
                radius,
                height,
                y_offset,
            };
        }

        fn character_overlaps(&self, _position: DVec3, _rotation: DQuat) -> bool {
            self.overlap_queries.set(self.overlap_queries.get() + 1);
            self.capsule.height > self.ceiling
        }
    }

    #[test]
    fn crouch_shrinks_before_the_step() {
        let mut motor = StubMotor::new(1.8);
        let mut adapter = CharacterVerticalAdapter::new();

        assert_eq!(adapter.adjust_before_step(1.2, &mut motor), 1.2);
        assert_eq!(motor.capsule.height, 1.2);
        assert_eq!(motor.capsule.y_offset, 0.6);
        assert_eq!(adapter.adjust_after_step(&mut motor), 1.2);
    }

    #[test]
    fn standing_up_waits_for_the_step() {
        let mut motor = StubMotor::new(1.2);
        let mut adapter = CharacterVerticalAdapter::new();

        assert_eq!(adapter.adjust_before_step(1.7, &mut motor), 1.2);
        assert_eq!(motor.capsule.height, 1.2);

        assert_eq!(adapter.adjust_after_step(&mut motor), 1.7);
        assert_eq!(motor.capsule.height, 1.7);
        assert_eq!(motor.capsule.y_offset, 0.85);
    }

    #[test]
    fn obstructed_growth_keeps_previous_height_and_retries() {
        let mut motor = StubMotor::new(1.2);
        motor.ceiling = 1.5;
        let mut adapter = CharacterVerticalAdapter::new();

        adapter.adjust_before_step(1.7, &mut motor);
        assert_eq!(adapter.adjust_after_step(&mut motor), 1.2);
        assert_eq!(motor.capsule, CapsuleDimensions::standing(0.25, 1.2));
        assert!(adapter.is_blocked());

        // ceiling gone: next tick grows
        motor.ceiling = f64::INFINITY;
        adapter.adjust_before_step(1.7, &mut motor);
        assert_eq!(adapter.adjust_after_step(&mut motor), 1.7);
        assert!(!adapter.is_blocked());
        assert_eq!(motor.overlap_queries.get(), 2);
    }
}
