use glam::{DQuat, DVec2};
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

// CharacterInputFrame is handed to the character controller once per tick,
// before the simulation runs, to tell it what the player is doing
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct CharacterInputFrame {
    pub move_direction: DVec2, // magnitude <= 1
    pub move_orientation: DQuat,
    pub headset_pose: Pose,
    pub play_area_pose: Pose,
    pub jump_down: bool,
    pub snap_turn_left_down: bool,
    pub snap_turn_right_down: bool,
}

impl Default for CharacterInputFrame {
    fn default() -> Self {
        CharacterInputFrame {
            move_direction: DVec2::ZERO,
            move_orientation: DQuat::IDENTITY,
            headset_pose: Pose::IDENTITY,
            play_area_pose: Pose::IDENTITY,
            jump_down: false,
            snap_turn_left_down: false,
            snap_turn_right_down: false,
        }
    }
}

// What the tracking layer reports every tick: buttons are reported as held,
// not as edges
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawControllerState {
    pub move_direction: DVec2,
    pub move_orientation: Pose,
    pub headset_pose: Pose,
    pub play_area_pose: Pose,
    pub jump_pressed: bool,
    pub snap_turn_left_pressed: bool,
    pub snap_turn_right_pressed: bool,
}

#[derive(Copy, Clone, Debug, Default)]
struct ButtonEdge {
    pressed_last_tick: bool,
}

impl ButtonEdge {
    // true only on the tick the button goes down
    fn update(&mut self, pressed: bool) -> bool {
        let went_down = pressed && !self.pressed_last_tick;
        self.pressed_last_tick = pressed;
        went_down
    }
}

#[derive(Default)]
pub struct InputEdgeDetector {
    jump: ButtonEdge,
    snap_turn_left: ButtonEdge,
    snap_turn_right: ButtonEdge,
}

impl InputEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_frame(&mut self, raw: &RawControllerState) -> CharacterInputFrame {
        CharacterInputFrame {
            move_direction: raw.move_direction,
            move_orientation: raw.move_orientation.rotation,
            headset_pose: raw.headset_pose,
            play_area_pose: raw.play_area_pose,
            jump_down: self.jump.update(raw.jump_pressed),
            snap_turn_left_down: self.snap_turn_left.update(raw.snap_turn_left_pressed),
            snap_turn_right_down: self.snap_turn_right.update(raw.snap_turn_right_pressed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_fires_once() {
        let mut detector = InputEdgeDetector::new();
        let mut raw = RawControllerState::default();

        raw.snap_turn_right_pressed = true;
        assert!(detector.next_frame(&raw).snap_turn_right_down);
        assert!(!detector.next_frame(&raw).snap_turn_right_down);
        assert!(!detector.next_frame(&raw).snap_turn_right_down);

        raw.snap_turn_right_pressed = false;
        assert!(!detector.next_frame(&raw).snap_turn_right_down);

        raw.snap_turn_right_pressed = true;
        assert!(detector.next_frame(&raw).snap_turn_right_down);
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut detector = InputEdgeDetector::new();
        let mut raw = RawControllerState::default();

        raw.jump_pressed = true;
        let frame = detector.next_frame(&raw);
        assert!(frame.jump_down);
        assert!(!frame.snap_turn_left_down);

        raw.snap_turn_left_pressed = true;
        let frame = detector.next_frame(&raw);
        assert!(!frame.jump_down);
        assert!(frame.snap_turn_left_down);
    }
}
