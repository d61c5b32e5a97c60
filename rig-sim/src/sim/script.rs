use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rig_core::player_inputs::RawControllerState;

use crate::sim::tracking::TrackedRig;

// Tracking noise on the headset, in meters per tick
const HEADSET_JITTER: f64 = 0.0005;

// One stretch of the scripted session
#[derive(Copy, Clone, Debug)]
pub struct Segment {
    pub ticks: u64,
    pub stick: DVec2,
    // how the player physically moves inside the play area, meters per tick
    pub headset_step: DVec3,
    pub headset_height: f64,
    pub snap_left: bool,
    pub snap_right: bool,
    pub jump: bool,
}

impl Segment {
    fn idle(ticks: u64) -> Segment {
        Segment {
            ticks,
            stick: DVec2::ZERO,
            headset_step: DVec3::ZERO,
            headset_height: 1.7,
            snap_left: false,
            snap_right: false,
            jump: false,
        }
    }
}

// Plays back a fixed list of segments, holding buttons for the whole segment
// and jittering the headset a little every tick
pub struct ScriptedInput {
    segments: Vec<Segment>,
    tick: u64,
    rng: StdRng,
}

impl ScriptedInput {
    pub fn new(segments: Vec<Segment>, seed: u64) -> Self {
        ScriptedInput {
            segments,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // Walk up to the wall, lean and crouch under the shelf, stand back up,
    // snap turn both ways and jump, spread over `total_ticks`
    pub fn walkabout(total_ticks: u64, seed: u64) -> Self {
        let part = (total_ticks / 8).max(1);
        let segments = vec![
            Segment {
                stick: DVec2::new(0.0, 1.0),
                ..Segment::idle(part * 2)
            },
            Segment {
                headset_step: DVec3::new(0.0, 0.0, 0.004),
                ..Segment::idle(part)
            },
            Segment {
                stick: DVec2::new(0.2, 0.0),
                headset_height: 1.1,
                ..Segment::idle(part)
            },
            Segment {
                headset_step: DVec3::new(-0.003, 0.0, 0.0),
                ..Segment::idle(part)
            },
            Segment {
                snap_right: true,
                ..Segment::idle(part)
            },
            Segment {
                snap_left: true,
                stick: DVec2::new(0.0, -0.5),
                ..Segment::idle(part)
            },
            Segment {
                jump: true,
                ..Segment::idle(total_ticks.saturating_sub(part * 7).max(1))
            },
        ];
        ScriptedInput::new(segments, seed)
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        let mut start = 0;
        for segment in self.segments.iter() {
            if self.tick < start + segment.ticks {
                return Some(segment);
            }
            start += segment.ticks;
        }
        None
    }

    // Moves the rig the way the player does this tick and reports the
    // controller state the tracking layer would
    pub fn next_state(&mut self, rig: &mut TrackedRig) -> RawControllerState {
        let segment = self.current_segment().copied().unwrap_or_else(|| Segment::idle(1));
        self.tick += 1;

        let jitter = DVec3::new(
            self.rng.gen_range(-HEADSET_JITTER..=HEADSET_JITTER),
            0.0,
            self.rng.gen_range(-HEADSET_JITTER..=HEADSET_JITTER),
        );
        rig.move_headset(segment.headset_step + jitter);
        rig.set_headset_height(segment.headset_height);

        let headset = rig.headset();
        RawControllerState {
            move_direction: segment.stick,
            move_orientation: headset,
            headset_pose: headset,
            play_area_pose: rig.play_area,
            jump_pressed: segment.jump,
            snap_turn_left_pressed: segment.snap_left,
            snap_turn_right_pressed: segment.snap_right,
        }
    }
}
