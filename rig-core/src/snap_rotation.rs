use std::collections::VecDeque;

use tracing::{debug, trace};

// A single discrete yaw rotation, played back linearly over its duration.
// Angles are in degrees and relative to the yaw the character had when the
// command started.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapRotationCommand {
    pub start_angle: f64,
    pub previous_angle: f64,
    pub current_angle: f64,
    pub end_angle: f64,
    pub duration: f64,
    // remaining time
    pub timer: f64,
    started: bool,
}

impl SnapRotationCommand {
    pub fn new(angle: f64, duration: f64) -> SnapRotationCommand {
        let duration = duration.max(0.0);
        SnapRotationCommand {
            start_angle: 0.0,
            previous_angle: 0.0,
            current_angle: 0.0,
            end_angle: angle,
            duration,
            timer: duration,
            started: false,
        }
    }

    // a finished, zero-length command; what the scheduler holds while idle
    fn idle() -> SnapRotationCommand {
        SnapRotationCommand {
            started: true,
            ..SnapRotationCommand::new(0.0, 0.0)
        }
    }

    pub fn progress(&self) -> f64 {
        if self.timer > 0.0 && self.duration > 0.0 {
            1.0 - self.timer / self.duration
        } else {
            1.0
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    // a command that hasn't been advanced yet still owes its whole angle, even
    // if its duration is zero
    pub fn is_active(&self) -> bool {
        !self.started || !self.is_finished()
    }

    pub fn last_angle_delta(&self) -> f64 {
        self.current_angle - self.previous_angle
    }

    pub fn remaining_angle(&self) -> f64 {
        self.end_angle - self.current_angle
    }

    // fraction of the total angle already turned
    fn completed_fraction(&self) -> f64 {
        let total = self.end_angle - self.start_angle;
        if total == 0.0 {
            return 1.0;
        }
        (self.current_angle - self.start_angle) / total
    }

    fn advance(&mut self, delta_time: f64) {
        self.started = true;
        self.timer = (self.timer - delta_time).max(0.0);
        self.previous_angle = self.current_angle;
        self.current_angle = lerp(self.start_angle, self.end_angle, self.progress());
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

#[derive(Copy, Clone, Debug)]
pub struct SnapRotationPolicy {
    // queue requests that arrive mid-turn instead of dropping them
    pub buffer_commands: bool,
    // an opposite-direction request cancels the rest of the current turn
    // instead of waiting behind it
    pub change_direction_immediately: bool,
}

impl Default for SnapRotationPolicy {
    fn default() -> Self {
        SnapRotationPolicy {
            buffer_commands: true,
            change_direction_immediately: true,
        }
    }
}

pub struct SnapRotationScheduler {
    policy: SnapRotationPolicy,
    current: SnapRotationCommand,
    queue: VecDeque<SnapRotationCommand>,
}

impl SnapRotationScheduler {
    pub fn new(policy: SnapRotationPolicy) -> Self {
        SnapRotationScheduler {
            policy,
            current: SnapRotationCommand::idle(),
            queue: VecDeque::new(),
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.current.is_active()
    }

    pub fn current(&self) -> &SnapRotationCommand {
        &self.current
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    // Ask for a yaw rotation of `angle` degrees (positive turns right) played
    // over `duration` seconds
    pub fn request_rotation(&mut self, angle: f64, duration: f64) {
        let rotating = self.is_rotating();
        if rotating && !self.policy.buffer_commands {
            debug!(angle, "snap rotation dropped, a turn is already in progress");
            return;
        }

        if rotating && self.policy.change_direction_immediately {
            let new_direction = angle > 0.0;
            let old_direction = self.current.end_angle > 0.0;

            if new_direction != old_direction {
                // turn as if the current rotation had finished and the new one
                // was applied on top of it, in the time the current one has
                // used up so far
                let merged_angle = self.current.remaining_angle() + angle;
                let merged_duration = self.current.completed_fraction() * duration;
                debug!(
                    requested = angle,
                    merged_angle, merged_duration, "snap rotation reversed mid-turn"
                );

                self.queue.clear();
                self.current = SnapRotationCommand::new(merged_angle, merged_duration);
                return;
            }
        }

        debug!(angle, duration, queued = self.queue.len(), "snap rotation queued");
        self.queue.push_back(SnapRotationCommand::new(angle, duration));
    }

    // Advances the active rotation and returns the yaw delta (degrees) to apply
    // to the character this tick
    pub fn update(&mut self, delta_time: f64) -> f64 {
        if !self.current.is_active() {
            match self.queue.pop_front() {
                Some(next) => self.current = next,
                None => return 0.0,
            }
        }

        self.current.advance(delta_time);
        let delta = self.current.last_angle_delta();
        trace!(
            delta,
            progress = self.current.progress(),
            "snap rotation advanced"
        );
        delta
    }

    // drops the active turn where it is along with everything queued
    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = SnapRotationCommand::idle();
    }
}

impl Default for SnapRotationScheduler {
    fn default() -> Self {
        SnapRotationScheduler::new(SnapRotationPolicy::default())
    }
}
