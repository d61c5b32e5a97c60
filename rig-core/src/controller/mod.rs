mod report;
mod state;

pub use report::ReconciliationReport;
pub use state::CharacterState;

use glam::{DQuat, DVec3};
use tracing::{debug, error, trace};

use crate::constants::ZERO_SQUARE;
use crate::error::RigError;
use crate::math::{clamp_magnitude, from_to_rotation, look_rotation, project_on_plane, Plane};
use crate::motion::{classify, MotionSample};
use crate::motor::{
    CharacterController, CharacterMotor, ColliderHandle, CollisionFilter, PoseSink,
    SimulationState,
};
use crate::player_inputs::CharacterInputFrame;
use crate::pose::{headset_altitude, player_root_pose, Pose};
use crate::reconciliation::{reconcile, ReconciliationFrame};
use crate::settings::ControllerSettings;
use crate::snap_rotation::{SnapRotationPolicy, SnapRotationScheduler};
use crate::vertical::CharacterVerticalAdapter;

// Character controller for a player walking around a tracked VR rig. The motor
// owning the capsule calls the four CharacterController phases once per fixed
// tick; set_inputs is called before each tick with what the player is doing.
pub struct VrCharacterController {
    settings: ControllerSettings,
    state: CharacterState,
    pose_sink: Option<Box<dyn PoseSink>>,
    missing_sink_reported: bool,

    snap_rotation: SnapRotationScheduler,
    vertical: CharacterVerticalAdapter,
    collision_filter: CollisionFilter,

    // inputs, refreshed by set_inputs
    move_input: DVec3,
    look_input: DVec3,
    headset_pose: Pose,
    play_area_pose: Pose,
    player_root: Pose,
    jump_requested: bool,
    time_since_jump_requested: f64,

    external_velocity: DVec3,

    // lateral motion the stick and the headset caused this tick
    velocity_input_motion: DVec3,
    headset_motion: DVec3,

    last_report: Option<ReconciliationReport>,
}

impl VrCharacterController {
    pub fn new(settings: ControllerSettings) -> Self {
        let policy = SnapRotationPolicy {
            buffer_commands: settings.buffer_snap_rotation_commands,
            change_direction_immediately: settings.change_snap_direction_immediately,
        };

        VrCharacterController {
            settings,
            state: CharacterState::Default,
            pose_sink: None,
            missing_sink_reported: false,
            snap_rotation: SnapRotationScheduler::new(policy),
            vertical: CharacterVerticalAdapter::new(),
            collision_filter: CollisionFilter::new(),
            move_input: DVec3::ZERO,
            look_input: DVec3::ZERO,
            headset_pose: Pose::IDENTITY,
            play_area_pose: Pose::IDENTITY,
            player_root: Pose::IDENTITY,
            jump_requested: false,
            time_since_jump_requested: f64::INFINITY,
            external_velocity: DVec3::ZERO,
            velocity_input_motion: DVec3::ZERO,
            headset_motion: DVec3::ZERO,
            last_report: None,
        }
    }

    pub fn set_pose_sink(&mut self, sink: Box<dyn PoseSink>) {
        self.pose_sink = Some(sink);
        self.missing_sink_reported = false;
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn snap_rotation(&self) -> &SnapRotationScheduler {
        &self.snap_rotation
    }

    pub fn collision_filter_mut(&mut self) -> &mut CollisionFilter {
        &mut self.collision_filter
    }

    pub fn move_input(&self) -> DVec3 {
        self.move_input
    }

    pub fn look_input(&self) -> DVec3 {
        self.look_input
    }

    pub fn player_root(&self) -> Pose {
        self.player_root
    }

    pub fn headset_altitude(&self) -> f64 {
        self.vertical.headset_altitude()
    }

    pub fn jump_requested(&self) -> bool {
        self.jump_requested
    }

    pub fn time_since_jump_requested(&self) -> f64 {
        self.time_since_jump_requested
    }

    // Hands the pending jump request over to whoever acts on it
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::replace(&mut self.jump_requested, false)
    }

    pub fn last_report(&self) -> Option<&ReconciliationReport> {
        self.last_report.as_ref()
    }

    // Puts the controller in its initial state and checks it can reach the
    // player rig
    pub fn activate(&mut self) -> Result<(), RigError> {
        self.transition_to_state(CharacterState::Default);
        if self.pose_sink.is_none() {
            error!("{}", RigError::MissingPoseSink);
            self.missing_sink_reported = true;
            return Err(RigError::MissingPoseSink);
        }
        Ok(())
    }

    pub fn transition_to_state(&mut self, new_state: CharacterState) {
        let previous = self.state;
        self.on_state_exit(previous, new_state);
        self.state = new_state;
        self.on_state_enter(new_state, previous);
    }

    fn on_state_enter(&mut self, state: CharacterState, from: CharacterState) {
        match state {
            CharacterState::Default => debug!(?from, "entering default state"),
        }
    }

    fn on_state_exit(&mut self, state: CharacterState, to: CharacterState) {
        match state {
            CharacterState::Default => debug!(?to, "leaving default state"),
        }
    }

    pub fn set_inputs(&mut self, inputs: &CharacterInputFrame, motor: &dyn CharacterMotor) {
        let up = motor.character_up();
        let move_input = clamp_magnitude(
            DVec3::new(inputs.move_direction.x, 0.0, inputs.move_direction.y),
            1.0,
        );

        // direction the player is steering, flattened onto the character plane
        let mut planar_direction =
            project_on_plane(inputs.move_orientation * DVec3::Z, up).normalize_or_zero();
        if planar_direction.length_squared() < f64::EPSILON {
            planar_direction =
                project_on_plane(inputs.move_orientation * DVec3::Y, up).normalize_or_zero();
        }
        let planar_rotation = look_rotation(planar_direction, up);

        match self.state {
            CharacterState::Default => {
                self.move_input = planar_rotation * move_input;
                self.look_input = planar_direction;

                let snap_angle = self.settings.snap_angle * self.settings.snap_angle_multiplier;
                if inputs.snap_turn_left_down {
                    self.snap_rotation
                        .request_rotation(-snap_angle, self.settings.snap_duration);
                }
                if inputs.snap_turn_right_down {
                    self.snap_rotation
                        .request_rotation(snap_angle, self.settings.snap_duration);
                }

                self.headset_pose = inputs.headset_pose;
                self.play_area_pose = inputs.play_area_pose;
                self.player_root = player_root_pose(&self.headset_pose, &self.play_area_pose);

                if inputs.jump_down {
                    debug!("jump requested");
                    self.jump_requested = true;
                    self.time_since_jump_requested = 0.0;
                }
            }
        }
    }

    pub fn add_external_velocity(&mut self, velocity: DVec3) {
        match self.state {
            CharacterState::Default => self.external_velocity += velocity,
        }
    }

    // Teleports the player rig onto the character
    pub fn force_reconcile(&mut self, motor: &dyn CharacterMotor) {
        debug!("forcing reconciliation");
        self.emit_pose(Pose::new(
            motor.transient_position(),
            motor.transient_rotation(),
        ));
    }

    fn emit_pose(&mut self, pose: Pose) {
        match self.pose_sink.as_mut() {
            Some(sink) => sink.apply_pose(pose),
            None => {
                if !self.missing_sink_reported {
                    error!("{}", RigError::MissingPoseSink);
                    self.missing_sink_reported = true;
                }
            }
        }
    }

    // Lateral velocity that moves the character towards where the player is
    // standing in the play area
    fn headset_velocity(&self, player_displacement: DVec3, up: DVec3, delta_time: f64) -> DVec3 {
        if delta_time <= 0.0 {
            return DVec3::ZERO;
        }
        let velocity = player_displacement / delta_time;
        // drop the vertical part, it's only floating point noise
        let velocity = velocity - up * velocity.dot(up);
        clamp_magnitude(velocity, self.settings.max_headset_velocity())
    }

    fn grounded_velocity(
        &mut self,
        motor: &dyn CharacterMotor,
        player_displacement: DVec3,
        delta_time: f64,
    ) -> DVec3 {
        let up = motor.character_up();
        let ground_normal = motor.grounding_status().ground_normal;
        let mut velocity = DVec3::ZERO;

        if self.move_input.length_squared() > ZERO_SQUARE {
            // keep the input tangent to the ground so slopes don't slow the player down
            let input_right = self.move_input.cross(up);
            let reoriented =
                ground_normal.cross(input_right).normalize_or_zero() * self.move_input.length();
            let move_velocity = reoriented * self.settings.max_stable_move_speed;

            self.velocity_input_motion = project_on_plane(move_velocity, up) * delta_time;
            velocity += move_velocity;
        } else {
            self.velocity_input_motion = DVec3::ZERO;
        }

        if player_displacement.length_squared() > ZERO_SQUARE {
            let headset_velocity = self.headset_velocity(player_displacement, up, delta_time);
            self.headset_motion = headset_velocity * delta_time;
            velocity += headset_velocity;
        } else {
            self.headset_motion = DVec3::ZERO;
        }

        velocity
    }

    fn airborne_velocity(
        &mut self,
        motor: &dyn CharacterMotor,
        current_velocity: DVec3,
        player_displacement: DVec3,
        delta_time: f64,
    ) -> DVec3 {
        let up = motor.character_up();
        let grounding = motor.grounding_status();
        let gravity = self.settings.gravity();
        let mut velocity = current_velocity;

        if self.move_input.length_squared() > ZERO_SQUARE {
            let mut move_velocity = self.move_input * self.settings.max_air_move_speed;

            // no climbing unstable slopes by air strafing
            if grounding.found_any_ground {
                let obstruction_normal = up
                    .cross(grounding.ground_normal)
                    .cross(up)
                    .normalize_or_zero();
                move_velocity = project_on_plane(move_velocity, obstruction_normal);
            }

            self.velocity_input_motion = project_on_plane(move_velocity, up) * delta_time;
            let velocity_diff = project_on_plane(move_velocity - velocity, gravity);
            velocity += velocity_diff * (self.settings.air_acceleration_speed * delta_time);
        } else {
            self.velocity_input_motion = DVec3::ZERO;
        }

        if player_displacement.length_squared() > ZERO_SQUARE
            && self.settings.allow_headset_input_when_airborne
        {
            let headset_velocity = self.headset_velocity(player_displacement, up, delta_time);
            self.headset_motion = headset_velocity * delta_time;
            velocity += project_on_plane(headset_velocity - velocity, gravity);
        } else {
            self.headset_motion = DVec3::ZERO;
        }

        velocity += gravity * delta_time;
        velocity * (1.0 / (1.0 + self.settings.drag * delta_time))
    }
}

impl CharacterController for VrCharacterController {
    fn before_character_update(&mut self, motor: &mut dyn CharacterMotor, _delta_time: f64) {
        match self.state {
            CharacterState::Default => {
                let altitude = headset_altitude(&self.headset_pose, &self.play_area_pose);
                self.vertical.adjust_before_step(altitude, motor);
            }
        }
    }

    fn update_rotation(
        &mut self,
        motor: &dyn CharacterMotor,
        current_rotation: DQuat,
        delta_time: f64,
    ) -> DQuat {
        match self.state {
            CharacterState::Default => {
                let up = motor.character_up();
                let mut rotation = current_rotation;

                if self.look_input != DVec3::ZERO {
                    rotation = look_rotation(self.look_input, up);
                }
                if self.settings.orient_towards_gravity {
                    rotation =
                        from_to_rotation(rotation * DVec3::Y, -self.settings.gravity()) * rotation;
                }

                let snap_delta = self.snap_rotation.update(delta_time);
                if snap_delta != 0.0 {
                    rotation = DQuat::from_axis_angle(up, snap_delta.to_radians()) * rotation;
                }

                rotation.normalize()
            }
        }
    }

    fn update_velocity(
        &mut self,
        motor: &dyn CharacterMotor,
        current_velocity: DVec3,
        delta_time: f64,
    ) -> DVec3 {
        match self.state {
            CharacterState::Default => {
                let player_displacement = self.player_root.position - motor.transient_position();

                let mut velocity = if motor.grounding_status().is_stable_on_ground {
                    self.grounded_velocity(motor, player_displacement, delta_time)
                } else {
                    self.airborne_velocity(motor, current_velocity, player_displacement, delta_time)
                };

                if self.external_velocity.length_squared() > 0.0 {
                    velocity += self.external_velocity;
                    self.external_velocity = DVec3::ZERO;
                }

                velocity
            }
        }
    }

    fn after_character_update(&mut self, motor: &mut dyn CharacterMotor, delta_time: f64) {
        match self.state {
            CharacterState::Default => {
                self.vertical.adjust_after_step(motor);

                let simulated = SimulationState::capture(&*motor);
                let up = simulated.up;
                let character_position = simulated.transient_position;
                let sample = MotionSample::lateral(
                    simulated.displacement(),
                    self.headset_motion,
                    self.velocity_input_motion,
                    up,
                );
                let classified = classify(&sample, up);

                let reconciliation = reconcile(&ReconciliationFrame {
                    mode: self.settings.reconciliation_mode,
                    up,
                    character_position,
                    character_rotation: simulated.transient_rotation,
                    player_root: self.player_root,
                    classified: &classified,
                });

                let character_floor = Plane::new(up, character_position);
                let report = ReconciliationReport {
                    mode: self.settings.reconciliation_mode,
                    case: reconciliation.lateral.map(|lateral| lateral.case),
                    classified,
                    lateral_correction: reconciliation
                        .lateral
                        .map(|lateral| lateral.total())
                        .unwrap_or(DVec3::ZERO),
                    vertical_correction: reconciliation.vertical,
                    pose: reconciliation.pose,
                    headset_offset: character_floor.closest_point(self.headset_pose.position)
                        - character_position,
                };
                trace!(?report, "reconciled");

                self.emit_pose(reconciliation.pose);
                self.last_report = Some(report);
                self.time_since_jump_requested += delta_time;
            }
        }
    }

    fn is_collider_valid_for_collisions(&self, collider: &ColliderHandle) -> bool {
        self.collision_filter.allows(collider)
    }
}
