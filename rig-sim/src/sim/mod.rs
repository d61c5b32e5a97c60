use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use glam::{DQuat, DVec3};
use rig_core::avatar::{AvatarData, AvatarRegistry};
use rig_core::controller::{ReconciliationReport, VrCharacterController};
use rig_core::motor::{CapsuleDimensions, CharacterMotor, OwnerId};
use rig_core::player_inputs::InputEdgeDetector;
use rig_core::pose::Pose;
use rig_core::settings::{Settings, SimSettings};
use rig_core::RigError;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::physics::bounding_box::BoundingBox;
use crate::physics::motor::KinematicMotor;
use crate::physics::obstacle::Obstacle;

use self::script::ScriptedInput;
use self::tracking::TrackedRig;

pub mod script;
pub mod tracking;

// everything hanging under this owner is see-through for the character
pub const CURTAIN_OWNER: OwnerId = 20;

pub fn default_scene() -> Vec<Obstacle> {
    vec![
        Obstacle::new(
            "wall",
            1,
            vec![],
            BoundingBox::from_vecs(DVec3::new(-2.0, 0.0, 4.0), DVec3::new(2.0, 3.0, 4.5)),
        ),
        Obstacle::new(
            "shelf",
            2,
            vec![10],
            BoundingBox::from_vecs(DVec3::new(0.5, 1.3, 2.5), DVec3::new(4.0, 1.5, 4.0)),
        ),
        Obstacle::new(
            "curtain",
            3,
            vec![CURTAIN_OWNER],
            BoundingBox::from_vecs(DVec3::new(-2.0, 0.0, 2.0), DVec3::new(2.0, 2.5, 2.1)),
        ),
    ]
}

#[derive(Clone, Debug, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub character_position: DVec3,
    pub character_rotation: DQuat,
    pub player_root: Pose,
    pub capsule_height: f64,
    pub grounded: bool,
    pub reconciliation: Option<ReconciliationReport>,
}

pub struct Simulation {
    settings: SimSettings,
    motor: KinematicMotor,
    controller: VrCharacterController,
    rig: Rc<RefCell<TrackedRig>>,
    edges: InputEdgeDetector,
    script: ScriptedInput,
    avatars: AvatarRegistry,
    tick: u64,
    reports: Vec<TickReport>,
}

impl Simulation {
    pub fn new(
        settings: &Settings,
        obstacles: Vec<Obstacle>,
        script: ScriptedInput,
    ) -> Result<Self, RigError> {
        let rig = Rc::new(RefCell::new(TrackedRig::new(
            Pose::IDENTITY,
            Pose::new(DVec3::new(0.0, 1.7, 0.0), DQuat::IDENTITY),
        )));

        // the player rig is placed where the avatar appears before it does
        let mut avatars = AvatarRegistry::new(Some(AvatarData {
            name: String::from("default"),
            avatar_prefab: Some(String::from("avatars/default")),
        }));
        let spawn_rig = rig.clone();
        avatars.on_before_spawn(move |pose| spawn_rig.borrow_mut().apply_root_pose(*pose));
        let spawn_pose = Pose::IDENTITY;
        avatars.spawn(spawn_pose)?;

        let motor = KinematicMotor::new(
            spawn_pose.position,
            CapsuleDimensions::standing(settings.sim.capsule_radius, settings.sim.capsule_height),
            obstacles,
        );

        let mut controller = VrCharacterController::new(settings.controller.clone());
        controller.collision_filter_mut().ignore_owner(CURTAIN_OWNER);
        let sink_rig = rig.clone();
        controller.set_pose_sink(Box::new(move |pose: Pose| {
            sink_rig.borrow_mut().apply_root_pose(pose)
        }));
        controller.activate()?;

        Ok(Simulation {
            settings: settings.sim.clone(),
            motor,
            controller,
            rig,
            edges: InputEdgeDetector::new(),
            script,
            avatars,
            tick: 0,
            reports: Vec::new(),
        })
    }

    pub fn motor(&self) -> &KinematicMotor {
        &self.motor
    }

    pub fn controller(&self) -> &VrCharacterController {
        &self.controller
    }

    pub fn rig(&self) -> TrackedRig {
        *self.rig.borrow()
    }

    pub fn avatars(&self) -> &AvatarRegistry {
        &self.avatars
    }

    pub fn reports(&self) -> &[TickReport] {
        &self.reports
    }

    // Runs the configured amount of ticks, paced to the configured tick length
    pub fn run(&mut self) {
        let max_tick_duration = Duration::from_millis(self.settings.tick_ms);

        for _ in 0..self.settings.ticks {
            let start_time = Instant::now();

            self.step();

            // wait until tick time has elapsed
            match max_tick_duration.checked_sub(start_time.elapsed()) {
                Some(remaining_tick_duration) => thread::sleep(remaining_tick_duration),
                None => warn!(tick = self.tick, "tick took longer than configured length"),
            }
        }

        let rig = self.rig();
        info!(
            ticks = self.tick,
            character = ?self.motor.position(),
            player_root = ?rig.player_root().position,
            play_area = ?rig.play_area.position,
            "simulation finished"
        );
    }

    pub fn step(&mut self) {
        let delta_time = self.settings.tick_seconds();

        let raw = {
            let mut rig = self.rig.borrow_mut();
            self.script.next_state(&mut rig)
        };
        let inputs = self.edges.next_frame(&raw);
        self.controller.set_inputs(&inputs, &self.motor);
        self.motor.simulate(&mut self.controller, delta_time);

        let report = TickReport {
            tick: self.tick,
            character_position: self.motor.position(),
            character_rotation: self.motor.transient_rotation(),
            player_root: self.rig.borrow().player_root(),
            capsule_height: self.motor.capsule().height,
            grounded: self.motor.grounding_status().is_stable_on_ground,
            reconciliation: self.controller.last_report().copied(),
        };
        if self.tick % 100 == 0 {
            debug!(tick = self.tick, position = ?report.character_position, "tick");
        }
        self.reports.push(report);
        self.tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_core::reconciliation::ReconciliationMode;
    use rig_core::GLOBAL_CONFIG;

    const TICKS: u64 = 400;

    fn simulation(mode: ReconciliationMode) -> Simulation {
        let mut settings = GLOBAL_CONFIG.clone();
        settings.controller.reconciliation_mode = mode;
        Simulation::new(&settings, default_scene(), ScriptedInput::walkabout(TICKS, 7)).unwrap()
    }

    fn run_ticks(sim: &mut Simulation) {
        for _ in 0..TICKS {
            sim.step();
        }
    }

    #[test]
    fn avatar_is_spawned_at_start() {
        let sim = simulation(ReconciliationMode::Strict);
        assert!(sim.avatars().is_avatar_spawned());
        assert!(sim.rig().player_root().position.abs_diff_eq(DVec3::ZERO, 1e-9));
    }

    #[test]
    fn strict_keeps_player_on_character() {
        let mut sim = simulation(ReconciliationMode::Strict);
        for _ in 0..TICKS {
            sim.step();
            let root = sim.rig().player_root().position;
            assert!(root.abs_diff_eq(sim.motor().position(), 1e-6));
        }
    }

    #[test]
    fn character_never_walks_through_the_wall() {
        // with reconciliation disabled the headset keeps pulling the character
        // back to where the player stands, so only the reconciling modes walk
        for mode in [ReconciliationMode::Strict, ReconciliationMode::Graceful] {
            let mut sim = simulation(mode);
            run_ticks(&mut sim);
            let radius = GLOBAL_CONFIG.sim.capsule_radius;
            assert!(sim
                .reports()
                .iter()
                .all(|report| report.character_position.z <= 4.0 - radius + 1e-9));
            // the curtain is ignored, so the character made it past it
            assert!(sim
                .reports()
                .iter()
                .any(|report| report.character_position.z > 2.1));
        }
    }

    #[test]
    fn disabled_never_moves_the_play_area() {
        let mut sim = simulation(ReconciliationMode::Disabled);
        run_ticks(&mut sim);
        assert!(sim.rig().play_area.position.abs_diff_eq(DVec3::ZERO, 1e-12));
        assert!(sim.reports().iter().all(|report| report
            .reconciliation
            .map(|r| r.mode == ReconciliationMode::Disabled)
            .unwrap_or(false)));
    }

    #[test]
    fn graceful_reports_a_case_every_tick() {
        let mut sim = simulation(ReconciliationMode::Graceful);
        run_ticks(&mut sim);
        assert!(sim
            .reports()
            .iter()
            .all(|report| report.reconciliation.and_then(|r| r.case).is_some()));
        assert!(sim.reports().iter().all(|report| report.capsule_height > 0.0));
    }
}
