use config::{Config, ConfigError, File};
use glam::DVec3;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::error::RigError;
use crate::reconciliation::ReconciliationMode;

#[derive(Deserialize, Clone, Debug)]
pub struct ControllerSettings {
    pub reconciliation_mode: ReconciliationMode,
    // how hard the player can push the character around with headset motion;
    // unbounded when absent
    pub max_headset_reconciliation_velocity: Option<f64>,
    pub allow_headset_input_when_airborne: bool,

    pub max_stable_move_speed: f64,
    pub max_air_move_speed: f64,
    pub air_acceleration_speed: f64,
    pub drag: f64,

    pub snap_duration: f64,
    pub snap_angle: f64, // degrees, [0, 90]
    pub snap_angle_multiplier: f64,
    pub buffer_snap_rotation_commands: bool,
    pub change_snap_direction_immediately: bool,

    pub orient_towards_gravity: bool,
    pub gravity: [f64; 3],
}

impl ControllerSettings {
    pub fn gravity(&self) -> DVec3 {
        DVec3::from(self.gravity)
    }

    pub fn max_headset_velocity(&self) -> f64 {
        self.max_headset_reconciliation_velocity
            .unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> Result<(), RigError> {
        if !(0.0..=90.0).contains(&self.snap_angle) {
            return Err(RigError::InvalidSettings(format!(
                "snap_angle must be within [0, 90], got {}",
                self.snap_angle
            )));
        }
        let non_negative = [
            ("snap_duration", self.snap_duration),
            ("max_stable_move_speed", self.max_stable_move_speed),
            ("max_air_move_speed", self.max_air_move_speed),
            ("air_acceleration_speed", self.air_acceleration_speed),
            ("drag", self.drag),
            ("max_headset_reconciliation_velocity", self.max_headset_velocity()),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(RigError::InvalidSettings(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        GLOBAL_CONFIG.controller.clone()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SimSettings {
    pub tick_ms: u64,
    pub ticks: u64,
    pub capsule_radius: f64,
    pub capsule_height: f64,
    pub report_json: bool,
}

impl SimSettings {
    pub fn validate(&self) -> Result<(), RigError> {
        if self.tick_ms == 0 {
            return Err(RigError::InvalidSettings(String::from(
                "tick_ms must be positive",
            )));
        }
        if self.capsule_radius <= 0.0 || self.capsule_height < self.capsule_radius * 2.0 {
            return Err(RigError::InvalidSettings(format!(
                "capsule of radius {} and height {} is degenerate",
                self.capsule_radius, self.capsule_height
            )));
        }
        Ok(())
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub controller: ControllerSettings,
    pub sim: SimSettings,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("controller.reconciliation_mode", "strict")?
            .set_default("controller.allow_headset_input_when_airborne", true)?
            .set_default("controller.max_stable_move_speed", 10.0)?
            .set_default("controller.max_air_move_speed", 10.0)?
            .set_default("controller.air_acceleration_speed", 5.0)?
            .set_default("controller.drag", 0.1)?
            .set_default("controller.snap_duration", 0.2)?
            .set_default("controller.snap_angle", 45.0)?
            .set_default("controller.snap_angle_multiplier", 1.0)?
            .set_default("controller.buffer_snap_rotation_commands", true)?
            .set_default("controller.change_snap_direction_immediately", true)?
            .set_default("controller.orient_towards_gravity", false)?
            .set_default("controller.gravity", vec![0.0, -30.0, 0.0])?
            .set_default("sim.tick_ms", 11)?
            .set_default("sim.ticks", 600)?
            .set_default("sim.capsule_radius", 0.25)?
            .set_default("sim.capsule_height", 1.8)?
            .set_default("sim.report_json", false)?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }

    pub fn load() -> Result<Settings, RigError> {
        let settings = Settings::new()?;
        settings.controller.validate()?;
        settings.sim.validate()?;
        Ok(settings)
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::load().expect("failed to read config file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::load().unwrap();
        assert_eq!(settings.controller.snap_angle, 45.0);
        assert_eq!(settings.controller.reconciliation_mode, ReconciliationMode::Strict);
        assert!(settings.controller.max_headset_velocity().is_infinite());
        assert!(settings
            .controller
            .gravity()
            .abs_diff_eq(DVec3::new(0.0, -30.0, 0.0), 1e-9));
    }

    #[test]
    fn snap_angle_out_of_range_is_rejected() {
        let mut controller = GLOBAL_CONFIG.controller.clone();
        controller.snap_angle = 120.0;
        assert!(matches!(
            controller.validate(),
            Err(RigError::InvalidSettings(_))
        ));
    }

    #[test]
    fn negative_speed_is_rejected() {
        let mut controller = GLOBAL_CONFIG.controller.clone();
        controller.max_stable_move_speed = -1.0;
        assert!(controller.validate().is_err());
    }

    #[test]
    fn zero_tick_is_rejected() {
        let mut sim = GLOBAL_CONFIG.sim.clone();
        sim.tick_ms = 0;
        assert!(sim.validate().is_err());
    }
}
