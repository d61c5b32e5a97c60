pub mod avatar;
pub mod constants;
pub mod controller;
pub mod error;
pub mod hook;
pub mod math;
pub mod motion;
pub mod motor;
pub mod player_inputs;
pub mod pose;
pub mod reconciliation;
pub mod settings;
pub mod snap_rotation;
pub mod vertical;

pub use error::RigError;
pub use settings::GLOBAL_CONFIG;
