use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::constants::ZERO_SQUARE;
use crate::math::{look_rotation, project_on_plane, Plane};

// A world-space position and rotation: tracked devices, the play area and the
// pose handed back to the player rig after reconciliation
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat, // should be a normalized quaternion
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(position: DVec3, rotation: DQuat) -> Pose {
        Pose { position, rotation }
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    // transform a pose expressed relative to self into world space
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn inverse_transform(&self, world: &Pose) -> Pose {
        let inverse_rotation = self.rotation.inverse();
        Pose {
            position: inverse_rotation * (world.position - self.position),
            rotation: (inverse_rotation * world.rotation).normalize(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

// Where the player "stands": the headset projected onto the play area's floor,
// facing the headset's forward direction flattened onto that floor
pub fn player_root_pose(headset: &Pose, play_area: &Pose) -> Pose {
    let play_area_up = play_area.up();
    let floor = Plane::new(play_area_up, play_area.position);

    let mut facing = project_on_plane(headset.forward(), play_area_up);
    if facing.length_squared() < ZERO_SQUARE {
        // looking straight up or down: the top of the head is the best guess
        facing = project_on_plane(headset.up(), play_area_up);
    }

    Pose {
        position: floor.closest_point(headset.position),
        rotation: look_rotation(facing, play_area_up),
    }
}

// Height of the headset above the play area's floor
pub fn headset_altitude(headset: &Pose, play_area: &Pose) -> f64 {
    Plane::new(play_area.up(), play_area.position).distance_to_point(headset.position)
}
