use glam::DVec3;
use rig_core::pose::{player_root_pose, Pose};

// The tracked VR rig: a play area placed in the world and a headset that
// wanders around inside it
#[derive(Copy, Clone, Debug)]
pub struct TrackedRig {
    pub play_area: Pose,
    // relative to the play area
    pub local_headset: Pose,
}

impl TrackedRig {
    pub fn new(play_area: Pose, local_headset: Pose) -> TrackedRig {
        TrackedRig {
            play_area,
            local_headset,
        }
    }

    pub fn headset(&self) -> Pose {
        self.play_area.transform(&self.local_headset)
    }

    pub fn player_root(&self) -> Pose {
        player_root_pose(&self.headset(), &self.play_area)
    }

    // Moves the whole play area rigidly so the player root lands on `pose`;
    // the player's position inside the play area doesn't change
    pub fn apply_root_pose(&mut self, pose: Pose) {
        let root = self.player_root();
        let turn = (pose.rotation * root.rotation.inverse()).normalize();

        self.play_area = Pose {
            position: pose.position + turn * (self.play_area.position - root.position),
            rotation: (turn * self.play_area.rotation).normalize(),
        };
    }

    // physically walk (or lean) inside the play area
    pub fn move_headset(&mut self, local_offset: DVec3) {
        self.local_headset.position += local_offset;
    }

    pub fn set_headset_height(&mut self, height: f64) {
        self.local_headset.position.y = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    #[test]
    fn root_pose_is_applied_rigidly() {
        let mut rig = TrackedRig::new(
            Pose::new(DVec3::new(1.0, 0.0, 1.0), DQuat::IDENTITY),
            Pose::new(DVec3::new(0.5, 1.7, 0.0), DQuat::IDENTITY),
        );
        let target = Pose::new(DVec3::new(3.0, 0.2, -1.0), DQuat::from_rotation_y(0.5));
        rig.apply_root_pose(target);

        let root = rig.player_root();
        assert!(root.position.abs_diff_eq(target.position, 1e-9));
        assert!(root.rotation.abs_diff_eq(target.rotation, 1e-9));
        // local tracking is untouched
        assert!(rig.local_headset.position.abs_diff_eq(DVec3::new(0.5, 1.7, 0.0), 1e-12));
    }
}
