use rig_core::motor::{ColliderHandle, ColliderId, OwnerId};

use crate::physics::bounding_box::BoundingBox;

// Static box in the scene the character can bump into
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub name: String,
    pub collider: ColliderHandle,
    pub bounds: BoundingBox,
}

impl Obstacle {
    pub fn new(name: &str, id: ColliderId, owners: Vec<OwnerId>, bounds: BoundingBox) -> Obstacle {
        Obstacle {
            name: String::from(name),
            collider: ColliderHandle { id, owners },
            bounds,
        }
    }
}
