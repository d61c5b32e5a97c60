use glam::DVec3;
use rig_core::motor::CapsuleDimensions;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl BoundingBox {
    pub fn from_vecs(min: DVec3, max: DVec3) -> BoundingBox {
        BoundingBox {
            min_x: min.x,
            max_x: max.x,
            min_y: min.y,
            max_y: max.y,
            min_z: min.z,
            max_z: max.z,
        }
    }

    // the box an upright capsule standing at `feet` takes up; the capsule is
    // symmetric around its up axis so yaw doesn't matter
    pub fn around_capsule(feet: DVec3, capsule: &CapsuleDimensions) -> BoundingBox {
        let center = feet + DVec3::Y * capsule.y_offset;
        let half_extents = DVec3::new(capsule.radius, capsule.height / 2.0, capsule.radius);
        BoundingBox::from_vecs(center - half_extents, center + half_extents)
    }

    pub fn pos(&self) -> DVec3 {
        DVec3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    // touching faces don't count, so a capsule can rest flush against a wall
    pub fn is_colliding(&self, other: &BoundingBox) -> bool {
        (self.min_x < other.max_x && self.max_x > other.min_x)
            && (self.min_y < other.max_y && self.max_y > other.min_y)
            && (self.min_z < other.max_z && self.max_z > other.min_z)
    }
}
