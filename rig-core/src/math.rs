use glam::{DMat3, DQuat, DVec3};

use crate::constants::{FLOAT_ROUNDING_MULTIPLIER, ZERO_SQUARE};

// Rounds to FLOAT_ROUNDING_PRECISION; used on every magnitude before it is
// compared against another
pub fn round_to_precision(x: f64) -> f64 {
    (x * FLOAT_ROUNDING_MULTIPLIER).round() / FLOAT_ROUNDING_MULTIPLIER
}

pub fn is_negligible(v: DVec3) -> bool {
    v.length_squared() <= ZERO_SQUARE
}

// Removes the component of v along normal (normal doesn't need to be unit length)
pub fn project_on_plane(v: DVec3, normal: DVec3) -> DVec3 {
    let normal_length_squared = normal.length_squared();
    if normal_length_squared < f64::EPSILON {
        return v;
    }
    v - normal * (v.dot(normal) / normal_length_squared)
}

pub fn clamp_magnitude(v: DVec3, max_length: f64) -> DVec3 {
    let length_squared = v.length_squared();
    if length_squared > max_length * max_length {
        v * (max_length / length_squared.sqrt())
    } else {
        v
    }
}

// Rotation whose local +Z points along forward and whose local +Y is as close
// to up as possible
pub fn look_rotation(forward: DVec3, up: DVec3) -> DQuat {
    let forward = forward.normalize_or_zero();
    if forward == DVec3::ZERO {
        return DQuat::IDENTITY;
    }

    let mut right = up.cross(forward);
    if right.length_squared() <= ZERO_SQUARE {
        // looking straight along up: any axis orthogonal to forward will do
        let fallback = if forward.x.abs() < 0.9 { DVec3::X } else { DVec3::Z };
        right = fallback.cross(forward);
    }
    let right = right.normalize();
    let true_up = forward.cross(right);

    DQuat::from_mat3(&DMat3::from_cols(right, true_up, forward)).normalize()
}

// Shortest rotation taking direction `from` onto direction `to`
pub fn from_to_rotation(from: DVec3, to: DVec3) -> DQuat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == DVec3::ZERO || to == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    DQuat::from_rotation_arc(from, to)
}

#[derive(Copy, Clone, Debug)]
pub struct Plane {
    pub normal: DVec3, // normalized on construction
    pub point: DVec3,
}

impl Plane {
    pub fn new(normal: DVec3, point: DVec3) -> Plane {
        Plane {
            normal: normal.normalize_or_zero(),
            point,
        }
    }

    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        (point - self.point).dot(self.normal)
    }

    pub fn closest_point(&self, point: DVec3) -> DVec3 {
        point - self.normal * self.distance_to_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_snaps_noise_away() {
        assert_eq!(round_to_precision(0.500_000_1), round_to_precision(0.5));
        assert_eq!(round_to_precision(0.123_456_7), 0.12346);
        assert_eq!(round_to_precision(-0.000_001), -0.0);
    }

    #[test]
    fn rounding_lands_on_the_grid() {
        assert_eq!(round_to_precision(1.0), 1.0);
        assert_eq!(round_to_precision(0.3), 0.3);
        assert_eq!(round_to_precision(0.1 + 0.2), 0.3);
        assert_eq!(round_to_precision(2.5), 2.5);
    }

    #[test]
    fn project_on_plane_drops_normal_component() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert!(project_on_plane(v, DVec3::Y).abs_diff_eq(DVec3::new(1.0, 0.0, 3.0), 1e-12));
        // non-unit normals behave the same as unit ones
        assert!(project_on_plane(v, DVec3::Y * 5.0)
            .abs_diff_eq(DVec3::new(1.0, 0.0, 3.0), 1e-12));
        assert_eq!(project_on_plane(v, DVec3::ZERO), v);
    }

    #[test]
    fn clamp_magnitude_only_shrinks() {
        let v = DVec3::new(3.0, 0.0, 4.0);
        assert!(clamp_magnitude(v, 1.0).abs_diff_eq(DVec3::new(0.6, 0.0, 0.8), 1e-12));
        assert_eq!(clamp_magnitude(v, 10.0), v);
        assert_eq!(clamp_magnitude(v, f64::INFINITY), v);
    }

    #[test]
    fn look_rotation_points_forward_along_z() {
        let forward = DVec3::new(1.0, 0.0, 1.0).normalize();
        let rotation = look_rotation(forward, DVec3::Y);
        assert!((rotation * DVec3::Z).abs_diff_eq(forward, 1e-9));
        assert!((rotation * DVec3::Y).abs_diff_eq(DVec3::Y, 1e-9));

        // degenerate: forward parallel to up still gives a valid rotation
        let straight_up = look_rotation(DVec3::Y, DVec3::Y);
        assert!((straight_up * DVec3::Z).abs_diff_eq(DVec3::Y, 1e-9));
    }

    #[test]
    fn from_to_rotation_aligns_directions() {
        let rotation = from_to_rotation(DVec3::X, DVec3::Y * 2.0);
        assert!((rotation * DVec3::X).abs_diff_eq(DVec3::Y, 1e-9));
        assert_eq!(from_to_rotation(DVec3::ZERO, DVec3::Y), DQuat::IDENTITY);
    }

    #[test]
    fn plane_distance_and_projection() {
        let floor = Plane::new(DVec3::Y * 3.0, DVec3::new(0.0, 1.0, 0.0));
        let head = DVec3::new(2.0, 2.7, -1.0);
        assert!((floor.distance_to_point(head) - 1.7).abs() < 1e-12);
        assert!(floor
            .closest_point(head)
            .abs_diff_eq(DVec3::new(2.0, 1.0, -1.0), 1e-12));
    }
}
