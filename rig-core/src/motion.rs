use glam::DVec3;
use serde::Serialize;

use crate::constants::FLOAT_ROUNDING_PRECISION;
use crate::math::{is_negligible, project_on_plane, round_to_precision};

// The three lateral displacements of one tick: what the capsule actually did,
// how far the headset wandered from the character, and how far the player
// asked to move with the stick
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct MotionSample {
    pub character: DVec3,
    pub headset: DVec3,
    pub velocity_input: DVec3,
}

impl MotionSample {
    // flattens all three displacements onto the plane orthogonal to up
    pub fn lateral(
        character: DVec3,
        headset: DVec3,
        velocity_input: DVec3,
        up: DVec3,
    ) -> MotionSample {
        MotionSample {
            character: project_on_plane(character, up),
            headset: project_on_plane(headset, up),
            velocity_input: project_on_plane(velocity_input, up),
        }
    }
}

// Which motion the reference direction was taken from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ReferenceSource {
    Character,
    Headset,
    VelocityInput,
    // nothing moved; every projection is zero
    Undefined,
}

// A motion split into its part along the reference direction and its part
// along the lateral axis orthogonal to it
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProjectedMotion {
    pub collinear_dot: f64,
    pub collinear: DVec3,
    pub collinear_magnitude: f64, // rounded
    // faces the same way as the reference direction (within tolerance)
    pub codirectional: bool,

    pub orthogonal_dot: f64,
    pub orthogonal: DVec3,
    pub orthogonal_magnitude: f64, // rounded
}

impl ProjectedMotion {
    fn project(motion: DVec3, reference: DVec3, orthogonal_axis: DVec3) -> ProjectedMotion {
        let collinear_dot = motion.dot(reference);
        let orthogonal_dot = motion.dot(orthogonal_axis);

        ProjectedMotion {
            collinear_dot,
            collinear: reference * collinear_dot,
            collinear_magnitude: round_to_precision(collinear_dot.abs()),
            codirectional: is_codirectional(collinear_dot),

            orthogonal_dot,
            orthogonal: orthogonal_axis * orthogonal_dot,
            orthogonal_magnitude: round_to_precision(orthogonal_dot.abs()),
        }
    }
}

// Ties and tiny negative projections count as pointing the same way
pub fn is_codirectional(dot: f64) -> bool {
    dot > -FLOAT_ROUNDING_PRECISION
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ClassifiedMotion {
    pub up: DVec3,
    pub source: ReferenceSource,
    pub reference: DVec3, // unit length, or zero when undefined
    pub orthogonal_axis: DVec3,

    pub character: DVec3,
    pub character_magnitude: f64, // rounded

    pub headset: ProjectedMotion,
    pub velocity_input: ProjectedMotion,
}

pub fn select_reference(sample: &MotionSample) -> (ReferenceSource, DVec3) {
    if !is_negligible(sample.character) {
        (ReferenceSource::Character, sample.character.normalize())
    } else if !is_negligible(sample.headset) {
        // the capsule didn't move; project against the headset instead so the
        // other motions still have something to be measured along
        (ReferenceSource::Headset, sample.headset.normalize())
    } else if !is_negligible(sample.velocity_input) {
        (ReferenceSource::VelocityInput, sample.velocity_input.normalize())
    } else {
        (ReferenceSource::Undefined, DVec3::ZERO)
    }
}

pub fn classify(sample: &MotionSample, up: DVec3) -> ClassifiedMotion {
    let (source, reference) = select_reference(sample);
    let orthogonal_axis = reference.cross(up).normalize_or_zero();

    ClassifiedMotion {
        up,
        source,
        reference,
        orthogonal_axis,
        character: sample.character,
        character_magnitude: round_to_precision(sample.character.length()),
        headset: ProjectedMotion::project(sample.headset, reference, orthogonal_axis),
        velocity_input: ProjectedMotion::project(sample.velocity_input, reference, orthogonal_axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(character: DVec3, headset: DVec3, velocity_input: DVec3) -> MotionSample {
        MotionSample::lateral(character, headset, velocity_input, DVec3::Y)
    }

    #[test]
    fn reference_prefers_character_motion() {
        let classified = classify(
            &sample(DVec3::X, DVec3::new(0.5, 0.0, 0.2), DVec3::Z * 0.1),
            DVec3::Y,
        );
        assert_eq!(classified.source, ReferenceSource::Character);
        assert!(classified.reference.abs_diff_eq(DVec3::X, 1e-12));
        assert_eq!(classified.character_magnitude, 1.0);

        assert!(classified.headset.codirectional);
        assert_eq!(classified.headset.collinear_magnitude, 0.5);
        assert!(classified.headset.collinear.abs_diff_eq(DVec3::X * 0.5, 1e-12));
        assert_eq!(classified.headset.orthogonal_magnitude, 0.2);
        // collinear and orthogonal parts put the motion back together
        assert!((classified.headset.collinear + classified.headset.orthogonal)
            .abs_diff_eq(DVec3::new(0.5, 0.0, 0.2), 1e-12));

        assert_eq!(classified.velocity_input.collinear_magnitude, 0.0);
        assert_eq!(classified.velocity_input.orthogonal_magnitude, 0.1);
    }

    #[test]
    fn reference_falls_back_to_headset_then_input() {
        let headset_only = classify(&sample(DVec3::ZERO, -DVec3::Z, DVec3::X), DVec3::Y);
        assert_eq!(headset_only.source, ReferenceSource::Headset);
        assert!(headset_only.reference.abs_diff_eq(-DVec3::Z, 1e-12));

        let input_only = classify(&sample(DVec3::ZERO, DVec3::ZERO, DVec3::X * 0.3), DVec3::Y);
        assert_eq!(input_only.source, ReferenceSource::VelocityInput);
        assert!(input_only.velocity_input.codirectional);
        assert_eq!(input_only.velocity_input.collinear_magnitude, 0.3);
        assert_eq!(input_only.headset.collinear_magnitude, 0.0);
    }

    #[test]
    fn undefined_reference_zeroes_everything() {
        let classified = classify(
            &sample(DVec3::splat(1e-6), DVec3::ZERO, DVec3::ZERO),
            DVec3::Y,
        );
        assert_eq!(classified.source, ReferenceSource::Undefined);
        assert_eq!(classified.reference, DVec3::ZERO);
        assert_eq!(
            classified.headset,
            ProjectedMotion::project(DVec3::ZERO, DVec3::ZERO, DVec3::ZERO)
        );
        assert!(classified.headset.codirectional);
    }

    #[test]
    fn opposite_motion_is_counter_directional() {
        let classified = classify(&sample(DVec3::X, -DVec3::X * 0.4, DVec3::ZERO), DVec3::Y);
        assert!(!classified.headset.codirectional);
        assert_eq!(classified.headset.collinear_magnitude, 0.4);
        // a hair behind zero is still treated as the same direction
        assert!(is_codirectional(-FLOAT_ROUNDING_PRECISION / 2.0));
    }

    #[test]
    fn vertical_motion_is_ignored() {
        let classified = classify(
            &sample(DVec3::new(0.0, 3.0, 0.0), DVec3::new(0.0, -1.0, 0.0), DVec3::ZERO),
            DVec3::Y,
        );
        assert_eq!(classified.source, ReferenceSource::Undefined);
        assert_eq!(classified.character_magnitude, 0.0);
    }

    #[test]
    fn magnitudes_are_rounded() {
        let classified = classify(
            &sample(DVec3::X * 0.500_000_3, DVec3::X * 0.499_999_8, DVec3::ZERO),
            DVec3::Y,
        );
        assert_eq!(
            classified.character_magnitude,
            classified.headset.collinear_magnitude
        );
    }
}
