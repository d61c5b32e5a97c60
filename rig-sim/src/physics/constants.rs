pub const FLOOR_HEIGHT: f64 = 0.0;

// feet closer than this to the floor count as standing on it
pub const GROUNDING_DISTANCE: f64 = 0.001;

// a capsule is always at least this much taller than its diameter
pub const CAPSULE_HEIGHT_PADDING: f64 = 0.01;
