// Motion magnitudes are rounded to this precision before any branch decision
// so that floating point noise can't flip the reconciliation case
pub const FLOAT_ROUNDING_PRECISION: f64 = 0.00001;
// exact inverse of the precision; 1.0 / 0.00001 is not exactly 1e5 in f64
pub const FLOAT_ROUNDING_MULTIPLIER: f64 = 100_000.0;

// vectors with a squared magnitude at or below this are considered zero-length
pub const ZERO_SQUARE: f64 = 0.00000001;
