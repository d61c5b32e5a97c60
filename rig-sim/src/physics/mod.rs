pub mod bounding_box;
pub mod constants;
pub mod motor;
pub mod obstacle;
