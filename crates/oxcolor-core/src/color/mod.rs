//! Color primitives: XYZ values, white points and color temperature

pub mod temperature;
pub mod white_point;
pub mod xyz;

pub use temperature::correlated_color_temperature;
pub use white_point::WhitePoint;
pub use xyz::Xyz;
