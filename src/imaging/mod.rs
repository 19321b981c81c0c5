/// Image decoding and proportional resizing for display

pub mod resize;

pub use resize::{prepare, Dimensions, PreparedImage};
