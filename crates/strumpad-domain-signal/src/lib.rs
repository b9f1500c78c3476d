pub mod curve;
pub mod decode;

pub use curve::*;
pub use decode::*;
