pub mod key;
pub mod model;
pub mod spread;

pub use key::*;
pub use model::*;
pub use spread::*;
