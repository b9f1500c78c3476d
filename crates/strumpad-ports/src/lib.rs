pub mod config;
pub mod frame;
pub mod midi;
pub mod storage;
pub mod types;

pub use config::*;
pub use frame::*;
pub use midi::*;
pub use storage::*;
pub use types::*;
