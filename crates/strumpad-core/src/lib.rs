pub mod actions;
pub mod engine;
pub mod events;
pub mod snapshot;
pub mod strummer;

pub use actions::*;
pub use engine::*;
pub use events::*;
pub use snapshot::*;
pub use strummer::*;
