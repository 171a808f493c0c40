//! ECS components and world-level resources

pub mod clock;
pub mod individual;
pub mod town;

pub use clock::*;
pub use individual::*;
pub use town::*;
