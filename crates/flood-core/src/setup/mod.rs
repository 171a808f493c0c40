//! World Setup
//!
//! Town layout and population generation.

pub mod population;
pub mod town;

pub use population::*;
pub use town::*;
