//! Shared vaultlens data models consumed by the core library and service crates.

pub mod diff;
pub mod line;
pub mod region;

pub use diff::*;
pub use line::*;
pub use region::*;
