//! Domain data types for the drive connector.

pub mod drive;

pub use drive::*;
