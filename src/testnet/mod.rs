//! Test fixtures shared by the unit tests

pub mod test_utils;

pub use test_utils::*;
