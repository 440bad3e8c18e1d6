//! Request flow orchestration.

pub mod driver;
