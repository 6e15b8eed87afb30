//! Combat systems (strategic layer logic)

pub mod attack;
pub mod health;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod health_tests;

// Re-export all systems
pub use attack::*;
pub use health::*;
