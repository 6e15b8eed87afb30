//! AI systems (strategic layer logic)

pub mod behavior;
pub mod navigation;

// Re-export all systems
pub use behavior::*;
pub use navigation::*;
