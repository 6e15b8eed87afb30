//! AI components

pub mod animation;
pub mod behavior;


// Re-export all components
pub use animation::*;
pub use behavior::*;
