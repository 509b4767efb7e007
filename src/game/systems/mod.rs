pub mod movement;
pub mod rules;

pub use movement::*;
pub use rules::*;
