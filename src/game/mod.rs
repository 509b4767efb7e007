pub mod types;
pub mod utils;
pub mod state;
pub mod events;
pub mod game_loop;

pub mod ai;
pub mod entities;
pub mod grid;
pub mod systems;

pub use events::*;
pub use game_loop::*;
pub use state::*;
