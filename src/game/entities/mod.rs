pub mod factory;
pub mod local;
pub mod mailbox;
pub mod player;
pub mod remote;

pub use factory::*;
pub use local::*;
pub use mailbox::*;
pub use player::*;
pub use remote::*;
