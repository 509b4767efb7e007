pub mod server;
pub mod session;
pub mod messages;
pub mod validation;

pub use server::GameSessionManager;
