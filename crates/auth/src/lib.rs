pub mod cognito;
pub mod demo;
pub mod gateway;
pub mod memory;
pub mod session;
pub mod store;

pub use cognito::CognitoIdentityStore;
pub use demo::DemoAccount;
pub use gateway::AuthGateway;
pub use memory::MemoryIdentityStore;
pub use session::{Session, SessionContext};
pub use store::IdentityStore;
