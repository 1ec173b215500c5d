//! Authentication: outbound partner credentials and inbound API keys.

pub mod credentials;
pub mod inbound;
pub mod signature;

pub use credentials::{CredentialManager, Token};
pub use inbound::ApiKeyGuard;
pub use signature::sign;
