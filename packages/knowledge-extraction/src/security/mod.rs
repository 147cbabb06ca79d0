//! Credential handling and SSRF protection.

pub mod credentials;
pub mod validator;

pub use credentials::{SearchCredentials, SecretString};
pub use validator::UrlValidator;
