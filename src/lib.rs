pub mod auth;
pub mod authorizer;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod controllers;
pub mod error;
pub mod factories;
pub mod platform;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use auth::Credentials;
pub use error::SdkError;
pub use platform::{Platform, PlatformOptions};
pub use types::Position;
