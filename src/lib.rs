//! # Airlift
//!
//! Publish over-the-air updates for Expo and React Native apps.
//!
//! The CLI exports the app's JavaScript bundles and assets with the
//! project's own toolchain, describes every file with its size and MD5,
//! streams the files to pre-signed storage URLs, and commits the update on
//! the server.
//!
//! ## Usage
//!
//! ```bash
//! airlift init                     # Connect the project to an update server
//! airlift update -m "Fix login"    # Export and publish a new update
//! airlift list                     # Show published updates
//! airlift rollback <update-id>     # Withdraw a published update
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod metadata;
pub mod publish;
pub mod toolchain;
pub mod upload;

// Re-export main types for public API
pub use api::ApiClient;
pub use cli::Args;
pub use config::Config;
pub use error::{AirliftError, Result};
pub use export::{Exporter, Platform, UpdateMetadata};
pub use publish::{publish_update, PublishOptions};
