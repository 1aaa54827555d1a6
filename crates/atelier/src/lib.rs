//! Atelier - an AI wardrobe assistant.
//!
//! Atelier catalogues clothing photos and asks Google Gemini for styling
//! help: outfit suggestions, shopping analysis, image edits, style videos and
//! live voice consults. Every backend call shares one serialized request lane
//! that spaces calls per traffic class and recovers from quota errors.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use atelier::{AtelierConfig, EnvCredentials, GeminiRestClient, RequestManager, Stylist};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AtelierConfig::load()?;
//! let stylist = Stylist::new(
//!     Arc::new(GeminiRestClient::new()?),
//!     Arc::new(EnvCredentials::new()),
//!     RequestManager::new(&config.throttle),
//!     config.models,
//! );
//!
//! println!("{}", stylist.ask_stylist_deep("Build me a capsule for Lisbon in May.").await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Atelier is organized as a workspace with focused crates:
//!
//! - `atelier_error` - Error types and failure classification
//! - `atelier_core` - Wardrobe domain types and logging setup
//! - `atelier_throttle` - Request lane, cooldowns, retry policy, configuration
//! - `atelier_models` - Gemini transport, stylist operations, live consults
//!
//! This crate (`atelier`) re-exports everything for convenience and ships the
//! `atelier` command-line tool.

pub use atelier_core::*;
pub use atelier_error::*;
pub use atelier_models::*;
pub use atelier_throttle::*;
