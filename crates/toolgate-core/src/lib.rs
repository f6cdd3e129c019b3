//! Core types, traits, and errors for toolgate.
//!
//! This crate provides the foundational types and abstractions shared by the
//! providers and the dispatch server.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`ProviderName`, `Method`, `RouteKey`, `ToolRequest`)
//! - Error taxonomy shared by every provider
//! - The `Provider` and `RouteTable` traits
//! - Immutable sandbox configuration for local filesystem access

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod args;
mod config;
mod error;
mod types;

pub mod traits;

pub use args::parse_args;
pub use config::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_BLOCKED_DIRS, SandboxConfig, SandboxConfigBuilder,
};
pub use error::{Error, Result};
pub use types::{Method, ProviderName, RouteKey, ToolRequest};
