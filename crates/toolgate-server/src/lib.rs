//! MCP server dispatching tool calls to toolgate providers.
//!
//! This crate wires the sandboxed filesystem provider and the GitHub and
//! Figma providers behind a single [`Dispatcher`] and exposes it to MCP
//! clients over stdio.
//!
//! # Architecture
//!
//! The server implements two tools:
//!
//! 1. **`call_provider`** - Route `{provider, method, path, body}` to a provider
//! 2. **`provider_health`** - Report which providers are configured
//!
//! Control flow for a call:
//!
//! 1. The dispatcher selects the provider by name
//! 2. The provider resolves `METHOD:/path` to one of its routes
//! 3. The route handler decodes the body and validates paths before any I/O
//! 4. The JSON result, or the provider's error message verbatim, goes back
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use rmcp::ServiceExt;
//! use rmcp::transport::stdio;
//! use toolgate_server::{Cli, ToolgateService};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cli = Cli::parse();
//! let service = ToolgateService::new(cli.dispatcher()?)
//!     .serve(stdio())
//!     .await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod service;
pub mod types;

pub use config::{Cli, LogFormat};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use service::ToolgateService;
pub use types::{CallProviderParams, ProviderHealthParams, ProviderHealthResult};
