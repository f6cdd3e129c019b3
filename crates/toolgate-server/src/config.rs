//! Command-line and environment configuration.
//!
//! Everything the server needs is read once at startup into [`Cli`], turned
//! into an immutable [`SandboxConfig`] plus provider tokens, and injected into
//! the providers. Nothing reads the environment after that.

use crate::Dispatcher;
use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use toolgate_core::{Error, Result, SandboxConfig};
use toolgate_files::FilesystemProvider;
use toolgate_remote::{FigmaProvider, GithubProvider};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Sandboxed filesystem, GitHub and Figma tools over MCP.
///
/// Serves the MCP protocol on stdio. Logs go to stderr.
#[derive(Parser)]
#[command(name = "toolgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root every filesystem path is confined to (default: current directory)
    #[arg(long, env = "TOOLGATE_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Additional directory name to block (repeatable)
    #[arg(long = "blocked-dir", value_name = "NAME", num_args = 1)]
    pub blocked_dirs: Vec<String>,

    /// Additional file extension to allow (repeatable)
    #[arg(long = "allow-ext", value_name = "EXT", num_args = 1)]
    pub allowed_extensions: Vec<String>,

    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Figma personal access token
    #[arg(long, env = "FIGMA_ACCESS_TOKEN", hide_env_values = true)]
    pub figma_token: Option<String>,

    /// Log output format
    #[arg(long, env = "TOOLGATE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Cli")
            .field("root", &self.root)
            .field("blocked_dirs", &self.blocked_dirs)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("github_token", &redact(&self.github_token))
            .field("figma_token", &redact(&self.figma_token))
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Cli {
    /// Builds the sandbox configuration.
    ///
    /// Blocked names and extensions given on the command line extend the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the root cannot be determined or
    /// fails validation.
    pub fn sandbox_config(&self) -> Result<SandboxConfig> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().map_err(|e| Error::ConfigError {
                message: format!("cannot determine current directory: {e}"),
            })?,
        };

        let builder = self
            .blocked_dirs
            .iter()
            .fold(SandboxConfig::builder().root(root), |builder, name| {
                builder.block_dir(name.trim())
            });
        self.allowed_extensions
            .iter()
            .fold(builder, |builder, ext| builder.allow_extension(ext))
            .build()
    }

    /// Builds the dispatcher with the filesystem, GitHub and Figma providers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the sandbox or a provider cannot be
    /// configured.
    pub fn dispatcher(&self) -> Result<Dispatcher> {
        let sandbox = Arc::new(self.sandbox_config()?);
        tracing::info!(root = %sandbox.root().display(), "project root");

        let github = GithubProvider::new(secret(self.github_token.as_deref()))?;
        let figma = FigmaProvider::new(secret(self.figma_token.as_deref()))?;

        Ok(Dispatcher::builder()
            .register(Arc::new(FilesystemProvider::new(sandbox)))
            .register(Arc::new(github))
            .register(Arc::new(figma))
            .build())
    }
}

/// Wraps a token, treating a blank value as absent.
fn secret(token: Option<&str>) -> Option<SecretString> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.to_string()))
}
