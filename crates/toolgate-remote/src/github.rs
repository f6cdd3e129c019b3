//! GitHub REST API provider.

use crate::client::{ApiClient, AuthScheme};
use crate::require_segment;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use toolgate_core::traits::{Provider, RouteTable};
use toolgate_core::{Error, Method, ProviderName, Result, RouteKey, parse_args};

/// Public GitHub API endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable holding the access token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_PER_PAGE: u8 = 30;

/// Operations of the GitHub provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GithubRoute {
    /// `GET:/user`
    User,
    /// `GET:/repos`
    Repos,
    /// `POST:/repo`
    Repo,
    /// `POST:/issues`
    Issues,
    /// `POST:/issues/create`
    CreateIssue,
    /// `POST:/pulls`
    Pulls,
    /// `POST:/contents`
    Contents,
    /// `POST:/commits`
    Commits,
}

impl RouteTable for GithubRoute {
    const ALL: &'static [Self] = &[
        Self::User,
        Self::Repos,
        Self::Repo,
        Self::Issues,
        Self::CreateIssue,
        Self::Pulls,
        Self::Contents,
        Self::Commits,
    ];

    fn spec(self) -> &'static [(Method, &'static str)] {
        match self {
            Self::User => &[(Method::Get, "/user")],
            Self::Repos => &[(Method::Get, "/repos")],
            Self::Repo => &[(Method::Post, "/repo")],
            Self::Issues => &[(Method::Post, "/issues")],
            Self::CreateIssue => &[(Method::Post, "/issues/create")],
            Self::Pulls => &[(Method::Post, "/pulls")],
            Self::Contents => &[(Method::Post, "/contents")],
            Self::Commits => &[(Method::Post, "/commits")],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepoArgs {
    owner: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    owner: String,
    repo: String,
    #[serde(default = "open_state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct CreateIssueArgs {
    owner: String,
    repo: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsArgs {
    owner: String,
    repo: String,
    path: String,
    #[serde(default, rename = "ref")]
    git_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitsArgs {
    owner: String,
    repo: String,
    #[serde(default = "default_per_page", alias = "perPage")]
    per_page: u8,
}

fn open_state() -> String {
    "open".to_string()
}

const fn default_per_page() -> u8 {
    DEFAULT_PER_PAGE
}

fn check_state(state: &str) -> Result<()> {
    if matches!(state, "open" | "closed" | "all") {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "state must be open, closed or all, got '{state}'"
        )))
    }
}

/// Provider for the GitHub REST API.
///
/// Without a token the provider still registers but reports unhealthy and
/// answers every call with `ProviderUnavailable`.
#[derive(Debug)]
pub struct GithubProvider {
    name: ProviderName,
    client: ApiClient,
}

impl GithubProvider {
    /// Name the provider registers under.
    pub const NAME: &'static str = "github";

    /// Creates a provider against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn new(token: Option<SecretString>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Creates a provider against another API endpoint, such as GitHub
    /// Enterprise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_base_url(token: Option<SecretString>, base_url: &str) -> Result<Self> {
        let name = ProviderName::new(Self::NAME);
        let client = ApiClient::new(
            name.clone(),
            base_url,
            token,
            GITHUB_TOKEN_ENV,
            AuthScheme::Bearer,
        )?;
        Ok(Self { name, client })
    }

    async fn dispatch(&self, route: GithubRoute, body: Value) -> Result<Value> {
        match route {
            GithubRoute::User => {
                let user = self.client.get(&["user"], &[]).await?;
                let login = user["login"].as_str().unwrap_or("unknown");
                Ok(json!({ "message": format!("Authenticated as {login}"), "user": user }))
            }
            GithubRoute::Repos => {
                let query = [("per_page", "100".to_string()), ("sort", "updated".to_string())];
                let repos = self.client.get(&["user", "repos"], &query).await?;
                Ok(listing("repositories", repos))
            }
            GithubRoute::Repo => {
                let args: RepoArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                let repository = self.client.get(&["repos", owner, repo], &[]).await?;
                Ok(json!({
                    "message": format!("Fetched {owner}/{repo}"),
                    "repository": repository,
                }))
            }
            GithubRoute::Issues => {
                let args: ListArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                check_state(&args.state)?;
                let issues = self
                    .client
                    .get(&["repos", owner, repo, "issues"], &[("state", args.state)])
                    .await?;
                Ok(listing("issues", issues))
            }
            GithubRoute::CreateIssue => {
                let args: CreateIssueArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                if args.title.trim().is_empty() {
                    return Err(Error::InvalidArgument("title must not be empty".to_string()));
                }
                let payload = json!({
                    "title": args.title,
                    "body": args.body,
                    "labels": args.labels,
                });
                let issue = self
                    .client
                    .post(&["repos", owner, repo, "issues"], &payload)
                    .await?;
                tracing::info!(provider = %self.name, owner, repo, number = %issue["number"], "issue created");
                Ok(json!({
                    "message": format!("Created issue #{} in {owner}/{repo}", issue["number"]),
                    "issue": issue,
                }))
            }
            GithubRoute::Pulls => {
                let args: ListArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                check_state(&args.state)?;
                let pulls = self
                    .client
                    .get(&["repos", owner, repo, "pulls"], &[("state", args.state)])
                    .await?;
                Ok(listing("pullRequests", pulls))
            }
            GithubRoute::Contents => {
                let args: ContentsArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                let mut segments = vec!["repos", owner, repo, "contents"];
                segments.extend(content_path(&args.path)?);
                let query: Vec<_> = args.git_ref.into_iter().map(|r| ("ref", r)).collect();
                let contents = self.client.get(&segments, &query).await?;
                Ok(decode_contents(&args.path, contents))
            }
            GithubRoute::Commits => {
                let args: CommitsArgs = parse_args(body)?;
                let (owner, repo) = repo_segments(&args.owner, &args.repo)?;
                if !(1..=100).contains(&args.per_page) {
                    return Err(Error::InvalidArgument(
                        "per_page must be between 1 and 100".to_string(),
                    ));
                }
                let commits = self
                    .client
                    .get(
                        &["repos", owner, repo, "commits"],
                        &[("per_page", args.per_page.to_string())],
                    )
                    .await?;
                Ok(listing("commits", commits))
            }
        }
    }
}

#[async_trait]
impl Provider for GithubProvider {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    async fn handle_request(&self, route: &RouteKey, body: Value) -> Result<Value> {
        let resolved =
            GithubRoute::resolve(route).ok_or_else(|| route.not_found(self.name.as_str()))?;
        tracing::debug!(provider = %self.name, %route, "handling request");
        self.dispatch(resolved, body).await
    }

    fn is_healthy(&self) -> bool {
        self.client.has_token()
    }

    fn routes(&self) -> Vec<RouteKey> {
        GithubRoute::keys()
    }
}

fn repo_segments<'a>(owner: &'a str, repo: &'a str) -> Result<(&'a str, &'a str)> {
    Ok((require_segment("owner", owner)?, require_segment("repo", repo)?))
}

/// Splits a repository file path into URL segments.
fn content_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(Error::InvalidArgument(format!(
            "path must not contain relative segments: {path}"
        )));
    }
    Ok(segments)
}

fn listing(key: &str, items: Value) -> Value {
    let count = items.as_array().map_or(0, Vec::len);
    json!({ "message": format!("Found {count} {key}"), key: items, "count": count })
}

/// Decodes base64 file content; directory listings pass through.
fn decode_contents(path: &str, contents: Value) -> Value {
    if let Some(entries) = contents.as_array() {
        let count = entries.len();
        return json!({
            "message": format!("Found {count} entries in {path}"),
            "entries": contents,
        });
    }

    let encoded = contents["content"].as_str().unwrap_or_default();
    let is_base64 = contents["encoding"].as_str() == Some("base64");
    let decoded = is_base64
        .then(|| {
            let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
            BASE64.decode(compact).ok()
        })
        .flatten()
        .and_then(|bytes| String::from_utf8(bytes).ok());

    match decoded {
        Some(text) => json!({
            "message": format!("Read {path} ({} bytes)", text.len()),
            "path": contents["path"],
            "sha": contents["sha"],
            "size": contents["size"],
            "content": text,
        }),
        None => json!({
            "message": format!("{path} is not UTF-8 text; returning raw metadata"),
            "path": contents["path"],
            "sha": contents["sha"],
            "size": contents["size"],
            "encoding": contents["encoding"],
            "content": encoded,
        }),
    }
}
