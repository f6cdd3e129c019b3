//! Figma REST API provider.

use crate::client::{ApiClient, AuthScheme};
use crate::require_segment;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use toolgate_core::traits::{Provider, RouteTable};
use toolgate_core::{Error, Method, ProviderName, Result, RouteKey, parse_args};

/// Public Figma API endpoint.
pub const FIGMA_API_URL: &str = "https://api.figma.com/v1";

/// Environment variable holding the personal access token.
pub const FIGMA_TOKEN_ENV: &str = "FIGMA_ACCESS_TOKEN";

const IMAGE_FORMATS: &[&str] = &["png", "jpg", "svg", "pdf"];

/// Operations of the Figma provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigmaRoute {
    /// `GET:/me`
    Me,
    /// `POST:/file`
    File,
    /// `POST:/nodes`
    Nodes,
    /// `POST:/images`
    Images,
    /// `POST:/comments`
    Comments,
    /// `POST:/comments/create`
    CreateComment,
    /// `POST:/projects`
    Projects,
    /// `POST:/components`
    Components,
}

impl RouteTable for FigmaRoute {
    const ALL: &'static [Self] = &[
        Self::Me,
        Self::File,
        Self::Nodes,
        Self::Images,
        Self::Comments,
        Self::CreateComment,
        Self::Projects,
        Self::Components,
    ];

    fn spec(self) -> &'static [(Method, &'static str)] {
        match self {
            Self::Me => &[(Method::Get, "/me")],
            Self::File => &[(Method::Post, "/file")],
            Self::Nodes => &[(Method::Post, "/nodes")],
            Self::Images => &[(Method::Post, "/images")],
            Self::Comments => &[(Method::Post, "/comments")],
            Self::CreateComment => &[(Method::Post, "/comments/create")],
            Self::Projects => &[(Method::Post, "/projects")],
            Self::Components => &[(Method::Post, "/components")],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileArgs {
    #[serde(alias = "file_key")]
    file_key: String,
    #[serde(default)]
    depth: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodesArgs {
    #[serde(alias = "file_key")]
    file_key: String,
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagesArgs {
    #[serde(alias = "file_key")]
    file_key: String,
    ids: Vec<String>,
    #[serde(default = "png")]
    format: String,
    #[serde(default)]
    scale: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileKeyArgs {
    #[serde(alias = "file_key")]
    file_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentArgs {
    #[serde(alias = "file_key")]
    file_key: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsArgs {
    #[serde(alias = "team_id")]
    team_id: String,
}

fn png() -> String {
    "png".to_string()
}

/// Joins node ids for the `ids` query parameter.
fn node_ids(ids: &[String]) -> Result<String> {
    if ids.is_empty() || ids.iter().any(|id| id.trim().is_empty()) {
        return Err(Error::InvalidArgument(
            "ids must list at least one non-empty node id".to_string(),
        ));
    }
    Ok(ids.join(","))
}

/// Provider for the Figma REST API.
#[derive(Debug)]
pub struct FigmaProvider {
    name: ProviderName,
    client: ApiClient,
}

impl FigmaProvider {
    /// Name the provider registers under.
    pub const NAME: &'static str = "figma";

    /// Creates a provider against the public Figma API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn new(token: Option<SecretString>) -> Result<Self> {
        Self::with_base_url(token, FIGMA_API_URL)
    }

    /// Creates a provider against another API endpoint.
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
            FIGMA_TOKEN_ENV,
            AuthScheme::Header("X-Figma-Token"),
        )?;
        Ok(Self { name, client })
    }

    async fn dispatch(&self, route: FigmaRoute, body: Value) -> Result<Value> {
        match route {
            FigmaRoute::Me => {
                let user = self.client.get(&["me"], &[]).await?;
                let handle = user["handle"].as_str().unwrap_or("unknown");
                Ok(json!({ "message": format!("Authenticated as {handle}"), "user": user }))
            }
            FigmaRoute::File => {
                let args: FileArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                let query: Vec<_> = args.depth.map(|d| ("depth", d.to_string())).into_iter().collect();
                let file = self.client.get(&["files", key], &query).await?;
                let name = file["name"].as_str().unwrap_or(key);
                Ok(json!({ "message": format!("Fetched file {name}"), "file": file }))
            }
            FigmaRoute::Nodes => {
                let args: NodesArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                let ids = node_ids(&args.ids)?;
                let nodes = self
                    .client
                    .get(&["files", key, "nodes"], &[("ids", ids)])
                    .await?;
                Ok(json!({
                    "message": format!("Fetched {} nodes", args.ids.len()),
                    "nodes": nodes["nodes"],
                }))
            }
            FigmaRoute::Images => {
                let args: ImagesArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                let ids = node_ids(&args.ids)?;
                let format = args.format.to_ascii_lowercase();
                if !IMAGE_FORMATS.contains(&format.as_str()) {
                    return Err(Error::InvalidArgument(format!(
                        "format must be one of {}, got '{format}'",
                        IMAGE_FORMATS.join(", ")
                    )));
                }
                let mut query = vec![("ids", ids), ("format", format)];
                if let Some(scale) = args.scale {
                    if !(0.01..=4.0).contains(&scale) {
                        return Err(Error::InvalidArgument(
                            "scale must be between 0.01 and 4".to_string(),
                        ));
                    }
                    query.push(("scale", scale.to_string()));
                }
                let images = self.client.get(&["images", key], &query).await?;
                Ok(json!({
                    "message": format!("Rendered {} images", args.ids.len()),
                    "images": images["images"],
                }))
            }
            FigmaRoute::Comments => {
                let args: FileKeyArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                let comments = self.client.get(&["files", key, "comments"], &[]).await?;
                Ok(collection("comments", &comments["comments"]))
            }
            FigmaRoute::CreateComment => {
                let args: CreateCommentArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                if args.message.trim().is_empty() {
                    return Err(Error::InvalidArgument("message must not be empty".to_string()));
                }
                let comment = self
                    .client
                    .post(&["files", key, "comments"], &json!({ "message": args.message }))
                    .await?;
                tracing::info!(provider = %self.name, file = key, "comment created");
                Ok(json!({ "message": format!("Comment posted on {key}"), "comment": comment }))
            }
            FigmaRoute::Projects => {
                let args: ProjectsArgs = parse_args(body)?;
                let team = require_segment("teamId", &args.team_id)?;
                let projects = self.client.get(&["teams", team, "projects"], &[]).await?;
                Ok(collection("projects", &projects["projects"]))
            }
            FigmaRoute::Components => {
                let args: FileKeyArgs = parse_args(body)?;
                let key = require_segment("fileKey", &args.file_key)?;
                let components = self.client.get(&["files", key, "components"], &[]).await?;
                Ok(collection("components", &components["meta"]["components"]))
            }
        }
    }
}

#[async_trait]
impl Provider for FigmaProvider {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    async fn handle_request(&self, route: &RouteKey, body: Value) -> Result<Value> {
        let resolved =
            FigmaRoute::resolve(route).ok_or_else(|| route.not_found(self.name.as_str()))?;
        tracing::debug!(provider = %self.name, %route, "handling request");
        self.dispatch(resolved, body).await
    }

    fn is_healthy(&self) -> bool {
        self.client.has_token()
    }

    fn routes(&self) -> Vec<RouteKey> {
        FigmaRoute::keys()
    }
}

fn collection(key: &str, items: &Value) -> Value {
    let items = if items.is_null() { json!([]) } else { items.clone() };
    let count = items.as_array().map_or(0, Vec::len);
    json!({ "message": format!("Found {count} {key}"), key: items, "count": count })
}
