//! A thin client for the parts of the Slack Web API that receiverd uses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Page size used when listing joined conversations.
const CONVERSATIONS_PAGE_LIMIT: u32 = 200;

#[derive(Error, Debug)]
pub enum SlackApiError {
    /// A Slack error code, e.g. `users_not_found`.
    #[error("{0}")]
    Api(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// A channel the app has joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackChannel {
    pub id: String,
    pub name: String,
}

/// Where and when a message was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// The result of an OAuth code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    pub access_token: String,
    pub workspace: String,
}

/// Slack operations bound to one bot token.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Returns the user id for an email address.
    async fn lookup_user_by_email(&self, email: &str) -> Result<String, SlackApiError>;

    /// Returns every public and private channel the app is a member of.
    async fn joined_channels(&self) -> Result<Vec<SlackChannel>, SlackApiError>;

    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        blocks: &[Value],
    ) -> Result<PostedMessage, SlackApiError>;
}

/// Creates Slack clients. Injected into the notifier and the receiver service
/// so tests can substitute a fake workspace.
#[async_trait]
pub trait SlackClientFactory: Send + Sync {
    fn client(&self, token: &str) -> Box<dyn SlackApi>;

    /// Exchanges an OAuth authorization code for a bot token.
    async fn exchange_auth_code(
        &self,
        client_id: &str,
        client_secret: &str,
        auth_code: &str,
    ) -> Result<OAuthCredential, SlackApiError>;
}

/// Builds [`SlackHttpClient`]s that share one connection pool.
#[derive(Clone)]
pub struct SlackHttpFactory {
    http: reqwest::Client,
    api_base_url: String,
}

impl SlackHttpFactory {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SlackClientFactory for SlackHttpFactory {
    fn client(&self, token: &str) -> Box<dyn SlackApi> {
        Box::new(SlackHttpClient {
            http: self.http.clone(),
            api_base_url: self.api_base_url.clone(),
            token: token.to_string(),
        })
    }

    #[instrument(skip(self, client_secret, auth_code))]
    async fn exchange_auth_code(
        &self,
        client_id: &str,
        client_secret: &str,
        auth_code: &str,
    ) -> Result<OAuthCredential, SlackApiError> {
        let response: OAuthAccessResponse = self
            .http
            .post(format!("{}/oauth.v2.access", self.api_base_url))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", auth_code),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(response.ok, response.error)?;

        Ok(OAuthCredential {
            access_token: response.access_token.unwrap_or_default(),
            workspace: response.team.map(|team| team.name).unwrap_or_default(),
        })
    }
}

/// A Slack Web API client authenticated with a bot token.
pub struct SlackHttpClient {
    http: reqwest::Client,
    api_base_url: String,
    token: String,
}

impl SlackHttpClient {
    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base_url, method)
    }
}

#[async_trait]
impl SlackApi for SlackHttpClient {
    #[instrument(skip(self))]
    async fn lookup_user_by_email(&self, email: &str) -> Result<String, SlackApiError> {
        let response: UserLookupResponse = self
            .http
            .get(self.url("users.lookupByEmail"))
            .bearer_auth(&self.token)
            .query(&[("email", email)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(response.ok, response.error)?;
        response
            .user
            .map(|user| user.id)
            .ok_or_else(|| SlackApiError::Api("users_not_found".to_string()))
    }

    #[instrument(skip(self))]
    async fn joined_channels(&self) -> Result<Vec<SlackChannel>, SlackApiError> {
        let mut channels = Vec::new();
        let mut cursor = String::new();
        let limit = CONVERSATIONS_PAGE_LIMIT.to_string();

        loop {
            let response: ConversationsResponse = self
                .http
                .get(self.url("users.conversations"))
                .bearer_auth(&self.token)
                .query(&[
                    ("types", "public_channel,private_channel"),
                    ("exclude_archived", "true"),
                    ("limit", limit.as_str()),
                    ("cursor", cursor.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            check(response.ok, response.error)?;

            channels.extend(response.channels);
            cursor = response
                .response_metadata
                .map(|metadata| metadata.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
            debug!(fetched = channels.len(), "Fetching next page of joined channels");
        }

        Ok(channels)
    }

    #[instrument(skip(self, text, blocks))]
    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        blocks: &[Value],
    ) -> Result<PostedMessage, SlackApiError> {
        let mut payload = json!({ "channel": channel_id, "text": text });
        if !blocks.is_empty() {
            payload["blocks"] = Value::Array(blocks.to_vec());
        }

        let response: PostMessageResponse = self
            .http
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(response.ok, response.error)?;

        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| channel_id.to_string()),
            ts: response.ts.unwrap_or_default(),
        })
    }
}

fn check(ok: bool, error: Option<String>) -> Result<(), SlackApiError> {
    if ok {
        Ok(())
    } else {
        Err(SlackApiError::Api(
            error.unwrap_or_else(|| "unknown_error".to_string()),
        ))
    }
}

#[derive(Deserialize)]
struct UserLookupResponse {
    ok: bool,
    error: Option<String>,
    user: Option<SlackUser>,
}

#[derive(Deserialize)]
struct SlackUser {
    id: String,
}

#[derive(Deserialize)]
struct ConversationsResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<SlackChannel>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
}

#[derive(Deserialize)]
struct OAuthAccessResponse {
    ok: bool,
    error: Option<String>,
    access_token: Option<String>,
    team: Option<SlackTeam>,
}

#[derive(Deserialize)]
struct SlackTeam {
    name: String,
}
