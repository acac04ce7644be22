use crate::notification::slack::api::{
    OAuthCredential, PostedMessage, SlackApi, SlackApiError, SlackChannel, SlackClientFactory,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A message recorded by the fake workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMessage {
    pub token: String,
    pub channel_id: String,
    pub text: String,
    pub blocks: Vec<Value>,
}

#[derive(Default)]
struct WorkspaceState {
    users: HashMap<String, String>,
    channels: Vec<SlackChannel>,
    user_lookup_error: Option<String>,
    channel_list_error: Option<String>,
    post_error: Option<String>,
    oauth: Option<Result<OAuthCredential, String>>,
    posted: Vec<RecordedMessage>,
    user_lookup_calls: usize,
    channel_list_calls: usize,
    oauth_exchange_calls: usize,
}

/// Fake Slack workspace for testing
///
/// Acts as a [`SlackClientFactory`]; every client it hands out shares the same
/// users, channels and recorded messages.
#[derive(Clone, Default)]
pub struct FakeSlackWorkspace {
    state: Arc<Mutex<WorkspaceState>>,
}

impl FakeSlackWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user that `users.lookupByEmail` can find.
    pub fn add_user(&self, email: &str, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.users.insert(email.to_string(), id.to_string());
    }

    /// Adds a channel the app has joined.
    pub fn add_channel(&self, id: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.channels.push(SlackChannel {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    /// Makes every user lookup fail with `error`.
    pub fn fail_user_lookup(&self, error: &str) {
        self.state.lock().unwrap().user_lookup_error = Some(error.to_string());
    }

    pub fn fail_channel_list(&self, error: &str) {
        self.state.lock().unwrap().channel_list_error = Some(error.to_string());
    }

    pub fn fail_post(&self, error: &str) {
        self.state.lock().unwrap().post_error = Some(error.to_string());
    }

    pub fn set_oauth_credential(&self, access_token: &str, workspace: &str) {
        self.state.lock().unwrap().oauth = Some(Ok(OAuthCredential {
            access_token: access_token.to_string(),
            workspace: workspace.to_string(),
        }));
    }

    pub fn fail_oauth(&self, error: &str) {
        self.state.lock().unwrap().oauth = Some(Err(error.to_string()));
    }

    /// Messages that were "posted", in order.
    pub fn posted_messages(&self) -> Vec<RecordedMessage> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn user_lookup_calls(&self) -> usize {
        self.state.lock().unwrap().user_lookup_calls
    }

    pub fn channel_list_calls(&self) -> usize {
        self.state.lock().unwrap().channel_list_calls
    }

    pub fn oauth_exchange_calls(&self) -> usize {
        self.state.lock().unwrap().oauth_exchange_calls
    }
}

#[async_trait]
impl SlackClientFactory for FakeSlackWorkspace {
    fn client(&self, token: &str) -> Box<dyn SlackApi> {
        Box::new(FakeSlackClient {
            token: token.to_string(),
            state: self.state.clone(),
        })
    }

    async fn exchange_auth_code(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _auth_code: &str,
    ) -> Result<OAuthCredential, SlackApiError> {
        let mut state = self.state.lock().unwrap();
        state.oauth_exchange_calls += 1;
        match state.oauth.clone() {
            Some(Ok(credential)) => Ok(credential),
            Some(Err(error)) => Err(SlackApiError::Api(error)),
            None => Err(SlackApiError::Api("invalid_code".to_string())),
        }
    }
}

struct FakeSlackClient {
    token: String,
    state: Arc<Mutex<WorkspaceState>>,
}

#[async_trait]
impl SlackApi for FakeSlackClient {
    async fn lookup_user_by_email(&self, email: &str) -> Result<String, SlackApiError> {
        let mut state = self.state.lock().unwrap();
        state.user_lookup_calls += 1;
        if let Some(error) = &state.user_lookup_error {
            return Err(SlackApiError::Api(error.clone()));
        }
        state
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| SlackApiError::Api("users_not_found".to_string()))
    }

    async fn joined_channels(&self) -> Result<Vec<SlackChannel>, SlackApiError> {
        let mut state = self.state.lock().unwrap();
        state.channel_list_calls += 1;
        match &state.channel_list_error {
            Some(error) => Err(SlackApiError::Api(error.clone())),
            None => Ok(state.channels.clone()),
        }
    }

    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        blocks: &[Value],
    ) -> Result<PostedMessage, SlackApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = &state.post_error {
            return Err(SlackApiError::Api(error.clone()));
        }
        state.posted.push(RecordedMessage {
            token: self.token.clone(),
            channel_id: channel_id.to_string(),
            text: text.to_string(),
            blocks: blocks.to_vec(),
        });
        Ok(PostedMessage {
            channel: channel_id.to_string(),
            ts: format!("1503435956.{:06}", state.posted.len()),
        })
    }
}
