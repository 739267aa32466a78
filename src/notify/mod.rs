//! Commit comment notifier
//!
//! Posts the markdown report as a comment on the commit under test. Only
//! active when both the commit and the token are provided; failures never
//! change the batch verdict.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{EnvConfig, NotifierConfig};

/// Notifier errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Comment rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Publishes the report to the commit comment endpoint
#[derive(Clone, Debug)]
pub struct Notifier {
    client: Client,
    endpoint: String,
    token: String,
}

impl Notifier {
    pub fn new(
        config: &NotifierConfig,
        commit: &str,
        token: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/repos/{}/commits/{}/comments",
                config.api_url.trim_end_matches('/'),
                config.repository,
                commit
            ),
            token: token.into(),
        })
    }

    /// Build a notifier when the commit and token are both set
    pub fn from_env(env: &EnvConfig, config: &NotifierConfig) -> Result<Option<Self>, NotifyError> {
        env.notifier_credentials()
            .map(|(commit, token)| Self::new(config, commit, token))
            .transpose()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post the markdown document
    pub async fn publish(&self, markdown: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(USER_AGENT, "mutation-bot")
            .header(ACCEPT, "application/vnd.github+json")
            .json(&CommentBody { body: markdown })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Report posted to {}", self.endpoint);
        Ok(())
    }

    /// Post the document, logging instead of failing
    pub async fn publish_best_effort(&self, markdown: &str) -> bool {
        match self.publish(markdown).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not post report: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_url: String) -> NotifierConfig {
        NotifierConfig {
            api_url,
            repository: "acme/wallet".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_endpoint() {
        let notifier =
            Notifier::new(&config("https://api.example.com/".to_string()), "abc123", "t").unwrap();
        assert_eq!(
            notifier.endpoint(),
            "https://api.example.com/repos/acme/wallet/commits/abc123/comments"
        );
    }

    #[test]
    fn test_from_env_requires_both_values() {
        let cfg = NotifierConfig::default();

        let none = EnvConfig {
            token: Some("t".to_string()),
            ..Default::default()
        };
        assert!(Notifier::from_env(&none, &cfg).unwrap().is_none());

        let both = EnvConfig {
            commit: Some("abc".to_string()),
            token: Some("t".to_string()),
            ..Default::default()
        };
        assert!(Notifier::from_env(&both, &cfg).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_publish_posts_comment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/acme/wallet/commits/abc123/comments"))
            .and(header("authorization", "Bearer s3cret"))
            .and(body_json(serde_json::json!({"body": "## report"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(&config(server.uri()), "abc123", "s3cret").unwrap();
        notifier.publish("## report").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_comment_is_not_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let notifier = Notifier::new(&config(server.uri()), "abc123", "wrong").unwrap();
        match notifier.publish("x").await {
            Err(NotifyError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!notifier.publish_best_effort("x").await);
    }
}
