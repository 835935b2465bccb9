use crate::action::component::ActionComponent;
use crate::action::model::Action;
use crate::action::payload::InvocationPayload;
use crate::action::spec::{ActionGetResponse, ActionPostResponse, ActionsJson};
use crate::action::url_mapper::{actions_json_url, map_with_rules, ActionUrl, Origin};
use crate::error::action::{PayloadError, ResolveActionError};
use crate::error::reqwest::WrappedReqwestError;
use crate::http::default_retry_policy;
use crate::http::get::get_with_retries;
use crate::http::post::post_json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use slog::{debug, trace, Logger};
use url::Url;

/// An action together with the page it was found through, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAction {
    pub action: Action,
    pub origin: Option<Origin>,
}

/// Fetches action descriptors and their invocation payloads.
pub struct ActionResolver {
    client: reqwest::Client,
    logger: Logger,
}

impl ActionResolver {
    pub fn new(logger: Logger) -> Result<Self, ResolveActionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("strike/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ResolveActionError::ClientFailed(WrappedReqwestError(err)))?;
        Ok(Self::with_client(client, logger))
    }

    pub fn with_client(client: reqwest::Client, logger: Logger) -> Self {
        ActionResolver { client, logger }
    }

    /// Resolves whatever the user shared into an action.
    pub async fn resolve(&self, shared: &str) -> Result<ResolvedAction, ResolveActionError> {
        let parsed = ActionUrl::parse(shared)?;
        let api_url = self.unfurl(&parsed).await?;
        let action = self.fetch_action(api_url).await?;
        Ok(ResolvedAction {
            action,
            origin: parsed.origin(),
        })
    }

    /// The action API URL a shared URL points at.
    pub async fn unfurl(&self, parsed: &ActionUrl) -> Result<Url, ResolveActionError> {
        match parsed {
            ActionUrl::Direct(url) | ActionUrl::Interstitial { action: url, .. } => Ok(url.clone()),
            ActionUrl::Website(page) => {
                let rules_url = actions_json_url(page);
                let actions_json: ActionsJson = self.get_json(rules_url.clone()).await?;
                let api_url = map_with_rules(page, &actions_json)
                    .ok_or(ResolveActionError::NoMatchingRule(rules_url))?;
                debug!(self.logger, "Mapped website to action"; "page" => %page, "api" => %api_url);
                Ok(api_url)
            }
        }
    }

    pub async fn fetch_action(&self, api_url: Url) -> Result<Action, ResolveActionError> {
        let response: ActionGetResponse = self.get_json(api_url.clone()).await?;
        Action::from_response(api_url.clone(), response)
            .map_err(|err| ResolveActionError::InvalidAction(api_url, err))
    }

    /// Re-fetches `action` from where it came from.
    pub async fn refresh(&self, action: &Action) -> Result<Action, ResolveActionError> {
        self.fetch_action(action.url.clone()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ResolveActionError> {
        trace!(self.logger, "GET"; "url" => %url);
        let response = get_with_retries(&self.client, url.clone(), default_retry_policy())
            .await
            .map_err(|err| ResolveActionError::FetchFailed(url.clone(), err))?;
        response
            .json()
            .await
            .map_err(|err| ResolveActionError::ParseFailed(url, WrappedReqwestError(err)))
    }

    /// What to invoke for `component`.
    ///
    /// Components with an href ask the action server, which may reshape the
    /// call around the caller's principal and staged values. Without an href
    /// the linked action itself is the payload.
    pub async fn invocation_payload(
        &self,
        action: &Action,
        component: &ActionComponent,
        principal: &str,
    ) -> Result<InvocationPayload, PayloadError> {
        let Some(href) = component.href() else {
            return Ok(InvocationPayload::from_linked_action(
                component.linked_action(),
            ));
        };
        let url = action
            .url
            .join(&href)
            .map_err(|err| PayloadError::InvalidHref(href.clone(), err))?;
        let body = component.build_body(principal);
        trace!(self.logger, "POST"; "url" => %url);

        let response = post_json(&self.client, url.clone(), &body)
            .await
            .map_err(|err| PayloadError::PostFailed(url.clone(), err))?;
        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|err| PayloadError::PostFailed(url, WrappedReqwestError(err)))?;

        if let Some(message) = error_message(&value) {
            return Err(PayloadError::Rejected(message));
        }
        if !status.is_success() {
            return Err(PayloadError::Rejected(format!(
                "Action server answered {status}"
            )));
        }
        let response: ActionPostResponse = serde_json::from_value(value)
            .map_err(|err| PayloadError::DecodeFailed(err.to_string()))?;
        InvocationPayload::from_post_response(response, component.linked_action())
    }
}

/// `{ "error": "..." }` or `{ "error": { "message": "..." } }`.
fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
