use async_trait::async_trait;
use dialoguer::Input;
use slog::{debug, Logger};
use strike_core::connector::identity_provider::{AuthorizeRequest, IdentityProviderLogin};
use strike_core::identity::delegation::JsonDelegationChain;

/// Sends the user to the identity provider and reads back the delegation
/// chain it produced.
pub struct TerminalLogin {
    logger: Logger,
}

impl TerminalLogin {
    pub fn new(logger: Logger) -> Self {
        TerminalLogin { logger }
    }
}

#[async_trait]
impl IdentityProviderLogin for TerminalLogin {
    async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<Option<JsonDelegationChain>, String> {
        eprintln!("Open {} and authorize this session key:", request.provider_url);
        eprintln!("  {}", hex::encode(&request.session_public_key));
        if let Some(origin) = &request.derivation_origin {
            eprintln!("Derivation origin: {}", origin);
        }
        let logger = self.logger.clone();
        tokio::task::spawn_blocking(move || {
            let answer = Input::<String>::new()
                .with_prompt("Paste the JSON delegation chain (empty to cancel)")
                .allow_empty(true)
                .interact_text()
                .map_err(|err| err.to_string())?;
            parse_answer(&answer, &logger)
        })
        .await
        .map_err(|err| err.to_string())?
    }
}

fn parse_answer(answer: &str, logger: &Logger) -> Result<Option<JsonDelegationChain>, String> {
    let answer = answer.trim();
    if answer.is_empty() {
        debug!(logger, "Login cancelled at the prompt");
        return Ok(None);
    }
    serde_json::from_str(answer)
        .map(Some)
        .map_err(|err| format!("Not a delegation chain: {}", err))
}
