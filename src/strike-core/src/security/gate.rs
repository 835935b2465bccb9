use crate::action::{Action, Origin};
use crate::security::level::{check_security, ActionState, NormalizedSecurityLevel, Source};
use crate::security::registry::TrustRegistry;
use serde::Serialize;
use std::sync::Arc;

/// Classification of an action and, when it was reached through one, of
/// the page it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExtendedActionState {
    pub action: ActionState,
    pub origin: Option<(Source, ActionState)>,
}

impl ExtendedActionState {
    pub fn overall(&self) -> ActionState {
        match self.origin {
            Some((_, origin)) => self.action.merge(origin),
            None => self.action,
        }
    }

    /// Each source is checked against its own level.
    pub fn passes(&self, levels: &NormalizedSecurityLevel) -> bool {
        let action = check_security(self.action, levels.for_source(Source::Actions));
        let origin = self
            .origin
            .is_none_or(|(source, state)| check_security(state, levels.for_source(source)));
        action && origin
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Disclaimer {
    /// Malicious; overriding it is only possible when the policy lets it pass.
    Blocked { ignorable: bool },
    /// Not in the registry; always ignorable.
    Unknown { ignorable: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SecurityAssessment {
    pub extended: ExtendedActionState,
    pub overall: ActionState,
    pub passes: bool,
    pub disclaimer: Option<Disclaimer>,
}

impl SecurityAssessment {
    pub fn new(extended: ExtendedActionState, levels: &NormalizedSecurityLevel) -> Self {
        let overall = extended.overall();
        let passes = extended.passes(levels);
        let disclaimer = match overall {
            ActionState::Malicious => Some(Disclaimer::Blocked { ignorable: passes }),
            ActionState::Unknown => Some(Disclaimer::Unknown { ignorable: true }),
            ActionState::Trusted => None,
        };
        SecurityAssessment {
            extended,
            overall,
            passes,
            disclaimer,
        }
    }

    /// Execution starts out blocked for malicious actions and for anything
    /// the configured levels reject.
    pub fn initially_blocked(&self) -> bool {
        self.overall == ActionState::Malicious || !self.passes
    }
}

/// Classifies actions against a [`TrustRegistry`] under fixed levels.
#[derive(Clone)]
pub struct SecurityGate {
    registry: Arc<dyn TrustRegistry>,
    levels: NormalizedSecurityLevel,
}

impl SecurityGate {
    pub fn new(registry: Arc<dyn TrustRegistry>, levels: NormalizedSecurityLevel) -> Self {
        SecurityGate { registry, levels }
    }

    pub fn levels(&self) -> NormalizedSecurityLevel {
        self.levels
    }

    pub async fn classify(&self, action: &Action, origin: Option<&Origin>) -> ExtendedActionState {
        let action_state = self.registry.action_state(&action.canister_id).await;
        let origin = origin.map(|origin| {
            let host = origin.host().unwrap_or_default();
            match origin {
                Origin::Website(_) => (Source::Websites, self.registry.website_state(host)),
                Origin::Interstitial(_) => {
                    (Source::Interstitials, self.registry.interstitial_state(host))
                }
            }
        });
        ExtendedActionState {
            action: action_state,
            origin,
        }
    }

    pub async fn evaluate(&self, action: &Action, origin: Option<&Origin>) -> SecurityAssessment {
        SecurityAssessment::new(self.classify(action, origin).await, &self.levels)
    }
}
