use crate::action::component::{ActionComponent, ComponentKind};
use crate::action::spec::{ActionErrorMessage, ActionGetResponse, ActionKind};
use crate::error::action::InvalidActionError;
use candid::Principal;
use std::collections::BTreeSet;
use url::Url;

pub const SOFT_LIMIT_BUTTONS: usize = 10;
pub const SOFT_LIMIT_INPUTS: usize = 3;
pub const SOFT_LIMIT_FORM_INPUTS: usize = 10;

/// A resolved action descriptor with its linked actions turned into
/// components. Replacing the action drops the components with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub url: Url,
    pub kind: ActionKind,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub canister_id: String,
    pub label: String,
    pub disabled: bool,
    pub error: Option<ActionErrorMessage>,
    pub derivation_origin: Option<String>,
    pub homepage: Option<String>,
    components: Vec<ActionComponent>,
}

impl Action {
    pub fn from_response(url: Url, response: ActionGetResponse) -> Result<Self, InvalidActionError> {
        let mut components = vec![];
        for (index, linked) in response.linked_actions().enumerate() {
            if linked.method.is_empty() {
                return Err(InvalidActionError::MissingMethod(linked.label.clone()));
            }
            let mut seen = BTreeSet::new();
            for parameter in &linked.parameters {
                if !seen.insert(parameter.name.as_str()) {
                    return Err(InvalidActionError::DuplicateParameter {
                        action: linked.label.clone(),
                        name: parameter.name.clone(),
                    });
                }
            }
            components.push(ActionComponent::new(index, linked.clone()));
        }

        Ok(Action {
            url,
            kind: response.kind,
            icon: response.icon,
            title: response.title,
            description: response.description,
            canister_id: response.canister_id,
            label: response.label,
            disabled: response.disabled,
            error: response.error,
            derivation_origin: response.derivation_origin,
            homepage: response.homepage,
            components,
        })
    }

    pub fn canister_principal(&self) -> Option<Principal> {
        Principal::from_text(&self.canister_id).ok()
    }

    pub fn is_completed(&self) -> bool {
        self.kind == ActionKind::Completed
    }

    pub fn components(&self) -> &[ActionComponent] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&ActionComponent> {
        self.components.get(index)
    }

    /// Parameterless components, capped at the button soft limit.
    pub fn buttons(&self) -> Vec<&ActionComponent> {
        self.of_kind(&[ComponentKind::Button], SOFT_LIMIT_BUTTONS)
    }

    /// Single-parameter components, capped at the input soft limit.
    pub fn inputs(&self) -> Vec<&ActionComponent> {
        self.of_kind(
            &[ComponentKind::SingleValue, ComponentKind::MultiValue],
            SOFT_LIMIT_INPUTS,
        )
    }

    /// The first form; further forms are not rendered.
    pub fn form(&self) -> Option<&ActionComponent> {
        self.components
            .iter()
            .find(|c| c.kind() == ComponentKind::Form)
    }

    /// Parameters of [`Action::form`], capped at the form soft limit.
    pub fn form_parameters(&self) -> &[crate::action::spec::TypedActionParameter] {
        match self.form() {
            Some(form) => {
                let parameters = form.parameters();
                &parameters[..parameters.len().min(SOFT_LIMIT_FORM_INPUTS)]
            }
            None => &[],
        }
    }

    fn of_kind(&self, kinds: &[ComponentKind], limit: usize) -> Vec<&ActionComponent> {
        self.components
            .iter()
            .filter(|c| kinds.contains(&c.kind()))
            .take(limit)
            .collect()
    }
}
