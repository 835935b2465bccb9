use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust classification of an action, a website or an interstitial.
///
/// The variants are ordered by severity so that `max` yields the worse of two
/// classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Trusted,
    Unknown,
    Malicious,
}

impl ActionState {
    /// Worst-of merge: `malicious` > `unknown` > `trusted`.
    pub fn merge(self, other: ActionState) -> ActionState {
        self.max(other)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionState::Trusted => "trusted",
            ActionState::Unknown => "unknown",
            ActionState::Malicious => "malicious",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityLevel {
    #[default]
    OnlyTrusted,
    NonMalicious,
    #[serde(alias = "all")]
    Everything,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Websites,
    Interstitials,
    Actions,
}

/// One security level per source category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSecurityLevel {
    pub websites: SecurityLevel,
    pub interstitials: SecurityLevel,
    pub actions: SecurityLevel,
}

impl NormalizedSecurityLevel {
    pub fn uniform(level: SecurityLevel) -> Self {
        NormalizedSecurityLevel {
            websites: level,
            interstitials: level,
            actions: level,
        }
    }

    pub fn for_source(&self, source: Source) -> SecurityLevel {
        match source {
            Source::Websites => self.websites,
            Source::Interstitials => self.interstitials,
            Source::Actions => self.actions,
        }
    }
}

/// Either a single level applied to every source, or one level per source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecurityLevelConfig {
    All(SecurityLevel),
    PerSource(NormalizedSecurityLevel),
}

impl Default for SecurityLevelConfig {
    fn default() -> Self {
        SecurityLevelConfig::All(SecurityLevel::default())
    }
}

impl SecurityLevelConfig {
    pub fn normalize(&self) -> NormalizedSecurityLevel {
        match self {
            SecurityLevelConfig::All(level) => NormalizedSecurityLevel::uniform(*level),
            SecurityLevelConfig::PerSource(levels) => *levels,
        }
    }
}

pub fn check_security(state: ActionState, level: SecurityLevel) -> bool {
    match level {
        SecurityLevel::OnlyTrusted => state == ActionState::Trusted,
        SecurityLevel::NonMalicious => state != ActionState::Malicious,
        SecurityLevel::Everything => true,
    }
}
