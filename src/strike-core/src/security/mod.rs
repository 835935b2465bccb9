//! Trust classification of actions and the pages they are reached through.
pub mod gate;
pub mod level;
pub mod registry;

pub use gate::{Disclaimer, ExtendedActionState, SecurityAssessment, SecurityGate};
pub use level::{check_security, ActionState, NormalizedSecurityLevel, SecurityLevel, Source};
pub use registry::{ActionsRegistry, TrustRegistry};
