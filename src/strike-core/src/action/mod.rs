//! Action descriptors: fetching, URL unfurling and the components a user
//! stages input on.
pub mod component;
pub mod model;
pub mod payload;
pub mod resolver;
pub mod spec;
pub mod url_mapper;

pub use component::{ActionComponent, ComponentKind};
pub use model::Action;
pub use payload::InvocationPayload;
pub use resolver::{ActionResolver, ResolvedAction};
pub use url_mapper::{ActionUrl, Origin};
