//! # openapi-accessor
//!
//! Fetches a service's OpenAPI JSON document and answers lookups against it:
//! paths, methods, tags, parameters, request bodies, defaults and API gateway
//! tag flags.

mod accessor;
mod error;
mod resolver;
mod settings;
mod types;
mod value;

pub use accessor::OpenApiAccessor;
pub use error::{AccessError, AccessResult};
pub use resolver::SchemaResolver;
pub use settings::{AccessorSettings, DEFAULT_SPEC_FILE, DEFAULT_TIMEOUT_SECS};
pub use types::*;
pub use value::{is_truthy, Node};
