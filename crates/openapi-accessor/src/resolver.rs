//! `$ref` pointer resolution inside a single OpenAPI document

use serde_json::Value;

use crate::error::{AccessError, AccessResult};
use crate::value::Node;

/// Resolves local `#/section/.../name` references against a document
pub struct SchemaResolver<'a> {
    document: &'a Value,
}

impl<'a> SchemaResolver<'a> {
    /// Create a resolver over a whole OpenAPI document
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Follow a reference such as `#/components/schemas/ConversionParams`.
    /// The leading segment may be `#` or empty, so a bare pointer such as
    /// `/components/schemas/ConversionParams` resolves the same way.
    ///
    /// The walk starts at the top-level section named by the first segment and
    /// indexes by each following segment. Array segments must be numeric.
    /// Anything that does not land on a value is an error.
    pub fn resolve_ref(&self, reference: &str) -> AccessResult<&'a Value> {
        let mut segments = reference.split('/');

        if !matches!(segments.next(), Some("#") | Some("")) {
            return Err(AccessError::InvalidReference(reference.to_string()));
        }

        let mut node = Node::root(self.document);
        let mut walked = 0;

        for raw in segments {
            let segment = unescape(raw);
            node = match node.value() {
                Value::Array(_) => {
                    let index: usize = segment
                        .parse()
                        .map_err(|_| AccessError::InvalidReference(reference.to_string()))?;
                    node.index(index)?
                }
                _ => node.field(&segment)?,
            };
            walked += 1;
        }

        if walked == 0 {
            return Err(AccessError::InvalidReference(reference.to_string()));
        }

        Ok(node.value())
    }
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
