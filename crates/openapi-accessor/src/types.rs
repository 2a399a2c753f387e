//! Result types returned by accessor queries

use serde::{Deserialize, Serialize};

/// Sentinel returned by `fetch` when the request never produced a response
pub const TRANSPORT_ERROR: i32 = -1;
/// Sentinel returned by `fetch` when the response body is not JSON
pub const INVALID_JSON: i32 = -2;

/// Outcome of fetching a service's OpenAPI document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// A JSON body was received; carries the HTTP status verbatim, which may
    /// still be a non-2xx code
    Received(u16),
    /// Connection, timeout or body read failure
    TransportError,
    /// The body could not be parsed as JSON
    InvalidJson,
}

impl FetchStatus {
    /// Integer form: the HTTP status, or a negative sentinel
    pub fn code(&self) -> i32 {
        match self {
            FetchStatus::Received(status) => i32::from(*status),
            FetchStatus::TransportError => TRANSPORT_ERROR,
            FetchStatus::InvalidJson => INVALID_JSON,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Received(status) if (200..300).contains(status))
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A parameter name with its mapped target type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Parallel lists describing an operation's parameters, in declared order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub names: Vec<String>,
    pub required: Vec<bool>,
    /// `true` where the parameter is sent as a cookie
    pub is_cookie: Vec<bool>,
}

impl QueryParams {
    /// Number of parameters
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the operation declares no parameters
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Split into `(names, required, is_cookie)`
    pub fn into_parts(self) -> (Vec<String>, Vec<bool>, Vec<bool>) {
        (self.names, self.required, self.is_cookie)
    }
}

/// OpenAPI primitive type names and the names callers use for them
pub const PRIMITIVE_TYPES: [(&str, &str); 4] = [
    ("integer", "int"),
    ("number", "float"),
    ("string", "str"),
    ("boolean", "bool"),
];

/// Map an OpenAPI primitive type name; unknown names pass through
pub fn map_primitive_type(openapi_type: &str) -> &str {
    PRIMITIVE_TYPES
        .iter()
        .find(|(from, _)| *from == openapi_type)
        .map(|(_, to)| *to)
        .unwrap_or(openapi_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_primitive_type() {
        assert_eq!(map_primitive_type("integer"), "int");
        assert_eq!(map_primitive_type("number"), "float");
        assert_eq!(map_primitive_type("string"), "str");
        assert_eq!(map_primitive_type("boolean"), "bool");
        assert_eq!(map_primitive_type("array"), "array");
        assert_eq!(map_primitive_type("uuid"), "uuid");
    }

    #[test]
    fn test_fetch_status_codes() {
        assert_eq!(FetchStatus::Received(200).code(), 200);
        assert_eq!(FetchStatus::Received(404).code(), 404);
        assert_eq!(FetchStatus::TransportError.code(), -1);
        assert_eq!(FetchStatus::InvalidJson.code(), -2);

        assert!(FetchStatus::Received(204).is_success());
        assert!(!FetchStatus::Received(404).is_success());
        assert!(!FetchStatus::InvalidJson.is_success());
    }

    #[test]
    fn test_typed_parameter_serializes_type_key() {
        let param = TypedParameter {
            name: "limit".to_string(),
            type_name: "int".to_string(),
        };
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value, serde_json::json!({"name": "limit", "type": "int"}));
    }
}
