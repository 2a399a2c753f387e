//! Typed lookups over the untyped OpenAPI document
//!
//! A [`Node`] pairs a borrowed `serde_json::Value` with the dotted location it
//! was reached through, so a failed lookup reports where the walk stopped
//! (`paths./upload.post.parameters[1].name`) instead of a bare key.

use serde_json::{Map, Value};

use crate::error::{AccessError, AccessResult};

/// A borrowed position inside the document
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    location: String,
}

impl<'a> Node<'a> {
    /// Start a walk at the document root
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            location: String::new(),
        }
    }

    /// Start a walk at a value reached some other way, e.g. through a `$ref`
    pub fn at(value: &'a Value, location: impl Into<String>) -> Self {
        Self {
            value,
            location: location.into(),
        }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Required member of an object
    pub fn field(&self, key: &str) -> AccessResult<Node<'a>> {
        let location = self.child_location(key);
        match self.as_object()?.get(key) {
            Some(value) => Ok(Node { value, location }),
            None => Err(AccessError::NotFound(location)),
        }
    }

    /// Optional member of an object. A `null` member reads as absent.
    pub fn get(&self, key: &str) -> AccessResult<Option<Node<'a>>> {
        let location = self.child_location(key);
        Ok(self
            .as_object()?
            .get(key)
            .filter(|value| !value.is_null())
            .map(|value| Node { value, location }))
    }

    /// Required element of an array
    pub fn index(&self, index: usize) -> AccessResult<Node<'a>> {
        let location = format!("{}[{}]", self.location, index);
        match self.as_array()?.get(index) {
            Some(value) => Ok(Node { value, location }),
            None => Err(AccessError::NotFound(location)),
        }
    }

    /// Elements of an array, each tagged with its index
    pub fn elements(&self) -> AccessResult<Vec<Node<'a>>> {
        Ok(self
            .as_array()?
            .iter()
            .enumerate()
            .map(|(i, value)| Node {
                value,
                location: format!("{}[{}]", self.location, i),
            })
            .collect())
    }

    /// Keys of an object in declaration order
    pub fn keys(&self) -> AccessResult<Vec<String>> {
        Ok(self.as_object()?.keys().cloned().collect())
    }

    pub fn as_object(&self) -> AccessResult<&'a Map<String, Value>> {
        self.value
            .as_object()
            .ok_or_else(|| AccessError::invalid_type(self.describe(), "object"))
    }

    pub fn as_array(&self) -> AccessResult<&'a Vec<Value>> {
        self.value
            .as_array()
            .ok_or_else(|| AccessError::invalid_type(self.describe(), "array"))
    }

    pub fn as_str(&self) -> AccessResult<&'a str> {
        self.value
            .as_str()
            .ok_or_else(|| AccessError::invalid_type(self.describe(), "string"))
    }

    pub fn as_bool(&self) -> AccessResult<bool> {
        self.value
            .as_bool()
            .ok_or_else(|| AccessError::invalid_type(self.describe(), "boolean"))
    }

    fn child_location(&self, key: &str) -> String {
        if self.location.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.location, key)
        }
    }

    fn describe(&self) -> String {
        if self.location.is_empty() {
            "<document root>".to_string()
        } else {
            self.location.clone()
        }
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""`, `[]` and `{}` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_reports_location() {
        let doc = json!({"paths": {"/a": {"get": {}}}});
        let root = Node::root(&doc);

        let get = root.field("paths").and_then(|p| p.field("/a")).and_then(|p| p.field("get"));
        assert_eq!(get.unwrap().location(), "paths./a.get");

        let err = root.field("paths").and_then(|p| p.field("/b")).unwrap_err();
        assert!(matches!(err, AccessError::NotFound(ref loc) if loc == "paths./b"));
    }

    #[test]
    fn test_get_treats_null_as_absent() {
        let doc = json!({"tags": null, "paths": {}});
        let root = Node::root(&doc);

        assert!(root.get("tags").unwrap().is_none());
        assert!(root.get("missing").unwrap().is_none());
        assert!(root.get("paths").unwrap().is_some());
    }

    #[test]
    fn test_type_mismatch() {
        let doc = json!({"paths": []});
        let err = Node::root(&doc).field("paths").unwrap().field("/a").unwrap_err();
        assert!(matches!(
            err,
            AccessError::InvalidType { ref path, expected: "object" } if path == "paths"
        ));
    }

    #[test]
    fn test_elements_and_index() {
        let doc = json!({"list": ["x", "y"]});
        let list = Node::root(&doc).field("list").unwrap();

        let elements = list.elements().unwrap();
        assert_eq!(elements[1].location(), "list[1]");
        assert_eq!(elements[1].as_str().unwrap(), "y");
        assert!(matches!(list.index(2), Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let doc: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(Node::root(&doc).keys().unwrap(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(["test1"])));
        assert!(is_truthy(&json!(1.5)));
    }
}
