//! Fetches a service's OpenAPI document and answers lookups against it

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{AccessError, AccessResult};
use crate::resolver::SchemaResolver;
use crate::settings::AccessorSettings;
use crate::types::{map_primitive_type, FetchStatus, QueryParams, TypedParameter};
use crate::value::{is_truthy, Node};

/// Keys of a path item that name operations
const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const APPLICATION_JSON: &str = "application/json";

/// In-memory view of the most recently fetched OpenAPI document.
///
/// The document starts out as an empty object. A successful [`fetch`] replaces
/// it together with the tag index; a failed one leaves both untouched. Queries
/// never modify either.
///
/// [`fetch`]: OpenApiAccessor::fetch
#[derive(Debug, Clone)]
pub struct OpenApiAccessor {
    settings: AccessorSettings,
    document: Value,
    tags: IndexMap<String, Value>,
}

impl Default for OpenApiAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiAccessor {
    /// Create an empty accessor with default settings
    pub fn new() -> Self {
        Self::with_settings(AccessorSettings::default())
    }

    /// Create an empty accessor with explicit settings
    pub fn with_settings(settings: AccessorSettings) -> Self {
        Self {
            settings,
            document: Value::Object(Map::new()),
            tags: IndexMap::new(),
        }
    }

    /// Build an accessor around a document that is already in hand
    pub fn from_json(content: &str) -> AccessResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        let mut accessor = Self::new();
        accessor.load_document(document);
        Ok(accessor)
    }

    /// Settings used for fetching
    pub fn settings(&self) -> &AccessorSettings {
        &self.settings
    }

    /// URL the document is fetched from for a service base URL
    pub fn spec_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.settings.spec_file.trim_start_matches('/')
        )
    }

    /// Fetch `{base_url}/openapi.json` and store it.
    ///
    /// Any status code with a JSON body counts as received, so callers still
    /// need to check for non-2xx codes.
    pub async fn fetch(&mut self, base_url: &str) -> FetchStatus {
        let url = self.spec_url(base_url);
        info!("Fetching OpenAPI document from: {}", url);

        let (status, body) = match self.request(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return FetchStatus::TransportError;
            }
        };

        let document: Value = match serde_json::from_slice(&body) {
            Ok(document) => document,
            Err(e) => {
                warn!("Response from {} is not valid JSON: {}", url, e);
                return FetchStatus::InvalidJson;
            }
        };

        self.load_document(document);
        debug!("HTTP {} from {}, {} tags indexed", status, url, self.tags.len());

        FetchStatus::Received(status)
    }

    async fn request(&self, url: &str) -> AccessResult<(u16, Vec<u8>)> {
        let client = reqwest::Client::builder()
            .timeout(self.settings.request_timeout())
            .build()
            .map_err(|e| AccessError::HttpError(e.to_string()))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| AccessError::HttpError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AccessError::HttpError(e.to_string()))?;

        Ok((status, body.to_vec()))
    }

    /// Replace the stored document and rebuild the tag index from it
    pub fn load_document(&mut self, document: Value) {
        self.document = document;
        self.tags = match self.tags() {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Ignoring malformed tags array: {}", e);
                IndexMap::new()
            }
        };
    }

    /// Tag objects keyed by name, read from the document's `tags` array.
    /// A later tag with the same name replaces an earlier one.
    pub fn tags(&self) -> AccessResult<IndexMap<String, Value>> {
        let mut index = IndexMap::new();

        let Some(tags) = self.root().get("tags")? else {
            return Ok(index);
        };

        for tag in tags.elements()? {
            let name = tag.field("name")?.as_str()?.to_string();
            index.insert(name, tag.value().clone());
        }

        Ok(index)
    }

    /// Tag index built when the document was loaded
    pub fn tag_index(&self) -> &IndexMap<String, Value> {
        &self.tags
    }

    /// All paths in declaration order
    pub fn paths(&self) -> AccessResult<Vec<String>> {
        self.root().field("paths")?.keys()
    }

    /// First operation method declared for a path
    pub fn path_method(&self, path: &str) -> AccessResult<String> {
        let item = self.root().field("paths")?.field(path)?;

        item.as_object()?
            .keys()
            .find(|key| HTTP_METHODS.contains(&key.as_str()))
            .cloned()
            .ok_or_else(|| AccessError::NotFound(format!("{}.<method>", item.location())))
    }

    /// Tags of the path's first operation, `None` if it declares none
    pub fn path_tags(&self, path: &str) -> AccessResult<Option<Vec<String>>> {
        let method = self.path_method(path)?;

        let Some(tags) = self.operation(path, &method)?.get("tags")? else {
            return Ok(None);
        };

        tags.elements()?
            .iter()
            .map(|tag| tag.as_str().map(str::to_string))
            .collect::<AccessResult<Vec<_>>>()
            .map(Some)
    }

    /// Property names of a `multipart/form-data` request body
    pub fn body_multipart_form_data(
        &self,
        path: &str,
        method: &str,
    ) -> AccessResult<Option<Vec<String>>> {
        let Some(schema) = self.request_body_schema(path, method, MULTIPART_FORM_DATA)? else {
            return Ok(None);
        };

        schema.field("properties")?.keys().map(Some)
    }

    /// Title of an `application/json` request body schema, as a one-element list
    pub fn body_application_json(
        &self,
        path: &str,
        method: &str,
    ) -> AccessResult<Option<Vec<String>>> {
        let Some(schema) = self.request_body_schema(path, method, APPLICATION_JSON)? else {
            return Ok(None);
        };

        let title = schema.field("title")?.as_str()?.to_string();
        Ok(Some(vec![title]))
    }

    fn request_body_schema(
        &self,
        path: &str,
        method: &str,
        content_type: &str,
    ) -> AccessResult<Option<Node<'_>>> {
        let Some(body) = self.operation(path, method)?.get("requestBody")? else {
            return Ok(None);
        };

        let Some(media) = body.field("content")?.get(content_type)? else {
            debug!("{} {} has no {} body", method, path, content_type);
            return Ok(None);
        };

        let reference = media.field("schema")?.field("$ref")?.as_str()?;
        let schema = self.resolve_schema_ref(reference)?;

        Ok(Some(Node::at(schema, reference)))
    }

    /// Follow a local `$ref` pointer such as `#/components/schemas/Foo`
    pub fn resolve_schema_ref(&self, reference: &str) -> AccessResult<&Value> {
        SchemaResolver::new(&self.document).resolve_ref(reference)
    }

    /// Parameter names with their mapped type names, in declared order
    pub fn parameters_with_types(
        &self,
        path: &str,
        method: &str,
    ) -> AccessResult<Vec<TypedParameter>> {
        let Some(parameters) = self.operation(path, method)?.get("parameters")? else {
            return Ok(Vec::new());
        };

        parameters
            .elements()?
            .iter()
            .map(|param| -> AccessResult<TypedParameter> {
                let name = param.field("name")?.as_str()?;
                let openapi_type = param.field("schema")?.field("type")?.as_str()?;
                Ok(TypedParameter {
                    name: name.to_string(),
                    type_name: map_primitive_type(openapi_type).to_string(),
                })
            })
            .collect()
    }

    /// Schema defaults of the path's first operation, keyed by parameter name.
    ///
    /// Unlike the other lookups this never fails: a malformed entry is logged
    /// and the defaults collected before it are returned.
    pub fn path_default_values(&self, path: &str) -> IndexMap<String, Value> {
        let mut defaults = IndexMap::new();

        if let Err(e) = self.collect_defaults(path, &mut defaults) {
            warn!("Stopped reading default values for {}: {}", path, e);
        }

        defaults
    }

    fn collect_defaults(
        &self,
        path: &str,
        defaults: &mut IndexMap<String, Value>,
    ) -> AccessResult<()> {
        let method = self.path_method(path)?;

        let Some(parameters) = self.operation(path, &method)?.get("parameters")? else {
            return Ok(());
        };

        for param in parameters.elements()? {
            let name = match param.get("name")? {
                Some(name) => name.as_str()?,
                None => continue,
            };
            if name.is_empty() {
                continue;
            }

            let Some(schema) = param.get("schema")? else {
                continue;
            };
            let Some(schema) = schema.value().as_object() else {
                continue;
            };

            if let Some(default) = schema.get("default") {
                defaults.insert(name.to_string(), default.clone());
            }
        }

        Ok(())
    }

    /// Names, requiredness and cookie flags of an operation's parameters.
    /// `None` when the operation declares no parameters.
    pub fn queries_param(&self, path: &str, method: &str) -> AccessResult<Option<QueryParams>> {
        let Some(parameters) = self.operation(path, method)?.get("parameters")? else {
            return Ok(None);
        };

        let mut params = QueryParams::default();

        for param in parameters.elements()? {
            params.names.push(param.field("name")?.as_str()?.to_string());
            params.required.push(param.field("required")?.as_bool()?);
            params.is_cookie.push(param.field("in")?.as_str()? == "cookie");
        }

        Ok(Some(params))
    }

    /// Value of a gateway key on the path's tags.
    ///
    /// Tags missing from the tag index are skipped. The first tag that is
    /// indexed decides the result: its value under `tag_key` if that value is
    /// truthy, `false` otherwise. Later tags are not consulted. Returns `false`
    /// when the path has no tags or none of them are indexed.
    pub fn check_api_gateway_tag(&self, path: &str, tag_key: &str) -> AccessResult<Value> {
        let Some(path_tags) = self.path_tags(path)? else {
            return Ok(Value::Bool(false));
        };

        for tag in &path_tags {
            let Some(tag_object) = self.tags.get(tag) else {
                debug!("There is no such tag: {}", tag);
                continue;
            };

            return Ok(match tag_object.get(tag_key) {
                Some(value) if is_truthy(value) => value.clone(),
                _ => Value::Bool(false),
            });
        }

        Ok(Value::Bool(false))
    }

    /// [`check_api_gateway_tag`](Self::check_api_gateway_tag) coerced to a boolean
    pub fn is_gateway_tag_enabled(&self, path: &str, tag_key: &str) -> AccessResult<bool> {
        Ok(is_truthy(&self.check_api_gateway_tag(path, tag_key)?))
    }

    /// The stored document as it was parsed
    pub fn raw_document(&self) -> &Value {
        &self.document
    }

    /// The stored document serialized back to JSON text
    pub fn raw_document_string(&self) -> AccessResult<String> {
        Ok(serde_json::to_string(&self.document)?)
    }

    fn root(&self) -> Node<'_> {
        Node::root(&self.document)
    }

    fn operation(&self, path: &str, method: &str) -> AccessResult<Node<'_>> {
        self.root().field("paths")?.field(path)?.field(method)
    }
}
