//! Core types for EDMX projection.

use serde_json::Value;

use crate::xml::XmlTemplate;

/// Schema property the projection starts from by default.
pub const DEFAULT_START_PROPERTY: &str = "sections";

/// Type name of the synthetic root entity.
pub const DEFAULT_ROOT_BASETYPE: &str = "NvidiaCPER";

/// Entity keys (lower-cased `base_id + basetype`) emitted at most once per
/// document. The error status block is shared by every section schema.
pub const DEFAULT_DEDUPLICATED_ENTITIES: &[&str] = &["errorstatuserrortype"];

/// Default nesting limit for projection.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Map a JSON schema primitive type to its OData primitive type.
///
/// Returns `None` for `object`, `array` and anything outside the CPER subset.
pub fn edm_type(json_type: &str) -> Option<&'static str> {
    match json_type {
        "integer" | "uint64" => Some("Edm.Int64"),
        "string" => Some("Edm.String"),
        "boolean" => Some("Edm.Boolean"),
        _ => None,
    }
}

/// Returns true for JSON types that project to a nested entity reference.
pub fn is_complex_type(json_type: &str) -> bool {
    matches!(json_type, "object" | "array")
}

/// Truthiness used when probing schema keywords: empty containers, empty
/// strings, zero, `false` and `null` count as absent.
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

/// Options for schema-to-EDMX projection.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// When set, every complex `Property` type is qualified with this
    /// namespace instead of its structural parent type.
    pub parent_basetype: Option<String>,
    /// Emit only properties listed in their schema's `required` array.
    pub required_only: bool,
    /// Property whose subtree becomes the projection root.
    pub start_property: String,
    /// Name of the synthetic root entity.
    pub root_basetype: String,
    /// Lower-cased entity keys emitted at most once per document.
    pub deduplicate: Vec<String>,
    /// Document header and footer.
    pub template: XmlTemplate,
    /// Nesting limit before projection gives up.
    pub max_depth: usize,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            parent_basetype: None,
            required_only: false,
            start_property: DEFAULT_START_PROPERTY.to_string(),
            root_basetype: DEFAULT_ROOT_BASETYPE.to_string(),
            deduplicate: DEFAULT_DEDUPLICATED_ENTITIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            template: XmlTemplate::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ProjectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent_basetype(mut self, basetype: impl Into<String>) -> Self {
        self.parent_basetype = Some(basetype.into());
        self
    }

    pub fn required_only(mut self, required_only: bool) -> Self {
        self.required_only = required_only;
        self
    }

    pub fn start_property(mut self, property: impl Into<String>) -> Self {
        self.start_property = property.into();
        self
    }

    pub fn root_basetype(mut self, basetype: impl Into<String>) -> Self {
        self.root_basetype = basetype.into();
        self
    }

    /// Replace the de-duplicated entity keys. Keys are lower-cased.
    pub fn deduplicate<I, T>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.deduplicate = keys
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn template(mut self, template: XmlTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
