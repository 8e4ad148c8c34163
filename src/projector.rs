//! Projection of CPER JSON schemas into OData EDMX XML.
//!
//! Every schema object that declares `required` becomes an `EntityType`, and
//! each of its properties a `Property` element. Nested entities are written
//! before the entity that contains them. `oneOf` alternatives that carry an
//! `$id` are gathered under a wrapper entity named after the property that
//! holds the `oneOf`.
//!
//! Entity names are namespaced by `base_id`, the formatted `$id` of the
//! closest ancestor that had one, so structurally repeated blocks (for
//! example `validationBits`) get distinct names under each parent.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::ProjectError;
use crate::naming::{capitalize, format_id};
use crate::resolver::{display_path, escape_pointer};
use crate::types::{edm_type, is_complex_type, is_truthy, json_type_name, ProjectOptions};
use crate::xml;

/// `$id` marker for shared name/value pair schemas, which keep the
/// structural base type instead of taking their own.
const NAME_VALUE_PAIR_MARKER: &str = "namevaluepair";

/// Property and base type name that triggers namespace extension.
const VALIDATION_BITS: &str = "validationbits";

/// Output of projecting one schema node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// `EntityType` blocks in emission order.
    pub xml: String,
    /// Formatted `$id` of the entity this node produced, if it had one.
    pub emitted_id: Option<String>,
}

/// Projects schemas into EDMX XML.
///
/// Holds the set of de-duplicated entities already written; it is reset by
/// every [`Projector::project_document`] call.
#[derive(Debug, Clone)]
pub struct Projector {
    options: ProjectOptions,
    emitted: HashSet<String>,
}

impl Projector {
    pub fn new(options: ProjectOptions) -> Self {
        Self {
            options,
            emitted: HashSet::new(),
        }
    }

    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    /// Project a whole schema document into an EDMX document.
    ///
    /// The subtree under the configured start property is located first,
    /// looking through `oneOf` and `required`/`properties` wrappers, then
    /// wrapped as the single property of the root entity.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::StartPropertyNotFound` when the start property
    /// can't be reached, or any error raised while projecting the subtree.
    pub fn project_document(&mut self, document: &Value) -> Result<String, ProjectError> {
        self.emitted.clear();

        let start = self.options.start_property.clone();
        let subtree = locate_start_property(document, &start)?;

        let mut properties = Map::new();
        properties.insert(start.clone(), subtree.clone());
        let root = json!({
            "required": [start],
            "properties": Value::Object(properties),
        });

        let basetype = self.options.root_basetype.clone();
        let fragment = self.project(&root, &basetype, "", "")?;
        Ok(self.options.template.wrap(&fragment.xml))
    }

    /// Project one schema node.
    ///
    /// `basetype` is the type name the node would take without an `$id`
    /// (the property name that holds it), `base_id` the namespace inherited
    /// from ancestors and `prev_property` the base type of the parent entity.
    pub fn project(
        &mut self,
        node: &Value,
        basetype: &str,
        base_id: &str,
        prev_property: &str,
    ) -> Result<Fragment, ProjectError> {
        self.project_node(node, basetype, base_id, prev_property, "", 0)
    }

    fn project_node(
        &mut self,
        node: &Value,
        basetype: &str,
        base_id: &str,
        prev_property: &str,
        path: &str,
        depth: usize,
    ) -> Result<Fragment, ProjectError> {
        if depth > self.options.max_depth {
            return Err(ProjectError::DepthExceeded {
                path: display_path(path),
                limit: self.options.max_depth,
            });
        }

        match node {
            Value::Object(map) => match map.get("required").filter(|r| is_truthy(r)) {
                Some(required) => {
                    self.project_entity(map, required, basetype, base_id, prev_property, path, depth)
                }
                None => {
                    if let Some(one_of) = map.get("oneOf").filter(|v| is_truthy(v)) {
                        let child_path = format!("{}/oneOf", path);
                        self.project_node(one_of, basetype, base_id, prev_property, &child_path, depth + 1)
                    } else if let Some(items) = map.get("items").filter(|v| is_truthy(v)) {
                        let child_path = format!("{}/items", path);
                        self.project_node(items, basetype, base_id, prev_property, &child_path, depth + 1)
                    } else {
                        Ok(Fragment::default())
                    }
                }
            },
            Value::Array(alternatives) => {
                self.project_alternatives(alternatives, basetype, base_id, path, depth)
            }
            _ => Ok(Fragment::default()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn project_entity(
        &mut self,
        map: &Map<String, Value>,
        required: &Value,
        basetype: &str,
        base_id: &str,
        prev_property: &str,
        path: &str,
        depth: usize,
    ) -> Result<Fragment, ProjectError> {
        let Some(required) = required.as_array() else {
            return Err(ProjectError::MalformedRequiredField {
                path: display_path(path),
                actual: json_type_name(required).to_string(),
            });
        };
        let required: Vec<&str> = required.iter().filter_map(Value::as_str).collect();

        let key = format!("{}{}", base_id, basetype).to_lowercase();
        if self.options.deduplicate.contains(&key) && !self.emitted.insert(key.clone()) {
            debug!(entity = %key, path = %display_path(path), "skipping repeated entity");
            return Ok(Fragment::default());
        }

        let Some(properties) = map
            .get("properties")
            .and_then(Value::as_object)
            .filter(|p| !p.is_empty())
        else {
            return Err(ProjectError::MissingPropertiesField {
                path: display_path(path),
            });
        };

        let id = map.get("$id").and_then(Value::as_str).filter(|s| !s.is_empty());

        let basetype = match id {
            Some(id) if !id.contains(NAME_VALUE_PAIR_MARKER) => format_id(id),
            _ => basetype.to_string(),
        };
        let entity_name = format!("{}{}", base_id, capitalize(&basetype));

        let mut base_id = base_id.to_string();
        let mut emitted_id = None;
        if let Some(id) = id {
            base_id = format_id(id);
            emitted_id = Some(base_id.clone());
        }
        if basetype.to_lowercase().contains(VALIDATION_BITS) {
            base_id.push_str(prev_property);
        }

        debug!(entity = %entity_name, path = %display_path(path), "emitting entity");

        let mut children = String::new();
        let mut block = xml::entity_open(&entity_name);
        for (name, schema) in properties {
            if self.options.required_only && !required.contains(&name.as_str()) {
                continue;
            }
            let prop_path = format!("{}/properties/{}", path, escape_pointer(name));

            // Sticks for every property declared after validationBits too.
            if name.eq_ignore_ascii_case(VALIDATION_BITS) {
                base_id.push_str(&basetype);
            }

            block.push_str(&self.property_element(name, schema, &base_id, &basetype, &prop_path)?);

            let child = self.project_node(schema, name, &base_id, &basetype, &prop_path, depth + 1)?;
            children.push_str(&child.xml);
        }
        block.push_str(xml::entity_close());

        children.push_str(&block);
        Ok(Fragment {
            xml: children,
            emitted_id,
        })
    }

    fn project_alternatives(
        &mut self,
        alternatives: &[Value],
        basetype: &str,
        base_id: &str,
        path: &str,
        depth: usize,
    ) -> Result<Fragment, ProjectError> {
        let mut out = String::new();
        let mut ids = Vec::new();

        for (i, alternative) in alternatives.iter().enumerate() {
            let item_path = format!("{}/{}", path, i);
            let fragment = self.project_node(alternative, basetype, base_id, "", &item_path, depth + 1)?;
            out.push_str(&fragment.xml);
            match fragment.emitted_id {
                Some(id) => ids.push(id),
                None => {
                    let suggested = format!("cper-json-{}-{}{}", base_id, basetype, i).to_lowercase();
                    warn!(
                        path = %display_path(&item_path),
                        suggested_id = %suggested,
                        "oneOf alternative has no $id and can't be referenced from its wrapper entity"
                    );
                }
            }
        }

        if !ids.is_empty() {
            out.push_str(&xml::entity_open(&format!("{}{}", base_id, capitalize(basetype))));
            for id in &ids {
                out.push_str(&xml::property(
                    &capitalize(id),
                    &self.complex_type(base_id, id, basetype),
                ));
            }
            out.push_str(xml::entity_close());
        }

        Ok(Fragment {
            xml: out,
            emitted_id: None,
        })
    }

    fn property_element(
        &self,
        name: &str,
        schema: &Value,
        namespace: &str,
        basetype: &str,
        path: &str,
    ) -> Result<String, ProjectError> {
        let json_type = property_type(schema, path)?;
        let type_name = if is_complex_type(json_type) {
            self.complex_type(namespace, name, basetype)
        } else {
            edm_type(json_type)
                .ok_or_else(|| ProjectError::UnsupportedPropertyType {
                    path: display_path(path),
                    type_name: json_type.to_string(),
                })?
                .to_string()
        };
        Ok(xml::property(&capitalize(name), &type_name))
    }

    /// Qualified name of a nested entity: `{parent}.{namespace}{Name}`.
    fn complex_type(&self, namespace: &str, name: &str, basetype: &str) -> String {
        let parent = match &self.options.parent_basetype {
            Some(parent) => parent.clone(),
            None => capitalize(basetype),
        };
        format!("{}.{}{}", parent, namespace, capitalize(name))
    }
}

/// Project `document` with `options` in one call.
pub fn project_document(document: &Value, options: ProjectOptions) -> Result<String, ProjectError> {
    Projector::new(options).project_document(document)
}

/// Find the subtree under `start`, descending through the first `oneOf`
/// alternative or into `properties` when `required` lists `start`.
pub fn locate_start_property<'a>(document: &'a Value, start: &str) -> Result<&'a Value, ProjectError> {
    let mut current = document;
    let mut path = String::new();

    loop {
        let not_found = |path: &str| ProjectError::StartPropertyNotFound {
            property: start.to_string(),
            path: display_path(path),
        };

        let Some(map) = current.as_object() else {
            return Err(not_found(&path));
        };
        if let Some(found) = map.get(start) {
            return Ok(found);
        }

        if let Some(first) = map
            .get("oneOf")
            .and_then(Value::as_array)
            .and_then(|alternatives| alternatives.first())
        {
            current = first;
            path.push_str("/oneOf/0");
            continue;
        }

        let listed = map
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().any(|r| r.as_str() == Some(start)))
            .unwrap_or(false);
        match map.get("properties") {
            Some(properties) if listed => {
                current = properties;
                path.push_str("/properties");
            }
            _ => return Err(not_found(&path)),
        }
    }
}

/// JSON type of a property schema.
///
/// A list of types yields its first non-`null` entry. Without `type`, a
/// schema with `properties`, `required` or `oneOf` is an object and one with
/// `items` an array.
fn property_type<'a>(schema: &'a Value, path: &str) -> Result<&'a str, ProjectError> {
    let missing = || ProjectError::MissingPropertyType {
        path: display_path(path),
    };

    match schema.get("type") {
        Some(Value::String(t)) => Ok(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .ok_or_else(missing),
        Some(_) => Err(missing()),
        None => {
            let has = |key: &str| schema.get(key).is_some();
            if has("properties") || has("required") || has("oneOf") {
                Ok("object")
            } else if has("items") {
                Ok("array")
            } else {
                Err(missing())
            }
        }
    }
}
