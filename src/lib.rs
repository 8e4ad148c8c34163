//! CPER Schema Generator
//!
//! Turns the CPER (Common Platform Error Record) JSON schema corpus into two
//! derived artifacts:
//!
//! - a **master schema**: the root schema with every `$ref` inlined from the
//!   schema directory, and
//! - an **EDMX document**: OData `EntityType`/`Property` metadata for
//!   Redfish consumers.
//!
//! # Example
//!
//! ```
//! use cper_schemagen::{project_document, ProjectOptions, XmlTemplate};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "required": ["sections"],
//!     "properties": {
//!         "sections": {
//!             "$id": "cper-json-example-id-section",
//!             "required": ["id"],
//!             "properties": { "id": { "type": "string" } }
//!         }
//!     }
//! });
//!
//! let options = ProjectOptions::new().template(XmlTemplate::new("", ""));
//! let xml = project_document(&schema, options).unwrap();
//!
//! assert!(xml.contains(r#"<EntityType Name="ExampleId">"#));
//! assert!(xml.contains(r#"<Property Name="Id" Type="Edm.String"></Property>"#));
//! ```
//!
//! # Type Mapping
//!
//! | JSON type | EDMX type |
//! |-----------|-----------|
//! | `integer`, `uint64` | `Edm.Int64` |
//! | `string` | `Edm.String` |
//! | `boolean` | `Edm.Boolean` |
//! | `object`, `array` | `{Parent}.{Namespace}{Name}` entity reference |
//!
//! # Naming
//!
//! Entity names come from `$id` values: `cper-json-firmware-error-section`
//! becomes `FirmwareError` (see [`format_id`]).

mod error;
mod index;
mod loader;
mod naming;
mod projector;
mod resolver;
mod transform;
mod types;
mod validator;
mod xml;

pub use error::{ProjectError, ResolveError, UnresolvedReference, ValidateXmlError};
pub use index::{reference_basename, Collision, ReferenceIndex, SchemaStore, SCHEMA_EXTENSION};
pub use loader::{load_schema, load_schema_str, locate_root_schema};
pub use naming::{capitalize, format_id, title_case};
pub use projector::{locate_start_property, project_document, Fragment, Projector};
pub use resolver::{contains_refs, resolve_refs, Resolution, Resolver, REF_KEY, SCHEMA_KEY};
pub use transform::transform_key;
pub use types::{
    edm_type, json_type_name, ProjectOptions, DEFAULT_ROOT_BASETYPE, DEFAULT_START_PROPERTY,
};
pub use validator::{find_duplicate_entities, validate_xml_file, DuplicateEntity, EntityReport};
pub use xml::{XmlTemplate, EDMX_FOOTER, EDMX_HEADER};
