//! Duplicate `EntityType` detection for generated EDMX documents.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::warn;

use crate::error::ValidateXmlError;

/// An entity name declared more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntity {
    pub name: String,
    /// Total number of declarations, including the first.
    pub occurrences: usize,
}

/// Result of scanning a document for duplicate entity names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    /// Number of `EntityType` elements seen.
    pub entities: usize,
    /// Names declared more than once, in order of their first repeat.
    pub duplicates: Vec<DuplicateEntity>,
}

impl EntityReport {
    /// Returns true if no entity name is repeated.
    pub fn is_ok(&self) -> bool {
        self.duplicates.is_empty()
    }
}

/// Scan EDMX text for `EntityType` elements sharing a `Name`.
///
/// # Errors
///
/// Returns `ValidateXmlError::Malformed` if the text isn't well-formed XML.
pub fn find_duplicate_entities(xml: &str) -> Result<EntityReport, ValidateXmlError> {
    let mut reader = Reader::from_str(xml);
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut repeated: Vec<String> = Vec::new();
    let mut entities = 0;

    loop {
        let malformed = |reader: &Reader<&[u8]>, message: String| ValidateXmlError::Malformed {
            position: reader.buffer_position() as u64,
            message,
        };

        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"EntityType" => {
                entities += 1;
                let attr = e
                    .try_get_attribute("Name")
                    .map_err(|err| malformed(&reader, err.to_string()))?;
                let Some(attr) = attr else {
                    warn!(position = reader.buffer_position() as u64, "EntityType without Name");
                    continue;
                };
                let name = attr
                    .unescape_value()
                    .map_err(|err| malformed(&reader, err.to_string()))?
                    .into_owned();

                let count = counts.entry(name.clone()).or_insert(0);
                *count += 1;
                if *count == 2 {
                    repeated.push(name);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(malformed(&reader, err.to_string())),
        }
    }

    let duplicates = repeated
        .into_iter()
        .map(|name| {
            let occurrences = counts.get(&name).copied().unwrap_or(0);
            DuplicateEntity { name, occurrences }
        })
        .collect();

    Ok(EntityReport {
        entities,
        duplicates,
    })
}

/// Read an XML file and scan it with [`find_duplicate_entities`].
pub fn validate_xml_file(path: &Path) -> Result<EntityReport, ValidateXmlError> {
    let content = std::fs::read_to_string(path).map_err(|source| ValidateXmlError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    find_duplicate_entities(&content)
}
