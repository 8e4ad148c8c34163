//! EDMX document template and element formatting.

use std::fmt::Write;

/// Fixed EDMX header: namespace declarations, vocabulary references and the
/// opening `Schema` element.
pub const EDMX_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:Reference Uri="http://docs.oasis-open.org/odata/odata/v4.0/errata03/csd01/complete/vocabularies/Org.OData.Core.V1.xml">
    <edmx:Include Namespace="Org.OData.Core.V1" Alias="OData"/>
  </edmx:Reference>
  <edmx:Reference Uri="http://redfish.dmtf.org/schemas/v1/RedfishExtensions_v1.xml">
    <edmx:Include Namespace="Validation.v1_0_0" Alias="Validation"/>
    <edmx:Include Namespace="RedfishExtensions.v1_0_0" Alias="Redfish"/>
  </edmx:Reference>
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NvidiaCPER.v1_0_0">
"#;

/// Fixed EDMX footer closing everything the header opened.
pub const EDMX_FOOTER: &str = r#"
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

/// Text placed around the generated entity types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTemplate {
    pub header: String,
    pub footer: String,
}

impl Default for XmlTemplate {
    fn default() -> Self {
        Self {
            header: EDMX_HEADER.to_string(),
            footer: EDMX_FOOTER.to_string(),
        }
    }
}

impl XmlTemplate {
    pub fn new(header: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
        }
    }

    /// Surround `body` with the header and footer.
    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.header.len() + body.len() + self.footer.len());
        out.push_str(&self.header);
        out.push_str(body);
        out.push_str(&self.footer);
        out
    }
}

/// Opening tag of an `EntityType`, preceded by a blank line.
pub fn entity_open(name: &str) -> String {
    format!("\n      <EntityType Name=\"{}\">\n", xml_escape(name))
}

/// Closing tag of an `EntityType`.
pub fn entity_close() -> &'static str {
    "      </EntityType>\n"
}

/// A `Property` element line.
pub fn property(name: &str, type_name: &str) -> String {
    let mut out = String::new();
    // Writing to a String can't fail.
    let _ = writeln!(
        out,
        "          <Property Name=\"{}\" Type=\"{}\"></Property>",
        xml_escape(name),
        xml_escape(type_name)
    );
    out
}

/// Escape text for use inside an attribute value.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
