/// CSDL version written to `Version` / `$Version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub enum EdmVersion {
    #[default]
    #[serde(rename = "4.0")]
    V4,
    #[serde(rename = "4.01")]
    V401,
}

impl EdmVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V4 => "4.0",
            Self::V401 => "4.01",
        }
    }
}

impl std::fmt::Display for EdmVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsdlWriterSettings {
    pub version: EdmVersion,
    /// Pretty-print with two-space indentation
    pub indent: bool,
    /// Write integer and decimal constants as JSON strings
    #[serde(rename = "ieee754Compatible")]
    pub ieee754_compatible: bool,
    /// Emit `<?xml ...?>` before the XML document
    pub xml_declaration: bool,
}

impl Default for CsdlWriterSettings {
    fn default() -> Self {
        Self {
            version: EdmVersion::V4,
            indent: false,
            ieee754_compatible: false,
            xml_declaration: true,
        }
    }
}

impl CsdlWriterSettings {
    pub fn with_version(mut self, version: EdmVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_ieee754_compatible(mut self, ieee754_compatible: bool) -> Self {
        self.ieee754_compatible = ieee754_compatible;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }
}

///////////////////////////////////////////////////////////////////////////////
