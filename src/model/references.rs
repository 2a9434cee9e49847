/// Reference to an external CSDL document
///
/// See: https://docs.oasis-open.org/odata/odata-csdl-xml/v4.01/odata-csdl-xml-v4.01.html#sec_Reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmReference {
    pub uri: String,
    pub includes: Vec<EdmInclude>,
    pub include_annotations: Vec<EdmIncludeAnnotations>,
}

impl EdmReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            includes: Vec::new(),
            include_annotations: Vec::new(),
        }
    }

    pub fn with_include(mut self, namespace: impl Into<String>, alias: Option<&str>) -> Self {
        self.includes.push(EdmInclude {
            namespace: namespace.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn with_include_annotations(mut self, include: EdmIncludeAnnotations) -> Self {
        self.include_annotations.push(include);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmInclude {
    pub namespace: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmIncludeAnnotations {
    pub term_namespace: String,
    pub qualifier: Option<String>,
    pub target_namespace: Option<String>,
}

impl EdmIncludeAnnotations {
    pub fn new(term_namespace: impl Into<String>) -> Self {
        Self {
            term_namespace: term_namespace.into(),
            qualifier: None,
            target_namespace: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }
}
