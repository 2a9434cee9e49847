use std::fmt;

///////////////////////////////////////////////////////////////////////////////

/// Namespace of the built-in EDM types (`Edm.String`, `Edm.Int32`, ...)
pub const EDM_NAMESPACE: &str = "Edm";

///////////////////////////////////////////////////////////////////////////////

/// Namespace-qualified name of a schema element, e.g. `ODataDemo.Product`.
///
/// Elements declared without a namespace use the empty namespace and render
/// as their bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Splits on the last dot: `A.B.C` becomes namespace `A.B` and name `C`
    pub fn parse(s: &str) -> Self {
        match s.rsplit_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("", s),
        }
    }

    pub fn is_edm(&self) -> bool {
        self.namespace == EDM_NAMESPACE
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&QualifiedName> for QualifiedName {
    fn from(value: &QualifiedName) -> Self {
        value.clone()
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_last_dot() {
        let qn = QualifiedName::parse("Org.OData.Core.V1.Description");
        assert_eq!(qn.namespace, "Org.OData.Core.V1");
        assert_eq!(qn.name, "Description");
        assert_eq!(qn.to_string(), "Org.OData.Core.V1.Description");
    }

    #[test]
    fn test_namespace_less_name() {
        let qn = QualifiedName::parse("Thing");
        assert_eq!(qn.namespace, "");
        assert_eq!(qn.to_string(), "Thing");
    }
}
