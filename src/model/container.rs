use super::expressions::Expression;
use super::names::QualifiedName;

///////////////////////////////////////////////////////////////////////////////

// <EntityContainer Name="DemoService">
//   <EntitySet Name="Products" EntityType="ODataDemo.Product"/>
// </EntityContainer>
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContainer {
    pub namespace: String,
    pub name: String,
    pub extends: Option<QualifiedName>,
    pub elements: Vec<ContainerElement>,
}

impl EntityContainer {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            extends: None,
            elements: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn with_extends(mut self, extends: impl Into<QualifiedName>) -> Self {
        self.extends = Some(extends.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<ContainerElement>) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn find_element(&self, name: &str) -> Option<&ContainerElement> {
        self.elements.iter().find(|e| e.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContainerElement {
    EntitySet(EntitySet),
    Singleton(Singleton),
    ActionImport(OperationImport),
    FunctionImport(OperationImport),
}

impl ContainerElement {
    pub fn name(&self) -> &str {
        match self {
            Self::EntitySet(e) => &e.name,
            Self::Singleton(e) => &e.name,
            Self::ActionImport(e) | Self::FunctionImport(e) => &e.name,
        }
    }
}

impl From<EntitySet> for ContainerElement {
    fn from(value: EntitySet) -> Self {
        Self::EntitySet(value)
    }
}

impl From<Singleton> for ContainerElement {
    fn from(value: Singleton) -> Self {
        Self::Singleton(value)
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: QualifiedName,
    pub include_in_service_document: bool,
    pub navigation_bindings: Vec<NavigationPropertyBinding>,
}

impl EntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            include_in_service_document: true,
            navigation_bindings: Vec::new(),
        }
    }

    pub fn with_include_in_service_document(mut self, include: bool) -> Self {
        self.include_in_service_document = include;
        self
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: BindingTarget) -> Self {
        self.navigation_bindings.push(NavigationPropertyBinding {
            path: path.into(),
            target,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Singleton {
    pub name: String,
    pub entity_type: QualifiedName,
    pub navigation_bindings: Vec<NavigationPropertyBinding>,
}

impl Singleton {
    pub fn new(name: impl Into<String>, entity_type: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            navigation_bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: BindingTarget) -> Self {
        self.navigation_bindings.push(NavigationPropertyBinding {
            path: path.into(),
            target,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyBinding {
    pub path: String,
    pub target: BindingTarget,
}

/// Navigation source a binding resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget {
    /// Entity set or singleton of the same container
    EntitySet(String),
    /// Entity set implied by a containment navigation property
    Contained { path: String },
    /// Entity set of another container
    External {
        container: QualifiedName,
        entity_set: String,
    },
}

impl BindingTarget {
    pub fn render(&self) -> String {
        match self {
            Self::EntitySet(name) => name.clone(),
            Self::Contained { path } => path.clone(),
            Self::External {
                container,
                entity_set,
            } => format!("{container}/{entity_set}"),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Action or function import, depending on the [`ContainerElement`] variant
#[derive(Debug, Clone, PartialEq)]
pub struct OperationImport {
    pub name: String,
    pub operation: QualifiedName,
    /// Entity set of the returned entities, must be a path expression
    pub entity_set: Option<Expression>,
    /// Only meaningful for function imports
    pub include_in_service_document: bool,
}

impl OperationImport {
    pub fn new(name: impl Into<String>, operation: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            entity_set: None,
            include_in_service_document: false,
        }
    }

    pub fn with_entity_set(mut self, entity_set: Expression) -> Self {
        self.entity_set = Some(entity_set);
        self
    }

    pub fn with_include_in_service_document(mut self, include: bool) -> Self {
        self.include_in_service_document = include;
        self
    }

    pub fn into_action_import(self) -> ContainerElement {
        ContainerElement::ActionImport(self)
    }

    pub fn into_function_import(self) -> ContainerElement {
        ContainerElement::FunctionImport(self)
    }
}
