use super::annotations::OperationTarget;
use super::names::QualifiedName;
use super::types::{Facets, PrimitiveKind, TypeReference};

///////////////////////////////////////////////////////////////////////////////

/// Top-level element declared inside a schema namespace
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaElement {
    EntityType(EntityType),
    ComplexType(ComplexType),
    EnumType(EnumType),
    TypeDefinition(TypeDefinition),
    Term(Term),
    Operation(Operation),
}

impl SchemaElement {
    pub fn name(&self) -> &str {
        match self {
            Self::EntityType(e) => &e.name,
            Self::ComplexType(e) => &e.name,
            Self::EnumType(e) => &e.name,
            Self::TypeDefinition(e) => &e.name,
            Self::Term(e) => &e.name,
            Self::Operation(e) => &e.name,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::EntityType(e) => &e.namespace,
            Self::ComplexType(e) => &e.namespace,
            Self::EnumType(e) => &e.namespace,
            Self::TypeDefinition(e) => &e.namespace,
            Self::Term(e) => &e.namespace,
            Self::Operation(e) => &e.namespace,
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.namespace(), self.name())
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Self::EntityType(_) | Self::ComplexType(_) | Self::EnumType(_) | Self::TypeDefinition(_)
        )
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Self::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Properties of entity and complex types
    pub fn properties(&self) -> &[Property] {
        match self {
            Self::EntityType(e) => &e.properties,
            Self::ComplexType(e) => &e.properties,
            _ => &[],
        }
    }

    pub fn base_type(&self) -> Option<&QualifiedName> {
        match self {
            Self::EntityType(e) => e.base_type.as_ref(),
            Self::ComplexType(e) => e.base_type.as_ref(),
            _ => None,
        }
    }
}

macro_rules! impl_into_schema_element {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for SchemaElement {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_into_schema_element!(
    EntityType,
    ComplexType,
    EnumType,
    TypeDefinition,
    Term,
    Operation
);

///////////////////////////////////////////////////////////////////////////////

// <EntityType Name="Employee">
//   <Key>
//     <PropertyRef Name="EmployeeID"/>
//   </Key>
//   <Property Name="LastName" Type="Edm.String" Nullable="false" MaxLength="20"/>
// </EntityType>
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    pub namespace: String,
    pub name: String,
    pub base_type: Option<QualifiedName>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub has_stream: bool,
    pub key: Vec<PropertyRef>,
    /// Structural and navigation properties in declaration order
    pub properties: Vec<Property>,
}

impl EntityType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            base_type: None,
            is_abstract: false,
            is_open: false,
            has_stream: false,
            key: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn with_base_type(mut self, base_type: impl Into<QualifiedName>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn with_stream(mut self, has_stream: bool) -> Self {
        self.has_stream = has_stream;
        self
    }

    pub fn with_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = names.into_iter().map(PropertyRef::new).collect();
        self
    }

    pub fn with_key_ref(mut self, key: PropertyRef) -> Self {
        self.key.push(key);
        self
    }

    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn structural_properties(&self) -> impl Iterator<Item = &StructuralProperty> {
        self.properties.iter().filter_map(Property::as_structural)
    }

    pub fn navigation_properties(&self) -> impl Iterator<Item = &NavigationProperty> {
        self.properties.iter().filter_map(Property::as_navigation)
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

/// Key member; `name` may be a path into a complex property, which requires an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub name: String,
    pub alias: Option<String>,
}

impl PropertyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    pub namespace: String,
    pub name: String,
    pub base_type: Option<QualifiedName>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub properties: Vec<Property>,
}

impl ComplexType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            base_type: None,
            is_abstract: false,
            is_open: false,
            properties: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn with_base_type(mut self, base_type: impl Into<QualifiedName>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn structural_properties(&self) -> impl Iterator<Item = &StructuralProperty> {
        self.properties.iter().filter_map(Property::as_structural)
    }

    pub fn navigation_properties(&self) -> impl Iterator<Item = &NavigationProperty> {
        self.properties.iter().filter_map(Property::as_navigation)
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Structural(StructuralProperty),
    Navigation(NavigationProperty),
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Self::Structural(p) => &p.name,
            Self::Navigation(p) => &p.name,
        }
    }

    pub fn type_ref(&self) -> &TypeReference {
        match self {
            Self::Structural(p) => &p.type_ref,
            Self::Navigation(p) => &p.type_ref,
        }
    }

    pub fn as_structural(&self) -> Option<&StructuralProperty> {
        match self {
            Self::Structural(p) => Some(p),
            Self::Navigation(_) => None,
        }
    }

    pub fn as_navigation(&self) -> Option<&NavigationProperty> {
        match self {
            Self::Navigation(p) => Some(p),
            Self::Structural(_) => None,
        }
    }
}

impl From<StructuralProperty> for Property {
    fn from(value: StructuralProperty) -> Self {
        Self::Structural(value)
    }
}

impl From<NavigationProperty> for Property {
    fn from(value: NavigationProperty) -> Self {
        Self::Navigation(value)
    }
}

/// See: https://docs.oasis-open.org/odata/odata-csdl-xml/v4.01/odata-csdl-xml-v4.01.html#sec_StructuralProperty
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralProperty {
    pub name: String,
    pub type_ref: TypeReference,
    pub default_value: Option<String>,
}

impl StructuralProperty {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default_value: None,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind, nullable: bool) -> Self {
        Self::new(name, TypeReference::primitive(kind, nullable))
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDeleteAction {
    #[default]
    None,
    Cascade,
    SetNull,
    SetDefault,
}

impl OnDeleteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Cascade => "Cascade",
            Self::SetNull => "SetNull",
            Self::SetDefault => "SetDefault",
        }
    }
}

/// Dependent property path and the principal property path it refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraint {
    pub property: String,
    pub referenced_property: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationProperty {
    pub name: String,
    pub type_ref: TypeReference,
    /// Name of the navigation property on the target type pointing back here
    pub partner: Option<String>,
    pub contains_target: bool,
    pub on_delete: OnDeleteAction,
    pub referential_constraints: Vec<ReferentialConstraint>,
}

impl NavigationProperty {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            partner: None,
            contains_target: false,
            on_delete: OnDeleteAction::None,
            referential_constraints: Vec::new(),
        }
    }

    /// Single-valued navigation to `target`
    pub fn single(name: impl Into<String>, target: impl Into<QualifiedName>, nullable: bool) -> Self {
        Self::new(name, TypeReference::named(target, nullable))
    }

    /// Collection-valued navigation to `target`
    pub fn many(name: impl Into<String>, target: impl Into<QualifiedName>) -> Self {
        Self::new(
            name,
            TypeReference::collection(TypeReference::named(target, false)),
        )
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn with_contains_target(mut self, contains_target: bool) -> Self {
        self.contains_target = contains_target;
        self
    }

    pub fn with_on_delete(mut self, action: OnDeleteAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn with_constraint(
        mut self,
        property: impl Into<String>,
        referenced_property: impl Into<String>,
    ) -> Self {
        self.referential_constraints.push(ReferentialConstraint {
            property: property.into(),
            referenced_property: referenced_property.into(),
        });
        self
    }

    pub fn target_type(&self) -> Option<&QualifiedName> {
        self.type_ref.referenced_name()
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub namespace: String,
    pub name: String,
    pub underlying_type: PrimitiveKind,
    pub is_flags: bool,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            underlying_type: PrimitiveKind::Int32,
            is_flags: false,
            members: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn with_underlying_type(mut self, kind: PrimitiveKind) -> Self {
        self.underlying_type = kind;
        self
    }

    pub fn with_flags(mut self, is_flags: bool) -> Self {
        self.is_flags = is_flags;
        self
    }

    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub namespace: String,
    pub name: String,
    pub underlying_type: PrimitiveKind,
    pub facets: Facets,
}

impl TypeDefinition {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        underlying_type: PrimitiveKind,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            underlying_type,
            facets: Facets::default(),
        }
    }

    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = facets;
        self
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub namespace: String,
    pub name: String,
    pub type_ref: TypeReference,
    /// Unqualified names of the element kinds the term can be applied to
    pub applies_to: Vec<String>,
    pub default_value: Option<String>,
    pub base_term: Option<QualifiedName>,
}

impl Term {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            type_ref,
            applies_to: Vec::new(),
            default_value: None,
            base_term: None,
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    /// Accepts comma or whitespace separated lists, e.g. `"Property,EntityType"`
    pub fn with_applies_to(mut self, applies_to: &str) -> Self {
        self.applies_to = applies_to
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_base_term(mut self, base_term: impl Into<QualifiedName>) -> Self {
        self.base_term = Some(base_term.into());
        self
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Action,
    Function { is_composable: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub namespace: String,
    pub name: String,
    pub kind: OperationKind,
    pub is_bound: bool,
    pub entity_set_path: Option<String>,
    pub parameters: Vec<OperationParameter>,
    pub return_type: Option<OperationReturn>,
}

impl Operation {
    fn new(namespace: impl Into<String>, name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            is_bound: false,
            entity_set_path: None,
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn action(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, OperationKind::Action)
    }

    pub fn function(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(
            namespace,
            name,
            OperationKind::Function {
                is_composable: false,
            },
        )
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, OperationKind::Action)
    }

    /// Bound operations take the binding parameter first
    pub fn with_bound(mut self, is_bound: bool) -> Self {
        self.is_bound = is_bound;
        self
    }

    pub fn with_composable(mut self, composable: bool) -> Self {
        if let OperationKind::Function { is_composable } = &mut self.kind {
            *is_composable = composable;
        }
        self
    }

    pub fn with_entity_set_path(mut self, path: impl Into<String>) -> Self {
        self.entity_set_path = Some(path.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_ref: TypeReference) -> Self {
        self.parameters.push(OperationParameter {
            name: name.into(),
            type_ref,
        });
        self
    }

    pub fn with_return_type(mut self, type_ref: TypeReference) -> Self {
        self.return_type = Some(OperationReturn { type_ref });
        self
    }

    /// Full type names of the parameters, identifying this overload
    pub fn signature(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| p.type_ref.full_name())
            .collect()
    }

    pub fn target(&self) -> OperationTarget {
        OperationTarget {
            operation: self.qualified_name(),
            signature: Some(self.signature()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationParameter {
    pub name: String,
    pub type_ref: TypeReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationReturn {
    pub type_ref: TypeReference,
}
