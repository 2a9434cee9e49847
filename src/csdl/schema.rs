use indexmap::{IndexMap, IndexSet};

use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

/// Elements of one namespace as they are written into a `Schema`
#[derive(Debug)]
pub struct EdmSchema<'m> {
    pub namespace: String,
    pub alias: Option<&'m str>,
    /// Non-operation elements in model order
    pub elements: Vec<&'m SchemaElement>,
    /// Overloads keyed by unqualified operation name, first-seen order
    pub operations: IndexMap<&'m str, Vec<&'m Operation>>,
    pub containers: Vec<&'m EntityContainer>,
    /// Out-of-line annotations keyed by target path
    pub out_of_line_annotations: IndexMap<String, Vec<&'m VocabularyAnnotation>>,
    /// Foreign namespaces this schema refers to, `Edm` excluded. Diagnostic
    /// only: checked against declared and included namespaces, never written.
    pub used_namespaces: IndexSet<String>,
    /// Namespace URIs of direct value annotations on elements of this schema
    pub annotation_namespaces: Vec<String>,
}

impl<'m> EdmSchema<'m> {
    pub fn new(namespace: impl Into<String>, alias: Option<&'m str>) -> Self {
        Self {
            namespace: namespace.into(),
            alias,
            elements: Vec::new(),
            operations: IndexMap::new(),
            containers: Vec::new(),
            out_of_line_annotations: IndexMap::new(),
            used_namespaces: IndexSet::new(),
            annotation_namespaces: Vec::new(),
        }
    }

    pub fn add_element(&mut self, element: &'m SchemaElement) {
        match element {
            SchemaElement::Operation(operation) => {
                self.operations
                    .entry(operation.name.as_str())
                    .or_default()
                    .push(operation);
            }
            _ => self.elements.push(element),
        }
    }

    pub fn add_container(&mut self, container: &'m EntityContainer) {
        self.containers.push(container);
    }

    pub fn add_out_of_line_annotation(&mut self, annotation: &'m VocabularyAnnotation) {
        self.out_of_line_annotations
            .entry(annotation.target.path())
            .or_default()
            .push(annotation);
    }

    pub fn add_annotation_namespace(&mut self, namespace_uri: &str) {
        if !self.annotation_namespaces.iter().any(|uri| uri == namespace_uri) {
            self.annotation_namespaces.push(namespace_uri.to_string());
        }
    }

    /// Records a reference to `name` unless it is built-in or local
    pub fn add_namespace_using(&mut self, name: &QualifiedName) {
        if name.is_edm() || name.namespace == self.namespace || name.namespace.is_empty() {
            return;
        }
        self.used_namespaces.insert(name.namespace.clone());
    }

    fn add_type_using(&mut self, type_ref: &TypeReference) {
        match &type_ref.definition {
            EdmType::Named(name) | EdmType::EntityReference(name) => self.add_namespace_using(name),
            EdmType::Collection(inner) => self.add_type_using(inner),
            EdmType::Primitive(_) | EdmType::Untyped | EdmType::None => {}
        }
    }

    fn add_properties_using(&mut self, properties: &[Property]) {
        for property in properties {
            self.add_type_using(property.type_ref());
        }
    }

    fn add_element_usings(&mut self, element: &SchemaElement) {
        match element {
            SchemaElement::EntityType(entity_type) => {
                if let Some(base_type) = &entity_type.base_type {
                    self.add_namespace_using(base_type);
                }
                self.add_properties_using(&entity_type.properties);
            }
            SchemaElement::ComplexType(complex_type) => {
                if let Some(base_type) = &complex_type.base_type {
                    self.add_namespace_using(base_type);
                }
                self.add_properties_using(&complex_type.properties);
            }
            // Underlying types of enums and type definitions are always primitive
            SchemaElement::EnumType(_) | SchemaElement::TypeDefinition(_) => {}
            SchemaElement::Term(term) => {
                self.add_type_using(&term.type_ref);
                if let Some(base_term) = &term.base_term {
                    self.add_namespace_using(base_term);
                }
            }
            SchemaElement::Operation(operation) => {
                for parameter in &operation.parameters {
                    self.add_type_using(&parameter.type_ref);
                }
                if let Some(return_type) = &operation.return_type {
                    self.add_type_using(&return_type.type_ref);
                }
            }
        }
    }

    fn add_container_usings(&mut self, container: &EntityContainer) {
        if let Some(extends) = &container.extends {
            self.add_namespace_using(extends);
        }
        for element in &container.elements {
            match element {
                ContainerElement::EntitySet(entity_set) => {
                    self.add_namespace_using(&entity_set.entity_type)
                }
                ContainerElement::Singleton(singleton) => {
                    self.add_namespace_using(&singleton.entity_type)
                }
                ContainerElement::ActionImport(import) | ContainerElement::FunctionImport(import) => {
                    self.add_namespace_using(&import.operation)
                }
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Partitions the model into one [`EdmSchema`] per namespace.
///
/// Schemas appear in the order their namespace is first seen on an element,
/// then on a container. Out-of-line annotations go to their explicit schema
/// namespace, else to the first schema.
pub fn group_schemas(model: &EdmModel) -> Vec<EdmSchema<'_>> {
    let mut schemas: IndexMap<String, EdmSchema<'_>> = IndexMap::new();

    fn schema_for<'a, 'm>(
        schemas: &'a mut IndexMap<String, EdmSchema<'m>>,
        model: &'m EdmModel,
        namespace: &str,
    ) -> &'a mut EdmSchema<'m> {
        schemas
            .entry(namespace.to_string())
            .or_insert_with(|| EdmSchema::new(namespace, model.namespace_alias(namespace)))
    }

    for element in model.schema_elements() {
        let schema = schema_for(&mut schemas, model, element.namespace());
        schema.add_element(element);
        schema.add_element_usings(element);
    }

    for container in model.entity_containers() {
        let schema = schema_for(&mut schemas, model, &container.namespace);
        schema.add_container(container);
        schema.add_container_usings(container);
    }

    for annotation in model.vocabulary_annotations() {
        let namespace = if model.is_inline_annotation(annotation) {
            annotation.target.root().namespace.clone()
        } else {
            annotation
                .schema_namespace
                .clone()
                .or_else(|| schemas.keys().next().cloned())
                .unwrap_or_default()
        };
        let schema = schema_for(&mut schemas, model, &namespace);
        if !model.is_inline_annotation(annotation) {
            schema.add_out_of_line_annotation(annotation);
        }
        schema.add_namespace_using(&annotation.term);
    }

    for annotation in model.all_direct_value_annotations() {
        let namespace = &annotation.target.root().namespace;
        if let Some(schema) = schemas.get_mut(namespace) {
            schema.add_annotation_namespace(&annotation.namespace_uri);
        }
    }

    let known: IndexSet<&str> = model
        .declared_namespaces()
        .into_iter()
        .chain(model.included_namespaces())
        .collect();
    for schema in schemas.values() {
        for namespace in &schema.used_namespaces {
            if !known.contains(namespace.as_str()) {
                tracing::warn!(
                    schema = %schema.namespace,
                    namespace = %namespace,
                    "Schema refers to a namespace that is neither declared nor referenced",
                );
            }
        }
    }

    schemas.into_values().collect()
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_schemas() {
        let mut model = EdmModel::new();
        model
            .add_element(EntityType::new("A", "Product").with_property(
                StructuralProperty::new("Category", TypeReference::named("B.Category", true)),
            ))
            .add_element(ComplexType::new("B", "Category"))
            .add_element(Operation::action("A", "Reset"))
            .add_element(EnumType::new("A", "Color"))
            .add_element(
                Operation::action("A", "Reset")
                    .with_parameter("all", TypeReference::primitive(PrimitiveKind::Boolean, false)),
            )
            .add_container(EntityContainer::new("C", "Service"))
            .add_annotation(VocabularyAnnotation::new(
                AnnotationTarget::element("External.Thing"),
                "Core.Description",
                Expression::string("x"),
            ));

        let schemas = group_schemas(&model);
        let namespaces: Vec<_> = schemas.iter().map(|s| s.namespace.as_str()).collect();
        assert_eq!(namespaces, ["A", "B", "C"]);

        let a = &schemas[0];
        assert_eq!(a.elements.len(), 2);
        assert_eq!(a.operations["Reset"].len(), 2);
        assert!(a.used_namespaces.contains("B"));
        assert!(a.used_namespaces.contains("Core"));
        assert_eq!(a.out_of_line_annotations["External.Thing"].len(), 1);

        assert!(schemas[1].used_namespaces.is_empty());
        assert_eq!(schemas[2].containers.len(), 1);
    }

    #[test]
    fn test_annotations_without_schema_use_empty_namespace() {
        let mut model = EdmModel::new();
        model.add_annotation(
            VocabularyAnnotation::new(
                AnnotationTarget::element("External.Thing"),
                "Core.Description",
                Expression::string("x"),
            )
            .with_location(SerializationLocation::OutOfLine),
        );

        let schemas = group_schemas(&model);
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].namespace, "");
        assert_eq!(schemas[0].out_of_line_annotations.len(), 1);
    }
}
