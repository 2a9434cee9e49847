use std::collections::HashSet;

use crate::csdl::references::write_references;
use crate::csdl::schema::EdmSchema;
use crate::csdl::writer::{DefaultType, Node, SchemaWriter};
use crate::error::{CsdlError, InvalidOperation, Result};
use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

/// Depth-first walk over grouped schemas, deciding order, inlining and
/// default elision, and reporting every element to a [`SchemaWriter`]
pub struct SerializationVisitor<'m, S> {
    model: &'m EdmModel,
    writer: S,
}

impl<'m, S: SchemaWriter> SerializationVisitor<'m, S> {
    pub fn new(model: &'m EdmModel, writer: S) -> Self {
        Self { model, writer }
    }

    pub fn into_writer(self) -> S {
        self.writer
    }

    pub fn visit_model(&mut self, schemas: &[EdmSchema<'_>]) -> Result<()> {
        self.scoped(Node::Document, |v| {
            write_references(v.model, &mut v.writer)?;
            v.scoped(Node::DataServices, |v| {
                for schema in schemas {
                    v.visit_schema(schema)?;
                }
                Ok(())
            })
        })?;
        self.writer.flush()
    }

    /// Opens `node`, writes its children, then closes it
    fn scoped<F>(&mut self, node: Node<'_>, children: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.writer.begin(node)?;
        children(self)?;
        self.writer.end(node)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_schema(&mut self, schema: &EdmSchema<'_>) -> Result<()> {
        tracing::trace!(
            namespace = %schema.namespace,
            elements = schema.elements.len(),
            operations = schema.operations.len(),
            containers = schema.containers.len(),
            "Writing schema",
        );

        self.scoped(Node::Schema(schema), |v| {
            for element in &schema.elements {
                v.visit_schema_element(element)?;
            }

            for (name, overloads) in &schema.operations {
                v.scoped(Node::Operations(*name), |v| {
                    for operation in overloads {
                        v.visit_operation(operation)?;
                    }
                    Ok(())
                })?;
            }

            for container in &schema.containers {
                v.visit_entity_container(container)?;
            }

            if !schema.out_of_line_annotations.is_empty() {
                v.scoped(Node::OutOfLineAnnotations, |v| {
                    for (target, annotations) in &schema.out_of_line_annotations {
                        v.scoped(Node::AnnotationTarget(target.as_str()), |v| {
                            for annotation in annotations {
                                v.visit_annotation(annotation)?;
                            }
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    fn visit_schema_element(&mut self, element: &SchemaElement) -> Result<()> {
        tracing::trace!(element = %element.qualified_name(), "Writing schema element");

        match element {
            SchemaElement::EntityType(entity_type) => self.visit_entity_type(entity_type),
            SchemaElement::ComplexType(complex_type) => self.visit_complex_type(complex_type),
            SchemaElement::EnumType(enum_type) => self.visit_enum_type(enum_type),
            SchemaElement::TypeDefinition(definition) => self.visit_type_definition(definition),
            SchemaElement::Term(term) => self.visit_term(term),
            SchemaElement::Operation(operation) => Err(CsdlError::internal(format!(
                "operation {} must be written through its overload group",
                operation.qualified_name()
            ))),
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_entity_type(&mut self, entity_type: &EntityType) -> Result<()> {
        let owner = entity_type.qualified_name();
        let target = AnnotationTarget::Element(owner.clone());

        self.scoped(Node::EntityType(entity_type), |v| {
            v.visit_direct_annotations(&target)?;
            if !entity_type.key.is_empty() {
                v.writer.key(&entity_type.key)?;
            }
            for property in entity_type.structural_properties() {
                v.visit_structural_property(&owner, property)?;
            }
            for property in entity_type.navigation_properties() {
                v.visit_navigation_property(&owner, property)?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_complex_type(&mut self, complex_type: &ComplexType) -> Result<()> {
        let owner = complex_type.qualified_name();
        let target = AnnotationTarget::Element(owner.clone());

        self.scoped(Node::ComplexType(complex_type), |v| {
            v.visit_direct_annotations(&target)?;
            for property in complex_type.structural_properties() {
                v.visit_structural_property(&owner, property)?;
            }
            for property in complex_type.navigation_properties() {
                v.visit_navigation_property(&owner, property)?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_structural_property(
        &mut self,
        owner: &QualifiedName,
        property: &StructuralProperty,
    ) -> Result<()> {
        let target = AnnotationTarget::property(owner, &property.name);

        self.scoped(Node::StructuralProperty(property), |v| {
            let inline = property.type_ref.is_inline();
            if inline {
                v.visit_inline_type(&property.type_ref, DefaultType::String)?;
            }
            if let Some(default_value) = &property.default_value {
                v.writer.default_value(default_value)?;
            }
            v.visit_direct_annotations(&target)?;
            if !inline {
                v.visit_type_element(&property.type_ref)?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_navigation_property(
        &mut self,
        owner: &QualifiedName,
        property: &NavigationProperty,
    ) -> Result<()> {
        let target = AnnotationTarget::property(owner, &property.name);

        self.scoped(Node::NavigationProperty(property), |v| {
            v.visit_direct_annotations(&target)?;
            if property.on_delete != OnDeleteAction::None {
                v.writer.on_delete(property.on_delete)?;
            }
            if !property.referential_constraints.is_empty() {
                v.writer
                    .referential_constraints(&property.referential_constraints)?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_enum_type(&mut self, enum_type: &EnumType) -> Result<()> {
        let name = enum_type.qualified_name();
        let target = AnnotationTarget::Element(name.clone());

        self.scoped(Node::EnumType(enum_type), |v| {
            v.visit_direct_annotations(&target)?;
            for member in &enum_type.members {
                let member_target = AnnotationTarget::enum_member(&name, &member.name);
                v.scoped(Node::EnumMember(member), |v| {
                    v.visit_direct_annotations(&member_target)?;
                    v.visit_inline_annotations(&member_target)
                })?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_type_definition(&mut self, definition: &TypeDefinition) -> Result<()> {
        let target = AnnotationTarget::Element(QualifiedName::new(
            &definition.namespace,
            &definition.name,
        ));

        self.scoped(Node::TypeDefinition(definition), |v| {
            v.writer.facets(
                &definition.facets,
                definition.underlying_type.facet_kind(),
            )?;
            v.visit_direct_annotations(&target)?;
            v.visit_inline_annotations(&target)
        })
    }

    fn visit_term(&mut self, term: &Term) -> Result<()> {
        let target = AnnotationTarget::Element(term.qualified_name());

        self.scoped(Node::Term(term), |v| {
            let inline = term.type_ref.is_inline();
            if inline {
                v.visit_inline_type(&term.type_ref, DefaultType::String)?;
            }
            v.writer.term_applicability(term)?;
            if let Some(default_value) = &term.default_value {
                v.writer.default_value(default_value)?;
            }
            v.visit_direct_annotations(&target)?;
            if !inline {
                v.visit_type_element(&term.type_ref)?;
            }
            v.visit_inline_annotations(&target)
        })
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_operation(&mut self, operation: &Operation) -> Result<()> {
        let overload = operation.target();
        let target = AnnotationTarget::Operation(overload.clone());

        self.scoped(Node::Operation(operation), |v| {
            v.visit_direct_annotations(&target)?;

            if !operation.parameters.is_empty() {
                v.scoped(Node::Parameters, |v| {
                    for parameter in &operation.parameters {
                        let target = AnnotationTarget::Parameter {
                            operation: overload.clone(),
                            parameter: parameter.name.clone(),
                        };
                        v.scoped(Node::Parameter(parameter), |v| {
                            v.visit_typed_element(&parameter.type_ref, &target)
                        })?;
                    }
                    Ok(())
                })?;
            }

            if let Some(return_type) = &operation.return_type {
                let target = AnnotationTarget::ReturnType(overload.clone());
                v.scoped(Node::ReturnType(return_type), |v| {
                    v.visit_typed_element(&return_type.type_ref, &target)
                })?;
            }

            v.visit_inline_annotations(&target)
        })
    }

    /// Type, facets and annotations of a parameter or return type
    fn visit_typed_element(
        &mut self,
        type_ref: &TypeReference,
        target: &AnnotationTarget,
    ) -> Result<()> {
        if type_ref.is_inline() {
            self.visit_inline_type(type_ref, DefaultType::String)?;
            self.visit_direct_annotations(target)?;
        } else {
            self.visit_direct_annotations(target)?;
            self.visit_type_element(type_ref)?;
        }
        self.visit_inline_annotations(target)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_entity_container(&mut self, container: &EntityContainer) -> Result<()> {
        let name = container.qualified_name();
        let target = AnnotationTarget::Element(name.clone());
        // (import name, operation, entity set path)
        let mut written_imports: HashSet<(String, QualifiedName, Option<String>)> = HashSet::new();

        self.scoped(Node::EntityContainer(container), |v| {
            v.visit_direct_annotations(&target)?;

            for element in &container.elements {
                let element_target = AnnotationTarget::container_element(&name, element.name());
                match element {
                    ContainerElement::EntitySet(entity_set) => {
                        v.scoped(Node::EntitySet(entity_set), |v| {
                            v.visit_direct_annotations(&element_target)?;
                            if !entity_set.navigation_bindings.is_empty() {
                                v.writer
                                    .navigation_property_bindings(&entity_set.navigation_bindings)?;
                            }
                            v.visit_inline_annotations(&element_target)
                        })?;
                    }
                    ContainerElement::Singleton(singleton) => {
                        v.scoped(Node::Singleton(singleton), |v| {
                            v.visit_direct_annotations(&element_target)?;
                            if !singleton.navigation_bindings.is_empty() {
                                v.writer
                                    .navigation_property_bindings(&singleton.navigation_bindings)?;
                            }
                            v.visit_inline_annotations(&element_target)
                        })?;
                    }
                    ContainerElement::ActionImport(import)
                    | ContainerElement::FunctionImport(import) => {
                        let is_action = matches!(element, ContainerElement::ActionImport(_));
                        let entity_set = entity_set_path(import)?;

                        let key = (
                            import.name.clone(),
                            import.operation.clone(),
                            entity_set.clone(),
                        );
                        if !written_imports.insert(key) {
                            tracing::warn!(
                                container = %name,
                                import = %import.name,
                                operation = %import.operation,
                                "Skipping duplicate operation import",
                            );
                            continue;
                        }

                        v.scoped(
                            Node::OperationImport {
                                import,
                                is_action,
                                entity_set: entity_set.as_deref(),
                            },
                            |v| {
                                v.visit_direct_annotations(&element_target)?;
                                v.visit_inline_annotations(&element_target)
                            },
                        )?;
                    }
                }
            }

            v.visit_inline_annotations(&target)
        })
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_inline_annotations(&mut self, target: &AnnotationTarget) -> Result<()> {
        let model = self.model;
        for annotation in model.find_declared_vocabulary_annotations(target) {
            if model.is_inline_annotation(annotation) {
                self.visit_annotation(annotation)?;
            }
        }
        Ok(())
    }

    fn visit_direct_annotations(&mut self, target: &AnnotationTarget) -> Result<()> {
        let annotations = self.model.direct_value_annotations(target);
        if annotations.is_empty() {
            return Ok(());
        }
        self.writer.direct_annotations(&annotations)
    }

    fn visit_annotation(&mut self, annotation: &VocabularyAnnotation) -> Result<()> {
        self.scoped(Node::Annotation(annotation), |v| {
            v.visit_nested_value(&annotation.value)
        })
    }

    /// Value of an annotation, property value, labeled element or URL reference
    fn visit_nested_value(&mut self, value: &Expression) -> Result<()> {
        if value.is_inline_eligible() {
            self.writer.inline_expression(value)
        } else {
            self.visit_expression(value)
        }
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Binary(_)
            | Expression::Boolean(_)
            | Expression::Date(_)
            | Expression::DateTimeOffset(_)
            | Expression::Decimal(_)
            | Expression::Duration(_)
            | Expression::Floating(_)
            | Expression::Guid(_)
            | Expression::Integer(_)
            | Expression::String(_)
            | Expression::TimeOfDay(_)
            | Expression::Null
            | Expression::Path(_)
            | Expression::PropertyPath(_)
            | Expression::NavigationPropertyPath(_)
            | Expression::AnnotationPath(_)
            | Expression::LabeledElementReference(_)
            | Expression::EnumMember(_) => self.writer.expression(expression),
            Expression::Record(record) => self.scoped(Node::Record(record), |v| {
                for property in &record.properties {
                    v.scoped(Node::PropertyValue(property), |v| {
                        v.visit_nested_value(&property.value)
                    })?;
                }
                Ok(())
            }),
            Expression::Collection(items) => self.scoped(Node::Collection, |v| {
                for item in items {
                    v.visit_expression(item)?;
                }
                Ok(())
            }),
            Expression::If(expression) => self.scoped(Node::If, |v| {
                v.visit_expression(&expression.test)?;
                v.visit_expression(&expression.then)?;
                v.visit_expression(&expression.otherwise)
            }),
            Expression::Cast(expression) => self.visit_type_test(Node::Cast, expression),
            Expression::IsOf(expression) => self.visit_type_test(Node::IsOf, expression),
            Expression::Apply(apply) => self.scoped(Node::Apply(apply), |v| {
                for argument in &apply.arguments {
                    v.visit_expression(argument)?;
                }
                Ok(())
            }),
            Expression::LabeledElement(element) => {
                self.scoped(Node::LabeledElement(element), |v| {
                    v.visit_nested_value(&element.value)
                })
            }
            Expression::UrlRef(value) => {
                self.scoped(Node::UrlRef, |v| v.visit_nested_value(value))
            }
        }
    }

    /// XML writes the type as attributes ahead of the operand, JSON after it
    fn visit_type_test(&mut self, node: Node<'_>, expression: &TypeTestExpression) -> Result<()> {
        self.scoped(node, |v| {
            if v.writer.type_test_type_first() {
                v.visit_type_test_type(&expression.type_ref)?;
                v.visit_expression(&expression.operand)
            } else {
                v.visit_expression(&expression.operand)?;
                v.visit_type_test_type(&expression.type_ref)
            }
        })
    }

    fn visit_type_test_type(&mut self, type_ref: &TypeReference) -> Result<()> {
        if type_ref.is_inline() {
            self.writer.type_reference(type_ref, DefaultType::None)?;
            self.writer
                .facets(&type_ref.element_type().facets, self.model.facet_kind(type_ref))
        } else {
            self.visit_type_element(type_ref)
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn visit_inline_type(&mut self, type_ref: &TypeReference, default: DefaultType) -> Result<()> {
        let element = type_ref.element_type();
        self.writer.type_reference(type_ref, default)?;
        self.writer.nullable(element.nullable)?;
        self.writer
            .facets(&element.facets, self.model.facet_kind(type_ref))
    }

    /// Spells out a type that has no short form
    fn visit_type_element(&mut self, type_ref: &TypeReference) -> Result<()> {
        match &type_ref.definition {
            EdmType::Collection(inner) => {
                self.scoped(Node::CollectionType, |v| v.visit_type_element(inner))
            }
            EdmType::None => Err(CsdlError::internal(
                "type reference of kind None cannot be serialized",
            )),
            EdmType::Primitive(_)
            | EdmType::Named(_)
            | EdmType::EntityReference(_)
            | EdmType::Untyped => self.scoped(Node::TypeRef, |v| {
                v.visit_inline_type(type_ref, DefaultType::None)
            }),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Entity set path of an import, which must be a path expression
fn entity_set_path(import: &OperationImport) -> Result<Option<String>> {
    match &import.entity_set {
        None => Ok(None),
        Some(expression) => match expression.as_path() {
            Some(path) => Ok(Some(path.to_string())),
            None => Err(InvalidOperation::new(
                &import.name,
                "the entity set of an operation import must be a path expression",
            )
            .into()),
        },
    }
}
