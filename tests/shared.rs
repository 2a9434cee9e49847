#![allow(dead_code)]

use edm_csdl::csdl::*;
use edm_csdl::error::Result;
use edm_csdl::model::*;

///////////////////////////////////////////////////////////////////////////////

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Products and categories of the classic OData demo service
pub fn fixture() -> EdmModel {
    init_tracing();

    let mut model = EdmModel::new();
    model
        .add_element(
            EntityType::new("ODataDemo", "Product")
                .with_key(["ID"])
                .with_property(StructuralProperty::primitive("ID", PrimitiveKind::Int32, false))
                .with_property(StructuralProperty::new(
                    "Name",
                    TypeReference::string(true).with_facets(Facets::default().with_max_length(100)),
                ))
                .with_property(StructuralProperty::new(
                    "Price",
                    TypeReference::primitive(PrimitiveKind::Decimal, false).with_facets(
                        Facets::default()
                            .with_precision(10)
                            .with_scale(Scale::Value(2)),
                    ),
                ))
                .with_property(
                    NavigationProperty::single("Category", "ODataDemo.Category", true)
                        .with_partner("Products"),
                ),
        )
        .add_element(
            EntityType::new("ODataDemo", "Category")
                .with_key(["ID"])
                .with_property(StructuralProperty::primitive("ID", PrimitiveKind::Int32, false))
                .with_property(
                    NavigationProperty::many("Products", "ODataDemo.Product").with_partner("Category"),
                ),
        )
        .add_element(
            EnumType::new("ODataDemo", "Color")
                .with_member("Red", 0)
                .with_member("Green", 1),
        )
        .add_element(
            Operation::function("ODataDemo", "GetTop")
                .with_parameter("count", TypeReference::primitive(PrimitiveKind::Int32, false))
                .with_return_type(TypeReference::collection(TypeReference::named(
                    "ODataDemo.Product",
                    false,
                ))),
        )
        .add_container(
            EntityContainer::new("ODataDemo", "DemoService")
                .with_element(
                    EntitySet::new("Products", "ODataDemo.Product")
                        .with_binding("Category", BindingTarget::EntitySet("Categories".into())),
                )
                .with_element(
                    EntitySet::new("Categories", "ODataDemo.Category")
                        .with_binding("Products", BindingTarget::EntitySet("Products".into())),
                )
                .with_element(
                    OperationImport::new("GetTop", "ODataDemo.GetTop")
                        .with_entity_set(Expression::path("Products"))
                        .into_function_import(),
                ),
        )
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("ODataDemo.Product"),
            "Core.Description",
            Expression::string("A product"),
        ));
    model
}

/// Model with a single entity type in namespace `NS`, for tests that only
/// care about annotations
pub fn thing_model() -> EdmModel {
    init_tracing();

    let mut model = EdmModel::new();
    model.add_element(
        EntityType::new("NS", "Thing")
            .with_key(["Id"])
            .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Int32, false)),
    );
    model
}

///////////////////////////////////////////////////////////////////////////////

pub fn compact() -> CsdlWriterSettings {
    CsdlWriterSettings::default().with_xml_declaration(false)
}

pub fn to_xml(model: &EdmModel) -> Result<String> {
    to_xml_string(model, compact())
}

pub fn to_json(model: &EdmModel) -> Result<String> {
    to_json_string(model, compact())
}

pub fn to_json_ieee754(model: &EdmModel) -> Result<String> {
    to_json_string(model, compact().with_ieee754_compatible(true))
}
