mod shared;

use edm_csdl::csdl::*;
use edm_csdl::error::CsdlError;
use edm_csdl::model::*;
use indoc::indoc;
use shared::*;

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_metadata() {
    let model = fixture();

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r#"
            {"$Version":"4.0","$EntityContainer":"ODataDemo.DemoService",
            "ODataDemo":{
            "Product":{"$Kind":"EntityType","$Key":["ID"],
            "ID":{"$Type":"Edm.Int32"},
            "Name":{"$Nullable":true,"$MaxLength":100},
            "Price":{"$Type":"Edm.Decimal","$Precision":10,"$Scale":2},
            "Category":{"$Kind":"NavigationProperty","$Type":"ODataDemo.Category","$Nullable":true,"$Partner":"Products"},
            "@Core.Description":"A product"},
            "Category":{"$Kind":"EntityType","$Key":["ID"],
            "ID":{"$Type":"Edm.Int32"},
            "Products":{"$Kind":"NavigationProperty","$Collection":true,"$Type":"ODataDemo.Product","$Partner":"Category"}},
            "Color":{"$Kind":"EnumType","Red":0,"Green":1},
            "GetTop":[{"$Kind":"Function",
            "$Parameter":[{"$Name":"count","$Type":"Edm.Int32"}],
            "$ReturnType":{"$Collection":true,"$Type":"ODataDemo.Product"}}],
            "DemoService":{"$Kind":"EntityContainer",
            "Products":{"$Collection":true,"$Type":"ODataDemo.Product","$NavigationPropertyBinding":{"Category":"Categories"}},
            "Categories":{"$Collection":true,"$Type":"ODataDemo.Category","$NavigationPropertyBinding":{"Products":"Products"}},
            "GetTop":{"$Function":"ODataDemo.GetTop","$EntitySet":"Products"}}}}
            "#
        )
        .replace('\n', "")
    );

    // Output is well-formed JSON
    let value: serde_json::Value = serde_json::from_str(&to_json(&model).unwrap()).unwrap();
    assert_eq!(value["ODataDemo"]["Product"]["$Kind"], "EntityType");
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_term_with_default_type() {
    let mut model = EdmModel::new();
    model.add_element(
        Term::new("NS", "Tag", TypeReference::string(false)).with_applies_to("Property,EntityType"),
    );

    assert_eq!(
        to_json(&model).unwrap(),
        r#"{"$Version":"4.0","NS":{"Tag":{"$Kind":"Term","$AppliesTo":["Property","EntityType"]}}}"#
    );
}

#[test]
fn test_pretty_output() {
    let mut model = EdmModel::new();
    model.add_element(
        Term::new("NS", "Tag", TypeReference::string(false)).with_applies_to("Property,EntityType"),
    );

    assert_eq!(
        to_json_string(&model, compact().with_indent(true)).unwrap(),
        indoc!(
            r#"
            {
              "$Version": "4.0",
              "NS": {
                "Tag": {
                  "$Kind": "Term",
                  "$AppliesTo": [
                    "Property",
                    "EntityType"
                  ]
                }
              }
            }"#
        )
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_ieee754_compatible_numbers() {
    let mut model = thing_model();
    model
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Measures.Max",
            Expression::Integer(9007199254740993),
        ))
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Measures.Scale",
            Expression::Decimal(DecimalLiteral::parse("12.50").unwrap()),
        ));

    let expected = |max: &str, scale: &str| {
        format!(
            r#"{{"$Version":"4.0","NS":{{"Thing":{{"$Kind":"EntityType","$Key":["Id"],"Id":{{"$Type":"Edm.Int32"}},"@Measures.Max":{max},"@Measures.Scale":{scale}}}}}}}"#
        )
    };

    assert_eq!(
        to_json_ieee754(&model).unwrap(),
        expected(r#""9007199254740993""#, r#""12.50""#)
    );
    assert_eq!(
        to_json(&model).unwrap(),
        expected("9007199254740993", "12.50")
    );
}

#[test]
fn test_special_float_values() {
    let mut model = thing_model();
    model
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Measures.Upper",
            Expression::Floating(f64::INFINITY),
        ))
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Measures.Lower",
            Expression::Floating(f64::NEG_INFINITY),
        ))
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Measures.Step",
            Expression::Floating(0.5),
        ));

    let json = to_json(&model).unwrap();
    assert!(
        json.contains(r#""@Measures.Upper":"INF","@Measures.Lower":"-INF","@Measures.Step":0.5"#),
        "{json}"
    );
}

#[test]
fn test_binary_is_base64url() {
    let mut model = thing_model();
    model.add_annotation(VocabularyAnnotation::new(
        AnnotationTarget::element("NS.Thing"),
        "Core.Thumbnail",
        Expression::Binary(vec![0xFF, 0xFE]),
    ));

    let json = to_json(&model).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let encoded = value["NS"]["Thing"]["@Core.Thumbnail"].as_str().unwrap();
    assert_eq!(encoded, "__4");
    assert!(!encoded.contains(['+', '/', '=']));

    // XML keeps the standard alphabet
    assert!(to_xml(&model)
        .unwrap()
        .contains(r#"<Annotation Term="Core.Thumbnail" Binary="//4="/>"#));
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_overloads_share_one_member() {
    let mut model = EdmModel::new();
    model
        .add_element(
            Operation::function("NS", "Area")
                .with_parameter("radius", TypeReference::primitive(PrimitiveKind::Double, false))
                .with_return_type(TypeReference::primitive(PrimitiveKind::Double, false)),
        )
        .add_element(ComplexType::new("NS", "Shape"))
        .add_element(
            Operation::function("NS", "Area")
                .with_bound(true)
                .with_composable(true)
                .with_parameter("shape", TypeReference::named("NS.Shape", false))
                .with_return_type(TypeReference::primitive(PrimitiveKind::Double, true)),
        );

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r#"
            {"$Version":"4.0","NS":{
            "Shape":{"$Kind":"ComplexType"},
            "Area":[
            {"$Kind":"Function",
            "$Parameter":[{"$Name":"radius","$Type":"Edm.Double"}],
            "$ReturnType":{"$Type":"Edm.Double"}},
            {"$Kind":"Function","$IsBound":true,"$IsComposable":true,
            "$Parameter":[{"$Name":"shape","$Type":"NS.Shape"}],
            "$ReturnType":{"$Type":"Edm.Double","$Nullable":true}}]}}
            "#
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_operation_imports_are_deduplicated() {
    let mut model = EdmModel::new();
    model
        .add_element(
            EntityType::new("NS", "Order")
                .with_key(["Id"])
                .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Int32, false)),
        )
        .add_element(Operation::action("NS", "Reset"))
        .add_container(
            EntityContainer::new("NS", "Service")
                .with_element(EntitySet::new("Orders", "NS.Order"))
                .with_element(EntitySet::new("Archive", "NS.Order"))
                .with_element(
                    OperationImport::new("Reset", "NS.Reset")
                        .with_entity_set(Expression::path("Orders"))
                        .into_action_import(),
                )
                .with_element(
                    OperationImport::new("Reset", "NS.Reset")
                        .with_entity_set(Expression::path("Orders"))
                        .into_action_import(),
                )
                .with_element(
                    OperationImport::new("Reset", "NS.Reset")
                        .with_entity_set(Expression::path("Archive"))
                        .into_action_import(),
                ),
        );

    let json = to_json(&model).unwrap();
    assert_eq!(
        json.matches(r#""$EntitySet":"Orders""#).count(),
        1,
        "duplicate import written twice: {json}"
    );
    assert_eq!(
        json,
        indoc!(
            r#"
            {"$Version":"4.0","$EntityContainer":"NS.Service","NS":{
            "Order":{"$Kind":"EntityType","$Key":["Id"],"Id":{"$Type":"Edm.Int32"}},
            "Reset":[{"$Kind":"Action"}],
            "Service":{"$Kind":"EntityContainer",
            "Orders":{"$Collection":true,"$Type":"NS.Order"},
            "Archive":{"$Collection":true,"$Type":"NS.Order"},
            "Reset":{"$Action":"NS.Reset","$EntitySet":"Orders"},
            "Reset":{"$Action":"NS.Reset","$EntitySet":"Archive"}}}}
            "#
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_annotation_on_all_overloads_is_written_once() {
    let mut model = EdmModel::new();
    model
        .add_element(
            Operation::action("NS", "Reset")
                .with_parameter("all", TypeReference::primitive(PrimitiveKind::Boolean, false)),
        )
        .add_element(Operation::action("NS", "Reset"))
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::Operation(OperationTarget::all_overloads("NS.Reset")),
            "Core.Description",
            Expression::string("once"),
        ));

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r#"
            {"$Version":"4.0","NS":{
            "Reset":[
            {"$Kind":"Action","$Parameter":[{"$Name":"all","$Type":"Edm.Boolean"}]},
            {"$Kind":"Action"}],
            "$Annotations":{"NS.Reset":{"@Core.Description":"once"}}}}
            "#
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_references_and_aliases() {
    let mut model = EdmModel::new();
    model
        .add_reference(
            EdmReference::new("http://example.com/Core.xml")
                .with_include("Org.OData.Core.V1", Some("Core")),
        )
        .add_reference(
            EdmReference::new("http://example.com/Annotations.xml").with_include_annotations(
                EdmIncludeAnnotations::new("Org.OData.Measures.V1").with_qualifier("Tablet"),
            ),
        )
        .set_namespace_alias("Sales.Model", "self")
        .add_element(
            EntityType::new("Sales.Model", "Customer")
                .with_key_ref(PropertyRef::new("Info/Id").with_alias("CustomerId"))
                .with_property(StructuralProperty::new(
                    "Info",
                    TypeReference::named("Sales.Model.Info", false),
                ))
                .with_property(StructuralProperty::new(
                    "Tier",
                    TypeReference::named("Sales.Model.Tier", true),
                )),
        )
        .add_element(
            ComplexType::new("Sales.Model", "Info")
                .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Guid, false)),
        )
        .add_element(
            EnumType::new("Sales.Model", "Tier")
                .with_underlying_type(PrimitiveKind::Byte)
                .with_flags(true)
                .with_member("Silver", 1)
                .with_member("Gold", 2),
        )
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::property("Sales.Model.Customer", "Tier"),
            "Org.OData.Core.V1.Description",
            Expression::string("Loyalty tier"),
        ))
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::enum_member("Sales.Model.Tier", "Gold"),
            "Org.OData.Core.V1.Description",
            Expression::string("Top tier"),
        ));

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r#"
            {"$Version":"4.0",
            "$Reference":{
            "http://example.com/Core.xml":{"$Include":[{"$Namespace":"Org.OData.Core.V1","$Alias":"Core"}]},
            "http://example.com/Annotations.xml":{"$IncludeAnnotations":[{"$TermNamespace":"Org.OData.Measures.V1","$Qualifier":"Tablet"}]}},
            "Sales.Model":{"$Alias":"self",
            "Customer":{"$Kind":"EntityType","$Key":[{"CustomerId":"Info/Id"}],
            "Info":{"$Type":"self.Info"},
            "Tier":{"$Type":"self.Tier","$Nullable":true,"@Core.Description":"Loyalty tier"}},
            "Info":{"$Kind":"ComplexType","Id":{"$Type":"Edm.Guid"}},
            "Tier":{"$Kind":"EnumType","$UnderlyingType":"Edm.Byte","$IsFlags":true,
            "Silver":1,"Gold":2,"Gold@Core.Description":"Top tier"}}}
            "#
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_out_of_line_annotations() {
    let mut model = thing_model();
    model
        .add_annotation(
            VocabularyAnnotation::new(
                AnnotationTarget::element("NS.Thing"),
                "UI.HeaderInfo",
                RecordExpression::typed("UI.HeaderInfoType")
                    .with_property("TypeName", Expression::string("Thing"))
                    .with_property(
                        "Title",
                        RecordExpression::typed("UI.DataField")
                            .with_property("Value", Expression::path("Id"))
                            .into(),
                    )
                    .into(),
            )
            .with_qualifier("Short"),
        )
        .add_annotation(
            VocabularyAnnotation::new(
                AnnotationTarget::element("NS.Thing"),
                "Core.LongDescription",
                Expression::Null,
            )
            .with_location(SerializationLocation::OutOfLine),
        )
        .add_annotation(VocabularyAnnotation::new(
            AnnotationTarget::container_element("Other.Service", "Things"),
            "Capabilities.Countable",
            Expression::Collection(vec![
                Expression::enum_member("Other.Flags", ["A", "B"]),
                Expression::Integer(3),
            ]),
        ));

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r#"
            {"$Version":"4.0","NS":{
            "Thing":{"$Kind":"EntityType","$Key":["Id"],"Id":{"$Type":"Edm.Int32"}},
            "$Annotations":{
            "NS.Thing":{
            "@UI.HeaderInfo#Short":{"@type":"UI.HeaderInfoType","TypeName":"Thing",
            "Title":{"@type":"UI.DataField","Value":{"$Path":"Id"}}},
            "@Core.LongDescription":null},
            "Other.Service/Things":{
            "@Capabilities.Countable":[{"$EnumMember":"Other.Flags/A Other.Flags/B"},3]}}}}
            "#
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_dynamic_expressions() {
    let mut model = thing_model();
    model.add_annotation(
        VocabularyAnnotation::new(
            AnnotationTarget::element("NS.Thing"),
            "Core.Description",
            Expression::if_then_else(
                Expression::is_of(
                    TypeReference::named("NS.Thing", true),
                    Expression::path("Parent"),
                ),
                Expression::apply(
                    "odata.concat",
                    vec![Expression::string("#"), Expression::path("Id")],
                ),
                Expression::cast(
                    TypeReference::string(true).with_facets(Facets::default().with_max_length(10)),
                    Expression::labeled("Fallback", Expression::string("none")),
                ),
            ),
        )
        .with_location(SerializationLocation::Inline),
    );

    assert_eq!(
        to_json(&model).unwrap(),
        indoc!(
            r##"
            {"$Version":"4.0","NS":{
            "Thing":{"$Kind":"EntityType","$Key":["Id"],"Id":{"$Type":"Edm.Int32"},
            "@Core.Description":{"$If":[
            {"$IsOf":{"$Path":"Parent"},"$Type":"NS.Thing"},
            {"$Apply":["#",{"$Path":"Id"}],"$Function":"odata.concat"},
            {"$Cast":{"$LabeledElement":"none","$Name":"Fallback"},"$Type":"Edm.String","$MaxLength":10}
            ]}}}}
            "##
        )
        .replace('\n', "")
    );
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_nested_collections_are_xml_only() {
    let mut model = EdmModel::new();
    model.add_element(ComplexType::new("NS", "Grid").with_property(StructuralProperty::new(
        "Cells",
        TypeReference::collection(TypeReference::collection(TypeReference::primitive(
            PrimitiveKind::Int32,
            false,
        ))),
    )));

    assert!(to_xml(&model).unwrap().contains(
        r#"<Property Name="Cells"><CollectionType><CollectionType><TypeRef Type="Edm.Int32" Nullable="false"/></CollectionType></CollectionType></Property>"#
    ));

    let err = to_json(&model).unwrap_err();
    assert!(matches!(err, CsdlError::UnsupportedFeature(_)), "{err:?}");
}

#[test]
fn test_invalid_model_is_rejected() {
    let mut model = EdmModel::new();
    model.add_element(
        EnumType::new("NS", "Level")
            .with_underlying_type(PrimitiveKind::SByte)
            .with_member("Max", 200),
    );

    let errors = serialization_errors(&model);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, EdmErrorCode::EnumMemberValueOutOfRange);

    match to_json(&model) {
        Err(CsdlError::Validation(failed)) => assert_eq!(failed.errors, errors),
        other => panic!("expected validation error, got {other:?}"),
    }
}
