mod shared;

use edm_csdl::csdl::*;
use edm_csdl::model::*;
use shared::*;

///////////////////////////////////////////////////////////////////////////////

#[test]
fn test_fixture_is_valid() {
    let model = fixture();
    assert_eq!(validate(&model), []);
}

#[test]
fn test_only_significant_errors_block_writing() {
    let mut model = thing_model();
    model
        .add_element(EntityType::new("NS", "Thing"))
        .add_element(ComplexType::new("NS", "bad name"));

    let codes: Vec<_> = validate(&model).into_iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        [EdmErrorCode::AlreadyDefined, EdmErrorCode::InvalidName]
    );
    assert!(serialization_errors(&model).is_empty());
    assert!(to_xml(&model).is_ok());
}

#[test]
fn test_kind_none_is_rejected() {
    let mut model = EdmModel::new();
    model.add_element(Term::new("NS", "Broken", TypeReference::none()));

    let errors = serialization_errors(&model);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, EdmErrorCode::TypeMustNotHaveKindOfNone);
    assert_eq!(errors[0].location, "NS.Broken");
    assert_eq!(
        errors[0].to_string(),
        "TypeMustNotHaveKindOfNone at NS.Broken: type reference has kind None"
    );
}

#[test]
fn test_referenced_names_must_be_valid() {
    let mut model = EdmModel::new();
    model.add_element(
        ComplexType::new("NS", "Holder").with_property(StructuralProperty::new(
            "Value",
            TypeReference::named(QualifiedName::new("NS", "not valid"), true),
        )),
    );

    let errors = serialization_errors(&model);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, EdmErrorCode::ReferencedTypeMustHaveValidName);
    assert_eq!(errors[0].location, "NS.Holder/Value");
}

#[test]
fn test_external_types_resolve_through_references() {
    let mut model = EdmModel::new();
    model
        .add_reference(
            EdmReference::new("http://example.com/Shared.xml").with_include("Shared", None),
        )
        .add_element(
            ComplexType::new("NS", "Holder")
                .with_property(StructuralProperty::new(
                    "Address",
                    TypeReference::named("Shared.Address", true),
                ))
                .with_property(StructuralProperty::new(
                    "Missing",
                    TypeReference::named("Elsewhere.Address", true),
                )),
        );

    let errors = validate(&model);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, EdmErrorCode::BadUnresolvedType);
    assert_eq!(errors[0].location, "NS.Holder/Missing");
}

#[test]
fn test_partner_may_be_inherited() {
    let mut model = EdmModel::new();
    model
        .add_element(
            EntityType::new("NS", "Person")
                .with_key(["Id"])
                .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Int32, false))
                .with_property(NavigationProperty::many("Orders", "NS.Order").with_partner("Customer")),
        )
        .add_element(
            EntityType::new("NS", "BaseOrder")
                .with_key(["Id"])
                .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Int32, false))
                .with_property(
                    NavigationProperty::single("Customer", "NS.Person", true).with_partner("Orders"),
                ),
        )
        .add_element(EntityType::new("NS", "Order").with_base_type("NS.BaseOrder"));

    assert_eq!(serialization_errors(&model), []);
    assert!(to_xml(&model).is_ok());

    model.add_element(
        EntityType::new("NS", "Invoice")
            .with_property(NavigationProperty::single("Payer", "NS.Order", true).with_partner("Customer")),
    );
    let errors = serialization_errors(&model);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, EdmErrorCode::NavigationPartnerInvalid);
    assert_eq!(errors[0].location, "NS.Invoice/Payer");
}
