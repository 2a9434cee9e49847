use super::names::{QualifiedName, EDM_NAMESPACE};

///////////////////////////////////////////////////////////////////////////////

// See: https://docs.oasis-open.org/odata/odata-csdl-xml/v4.01/odata-csdl-xml-v4.01.html#sec_PrimitiveTypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
    /// Abstract `Edm.PrimitiveType`
    PrimitiveType,
}

impl PrimitiveKind {
    pub fn full_name(self) -> &'static str {
        match self {
            Self::Binary => "Edm.Binary",
            Self::Boolean => "Edm.Boolean",
            Self::Byte => "Edm.Byte",
            Self::Date => "Edm.Date",
            Self::DateTimeOffset => "Edm.DateTimeOffset",
            Self::Decimal => "Edm.Decimal",
            Self::Double => "Edm.Double",
            Self::Duration => "Edm.Duration",
            Self::Guid => "Edm.Guid",
            Self::Int16 => "Edm.Int16",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::SByte => "Edm.SByte",
            Self::Single => "Edm.Single",
            Self::Stream => "Edm.Stream",
            Self::String => "Edm.String",
            Self::TimeOfDay => "Edm.TimeOfDay",
            Self::Geography => "Edm.Geography",
            Self::GeographyPoint => "Edm.GeographyPoint",
            Self::GeographyLineString => "Edm.GeographyLineString",
            Self::GeographyPolygon => "Edm.GeographyPolygon",
            Self::GeographyMultiPoint => "Edm.GeographyMultiPoint",
            Self::GeographyMultiLineString => "Edm.GeographyMultiLineString",
            Self::GeographyMultiPolygon => "Edm.GeographyMultiPolygon",
            Self::GeographyCollection => "Edm.GeographyCollection",
            Self::Geometry => "Edm.Geometry",
            Self::GeometryPoint => "Edm.GeometryPoint",
            Self::GeometryLineString => "Edm.GeometryLineString",
            Self::GeometryPolygon => "Edm.GeometryPolygon",
            Self::GeometryMultiPoint => "Edm.GeometryMultiPoint",
            Self::GeometryMultiLineString => "Edm.GeometryMultiLineString",
            Self::GeometryMultiPolygon => "Edm.GeometryMultiPolygon",
            Self::GeometryCollection => "Edm.GeometryCollection",
            Self::PrimitiveType => "Edm.PrimitiveType",
        }
    }

    /// Name without the `Edm.` prefix
    pub fn name(self) -> &'static str {
        &self.full_name()[EDM_NAMESPACE.len() + 1..]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("Edm.").unwrap_or(name);
        ALL_PRIMITIVE_KINDS
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
    }

    pub fn is_integer(self) -> bool {
        self.integer_range().is_some()
    }

    /// Inclusive value range of the integral kinds
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Byte => Some((u8::MIN as i64, u8::MAX as i64)),
            Self::SByte => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    pub fn facet_kind(self) -> Option<FacetKind> {
        match self {
            Self::Binary => Some(FacetKind::Binary),
            Self::String => Some(FacetKind::String),
            Self::Decimal => Some(FacetKind::Decimal),
            Self::DateTimeOffset | Self::Duration | Self::TimeOfDay => Some(FacetKind::Temporal),
            Self::Geography
            | Self::GeographyPoint
            | Self::GeographyLineString
            | Self::GeographyPolygon
            | Self::GeographyMultiPoint
            | Self::GeographyMultiLineString
            | Self::GeographyMultiPolygon
            | Self::GeographyCollection => Some(FacetKind::Spatial(SpatialFamily::Geography)),
            Self::Geometry
            | Self::GeometryPoint
            | Self::GeometryLineString
            | Self::GeometryPolygon
            | Self::GeometryMultiPoint
            | Self::GeometryMultiLineString
            | Self::GeometryMultiPolygon
            | Self::GeometryCollection => Some(FacetKind::Spatial(SpatialFamily::Geometry)),
            Self::Boolean
            | Self::Byte
            | Self::Date
            | Self::Double
            | Self::Guid
            | Self::Int16
            | Self::Int32
            | Self::Int64
            | Self::SByte
            | Self::Single
            | Self::Stream
            | Self::PrimitiveType => None,
        }
    }
}

const ALL_PRIMITIVE_KINDS: [PrimitiveKind; 34] = [
    PrimitiveKind::Binary,
    PrimitiveKind::Boolean,
    PrimitiveKind::Byte,
    PrimitiveKind::Date,
    PrimitiveKind::DateTimeOffset,
    PrimitiveKind::Decimal,
    PrimitiveKind::Double,
    PrimitiveKind::Duration,
    PrimitiveKind::Guid,
    PrimitiveKind::Int16,
    PrimitiveKind::Int32,
    PrimitiveKind::Int64,
    PrimitiveKind::SByte,
    PrimitiveKind::Single,
    PrimitiveKind::Stream,
    PrimitiveKind::String,
    PrimitiveKind::TimeOfDay,
    PrimitiveKind::Geography,
    PrimitiveKind::GeographyPoint,
    PrimitiveKind::GeographyLineString,
    PrimitiveKind::GeographyPolygon,
    PrimitiveKind::GeographyMultiPoint,
    PrimitiveKind::GeographyMultiLineString,
    PrimitiveKind::GeographyMultiPolygon,
    PrimitiveKind::GeographyCollection,
    PrimitiveKind::Geometry,
    PrimitiveKind::GeometryPoint,
    PrimitiveKind::GeometryLineString,
    PrimitiveKind::GeometryPolygon,
    PrimitiveKind::GeometryMultiPoint,
    PrimitiveKind::GeometryMultiLineString,
    PrimitiveKind::GeometryMultiPolygon,
    PrimitiveKind::GeometryCollection,
    PrimitiveKind::PrimitiveType,
];

///////////////////////////////////////////////////////////////////////////////

/// Facet group a primitive kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Binary,
    String,
    Temporal,
    Decimal,
    Spatial(SpatialFamily),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialFamily {
    Geography,
    Geometry,
}

impl SpatialFamily {
    pub fn default_srid(self) -> i32 {
        match self {
            Self::Geography => 4326,
            Self::Geometry => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxLength {
    Value(u32),
    /// Symbolic `max`, only expressible in CSDL-XML
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Value(u32),
    Variable,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Srid {
    Value(i32),
    Variable,
}

/// Type facets; `None` means the facet was not specified
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub max_length: Option<MaxLength>,
    pub unicode: Option<bool>,
    pub precision: Option<u32>,
    pub scale: Option<Scale>,
    pub srid: Option<Srid>,
}

impl Facets {
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(MaxLength::Value(max_length));
        self
    }

    pub fn with_unbounded_max_length(mut self) -> Self {
        self.max_length = Some(MaxLength::Max);
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = Some(unicode);
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_srid(mut self, srid: Srid) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

///////////////////////////////////////////////////////////////////////////////

/// The definition a [`TypeReference`] points to
#[derive(Debug, Clone, PartialEq)]
pub enum EdmType {
    Primitive(PrimitiveKind),
    /// Entity, complex, enum type or type definition, resolved through the model
    Named(QualifiedName),
    EntityReference(QualifiedName),
    Collection(Box<TypeReference>),
    Untyped,
    /// Sentinel for a type whose kind could not be determined
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    pub definition: EdmType,
    pub nullable: bool,
    pub facets: Facets,
}

impl TypeReference {
    pub fn new(definition: EdmType, nullable: bool) -> Self {
        Self {
            definition,
            nullable,
            facets: Facets::default(),
        }
    }

    pub fn primitive(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::new(EdmType::Primitive(kind), nullable)
    }

    pub fn string(nullable: bool) -> Self {
        Self::primitive(PrimitiveKind::String, nullable)
    }

    /// Reference by name; `Edm.*` names map to primitive kinds
    pub fn named(name: impl Into<QualifiedName>, nullable: bool) -> Self {
        let name = name.into();
        if name.is_edm() {
            if name.name == "Untyped" {
                return Self::new(EdmType::Untyped, nullable);
            }
            if let Some(kind) = PrimitiveKind::from_name(&name.name) {
                return Self::primitive(kind, nullable);
            }
        }
        Self::new(EdmType::Named(name), nullable)
    }

    pub fn entity_reference(entity_type: impl Into<QualifiedName>, nullable: bool) -> Self {
        Self::new(EdmType::EntityReference(entity_type.into()), nullable)
    }

    /// Collections carry nullability on their element type
    pub fn collection(element: TypeReference) -> Self {
        Self::new(EdmType::Collection(Box::new(element)), false)
    }

    pub fn untyped() -> Self {
        Self::new(EdmType::Untyped, true)
    }

    pub fn none() -> Self {
        Self::new(EdmType::None, true)
    }

    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = facets;
        self
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.definition, EdmType::Collection(_))
    }

    /// Element type of a collection, or the reference itself
    pub fn element_type(&self) -> &TypeReference {
        match &self.definition {
            EdmType::Collection(inner) => inner,
            _ => self,
        }
    }

    /// Whether the reference can be written as a short type name
    pub fn is_inline(&self) -> bool {
        fn is_scalar_inline(definition: &EdmType) -> bool {
            matches!(
                definition,
                EdmType::Primitive(_)
                    | EdmType::Named(_)
                    | EdmType::EntityReference(_)
                    | EdmType::Untyped
            )
        }

        match &self.definition {
            EdmType::Collection(inner) => is_scalar_inline(&inner.definition),
            other => is_scalar_inline(other),
        }
    }

    /// Qualified name of the referenced schema type, looking through collections
    pub fn referenced_name(&self) -> Option<&QualifiedName> {
        match &self.element_type().definition {
            EdmType::Named(name) | EdmType::EntityReference(name) => Some(name),
            _ => None,
        }
    }

    /// Full name ignoring namespace aliases, e.g. `Collection(NS.Product)`
    pub fn full_name(&self) -> String {
        match &self.definition {
            EdmType::Primitive(kind) => kind.full_name().to_string(),
            EdmType::Named(name) => name.to_string(),
            EdmType::EntityReference(name) => format!("Ref({name})"),
            EdmType::Collection(inner) => format!("Collection({})", inner.full_name()),
            EdmType::Untyped => "Edm.Untyped".to_string(),
            EdmType::None => "None".to_string(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names_round_trip() {
        for kind in ALL_PRIMITIVE_KINDS {
            assert_eq!(PrimitiveKind::from_name(kind.full_name()), Some(kind));
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("Edm.Nope"), None);
    }

    #[test]
    fn test_named_maps_edm_primitives() {
        assert_eq!(
            TypeReference::named("Edm.Int32", false),
            TypeReference::primitive(PrimitiveKind::Int32, false)
        );
        assert_eq!(
            TypeReference::named("Edm.Untyped", true).definition,
            EdmType::Untyped
        );
        assert_eq!(
            TypeReference::named("NS.Product", true).definition,
            EdmType::Named(QualifiedName::new("NS", "Product"))
        );
    }

    #[test]
    fn test_inline_eligibility() {
        let product = TypeReference::named("NS.Product", true);
        assert!(product.is_inline());
        assert!(TypeReference::collection(product.clone()).is_inline());
        assert!(TypeReference::entity_reference("NS.Product", true).is_inline());
        assert!(!TypeReference::collection(TypeReference::collection(product)).is_inline());
        assert!(!TypeReference::none().is_inline());
    }

    #[test]
    fn test_full_name() {
        let t = TypeReference::collection(TypeReference::entity_reference("NS.Order", false));
        assert_eq!(t.full_name(), "Collection(Ref(NS.Order))");
        assert_eq!(t.referenced_name(), Some(&QualifiedName::new("NS", "Order")));
    }

    #[test]
    fn test_facet_kind_dispatch() {
        assert_eq!(PrimitiveKind::Duration.facet_kind(), Some(FacetKind::Temporal));
        assert_eq!(
            PrimitiveKind::GeographyPoint.facet_kind(),
            Some(FacetKind::Spatial(SpatialFamily::Geography))
        );
        assert_eq!(PrimitiveKind::Int32.facet_kind(), None);
        assert_eq!(PrimitiveKind::Int16.integer_range(), Some((-32768, 32767)));
    }
}
