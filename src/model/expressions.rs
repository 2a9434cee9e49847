use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};

use super::names::QualifiedName;
use super::types::TypeReference;

///////////////////////////////////////////////////////////////////////////////

/// Annotation value expression
///
/// See: https://docs.oasis-open.org/odata/odata-csdl-xml/v4.01/odata-csdl-xml-v4.01.html#sec_Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary(Vec<u8>),
    Boolean(bool),
    Date(NaiveDate),
    DateTimeOffset(DateTime<FixedOffset>),
    Decimal(DecimalLiteral),
    Duration(TimeDelta),
    Floating(f64),
    Guid(uuid::Uuid),
    Integer(i64),
    String(String),
    TimeOfDay(NaiveTime),
    Null,
    Path(String),
    PropertyPath(String),
    NavigationPropertyPath(String),
    AnnotationPath(String),
    Record(RecordExpression),
    Collection(Vec<Expression>),
    If(Box<IfExpression>),
    Cast(Box<TypeTestExpression>),
    IsOf(Box<TypeTestExpression>),
    Apply(ApplyExpression),
    LabeledElement(LabeledElement),
    LabeledElementReference(QualifiedName),
    EnumMember(EnumMemberExpression),
    UrlRef(Box<Expression>),
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn path(value: impl Into<String>) -> Self {
        Self::Path(value.into())
    }

    pub fn if_then_else(test: Expression, then: Expression, otherwise: Expression) -> Self {
        Self::If(Box::new(IfExpression {
            test,
            then,
            otherwise,
        }))
    }

    pub fn cast(type_ref: TypeReference, operand: Expression) -> Self {
        Self::Cast(Box::new(TypeTestExpression { type_ref, operand }))
    }

    pub fn is_of(type_ref: TypeReference, operand: Expression) -> Self {
        Self::IsOf(Box::new(TypeTestExpression { type_ref, operand }))
    }

    pub fn apply(function: impl Into<QualifiedName>, arguments: Vec<Expression>) -> Self {
        Self::Apply(ApplyExpression {
            function: function.into(),
            arguments,
        })
    }

    pub fn labeled(name: impl Into<String>, value: Expression) -> Self {
        Self::LabeledElement(LabeledElement {
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn enum_member<I, S>(enum_type: impl Into<QualifiedName>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::EnumMember(EnumMemberExpression {
            enum_type: enum_type.into(),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    pub fn url_ref(value: Expression) -> Self {
        Self::UrlRef(Box::new(value))
    }

    /// Constants and path expressions, which CSDL-XML writes as attributes
    pub fn is_inline_eligible(&self) -> bool {
        match self {
            Self::Binary(_)
            | Self::Boolean(_)
            | Self::Date(_)
            | Self::DateTimeOffset(_)
            | Self::Decimal(_)
            | Self::Duration(_)
            | Self::Floating(_)
            | Self::Guid(_)
            | Self::Integer(_)
            | Self::String(_)
            | Self::TimeOfDay(_)
            | Self::Path(_)
            | Self::PropertyPath(_)
            | Self::NavigationPropertyPath(_)
            | Self::AnnotationPath(_) => true,
            Self::Null
            | Self::Record(_)
            | Self::Collection(_)
            | Self::If(_)
            | Self::Cast(_)
            | Self::IsOf(_)
            | Self::Apply(_)
            | Self::LabeledElement(_)
            | Self::LabeledElementReference(_)
            | Self::EnumMember(_)
            | Self::UrlRef(_) => false,
        }
    }

    /// Path string of the path-family expressions
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(p)
            | Self::PropertyPath(p)
            | Self::NavigationPropertyPath(p)
            | Self::AnnotationPath(p) => Some(p),
            _ => None,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Decimal constant kept in its literal form so no precision is lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalLiteral(String);

impl DecimalLiteral {
    /// Accepts an optional sign, digits and an optional fractional part
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits, None),
        };
        let valid_int = !int_part.is_empty() && int_part.bytes().all(|b| b.is_ascii_digit());
        let valid_frac =
            frac_part.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
        (valid_int && valid_frac).then(|| Self(s.trim_start_matches('+').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordExpression {
    pub type_name: Option<QualifiedName>,
    pub properties: Vec<PropertyValue>,
}

impl RecordExpression {
    pub fn new() -> Self {
        Self {
            type_name: None,
            properties: Vec::new(),
        }
    }

    pub fn typed(type_name: impl Into<QualifiedName>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>, value: Expression) -> Self {
        self.properties.push(PropertyValue {
            property: property.into(),
            value,
        });
        self
    }
}

impl Default for RecordExpression {
    fn default() -> Self {
        Self::new()
    }
}

impl From<RecordExpression> for Expression {
    fn from(value: RecordExpression) -> Self {
        Self::Record(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub test: Expression,
    pub then: Expression,
    pub otherwise: Expression,
}

/// Operand and target type of `Cast` and `IsOf`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTestExpression {
    pub type_ref: TypeReference,
    pub operand: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyExpression {
    pub function: QualifiedName,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledElement {
    pub name: String,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberExpression {
    pub enum_type: QualifiedName,
    /// More than one member only for flags enums
    pub members: Vec<String>,
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_literal() {
        assert_eq!(DecimalLiteral::parse("12.50").unwrap().as_str(), "12.50");
        assert_eq!(DecimalLiteral::parse("+3").unwrap().as_str(), "3");
        assert_eq!(DecimalLiteral::parse("-0.1").unwrap().as_str(), "-0.1");
        assert!(DecimalLiteral::parse("1.").is_none());
        assert!(DecimalLiteral::parse("abc").is_none());
        assert!(DecimalLiteral::parse("").is_none());
    }

    #[test]
    fn test_inline_eligibility() {
        assert!(Expression::string("x").is_inline_eligible());
        assert!(Expression::AnnotationPath("@UI.LineItem".into()).is_inline_eligible());
        assert!(!Expression::Null.is_inline_eligible());
        assert!(!Expression::Collection(vec![]).is_inline_eligible());
        assert!(!Expression::enum_member("NS.Color", ["Red"]).is_inline_eligible());
    }
}
