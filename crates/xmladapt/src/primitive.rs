//! Built-in scalar types and their XML Schema names.

use crate::ext::XSD_NAMESPACE;
use crate::known_type::{KnownType, LogicalType};
use crate::name::XmlName;

/// Scalar types with a fixed XML Schema counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    DateTime,
    Date,
    Time,
    Duration,
    Uri,
    Bytes,
    QualifiedName,
}

const TABLE: &[(Primitive, &str, &str)] = &[
    (Primitive::String, "String", "string"),
    (Primitive::Boolean, "Boolean", "boolean"),
    (Primitive::Int8, "Int8", "byte"),
    (Primitive::UInt8, "UInt8", "unsignedByte"),
    (Primitive::Int16, "Int16", "short"),
    (Primitive::UInt16, "UInt16", "unsignedShort"),
    (Primitive::Int32, "Int32", "int"),
    (Primitive::UInt32, "UInt32", "unsignedInt"),
    (Primitive::Int64, "Int64", "long"),
    (Primitive::UInt64, "UInt64", "unsignedLong"),
    (Primitive::Float32, "Float32", "float"),
    (Primitive::Float64, "Float64", "double"),
    (Primitive::Decimal, "Decimal", "decimal"),
    (Primitive::DateTime, "DateTime", "dateTime"),
    (Primitive::Date, "Date", "date"),
    (Primitive::Time, "Time", "time"),
    (Primitive::Duration, "Duration", "duration"),
    (Primitive::Uri, "Uri", "anyURI"),
    (Primitive::Bytes, "Bytes", "base64Binary"),
    (Primitive::QualifiedName, "QualifiedName", "QName"),
];

impl Primitive {
    pub fn all() -> impl Iterator<Item = Primitive> {
        TABLE.iter().map(|(p, _, _)| *p)
    }

    fn row(self) -> (&'static str, &'static str) {
        TABLE
            .iter()
            .find(|(p, _, _)| *p == self)
            .map_or(("String", "string"), |(_, type_name, schema_name)| (*type_name, *schema_name))
    }

    /// Name of the logical type registered for this primitive.
    pub fn type_name(self) -> &'static str {
        self.row().0
    }

    /// Local name of the XML Schema type, e.g. `int`.
    pub fn schema_name(self) -> &'static str {
        self.row().1
    }

    pub fn from_schema_name(name: &str) -> Option<Primitive> {
        TABLE
            .iter()
            .find(|(_, _, schema_name)| *schema_name == name)
            .map(|(p, _, _)| *p)
    }

    pub fn logical_type(self) -> LogicalType {
        LogicalType::new(self.type_name())
    }

    /// The `xsi:type` value that marks a node as holding this primitive.
    pub fn schema_type(self) -> XmlName {
        XmlName::new(self.schema_name(), XSD_NAMESPACE)
    }
}

/// Host types that map onto a [`Primitive`].
pub trait XmlPrimitive {
    const PRIMITIVE: Primitive;
}

macro_rules! xml_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(impl XmlPrimitive for $ty {
            const PRIMITIVE: Primitive = Primitive::$primitive;
        })*
    };
}

xml_primitive! {
    String => String,
    bool => Boolean,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Vec<u8> => Bytes,
}

impl KnownType {
    /// Entry for a primitive stored under `local_name`, discriminated by its
    /// schema type so it can share a name with other primitives.
    pub fn primitive(primitive: Primitive, local_name: impl Into<String>) -> Self {
        KnownType::new(primitive.logical_type(), local_name).with_discriminator(primitive.schema_type())
    }

    /// [`KnownType::primitive`] for a host type.
    pub fn of<T: XmlPrimitive>(local_name: impl Into<String>) -> Self {
        Self::primitive(T::PRIMITIVE, local_name)
    }
}
