//! Value kinds observed during schema inference

use mongodb::bson::{Bson, Document};
use serde::Serialize;
use std::fmt;

/// BSON type names tracked per field, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BsonType {
    Double,
    String,
    Object,
    Array,
    BinData,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    Timestamp,
    Long,
    MinKey,
    MaxKey,
}

impl BsonType {
    /// All tracked types in display order
    pub const ALL: [BsonType; 14] = [
        BsonType::Double,
        BsonType::String,
        BsonType::Object,
        BsonType::Array,
        BsonType::BinData,
        BsonType::ObjectId,
        BsonType::Bool,
        BsonType::Date,
        BsonType::Null,
        BsonType::Regex,
        BsonType::Timestamp,
        BsonType::Long,
        BsonType::MinKey,
        BsonType::MaxKey,
    ];

    /// Shell type name, e.g. `objectId`
    pub fn name(&self) -> &'static str {
        match self {
            BsonType::Double => "double",
            BsonType::String => "string",
            BsonType::Object => "object",
            BsonType::Array => "array",
            BsonType::BinData => "binData",
            BsonType::ObjectId => "objectId",
            BsonType::Bool => "bool",
            BsonType::Date => "date",
            BsonType::Null => "null",
            BsonType::Regex => "regex",
            BsonType::Timestamp => "timestamp",
            BsonType::Long => "long",
            BsonType::MinKey => "minKey",
            BsonType::MaxKey => "maxKey",
        }
    }

    /// Placeholder suggestion for this type, e.g. `(objectId)`
    pub fn placeholder(&self) -> String {
        format!("({})", self.name())
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sampled value reduced to what schema inference cares about
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind<'a> {
    /// Int32 or Double
    Number(f64),
    /// Decimal128, counted as a number without enumerating it
    Decimal,
    Text(&'a str),
    Boolean,
    Null,
    Date,
    Pattern,
    Binary,
    Identifier,
    Long,
    Timestamp,
    MinKey,
    MaxKey,
    Object(&'a Document),
    Array(&'a [Bson]),
    /// Kinds that are not tracked (JavaScript code, DBPointer)
    Unsupported,
}

impl<'a> From<&'a Bson> for ValueKind<'a> {
    fn from(value: &'a Bson) -> Self {
        match value {
            Bson::Double(n) => ValueKind::Number(*n),
            Bson::Int32(n) => ValueKind::Number(f64::from(*n)),
            Bson::Decimal128(_) => ValueKind::Decimal,
            Bson::String(s) => ValueKind::Text(s),
            Bson::Symbol(s) => ValueKind::Text(s),
            Bson::Boolean(_) => ValueKind::Boolean,
            Bson::Null | Bson::Undefined => ValueKind::Null,
            Bson::DateTime(_) => ValueKind::Date,
            Bson::RegularExpression(_) => ValueKind::Pattern,
            Bson::Binary(_) => ValueKind::Binary,
            Bson::ObjectId(_) => ValueKind::Identifier,
            Bson::Int64(_) => ValueKind::Long,
            Bson::Timestamp(_) => ValueKind::Timestamp,
            Bson::MinKey => ValueKind::MinKey,
            Bson::MaxKey => ValueKind::MaxKey,
            Bson::Document(doc) => ValueKind::Object(doc),
            Bson::Array(items) => ValueKind::Array(items),
            _ => ValueKind::Unsupported,
        }
    }
}

impl ValueKind<'_> {
    /// The tracked type of this value, if any
    pub fn bson_type(&self) -> Option<BsonType> {
        match self {
            ValueKind::Number(_) | ValueKind::Decimal => Some(BsonType::Double),
            ValueKind::Text(_) => Some(BsonType::String),
            ValueKind::Boolean => Some(BsonType::Bool),
            ValueKind::Null => Some(BsonType::Null),
            ValueKind::Date => Some(BsonType::Date),
            ValueKind::Pattern => Some(BsonType::Regex),
            ValueKind::Binary => Some(BsonType::BinData),
            ValueKind::Identifier => Some(BsonType::ObjectId),
            ValueKind::Long => Some(BsonType::Long),
            ValueKind::Timestamp => Some(BsonType::Timestamp),
            ValueKind::MinKey => Some(BsonType::MinKey),
            ValueKind::MaxKey => Some(BsonType::MaxKey),
            ValueKind::Object(_) => Some(BsonType::Object),
            ValueKind::Array(_) => Some(BsonType::Array),
            ValueKind::Unsupported => None,
        }
    }
}
