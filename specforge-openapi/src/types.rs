use std::fmt;

use specforge_core::{Type, TypeDef, TypeStore};

/// Semantic classification of a type, each kind carrying a canonical
/// `(type, format)` wire pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKind {
    Float,
    Double,
    Integer,
    Long,
    String,
    Byte,
    Binary,
    Date,
    DateTime,
    Duration,
    Ip,
    Url,
    Password,
    Uuid,
    ObjectId,
    Complex,
    Boolean,
    Unsupported,
}

impl DataKind {
    /// The wire type of the kind. Empty for `Unsupported`.
    pub fn wire_type(self) -> &'static str {
        match self {
            DataKind::Float | DataKind::Double => "number",
            DataKind::Integer | DataKind::Long => "integer",
            DataKind::String
            | DataKind::Byte
            | DataKind::Binary
            | DataKind::Date
            | DataKind::DateTime
            | DataKind::Duration
            | DataKind::Ip
            | DataKind::Url
            | DataKind::Password
            | DataKind::Uuid
            | DataKind::ObjectId
            | DataKind::Complex => "string",
            DataKind::Boolean => "boolean",
            DataKind::Unsupported => "",
        }
    }

    /// The wire format of the kind. Empty where the type alone is
    /// sufficient.
    pub fn format(self) -> &'static str {
        match self {
            DataKind::Float => "float",
            DataKind::Double => "double",
            DataKind::Integer => "int32",
            DataKind::Long => "int64",
            DataKind::Byte => "byte",
            DataKind::Binary => "binary",
            DataKind::Date => "date",
            DataKind::DateTime => "date-time",
            DataKind::Duration => "duration",
            DataKind::Ip => "ip",
            DataKind::Url => "url",
            DataKind::Password => "password",
            DataKind::Uuid => "uuid",
            DataKind::ObjectId => "objectid",
            DataKind::String
            | DataKind::Complex
            | DataKind::Boolean
            | DataKind::Unsupported => "",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataKind::Float => "float",
            DataKind::Double => "double",
            DataKind::Integer => "integer",
            DataKind::Long => "long",
            DataKind::String => "string",
            DataKind::Byte => "byte",
            DataKind::Binary => "binary",
            DataKind::Date => "date",
            DataKind::DateTime => "datetime",
            DataKind::Duration => "duration",
            DataKind::Ip => "ip",
            DataKind::Url => "url",
            DataKind::Password => "password",
            DataKind::Uuid => "uuid",
            DataKind::ObjectId => "objectid",
            DataKind::Complex => "complex",
            DataKind::Boolean => "boolean",
            DataKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Classification result: either one of the closed kinds, or a pair
/// self-described by the type through its data-type capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Kind(DataKind),
    Custom {
        wire_type: &'static str,
        format: &'static str,
    },
}

impl DataType {
    pub fn wire_type(&self) -> &str {
        match self {
            DataType::Kind(k) => k.wire_type(),
            DataType::Custom { wire_type, .. } => wire_type,
        }
    }

    pub fn format(&self) -> &str {
        match self {
            DataType::Kind(k) => k.format(),
            DataType::Custom { format, .. } => format,
        }
    }
}

/// Classify a type. Pointers are dereferenced transparently; a type's
/// data-type capability takes precedence over the built-in mapping.
pub fn data_type_of(store: &TypeStore, ty: Type) -> DataType {
    let (base, _) = store.deref(ty);
    if let Some((wire_type, format)) = store.caps(base).data_type {
        return DataType::Custom { wire_type, format };
    }
    let kind = match store.def(base) {
        TypeDef::Int(w) | TypeDef::Uint(w) => {
            if w.is_64() {
                DataKind::Long
            } else {
                DataKind::Integer
            }
        }
        TypeDef::Float32 => DataKind::Float,
        TypeDef::Float64 => DataKind::Double,
        TypeDef::Bool => DataKind::Boolean,
        TypeDef::Str => DataKind::String,
        TypeDef::Bytes => DataKind::Byte,
        TypeDef::Instant => DataKind::DateTime,
        TypeDef::Duration => DataKind::Duration,
        TypeDef::Url => DataKind::Url,
        TypeDef::Ip => DataKind::Ip,
        TypeDef::Uuid => DataKind::Uuid,
        TypeDef::ObjectId => DataKind::ObjectId,
        TypeDef::Struct(_)
        | TypeDef::Slice(_)
        | TypeDef::Array(..)
        | TypeDef::Map { .. }
        | TypeDef::Any => DataKind::Complex,
        TypeDef::Ptr(_) => unreachable!("pointers are dereferenced before classification"),
        TypeDef::Func | TypeDef::Chan | TypeDef::Uintptr | TypeDef::Complex => {
            DataKind::Unsupported
        }
    };
    DataType::Kind(kind)
}
