use thiserror::Error;

/// Errors recorded or returned during document generation.
///
/// Structural errors (`UnsupportedType`, `UnsupportedMapKey`, `Field`,
/// `NamingConflict`) accumulate in the generator's error sink and never
/// abort synthesis of sibling fields. Binder and override errors are
/// returned synchronously to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("unsupported type {type_name}")]
    UnsupportedType { type_name: String },

    #[error("map {type_name} has unsupported key type {key}, only string keys are supported")]
    UnsupportedMapKey { type_name: String, key: String },

    #[error("field {name} of type {type_name}: {message}")]
    Field {
        name: String,
        type_name: String,
        message: String,
    },

    #[error("naming conflict: {0}")]
    NamingConflict(String),

    #[error("invalid override: {0}")]
    InvalidOverride(String),

    #[error("operation identifier {0} is already registered")]
    DuplicateOperation(String),

    #[error("unknown HTTP method {0:?}")]
    UnknownMethod(String),

    #[error("parameter location conflict: {0}")]
    ParameterLocation(String),

    #[error("malformed status code {0:?}")]
    MalformedStatusCode(String),

    #[error("response conflict: {0}")]
    ResponseConflict(String),
}

/// Failure to convert annotation text to a typed value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("cannot convert {value:?} to {target}")]
    Conversion { value: String, target: String },

    #[error("values of type {0} are not supported")]
    UnsupportedTarget(String),

    #[error("{0}")]
    Custom(String),
}
