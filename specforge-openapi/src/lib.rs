//! Derives OpenAPI 3.0 documents from runtime type descriptors: type
//! classification, schema synthesis with component references, and
//! operation binding onto paths.

mod error;
mod generator;
pub mod spec;
mod types;
mod values;

pub use error::{GenError, ParseError};
pub use generator::{
    rewrite_path, Generator, OperationInfo, OperationResponse, ResponseHeader, DEFAULT_MEDIA_TYPE,
};
pub use types::{data_type_of, DataKind, DataType};
pub use values::parse_value;
