//! Runtime type descriptors: an interned type graph with field
//! annotations and per-type capabilities, consumed by the document
//! generators.

pub mod store;
pub mod tags;

pub use store::{Capabilities, Field, IntWidth, Type, TypeDef, TypeName, TypeStore};
pub use tags::TagConfig;
