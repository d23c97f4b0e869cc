use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// OpenAPI version emitted in generated documents. The schema model
/// uses the `nullable` keyword, which belongs to the 3.0.x line.
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Prefix of component schema references.
pub const SCHEMAS_REF_PREFIX: &str = "#/components/schemas/";

fn is_false(b: &bool) -> bool {
    !*b
}

/// Root of a generated document.
#[derive(Serialize, Clone, Debug, Default)]
pub struct OpenApi {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "termsOfService", skip_serializing_if = "String::is_empty")]
    pub terms_of_service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub version: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Contact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, ServerVariable>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct ServerVariable {
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    pub default: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One operation slot per HTTP verb.
#[derive(Serialize, Clone, Debug, Default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, Example>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Header {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// An inline schema or a `$ref` pointer into `components/schemas`.
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref(Reference),
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    /// A reference to the named component schema.
    pub fn to(name: &str) -> Self {
        SchemaOrRef::Ref(Reference {
            reference: format!("{SCHEMAS_REF_PREFIX}{name}"),
        })
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    pub fn schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref(_) => None,
        }
    }

    pub fn schema_mut(&mut self) -> Option<&mut Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref(_) => None,
        }
    }

    /// Name of the referenced component schema, if this is a reference.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref(r) => r.reference.strip_prefix(SCHEMAS_REF_PREFIX),
            SchemaOrRef::Schema(_) => None,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<SchemaOrRef>>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    /// An inline primitive schema.
    pub fn primitive(schema_type: &str, format: &str, nullable: bool) -> Self {
        Schema {
            schema_type: schema_type.to_string(),
            format: format.to_string(),
            nullable,
            ..Schema::default()
        }
    }
}
