/// Names of the annotation keys the generator recognizes on struct
/// fields.
///
/// The keys carrying binding semantics (validation, parameter
/// locations, enum/default values) are configurable so the generator
/// can follow whatever convention the host framework uses; the
/// remaining keys are fixed.
#[derive(Clone, Debug)]
pub struct TagConfig {
    /// Validation constraints; the `required` token marks a field
    /// required, other known tokens map to string formats.
    pub validator: String,
    /// Binds a field to a path placeholder.
    pub path: String,
    /// Binds a field to a query parameter.
    pub query: String,
    /// Binds a field to a request header.
    pub header: String,
    /// Comma-separated list of accepted literals.
    pub enum_values: String,
    /// Pre-filled value literal.
    pub default: String,
    /// Example value literal.
    pub example: String,
    /// Overrides the schema format.
    pub format: String,
    /// Marks a field deprecated when it parses as a true literal.
    pub deprecated: String,
    /// Human-readable field description.
    pub description: String,
    /// Wire-name override; a value of `-` suppresses the field.
    pub name: String,
    /// Skip marker for non-serialization concerns; a value of `-`
    /// excludes the field from the schema entirely.
    pub skip: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            validator: "validate".into(),
            path: "path".into(),
            query: "query".into(),
            header: "header".into(),
            enum_values: "enum".into(),
            default: "default".into(),
            example: "example".into(),
            format: "format".into(),
            deprecated: "deprecated".into(),
            description: "description".into(),
            name: "json".into(),
            skip: "binding".into(),
        }
    }
}
