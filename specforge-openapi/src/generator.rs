use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;
use specforge_core::{Field, TagConfig, Type, TypeDef, TypeStore};
use tracing::{debug, warn};

use crate::error::GenError;
use crate::spec::{
    Components, Example, Header, Info, MediaType, OpenApi, Operation, Parameter, RequestBody,
    Response, Schema, SchemaOrRef, Server, Tag, OPENAPI_VERSION,
};
use crate::types::{data_type_of, DataKind, DataType};
use crate::values::{parse_bool, parse_value};

/// Media type used when an operation does not specify one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

const METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE",
];

/// Declarative description of an operation to bind.
#[derive(Clone, Debug, Default)]
pub struct OperationInfo {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub deprecated: bool,
    /// Success status code; `0` means 200.
    pub status_code: u16,
    pub status_description: String,
    pub responses: Vec<OperationResponse>,
    /// Headers attached to the success response.
    pub headers: Vec<ResponseHeader>,
}

/// An additional response, registered by status code or by a wildcard
/// class pattern such as `5XX`.
#[derive(Clone, Debug, Default)]
pub struct OperationResponse {
    pub code: String,
    pub description: String,
    /// Empty means [`DEFAULT_MEDIA_TYPE`].
    pub media_type: String,
    pub model: Option<Type>,
    pub example: Option<Value>,
    pub examples: BTreeMap<String, Value>,
    pub headers: Vec<ResponseHeader>,
}

#[derive(Clone, Debug, Default)]
pub struct ResponseHeader {
    pub name: String,
    pub description: String,
    /// Header value type; defaults to a plain string.
    pub model: Option<Type>,
}

/// A generation session: owns the document under construction, the
/// schema reference registry, the override tables and the error sink.
///
/// Structural errors accumulate in the sink (see [`errors`]) and never
/// abort synthesis; configuration and binding calls fail fast instead.
/// Sessions are independent values — concurrent builds each use their
/// own.
///
/// [`errors`]: Generator::errors
pub struct Generator<'ts> {
    store: &'ts TypeStore,
    tags: TagConfig,
    api: OpenApi,
    full_names: bool,
    sort_params: bool,
    registered: HashMap<String, Type>,
    name_overrides: HashMap<Type, String>,
    data_type_overrides: HashMap<Type, (String, String)>,
    operation_ids: HashSet<String>,
    errors: Vec<GenError>,
}

impl<'ts> Generator<'ts> {
    pub fn new(store: &'ts TypeStore, tags: TagConfig) -> Self {
        Self {
            store,
            tags,
            api: OpenApi {
                openapi: OPENAPI_VERSION.to_string(),
                info: Info::default(),
                servers: Vec::new(),
                paths: IndexMap::new(),
                components: Components::default(),
                tags: Vec::new(),
            },
            full_names: true,
            sort_params: false,
            registered: HashMap::new(),
            name_overrides: HashMap::new(),
            data_type_overrides: HashMap::new(),
            operation_ids: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// The document in its current state.
    pub fn api(&self) -> &OpenApi {
        &self.api
    }

    /// Consume the session and return the document.
    pub fn into_api(self) -> OpenApi {
        self.api
    }

    /// Errors accumulated so far. A non-empty list means the document
    /// is incomplete and should not be trusted.
    pub fn errors(&self) -> &[GenError] {
        &self.errors
    }

    pub fn set_info(&mut self, info: Info) {
        self.api.info = info;
    }

    pub fn set_servers(&mut self, servers: Vec<Server>) {
        self.api.servers = servers;
    }

    pub fn set_version(&mut self, version: &str) {
        self.api.info.version = version.to_string();
    }

    /// Use package-qualified schema names. Enabled by default; bare
    /// names make collisions between identically named types a hard
    /// error.
    pub fn use_full_schema_names(&mut self, enabled: bool) {
        self.full_names = enabled;
    }

    /// Sort operation parameters by location then name for stable
    /// output diffs.
    pub fn set_sort_params(&mut self, enabled: bool) {
        self.sort_params = enabled;
    }

    /// Add a tag or update the description of an existing one. The tag
    /// list stays name-sorted, with `default` always first.
    pub fn add_tag(&mut self, name: &str, description: &str) {
        if name.is_empty() {
            return;
        }
        if let Some(tag) = self.api.tags.iter_mut().find(|t| t.name == name) {
            tag.description = description.to_string();
        } else {
            self.api.tags.push(Tag {
                name: name.to_string(),
                description: description.to_string(),
            });
        }
        self.api
            .tags
            .sort_by_key(|t| (t.name != "default", t.name.clone()));
    }

    /// Force the schema name of a type. One-shot: reusing a name or
    /// re-overriding the same type is an error.
    pub fn override_type_name(&mut self, ty: Type, name: &str) -> Result<(), GenError> {
        let (base, _) = self.store.deref(ty);
        if name.is_empty() {
            return Err(GenError::NamingConflict(
                "type name override cannot be empty".to_string(),
            ));
        }
        if self.name_overrides.contains_key(&base) {
            return Err(GenError::NamingConflict(format!(
                "type {} already has a name override",
                self.store.describe(base)
            )));
        }
        if self.name_overrides.values().any(|n| n == name) {
            return Err(GenError::NamingConflict(format!(
                "name override {name} is already in use"
            )));
        }
        self.name_overrides.insert(base, name.to_string());
        Ok(())
    }

    /// Force the wire `(type, format)` pair of a type, bypassing
    /// classification entirely. One-shot, like name overrides.
    pub fn override_data_type(
        &mut self,
        ty: Type,
        wire_type: &str,
        format: &str,
    ) -> Result<(), GenError> {
        let (base, _) = self.store.deref(ty);
        if wire_type.is_empty() {
            return Err(GenError::InvalidOverride(
                "data type override requires a type".to_string(),
            ));
        }
        if self.data_type_overrides.contains_key(&base) {
            return Err(GenError::InvalidOverride(format!(
                "data type of {} is already overridden",
                self.store.describe(base)
            )));
        }
        self.data_type_overrides
            .insert(base, (wire_type.to_string(), format.to_string()));
        Ok(())
    }

    /// Canonical schema name of a type: override, then the type's own
    /// naming capability, then its declared name. Empty for anonymous
    /// types.
    pub fn type_name(&self, ty: Type) -> String {
        let (base, _) = self.store.deref(ty);
        if let Some(name) = self.name_overrides.get(&base) {
            return name.clone();
        }
        if let Some(name) = self.store.caps(base).schema_name {
            return name.to_string();
        }
        match self.store.name(base) {
            Some(tn) if self.full_names => format!("{}{}", upper_first(&tn.package), tn.ident),
            Some(tn) => tn.ident.clone(),
            None => String::new(),
        }
    }

    // ── Schema synthesis ────────────────────────────────────────────

    /// Synthesize a schema for a type. Returns `None` and records an
    /// error when the type cannot be represented; named complex types
    /// are registered in the components and returned as references.
    pub fn schema_from_type(&mut self, ty: Type) -> Option<SchemaOrRef> {
        let store = self.store;
        let (base, depth) = store.deref(ty);
        let nullable = store.caps(base).nullable.unwrap_or(depth > 0);

        if matches!(store.def(base), TypeDef::Any) {
            return Some(SchemaOrRef::inline(Schema {
                description: "Can be any value - string, number, boolean, array or object."
                    .to_string(),
                nullable: true,
                ..Schema::default()
            }));
        }
        if let Some((wire_type, format)) = self.data_type_overrides.get(&base).cloned() {
            return Some(SchemaOrRef::inline(Schema::primitive(
                &wire_type, &format, nullable,
            )));
        }
        match data_type_of(store, base) {
            DataType::Custom { wire_type, format } => {
                Some(SchemaOrRef::inline(Schema::primitive(
                    wire_type, format, nullable,
                )))
            }
            DataType::Kind(DataKind::Unsupported) => {
                self.push_error(GenError::UnsupportedType {
                    type_name: store.describe(base),
                });
                None
            }
            DataType::Kind(DataKind::Complex) => self.schema_from_complex(base, nullable),
            DataType::Kind(kind) => Some(SchemaOrRef::inline(Schema::primitive(
                kind.wire_type(),
                kind.format(),
                nullable,
            ))),
        }
    }

    /// Resolve a schema-or-reference to an inline schema, following a
    /// reference into the components.
    pub fn resolve_schema<'a>(&'a self, sor: &'a SchemaOrRef) -> Option<&'a Schema> {
        match sor {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref(_) => sor
                .ref_name()
                .and_then(|name| self.api.components.schemas.get(name))
                .and_then(SchemaOrRef::schema),
        }
    }

    fn schema_from_complex(&mut self, base: Type, nullable: bool) -> Option<SchemaOrRef> {
        let name = self.type_name(base);
        if name.is_empty() {
            // Anonymous types are always inlined.
            return self.complex_schema(base, nullable).map(SchemaOrRef::inline);
        }
        if let Some(&existing) = self.registered.get(&name) {
            if existing != base {
                self.push_error(GenError::NamingConflict(format!(
                    "types {} and {} both resolve to schema name {name}",
                    self.store.describe(existing),
                    self.store.describe(base)
                )));
                return None;
            }
            return Some(SchemaOrRef::to(&name));
        }
        // Register a placeholder before recursing so self-references
        // resolve to a reference instead of re-entering.
        self.registered.insert(name.clone(), base);
        self.api
            .components
            .schemas
            .insert(name.clone(), SchemaOrRef::inline(Schema::default()));
        debug!(name = %name, "registering schema");
        match self.complex_schema(base, false) {
            Some(schema) => {
                self.api
                    .components
                    .schemas
                    .insert(name.clone(), SchemaOrRef::inline(schema));
                Some(SchemaOrRef::to(&name))
            }
            None => {
                self.registered.remove(&name);
                self.api.components.schemas.shift_remove(&name);
                None
            }
        }
    }

    fn complex_schema(&mut self, base: Type, nullable: bool) -> Option<Schema> {
        let store = self.store;
        let mut schema = match store.def(base) {
            TypeDef::Struct(_) => self.struct_schema(base)?,
            TypeDef::Slice(elem) | TypeDef::Array(elem, _) => {
                let items = self.schema_from_type(*elem)?;
                Schema {
                    schema_type: "array".to_string(),
                    items: Some(Box::new(items)),
                    ..Schema::default()
                }
            }
            TypeDef::Map { key, value } => {
                let (key_base, _) = store.deref(*key);
                if !matches!(store.def(key_base), TypeDef::Str) {
                    self.push_error(GenError::UnsupportedMapKey {
                        type_name: store.describe(base),
                        key: store.describe(*key),
                    });
                    return None;
                }
                let values = self.schema_from_type(*value)?;
                Schema {
                    schema_type: "object".to_string(),
                    additional_properties: Some(Box::new(values)),
                    ..Schema::default()
                }
            }
            _ => return None,
        };
        schema.nullable = nullable;
        Some(schema)
    }

    fn struct_schema(&mut self, base: Type) -> Option<Schema> {
        let mut schema = Schema {
            schema_type: "object".to_string(),
            ..Schema::default()
        };
        let mut chain = vec![base];
        self.collect_struct_fields(base, &mut chain, &mut schema);
        Some(schema)
    }

    /// Walk a struct's fields into `schema`. Directly declared fields
    /// are emitted first, then embedded promotions, so a declared
    /// field always shadows a promoted one with the same wire name;
    /// among promotions the first occurrence wins.
    fn collect_struct_fields(&mut self, ty: Type, chain: &mut Vec<Type>, schema: &mut Schema) {
        let store = self.store;
        let fields = match store.def(ty) {
            TypeDef::Struct(fields) => fields,
            _ => return,
        };
        let tags = self.tags.clone();
        for field in fields.iter().filter(|f| !is_promoted(f, &tags)) {
            self.add_struct_field(field, schema, &tags);
        }
        for field in fields.iter().filter(|f| is_promoted(f, &tags)) {
            if !field.public {
                continue;
            }
            let (fbase, _) = store.deref(field.ty);
            if !matches!(store.def(fbase), TypeDef::Struct(_)) {
                continue;
            }
            if chain.contains(&fbase) {
                // Self-embedding, direct or indirect.
                continue;
            }
            chain.push(fbase);
            self.collect_struct_fields(fbase, chain, schema);
            chain.pop();
        }
    }

    fn add_struct_field(&mut self, field: &Field, schema: &mut Schema, tags: &TagConfig) {
        if !field.public || field.get_tag(&tags.skip) == Some("-") {
            return;
        }
        // Location-tagged fields travel as parameters, never as body
        // members.
        if field.get_tag(&tags.path).is_some()
            || field.get_tag(&tags.query).is_some()
            || field.get_tag(&tags.header).is_some()
        {
            return;
        }
        let Some(wire_name) = wire_name(field, tags) else {
            return;
        };
        if schema.properties.contains_key(&wire_name) {
            return;
        }
        let required = is_required(field, tags);
        let Some(sor) = self.schema_from_struct_field(field, required) else {
            return;
        };
        schema.properties.insert(wire_name.clone(), sor);
        if required {
            schema.required.push(wire_name);
        }
    }

    /// Synthesize the schema of a single field and apply its
    /// annotations. Parsed enum/default/example values only attach
    /// when the schema is inline; a `$ref` carries no sibling keys.
    fn schema_from_struct_field(&mut self, field: &Field, required: bool) -> Option<SchemaOrRef> {
        let store = self.store;
        let tags = self.tags.clone();
        let mut sor = self.schema_from_type(field.ty)?;
        let (fbase, _) = store.deref(field.ty);

        if required && field.get_tag(&tags.default).is_some_and(|v| !v.is_empty()) {
            self.push_field_error(field, fbase, "required field cannot have a default value");
        }
        if let Some(schema) = sor.schema_mut() {
            if let Some(v) = field.get_tag(&tags.deprecated) {
                schema.deprecated = parse_bool(v).unwrap_or(false);
            }
            if let Some(v) = field.get_tag(&tags.description) {
                schema.description = v.to_string();
            }
            if let Some(v) = field.get_tag(&tags.validator) {
                if let Some(format) = validator_format(v) {
                    schema.format = format.to_string();
                }
            }
            if let Some(v) = field.get_tag(&tags.format) {
                schema.format = v.to_string();
            }
        }
        if let Some(list) = field.get_tag(&tags.enum_values) {
            let elem = match store.def(fbase) {
                TypeDef::Slice(elem) | TypeDef::Array(elem, _) => Some(*elem),
                _ => None,
            };
            let target = elem.unwrap_or(fbase);
            let mut values = Vec::new();
            for raw in list.split(',') {
                match parse_value(store, target, raw) {
                    Ok(v) => values.push(v),
                    Err(e) => self.push_field_error(field, target, &e.to_string()),
                }
            }
            if let Some(schema) = sor.schema_mut() {
                match elem {
                    // Enum values of a slice field belong to the items.
                    Some(_) => {
                        if let Some(items) = schema.items.as_mut().and_then(|i| i.schema_mut()) {
                            items.enum_values = values;
                        }
                    }
                    None => schema.enum_values = values,
                }
            }
        }
        if let Some(text) = field.get_tag(&tags.default) {
            match parse_value(store, fbase, text) {
                Ok(v) => {
                    if let Some(schema) = sor.schema_mut() {
                        schema.default = Some(v);
                    }
                }
                Err(e) => self.push_field_error(field, fbase, &e.to_string()),
            }
        }
        if let Some(text) = field.get_tag(&tags.example) {
            match parse_value(store, fbase, text) {
                Ok(v) => {
                    if let Some(schema) = sor.schema_mut() {
                        schema.example = Some(v);
                    }
                }
                Err(e) => self.push_field_error(field, fbase, &e.to_string()),
            }
        }
        Some(sor)
    }

    // ── Operation binding ───────────────────────────────────────────

    /// Bind an operation to `path` and `method`. Parameters derive
    /// from the input type's location-tagged fields; POST, PUT and
    /// PATCH also get a request body referencing the input schema.
    pub fn add_operation(
        &mut self,
        path: &str,
        method: &str,
        tag: &str,
        input: Option<Type>,
        output: Option<Type>,
        info: &OperationInfo,
    ) -> Result<&Operation, GenError> {
        if !METHODS.contains(&method) {
            return Err(GenError::UnknownMethod(method.to_string()));
        }
        if !info.id.is_empty() && self.operation_ids.contains(&info.id) {
            return Err(GenError::DuplicateOperation(info.id.clone()));
        }
        let rewritten = rewrite_path(path);

        let mut op = Operation {
            id: info.id.clone(),
            summary: info.summary.clone(),
            description: info.description.clone(),
            deprecated: info.deprecated,
            tags: if tag.is_empty() {
                Vec::new()
            } else {
                vec![tag.to_string()]
            },
            ..Operation::default()
        };

        if let Some(input_ty) = input {
            self.set_operation_params(&mut op, input_ty, &rewritten)?;
            if matches!(method, "POST" | "PUT" | "PATCH") {
                if let Some(schema) = self.schema_from_type(input_ty) {
                    op.request_body = Some(RequestBody {
                        content: IndexMap::from([(
                            DEFAULT_MEDIA_TYPE.to_string(),
                            MediaType {
                                schema: Some(schema),
                                ..MediaType::default()
                            },
                        )]),
                        required: true,
                        ..RequestBody::default()
                    });
                }
            }
        }

        let code = if info.status_code == 0 {
            200
        } else {
            info.status_code
        };
        self.set_operation_response(
            &mut op,
            output,
            &code.to_string(),
            DEFAULT_MEDIA_TYPE,
            &info.status_description,
            &info.headers,
            None,
            &BTreeMap::new(),
        )?;
        for response in &info.responses {
            let media = if response.media_type.is_empty() {
                DEFAULT_MEDIA_TYPE
            } else {
                &response.media_type
            };
            self.set_operation_response(
                &mut op,
                response.model,
                &response.code,
                media,
                &response.description,
                &response.headers,
                response.example.clone(),
                &response.examples,
            )?;
        }

        if !info.id.is_empty() {
            self.operation_ids.insert(info.id.clone());
        }
        debug!(path = %rewritten, method, id = %info.id, "operation bound");
        let item = self.api.paths.entry(rewritten).or_default();
        let slot = match method {
            "GET" => &mut item.get,
            "POST" => &mut item.post,
            "PUT" => &mut item.put,
            "PATCH" => &mut item.patch,
            "DELETE" => &mut item.delete,
            "HEAD" => &mut item.head,
            "OPTIONS" => &mut item.options,
            "TRACE" => &mut item.trace,
            _ => unreachable!("method validated above"),
        };
        Ok(slot.insert(op))
    }

    fn set_operation_params(
        &mut self,
        op: &mut Operation,
        input: Type,
        rewritten_path: &str,
    ) -> Result<(), GenError> {
        let store = self.store;
        let (base, _) = store.deref(input);
        if !matches!(store.def(base), TypeDef::Struct(_)) {
            return Err(GenError::UnsupportedType {
                type_name: store.describe(base),
            });
        }
        let placeholders: HashSet<&str> = rewritten_path
            .split('/')
            .filter_map(|s| s.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .collect();

        let tags = self.tags.clone();
        let mut fields = Vec::new();
        let mut chain = vec![base];
        collect_param_fields(store, base, &mut chain, &mut fields);

        let mut seen = HashSet::new();
        for field in fields {
            if field.get_tag(&tags.skip) == Some("-") {
                continue;
            }
            let Some((location, name)) = param_location(field, &tags)? else {
                continue;
            };
            if !seen.insert(name.clone()) {
                // First occurrence wins.
                continue;
            }
            if location == "path" && !placeholders.contains(name.as_str()) {
                return Err(GenError::ParameterLocation(format!(
                    "field {} is bound to path parameter {name} but the path has no {{{name}}} placeholder",
                    field.name
                )));
            }
            let required = location == "path" || is_required(field, &tags);
            let schema = self.schema_from_struct_field(field, required);
            op.parameters.push(Parameter {
                name,
                location: location.to_string(),
                description: field
                    .get_tag(&tags.description)
                    .unwrap_or_default()
                    .to_string(),
                required,
                deprecated: field
                    .get_tag(&tags.deprecated)
                    .and_then(parse_bool)
                    .unwrap_or(false),
                schema,
            });
        }
        if self.sort_params {
            op.parameters
                .sort_by_key(|p| (location_rank(&p.location), p.name.clone()));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn set_operation_response(
        &mut self,
        op: &mut Operation,
        model: Option<Type>,
        code: &str,
        media_type: &str,
        description: &str,
        headers: &[ResponseHeader],
        example: Option<Value>,
        examples: &BTreeMap<String, Value>,
    ) -> Result<(), GenError> {
        let reason = check_status_code(code)?;
        if example.is_some() && !examples.is_empty() {
            return Err(GenError::ResponseConflict(format!(
                "response {code}: example and examples are mutually exclusive"
            )));
        }
        let response = op
            .responses
            .entry(code.to_string())
            .or_insert_with(|| Response {
                description: if description.is_empty() {
                    reason.unwrap_or_default().to_string()
                } else {
                    description.to_string()
                },
                ..Response::default()
            });

        // A 204 carries no body; otherwise content is additive across
        // media types, and only an exact (code, media type) duplicate
        // is rejected.
        let has_content = model.is_some() || example.is_some() || !examples.is_empty();
        if code != "204" && has_content {
            if response.content.contains_key(media_type) {
                return Err(GenError::ResponseConflict(format!(
                    "response {code} already has content for media type {media_type}"
                )));
            }
            let schema = model.and_then(|t| self.schema_from_type(t));
            response.content.insert(
                media_type.to_string(),
                MediaType {
                    schema,
                    example,
                    examples: examples
                        .iter()
                        .map(|(k, v)| (k.clone(), Example { value: Some(v.clone()) }))
                        .collect(),
                },
            );
        }
        for header in headers {
            let schema = match header.model {
                Some(t) => self.schema_from_type(t),
                None => Some(SchemaOrRef::inline(Schema::primitive("string", "", false))),
            };
            response
                .headers
                .entry(header.name.clone())
                .or_insert(Header {
                    description: header.description.clone(),
                    schema,
                });
        }
        Ok(())
    }

    // ── Error sink ──────────────────────────────────────────────────

    fn push_error(&mut self, err: GenError) {
        warn!(error = %err, "generation error");
        self.errors.push(err);
    }

    fn push_field_error(&mut self, field: &Field, ty: Type, message: &str) {
        self.push_error(GenError::Field {
            name: field.name.clone(),
            type_name: self.store.describe(ty),
            message: message.to_string(),
        });
    }
}

/// Rewrite colon- and star-parameter segments to brace placeholders:
/// `/users/:id` becomes `/users/{id}`.
pub fn rewrite_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            match segment
                .strip_prefix(':')
                .or_else(|| segment.strip_prefix('*'))
            {
                Some(name) => format!("{{{name}}}"),
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_promoted(field: &Field, tags: &TagConfig) -> bool {
    // An embedded field with an explicit wire name is an ordinary
    // field under that name, not a promotion.
    field.flatten
        && match field.get_tag(&tags.name) {
            Some("-") | None => true,
            Some(v) => v.split(',').next().unwrap_or("").is_empty(),
        }
}

fn wire_name(field: &Field, tags: &TagConfig) -> Option<String> {
    match field.get_tag(&tags.name) {
        Some("-") => None,
        Some(v) => {
            let name = v.split(',').next().unwrap_or("");
            if name.is_empty() {
                Some(field.name.clone())
            } else {
                Some(name.to_string())
            }
        }
        None => Some(field.name.clone()),
    }
}

fn is_required(field: &Field, tags: &TagConfig) -> bool {
    field
        .get_tag(&tags.validator)
        .is_some_and(|v| v.split(',').any(|t| t == "required"))
}

fn validator_format(tag: &str) -> Option<&'static str> {
    tag.split(',').find_map(|token| match token {
        "email" => Some("email"),
        "uuid" => Some("uuid"),
        "uri" => Some("uri"),
        "url" => Some("url"),
        "hostname" => Some("hostname"),
        "ipv4" => Some("ipv4"),
        "ipv6" => Some("ipv6"),
        _ => None,
    })
}

fn location_rank(location: &str) -> u8 {
    match location {
        "path" => 0,
        "query" => 1,
        _ => 2,
    }
}

fn param_location(
    field: &Field,
    tags: &TagConfig,
) -> Result<Option<(&'static str, String)>, GenError> {
    let mut found: Option<(&'static str, String)> = None;
    for (location, key) in [
        ("path", &tags.path),
        ("query", &tags.query),
        ("header", &tags.header),
    ] {
        if let Some(v) = field.get_tag(key) {
            if found.is_some() {
                return Err(GenError::ParameterLocation(format!(
                    "field {} is bound to more than one parameter location",
                    field.name
                )));
            }
            let name = if v.is_empty() {
                field.name.clone()
            } else {
                v.split(',').next().unwrap_or(v).to_string()
            };
            found = Some((location, name));
        }
    }
    Ok(found)
}

/// Collect parameter candidate fields: declared fields first, then
/// embedded promotions, skipping private members and self-embeddings.
fn collect_param_fields<'ts>(
    store: &'ts TypeStore,
    ty: Type,
    chain: &mut Vec<Type>,
    out: &mut Vec<&'ts Field>,
) {
    let fields = match store.def(ty) {
        TypeDef::Struct(fields) => fields,
        _ => return,
    };
    for field in fields.iter().filter(|f| f.public && !f.flatten) {
        out.push(field);
    }
    for field in fields.iter().filter(|f| f.public && f.flatten) {
        let (fbase, _) = store.deref(field.ty);
        if !matches!(store.def(fbase), TypeDef::Struct(_)) || chain.contains(&fbase) {
            continue;
        }
        chain.push(fbase);
        collect_param_fields(store, fbase, chain, out);
        chain.pop();
    }
}

/// Validate a status token: a three-digit code in the 100..=599 range
/// or a wildcard class such as `5XX`. Returns the canonical reason
/// phrase for plain codes.
fn check_status_code(code: &str) -> Result<Option<&'static str>, GenError> {
    if code.len() == 3 && code.ends_with("XX") {
        if matches!(code.as_bytes()[0], b'1'..=b'5') {
            return Ok(None);
        }
        return Err(GenError::MalformedStatusCode(code.to_string()));
    }
    let numeric: u16 = code
        .parse()
        .map_err(|_| GenError::MalformedStatusCode(code.to_string()))?;
    if !(100..=599).contains(&numeric) {
        return Err(GenError::MalformedStatusCode(code.to_string()));
    }
    Ok(http::StatusCode::from_u16(numeric)
        .ok()
        .and_then(|s| s.canonical_reason()))
}

fn upper_first(package: &str) -> String {
    let last = package.rsplit(['/', '.']).next().unwrap_or(package);
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_colon_and_star_segments() {
        assert_eq!(rewrite_path("/test/:a"), "/test/{a}");
        assert_eq!(rewrite_path("/files/*filepath"), "/files/{filepath}");
        assert_eq!(rewrite_path("/users/:id/posts/:post"), "/users/{id}/posts/{post}");
        assert_eq!(rewrite_path("/plain"), "/plain");
    }

    #[test]
    fn status_code_validation() {
        assert_eq!(check_status_code("200").unwrap(), Some("OK"));
        assert_eq!(check_status_code("5XX").unwrap(), None);
        assert!(check_status_code("two-hundred").is_err());
        assert!(check_status_code("777").is_err());
        assert!(check_status_code("6XX").is_err());
        assert!(check_status_code("99").is_err());
    }

    #[test]
    fn package_qualified_names() {
        assert_eq!(upper_first("openapi"), "Openapi");
        assert_eq!(upper_first("net/url"), "Url");
    }
}
