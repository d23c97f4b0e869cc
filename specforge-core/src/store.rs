use std::collections::BTreeMap;

use serde_json::Value;

/// Handle to a type interned in a [`TypeStore`].
///
/// Handles are cheap to copy and only meaningful for the store that
/// produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Type(u32);

/// Declared name of a type, qualified by the package (module path)
/// that declares it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub package: String,
    pub ident: String,
}

/// Width of an integer type. `Machine` is the platform-sized integer,
/// treated as 32-bit for wire purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    Machine,
}

impl IntWidth {
    pub fn is_64(self) -> bool {
        matches!(self, IntWidth::W64)
    }
}

/// Structural definition of a type.
///
/// Named types clone the definition of their underlying type rather
/// than chaining to it, so consumers never have to walk aliases; only
/// pointers require dereferencing.
#[derive(Clone, Debug)]
pub enum TypeDef {
    Int(IntWidth),
    Uint(IntWidth),
    Float32,
    Float64,
    Bool,
    Str,
    /// A byte slice, kept distinct from `Slice(u8)` so it can map to
    /// the `("string", "byte")` wire pair.
    Bytes,
    /// The "any value" type. Schemas derived from it carry no type.
    Any,
    Ptr(Type),
    Slice(Type),
    Array(Type, usize),
    Map {
        key: Type,
        value: Type,
    },
    Struct(Vec<Field>),

    // Well-known imported types.
    Instant,
    Duration,
    Url,
    Ip,
    Uuid,
    ObjectId,

    // Kinds that cannot be represented in a schema document.
    Func,
    Chan,
    Uintptr,
    Complex,
}

/// A struct field definition: declared name, type, visibility,
/// flattening flag and its raw annotation strings.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub public: bool,
    pub flatten: bool,
    tags: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            public: true,
            flatten: false,
            tags: BTreeMap::new(),
        }
    }

    /// Mark the field private. Private fields never appear in schemas.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Mark the field as an embedded member whose fields are promoted
    /// into the enclosing struct.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Attach an annotation string under the given tag key.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Look up an annotation by tag key.
    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Result of a custom example parser.
pub type ParseFn = fn(&str) -> Result<Value, String>;

/// Optional behaviors a type may opt into. Absence of a capability
/// always falls through to default behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    /// Self-described `(type, format)` wire pair.
    pub data_type: Option<(&'static str, &'static str)>,
    /// Custom schema name, used instead of the declared name.
    pub schema_name: Option<&'static str>,
    /// Forced nullability; wins over pointer indirection.
    pub nullable: Option<bool>,
    /// Custom parser for example/default/enum annotation text.
    pub example_parser: Option<ParseFn>,
}

struct Entry {
    def: TypeDef,
    name: Option<TypeName>,
    caps: Capabilities,
}

/// Interned graph of type descriptors.
///
/// All leaf types are interned up front; composite types are created
/// through the builder methods. Recursive types are expressed by
/// [`declare`](TypeStore::declare)-ing a named struct before
/// [`define`](TypeStore::define)-ing its fields, so a field may refer
/// to its enclosing type.
pub struct TypeStore {
    entries: Vec<Entry>,
    leaves: Leaves,
}

struct Leaves {
    int8: Type,
    int16: Type,
    int32: Type,
    int64: Type,
    int: Type,
    uint8: Type,
    uint16: Type,
    uint32: Type,
    uint64: Type,
    uint: Type,
    float32: Type,
    float64: Type,
    boolean: Type,
    string: Type,
    bytes: Type,
    any: Type,
    instant: Type,
    duration: Type,
    url: Type,
    ip: Type,
    uuid: Type,
    object_id: Type,
    func: Type,
    chan: Type,
    uintptr: Type,
    complex: Type,
}

impl TypeStore {
    pub fn new() -> Self {
        let mut entries = Vec::new();
        let mut leaf = |def: TypeDef| {
            let id = Type(entries.len() as u32);
            entries.push(Entry {
                def,
                name: None,
                caps: Capabilities::default(),
            });
            id
        };
        let leaves = Leaves {
            int8: leaf(TypeDef::Int(IntWidth::W8)),
            int16: leaf(TypeDef::Int(IntWidth::W16)),
            int32: leaf(TypeDef::Int(IntWidth::W32)),
            int64: leaf(TypeDef::Int(IntWidth::W64)),
            int: leaf(TypeDef::Int(IntWidth::Machine)),
            uint8: leaf(TypeDef::Uint(IntWidth::W8)),
            uint16: leaf(TypeDef::Uint(IntWidth::W16)),
            uint32: leaf(TypeDef::Uint(IntWidth::W32)),
            uint64: leaf(TypeDef::Uint(IntWidth::W64)),
            uint: leaf(TypeDef::Uint(IntWidth::Machine)),
            float32: leaf(TypeDef::Float32),
            float64: leaf(TypeDef::Float64),
            boolean: leaf(TypeDef::Bool),
            string: leaf(TypeDef::Str),
            bytes: leaf(TypeDef::Bytes),
            any: leaf(TypeDef::Any),
            instant: leaf(TypeDef::Instant),
            duration: leaf(TypeDef::Duration),
            url: leaf(TypeDef::Url),
            ip: leaf(TypeDef::Ip),
            uuid: leaf(TypeDef::Uuid),
            object_id: leaf(TypeDef::ObjectId),
            func: leaf(TypeDef::Func),
            chan: leaf(TypeDef::Chan),
            uintptr: leaf(TypeDef::Uintptr),
            complex: leaf(TypeDef::Complex),
        };
        Self { entries, leaves }
    }

    // ── Leaf accessors ──────────────────────────────────────────────

    pub fn int8(&self) -> Type {
        self.leaves.int8
    }
    pub fn int16(&self) -> Type {
        self.leaves.int16
    }
    pub fn int32(&self) -> Type {
        self.leaves.int32
    }
    pub fn int64(&self) -> Type {
        self.leaves.int64
    }
    pub fn int(&self) -> Type {
        self.leaves.int
    }
    pub fn uint8(&self) -> Type {
        self.leaves.uint8
    }
    pub fn uint16(&self) -> Type {
        self.leaves.uint16
    }
    pub fn uint32(&self) -> Type {
        self.leaves.uint32
    }
    pub fn uint64(&self) -> Type {
        self.leaves.uint64
    }
    pub fn uint(&self) -> Type {
        self.leaves.uint
    }
    pub fn float32(&self) -> Type {
        self.leaves.float32
    }
    pub fn float64(&self) -> Type {
        self.leaves.float64
    }
    pub fn boolean(&self) -> Type {
        self.leaves.boolean
    }
    pub fn string(&self) -> Type {
        self.leaves.string
    }
    pub fn bytes(&self) -> Type {
        self.leaves.bytes
    }
    pub fn any(&self) -> Type {
        self.leaves.any
    }
    pub fn instant(&self) -> Type {
        self.leaves.instant
    }
    pub fn duration(&self) -> Type {
        self.leaves.duration
    }
    pub fn url(&self) -> Type {
        self.leaves.url
    }
    pub fn ip(&self) -> Type {
        self.leaves.ip
    }
    pub fn uuid(&self) -> Type {
        self.leaves.uuid
    }
    pub fn object_id(&self) -> Type {
        self.leaves.object_id
    }
    pub fn func(&self) -> Type {
        self.leaves.func
    }
    pub fn chan(&self) -> Type {
        self.leaves.chan
    }
    pub fn uintptr(&self) -> Type {
        self.leaves.uintptr
    }
    pub fn complex(&self) -> Type {
        self.leaves.complex
    }

    // ── Composite builders ──────────────────────────────────────────

    fn intern(&mut self, def: TypeDef, name: Option<TypeName>) -> Type {
        let id = Type(self.entries.len() as u32);
        self.entries.push(Entry {
            def,
            name,
            caps: Capabilities::default(),
        });
        id
    }

    pub fn ptr(&mut self, pointee: Type) -> Type {
        self.intern(TypeDef::Ptr(pointee), None)
    }

    /// A slice of `elem`. A slice of `uint8` is the byte-slice type.
    pub fn slice(&mut self, elem: Type) -> Type {
        if elem == self.leaves.uint8 {
            return self.leaves.bytes;
        }
        self.intern(TypeDef::Slice(elem), None)
    }

    pub fn array(&mut self, elem: Type, len: usize) -> Type {
        self.intern(TypeDef::Array(elem, len), None)
    }

    pub fn map(&mut self, key: Type, value: Type) -> Type {
        self.intern(TypeDef::Map { key, value }, None)
    }

    /// An anonymous struct type.
    pub fn struct_of(&mut self, fields: Vec<Field>) -> Type {
        self.intern(TypeDef::Struct(fields), None)
    }

    pub fn named_struct(
        &mut self,
        package: impl Into<String>,
        ident: impl Into<String>,
        fields: Vec<Field>,
    ) -> Type {
        self.intern(
            TypeDef::Struct(fields),
            Some(TypeName {
                package: package.into(),
                ident: ident.into(),
            }),
        )
    }

    /// Reserve a named struct whose fields are supplied later with
    /// [`define`](TypeStore::define). This is how self-referential and
    /// mutually-referential types are built.
    pub fn declare(&mut self, package: impl Into<String>, ident: impl Into<String>) -> Type {
        self.named_struct(package, ident, Vec::new())
    }

    /// Supply the fields of a previously declared struct.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not a struct.
    pub fn define(&mut self, ty: Type, fields: Vec<Field>) {
        match &mut self.entries[ty.0 as usize].def {
            TypeDef::Struct(existing) => *existing = fields,
            other => panic!("define called on non-struct type {other:?}"),
        }
    }

    /// A named type whose underlying definition is that of `underlying`.
    pub fn newtype(
        &mut self,
        package: impl Into<String>,
        ident: impl Into<String>,
        underlying: Type,
    ) -> Type {
        let def = self.entries[underlying.0 as usize].def.clone();
        self.intern(
            def,
            Some(TypeName {
                package: package.into(),
                ident: ident.into(),
            }),
        )
    }

    // ── Capabilities ────────────────────────────────────────────────

    pub fn set_data_type(&mut self, ty: Type, wire_type: &'static str, format: &'static str) {
        self.entries[ty.0 as usize].caps.data_type = Some((wire_type, format));
    }

    pub fn set_schema_name(&mut self, ty: Type, name: &'static str) {
        self.entries[ty.0 as usize].caps.schema_name = Some(name);
    }

    pub fn set_nullable(&mut self, ty: Type, nullable: bool) {
        self.entries[ty.0 as usize].caps.nullable = Some(nullable);
    }

    pub fn set_example_parser(&mut self, ty: Type, parser: ParseFn) {
        self.entries[ty.0 as usize].caps.example_parser = Some(parser);
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn def(&self, ty: Type) -> &TypeDef {
        &self.entries[ty.0 as usize].def
    }

    pub fn name(&self, ty: Type) -> Option<&TypeName> {
        self.entries[ty.0 as usize].name.as_ref()
    }

    pub fn caps(&self, ty: Type) -> &Capabilities {
        &self.entries[ty.0 as usize].caps
    }

    /// Follow pointer indirection to the base type, returning the base
    /// and the number of pointers crossed.
    pub fn deref(&self, ty: Type) -> (Type, usize) {
        let mut t = ty;
        let mut depth = 0;
        while let TypeDef::Ptr(pointee) = self.def(t) {
            t = *pointee;
            depth += 1;
        }
        (t, depth)
    }

    /// Human-readable description of a type, for error messages.
    pub fn describe(&self, ty: Type) -> String {
        if let Some(name) = self.name(ty) {
            if name.package.is_empty() {
                return name.ident.clone();
            }
            return format!("{}.{}", name.package, name.ident);
        }
        match self.def(ty) {
            TypeDef::Int(w) => match w {
                IntWidth::W8 => "int8".into(),
                IntWidth::W16 => "int16".into(),
                IntWidth::W32 => "int32".into(),
                IntWidth::W64 => "int64".into(),
                IntWidth::Machine => "int".into(),
            },
            TypeDef::Uint(w) => match w {
                IntWidth::W8 => "uint8".into(),
                IntWidth::W16 => "uint16".into(),
                IntWidth::W32 => "uint32".into(),
                IntWidth::W64 => "uint64".into(),
                IntWidth::Machine => "uint".into(),
            },
            TypeDef::Float32 => "float32".into(),
            TypeDef::Float64 => "float64".into(),
            TypeDef::Bool => "bool".into(),
            TypeDef::Str => "string".into(),
            TypeDef::Bytes => "bytes".into(),
            TypeDef::Any => "any".into(),
            TypeDef::Ptr(p) => format!("*{}", self.describe(*p)),
            TypeDef::Slice(e) => format!("[]{}", self.describe(*e)),
            TypeDef::Array(e, n) => format!("[{}]{}", n, self.describe(*e)),
            TypeDef::Map { key, value } => {
                format!("map[{}]{}", self.describe(*key), self.describe(*value))
            }
            TypeDef::Struct(_) => "struct".into(),
            TypeDef::Instant => "time".into(),
            TypeDef::Duration => "duration".into(),
            TypeDef::Url => "url".into(),
            TypeDef::Ip => "ip".into(),
            TypeDef::Uuid => "uuid".into(),
            TypeDef::ObjectId => "objectid".into(),
            TypeDef::Func => "func".into(),
            TypeDef::Chan => "chan".into(),
            TypeDef::Uintptr => "uintptr".into(),
            TypeDef::Complex => "complex".into(),
        }
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}
