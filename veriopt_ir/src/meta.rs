//! Declared-type metadata for the program a graph belongs to.
//!
//! The exporter resolves virtual dispatch, class initializers and class
//! layouts through this universe instead of inspecting a live runtime:
//!
//! - **Types** (`JavaKind`, `JavaType`): primitive kinds, class and array types
//! - **Signatures** (`MethodSignature`, `MethodRef`, `MethodKey`): the canonical
//!   method identity used as cache key and emitted for call targets
//! - **Declarations** (`ClassInfo`, `MethodInfo`, `FieldInfo`): what each class declares
//! - **Lookup** (`TypeUniverse`): name-indexed class table with method search

use crate::value::Value;
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use std::fmt;

/// Name of the universal root type.
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// Method name used for instance initializers.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Method name used for static initializers.
pub const CLASS_INITIALIZER_NAME: &str = "<clinit>";

// =============================================================================
// Kinds and Types
// =============================================================================

/// Primitive kinds, plus `Void` for return types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JavaKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl JavaKind {
    /// Single-character descriptor (`I`, `J`, `Z`, ...).
    pub const fn descriptor_char(self) -> char {
        match self {
            JavaKind::Boolean => 'Z',
            JavaKind::Byte => 'B',
            JavaKind::Char => 'C',
            JavaKind::Short => 'S',
            JavaKind::Int => 'I',
            JavaKind::Long => 'J',
            JavaKind::Float => 'F',
            JavaKind::Double => 'D',
            JavaKind::Void => 'V',
        }
    }

    /// Source-level keyword.
    pub const fn java_name(self) -> &'static str {
        match self {
            JavaKind::Boolean => "boolean",
            JavaKind::Byte => "byte",
            JavaKind::Char => "char",
            JavaKind::Short => "short",
            JavaKind::Int => "int",
            JavaKind::Long => "long",
            JavaKind::Float => "float",
            JavaKind::Double => "double",
            JavaKind::Void => "void",
        }
    }

    /// The zero value a field of this kind starts with.
    pub fn default_value(self) -> Value {
        match self {
            JavaKind::Boolean => Value::Bool(false),
            JavaKind::Byte => Value::Byte(0),
            JavaKind::Char => Value::Char(0),
            JavaKind::Short => Value::Short(0),
            JavaKind::Int => Value::Int(0),
            JavaKind::Long => Value::Long(0),
            JavaKind::Float => Value::Float(0.0),
            JavaKind::Double => Value::Double(0.0),
            JavaKind::Void => Value::Null,
        }
    }
}

/// A declared type: primitive, class, or array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(JavaKind),
    Class(String),
    Array(Box<JavaType>),
}

impl JavaType {
    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class(name.into())
    }

    pub fn array_of(element: JavaType) -> Self {
        JavaType::Array(Box::new(element))
    }

    pub const fn int() -> Self {
        JavaType::Primitive(JavaKind::Int)
    }

    pub const fn void() -> Self {
        JavaType::Primitive(JavaKind::Void)
    }

    pub fn kind(&self) -> Option<JavaKind> {
        match self {
            JavaType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Primitive(JavaKind::Void))
    }

    /// Method-descriptor form: `I`, `Ljava/lang/String;`, `[I`.
    pub fn descriptor(&self) -> String {
        match self {
            JavaType::Primitive(kind) => kind.descriptor_char().to_string(),
            JavaType::Class(name) => format!("L{};", name.replace('.', "/")),
            JavaType::Array(element) => format!("[{}", element.descriptor()),
        }
    }

    /// Source-style name: `int`, `java.lang.String`, `int[]`.
    pub fn class_name(&self) -> String {
        match self {
            JavaType::Primitive(kind) => kind.java_name().to_string(),
            JavaType::Class(name) => name.clone(),
            JavaType::Array(element) => format!("{}[]", element.class_name()),
        }
    }

    /// Runtime class name: `int`, `java.lang.String`, `[I`, `[Ljava.lang.String;`.
    pub fn reflect_name(&self) -> String {
        match self {
            JavaType::Array(_) => self.descriptor().replace('/', "."),
            _ => self.class_name(),
        }
    }

    /// Name without the package: `String`, `int`, `Outer$Inner[]`.
    pub fn unqualified_name(&self) -> String {
        let name = self.class_name();
        match name.rfind('.') {
            Some(dot) => name[dot + 1..].to_string(),
            None => name,
        }
    }

    /// Zero value stored into a freshly allocated field of this type.
    pub fn default_value(&self) -> Value {
        match self {
            JavaType::Primitive(kind) => kind.default_value(),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

// =============================================================================
// Signatures and Method Identity
// =============================================================================

/// Parameter and return types of a method (receiver excluded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub params: Vec<JavaType>,
    pub ret: JavaType,
}

impl MethodSignature {
    pub fn new(params: Vec<JavaType>, ret: JavaType) -> Self {
        Self { params, ret }
    }

    /// `(II)I` style descriptor.
    pub fn to_descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            out.push_str(&param.descriptor());
        }
        out.push(')');
        out.push_str(&self.ret.descriptor());
        out
    }
}

/// Canonical method identity: `holder.name(descriptor)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey(String);

impl MethodKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with its holder's package and class stripped, e.g. `m(I)I`.
    pub fn short_name(&self) -> &str {
        short_name_of(&self.0)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MethodKey {
    fn from(key: &str) -> Self {
        MethodKey(key.to_string())
    }
}

/// Last `.`-separated component. Descriptors use `/` so they survive intact.
pub fn short_name_of(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(dot) => &qualified[dot + 1..],
        None => qualified,
    }
}

/// A resolved reference to a declared method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub holder: String,
    pub name: String,
    pub signature: MethodSignature,
}

impl MethodRef {
    pub fn new(holder: impl Into<String>, name: impl Into<String>, signature: MethodSignature) -> Self {
        Self {
            holder: holder.into(),
            name: name.into(),
            signature,
        }
    }

    pub fn key(&self) -> MethodKey {
        MethodKey(format!(
            "{}.{}{}",
            self.holder,
            self.name,
            self.signature.to_descriptor()
        ))
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_class_initializer(&self) -> bool {
        self.name == CLASS_INITIALIZER_NAME
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A field identified by its declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub holder: String,
    pub name: String,
}

impl FieldRef {
    pub fn new(holder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
            name: name.into(),
        }
    }
}

/// `Holder::name`, the form used in field-reference terms.
impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.holder, self.name)
    }
}

// =============================================================================
// Declarations
// =============================================================================

bitflags! {
    /// Modifiers of a declared method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        const STATIC = 1 << 0;
        const NATIVE = 1 << 1;
        const ABSTRACT = 1 << 2;
    }
}

bitflags! {
    /// Modifiers of a declared field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        const STATIC = 1 << 0;
        const FINAL = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub method: MethodRef,
    pub flags: MethodFlags,
}

impl MethodInfo {
    pub fn new(method: MethodRef, flags: MethodFlags) -> Self {
        Self { method, flags }
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_native(&self) -> bool {
        self.flags.contains(MethodFlags::NATIVE)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ABSTRACT)
    }

    /// Whether the method has a body that a graph can be built from.
    pub fn has_code(&self) -> bool {
        !self.is_native() && !self.is_abstract()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub field: FieldRef,
    pub ty: JavaType,
    pub flags: FieldFlags,
}

impl FieldInfo {
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldFlags::STATIC)
    }
}

/// Everything a class declares, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub constructors: Vec<MethodInfo>,
    pub class_initializer: Option<MethodInfo>,
}

impl ClassInfo {
    /// A class extending `java.lang.Object`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: Some(OBJECT_CLASS.to_string()),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            class_initializer: None,
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn root(mut self) -> Self {
        self.superclass = None;
        self
    }

    pub fn field(mut self, name: &str, ty: JavaType) -> Self {
        self.fields.push(FieldInfo {
            field: FieldRef::new(self.name.clone(), name),
            ty,
            flags: FieldFlags::empty(),
        });
        self
    }

    pub fn static_field(mut self, name: &str, ty: JavaType) -> Self {
        self.fields.push(FieldInfo {
            field: FieldRef::new(self.name.clone(), name),
            ty,
            flags: FieldFlags::STATIC,
        });
        self
    }

    pub fn method(mut self, name: &str, signature: MethodSignature, flags: MethodFlags) -> Self {
        let method = MethodRef::new(self.name.clone(), name, signature);
        self.methods.push(MethodInfo::new(method, flags));
        self
    }

    pub fn constructor(mut self, params: Vec<JavaType>) -> Self {
        let signature = MethodSignature::new(params, JavaType::void());
        let method = MethodRef::new(self.name.clone(), CONSTRUCTOR_NAME, signature);
        self.constructors.push(MethodInfo::new(method, MethodFlags::empty()));
        self
    }

    pub fn class_initializer(mut self) -> Self {
        let signature = MethodSignature::new(Vec::new(), JavaType::void());
        let method = MethodRef::new(self.name.clone(), CLASS_INITIALIZER_NAME, signature);
        self.class_initializer = Some(MethodInfo::new(method, MethodFlags::STATIC));
        self
    }

    /// Instance (non-static) fields.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| !f.is_static())
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.is_static())
    }

    /// Declared method, constructor or initializer with this name and signature.
    pub fn find_declared(&self, name: &str, signature: &MethodSignature) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .chain(self.constructors.iter())
            .chain(self.class_initializer.iter())
            .find(|m| m.method.name == name && &m.method.signature == signature)
    }
}

// =============================================================================
// Type Universe
// =============================================================================

/// All classes known to an export run, indexed by name.
///
/// Always contains `java.lang.Object`.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
    classes: FxHashMap<String, ClassInfo>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        let mut classes = FxHashMap::default();
        let object = ClassInfo::new(OBJECT_CLASS)
            .root()
            .constructor(Vec::new());
        classes.insert(OBJECT_CLASS.to_string(), object);
        Self { classes }
    }

    /// Add or replace a class.
    pub fn define(&mut self, class: ClassInfo) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn superclass_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name)?.superclass.as_deref()
    }

    /// Proper ancestors of `name`, nearest first, ending at the root.
    ///
    /// Stops early at a superclass missing from the universe or on a cycle.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = self.superclass_of(name);
        while let Some(parent) = current {
            if parent == name || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            if !self.contains(parent) {
                break;
            }
            current = self.superclass_of(parent);
        }
        chain
    }

    /// Method declared by `class` (not inherited) matching name and signature.
    pub fn find_method(
        &self,
        class: &str,
        name: &str,
        signature: &MethodSignature,
    ) -> Option<&MethodInfo> {
        self.classes.get(class)?.find_declared(name, signature)
    }

    /// Declaration behind a method reference.
    pub fn method(&self, method: &MethodRef) -> Option<&MethodInfo> {
        self.find_method(&method.holder, &method.name, &method.signature)
    }

    pub fn class_initializer(&self, class: &str) -> Option<&MethodInfo> {
        self.classes.get(class)?.class_initializer.as_ref()
    }

    pub fn declared_methods(&self, class: &str) -> &[MethodInfo] {
        self.classes
            .get(class)
            .map(|c| c.methods.as_slice())
            .unwrap_or(&[])
    }

    pub fn declared_constructors(&self, class: &str) -> &[MethodInfo] {
        self.classes
            .get(class)
            .map(|c| c.constructors.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
