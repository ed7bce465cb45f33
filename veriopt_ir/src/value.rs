//! Concrete runtime values and node constants.

use std::fmt;

/// A concrete value: a constant carried by a node, a test argument, or a
/// test result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Null,
    /// Slot in the test heap. `None` is a null reference argument.
    HeapRef(Option<u32>),
    /// A value of a runtime type the encoder has no term for.
    Other(String),
}

impl Value {
    /// Name of the value's runtime type.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "Boolean",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Char(_) => "Character",
            Value::Int(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Str(_) => "String",
            Value::Null => "null",
            Value::HeapRef(_) => "HeapRef",
            Value::Other(name) => name,
        }
    }

    /// Boxed primitives, the only values passed to tests by value.
    pub fn is_integral_primitive(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Byte(_)
                | Value::Short(_)
                | Value::Char(_)
                | Value::Int(_)
                | Value::Long(_)
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Value::Float(_) | Value::Double(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Null => f.write_str("null"),
            Value::HeapRef(Some(i)) => write!(f, "heap[{}]", i),
            Value::HeapRef(None) => f.write_str("heap[none]"),
            Value::Other(name) => write!(f, "<{}>", name),
        }
    }
}

/// The payload of a `ConstantNode`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Primitive(Value),
    Null,
    /// A non-null object constant, described for diagnostics only.
    Object(String),
}

impl Constant {
    pub fn int(v: i32) -> Self {
        Constant::Primitive(Value::Int(v))
    }

    pub fn long(v: i64) -> Self {
        Constant::Primitive(Value::Long(v))
    }

    pub fn bool(v: bool) -> Self {
        Constant::Primitive(Value::Bool(v))
    }

    /// Constant holding `value`; nulls map to [`Constant::Null`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Constant::Null,
            other => Constant::Primitive(other),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Primitive(v) => write!(f, "{}", v),
            Constant::Null => f.write_str("null"),
            Constant::Object(desc) => write!(f, "Object[{}]", desc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_maps_null() {
        assert_eq!(Constant::from_value(Value::Null), Constant::Null);
        assert_eq!(Constant::from_value(Value::Int(3)), Constant::int(3));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Char(65).type_name(), "Character");
        assert_eq!(Value::Other("java.util.ArrayList".into()).type_name(), "java.util.ArrayList");
    }
}
