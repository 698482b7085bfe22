/// An in-memory hex-map document. The on-disk `.wxx` codec lives outside
/// this crate; scripts only see the handle produced by `load`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDoc {
    pub source: String,
    pub width: i64,
    pub height: i64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Num(f64),
    Str(String),
    Bool(bool),
    Array(Vec<Value>),
    Map(MapDoc),
    Nil,
}

/// Ordered sequence of values produced by one call evaluation.
pub(crate) type CallResult = Vec<Value>;

impl Value {
    pub(crate) fn truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Num(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Array(items) => !items.is_empty(),
            Value::Map(_) => true,
            Value::Nil => false,
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Num(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string_value()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(doc) => format!("Map({} {}x{})", doc.source, doc.width, doc.height),
            Value::Nil => "nil".to_string(),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Num(_) => "num",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Nil => "nil",
        }
    }
}
