use crate::error::ErrorSignal;
use serde_json::Value;

/// String-keyed argument map carried by a [`Command`].
pub type Arguments = serde_json::Map<String, Value>;

/// A named request crossing the dispatch boundary.
///
/// Commands are immutable once constructed; the dispatcher hands the
/// arguments to exactly one handler by value.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    name: String,
    arguments: Arguments,
}
impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn into_parts(self) -> (String, Arguments) {
        (self.name, self.arguments)
    }
}

/// Typed extraction of handler arguments.
///
/// Absent, `null` and mistyped values are all caller misuse and surface as
/// [`InvalidArgument`](crate::ErrorCode::InvalidArgument).
pub trait ArgumentsExt {
    fn required_str(&self, key: &str) -> Result<&str, ErrorSignal>;
}
impl ArgumentsExt for Arguments {
    fn required_str(&self, key: &str) -> Result<&str, ErrorSignal> {
        match self.get(key) {
            None | Some(Value::Null) => Err(ErrorSignal::invalid_argument(format!("`{key}` cannot be null"))),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ErrorSignal::invalid_argument(format!(
                "`{key}` must be a string, got {}",
                type_name(other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
