//! Declarative value shapes.
//!
//! A [`Schema`] does two independent things: it validates a JSON value
//! ([`Schema::validate`]) and renders itself as JSON Schema
//! ([`Schema::to_json_schema`]) for embedding in prompts and structured
//! output requests.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// A validation failure, located by JSON path (`$.items[2].name`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// The shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// Accepts anything.
    Any,
    String,
    Number,
    /// A number without a fractional part.
    Integer,
    Boolean,
    Array(Box<Schema>),
    /// Any JSON object, keys and values unchecked.
    Record,
    Object(Vec<Field>),
    /// One of a closed set of strings.
    Enum(Vec<String>),
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

/// A value shape plus documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: Kind,
    pub description: Option<String>,
    pub nullable: bool,
}

impl Schema {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            description: None,
            nullable: false,
        }
    }

    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    pub fn number() -> Self {
        Self::of(Kind::Number)
    }

    pub fn integer() -> Self {
        Self::of(Kind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    pub fn array(items: Schema) -> Self {
        Self::of(Kind::Array(Box::new(items)))
    }

    pub fn record() -> Self {
        Self::of(Kind::Record)
    }

    /// An object with no fields yet. Add them with [`Schema::field`] and
    /// [`Schema::optional_field`].
    pub fn object() -> Self {
        Self::of(Kind::Object(Vec::new()))
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Attach documentation.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Also accept `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Add a required field. No-op on non-object schemas.
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with_field(name.into(), schema, true)
    }

    /// Add an optional field. No-op on non-object schemas.
    pub fn optional_field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with_field(name.into(), schema, false)
    }

    fn with_field(mut self, name: String, schema: Schema, required: bool) -> Self {
        if let Kind::Object(fields) = &mut self.kind {
            fields.retain(|f| f.name != name);
            fields.push(Field {
                name,
                schema,
                required,
            });
        }
        self
    }

    /// Validate `value`, returning its normalized form.
    ///
    /// Normalization drops object keys the schema does not declare and
    /// optional fields whose value is `null`.
    pub fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        self.check("$", value)
    }

    fn check(&self, path: &str, value: &Value) -> Result<Value, SchemaError> {
        if value.is_null() && (self.nullable || self.kind == Kind::Any) {
            return Ok(Value::Null);
        }

        match &self.kind {
            Kind::Any => Ok(value.clone()),
            Kind::String if value.is_string() => Ok(value.clone()),
            Kind::Number if value.is_number() => Ok(value.clone()),
            Kind::Integer if is_integer(value) => Ok(value.clone()),
            Kind::Boolean if value.is_boolean() => Ok(value.clone()),
            Kind::Record if value.is_object() => Ok(value.clone()),
            Kind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Ok(value.clone()),
                _ => Err(SchemaError::new(
                    path,
                    format!(
                        "expected one of {}, found {}",
                        allowed
                            .iter()
                            .map(|a| format!("\"{a}\""))
                            .collect::<Vec<_>>()
                            .join(" | "),
                        describe_value(value)
                    ),
                )),
            },
            Kind::Array(items) => {
                let Some(elements) = value.as_array() else {
                    return Err(self.mismatch(path, value));
                };
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| items.check(&format!("{path}[{i}]"), element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Kind::Object(fields) => {
                let Some(object) = value.as_object() else {
                    return Err(self.mismatch(path, value));
                };
                let mut normalized = Map::new();
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match object.get(&field.name) {
                        Some(Value::Null) if !field.required && !field.schema.nullable => {}
                        Some(v) => {
                            normalized.insert(field.name.clone(), field.schema.check(&field_path, v)?);
                        }
                        None if field.required => {
                            return Err(SchemaError::new(&field_path, "required field is missing"));
                        }
                        None => {}
                    }
                }
                Ok(Value::Object(normalized))
            }
            _ => Err(self.mismatch(path, value)),
        }
    }

    fn mismatch(&self, path: &str, value: &Value) -> SchemaError {
        SchemaError::new(
            path,
            format!(
                "expected {}, found {}",
                self.type_name(),
                describe_value(value)
            ),
        )
    }

    fn type_name(&self) -> &'static str {
        match self.kind {
            Kind::Any => "any value",
            Kind::String | Kind::Enum(_) => "string",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Array(_) => "array",
            Kind::Record | Kind::Object(_) => "object",
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();

        let json_type = match &self.kind {
            Kind::Any => None,
            Kind::String | Kind::Enum(_) => Some("string"),
            Kind::Number => Some("number"),
            Kind::Integer => Some("integer"),
            Kind::Boolean => Some("boolean"),
            Kind::Array(_) => Some("array"),
            Kind::Record | Kind::Object(_) => Some("object"),
        };
        if let Some(t) = json_type {
            let t = if self.nullable {
                json!([t, "null"])
            } else {
                json!(t)
            };
            out.insert("type".into(), t);
        }

        match &self.kind {
            Kind::Array(items) => {
                out.insert("items".into(), items.to_json_schema());
            }
            Kind::Enum(values) => {
                out.insert("enum".into(), json!(values));
            }
            Kind::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.schema.to_json_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.as_str())
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert("required".into(), json!(required));
                out.insert("additionalProperties".into(), Value::Bool(false));
            }
            _ => {}
        }

        if let Some(description) = &self.description {
            out.insert("description".into(), json!(description));
        }

        Value::Object(out)
    }
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
