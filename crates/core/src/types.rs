use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// All server record ids are integers.
pub type RecordId = i64;

/// A record as returned by the server: field name to JSON value, in the
/// order the server sent them.
pub type Record = serde_json::Map<String, Value>;

/// One `(field, operator, value)` search criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTerm {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl Serialize for DomainTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.field)?;
        seq.serialize_element(&self.operator)?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

/// Search domain: a conjunction of terms. The empty domain matches every
/// record of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Domain(Vec<DomainTerm>);

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain matching exactly the given ids.
    pub fn ids(ids: &[RecordId]) -> Self {
        Self::new().filter("id", "in", Value::from(ids.to_vec()))
    }

    /// Append a term.
    pub fn filter(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.0.push(DomainTerm {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        });
        self
    }
}

/// Python-style truthiness of a JSON value, which is how the server's
/// boolean fields are read back (`false`, `null`, `0`, `""`, `[]` and `{}`
/// are all false).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
