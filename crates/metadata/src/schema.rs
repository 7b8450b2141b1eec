//! Reading field types out of the record schemas stored as entity properties.
//!
//! Schemas are JSON documents in the Avro style: a record with a `fields`
//! array, where each field's `type` is a primitive name, a nested schema
//! object, or a union written as an array. A union of exactly one type and
//! `"null"` is a nullable field.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("schema is not valid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("schema is not a record schema")]
	NotARecord,
	#[error("schema field has no type <field='{0}'>")]
	MissingType(String),
}

/// Type name of the field called `field`, upper-cased (`STRING`, `INT`, ...).
///
/// Nullable fields report their non-null type. Returns `Ok(None)` if the record
/// has no such field.
pub fn field_type(schema: &str, field: &str) -> Result<Option<String>, SchemaError> {
	let schema = serde_json::from_str::<Value>(schema)?;

	let fields = schema
		.get("fields")
		.and_then(Value::as_array)
		.ok_or(SchemaError::NotARecord)?;

	let Some(found) = fields
		.iter()
		.find(|f| f.get("name").and_then(Value::as_str) == Some(field))
	else {
		return Ok(None);
	};

	let field_schema = found
		.get("type")
		.ok_or_else(|| SchemaError::MissingType(field.to_string()))?;

	type_name(field_schema)
		.map(Some)
		.ok_or_else(|| SchemaError::MissingType(field.to_string()))
}

fn type_name(schema: &Value) -> Option<String> {
	match schema {
		Value::String(name) => Some(name.to_uppercase()),
		Value::Array(members) => match non_null_member(members) {
			Some(inner) => type_name(inner),
			None => Some("UNION".to_string()),
		},
		Value::Object(object) => object.get("type").and_then(type_name),
		_ => None,
	}
}

/// The single non-null member of a nullable union.
fn non_null_member(members: &[Value]) -> Option<&Value> {
	let is_null = |v: &Value| v.as_str() == Some("null");

	match members {
		[a, b] if is_null(b) && !is_null(a) => Some(a),
		[a, b] if is_null(a) && !is_null(b) => Some(b),
		_ => None,
	}
}
