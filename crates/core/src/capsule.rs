//! Immutable snapshots of one capability's state.
//!
//! A [`StateCapsule`] is a flat record of named [`FieldValue`]s. It never
//! holds references to live objects, so it can be stored, compared, and
//! encoded without knowing which capability produced it. Capabilities
//! declare their own shape: either field by field through
//! [`StateCapsule::builder`], or by round-tripping a plain serde record with
//! [`StateCapsule::from_record`] / [`StateCapsule::to_record`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::CapsuleError;

/// Value stored under one capsule field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    /// Also carries `f32` values losslessly.
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Record(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Short name of the variant, used in mismatch diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    fn from_json(field: &str, value: Value) -> Result<Self, CapsuleError> {
        Ok(match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => number_to_field(field, &n)?,
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| Self::from_json(field, item))
                    .collect::<Result<_, CapsuleError>>()?,
            ),
            Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(k, v)| {
                        let value = Self::from_json(&k, v)?;
                        Ok((k, value))
                    })
                    .collect::<Result<_, CapsuleError>>()?,
            ),
            Value::Null => {
                return Err(CapsuleError::Unrepresentable {
                    field: field.to_string(),
                    reason: "null or non-finite values have no capsule form".to_string(),
                });
            }
        })
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

fn number_to_field(field: &str, n: &Number) -> Result<FieldValue, CapsuleError> {
    if let Some(i) = n.as_i64() {
        return Ok(FieldValue::Int(i));
    }
    if n.is_u64() {
        return Err(CapsuleError::Unrepresentable {
            field: field.to_string(),
            reason: format!("{n} exceeds the signed 64-bit range"),
        });
    }
    n.as_f64()
        .map(FieldValue::Float)
        .ok_or_else(|| CapsuleError::Unrepresentable {
            field: field.to_string(),
            reason: format!("{n} is not a finite number"),
        })
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<[f32; 3]> for FieldValue {
    fn from(value: [f32; 3]) -> Self {
        Self::List(value.into_iter().map(FieldValue::from).collect())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// One capability's snapshot: named fields, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateCapsule {
    fields: BTreeMap<String, FieldValue>,
}

impl StateCapsule {
    pub fn builder() -> CapsuleBuilder {
        CapsuleBuilder::default()
    }

    /// Captures any serde record whose fields map onto [`FieldValue`]s.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, CapsuleError> {
        let value = serde_json::to_value(record).map_err(|e| CapsuleError::Record(e.to_string()))?;
        match FieldValue::from_json("<root>", value)? {
            FieldValue::Record(fields) => Ok(Self { fields }),
            other => Err(CapsuleError::NotARecord {
                found: other.type_name(),
            }),
        }
    }

    /// Reads the capsule back as a serde record.
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, CapsuleError> {
        let object = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<Map<_, _>>();
        serde_json::from_value(Value::Object(object)).map_err(|e| CapsuleError::Record(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Iterates fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn require(&self, field: &str) -> Result<&FieldValue, CapsuleError> {
        self.fields
            .get(field)
            .ok_or_else(|| CapsuleError::MissingField {
                field: field.to_string(),
            })
    }

    pub fn get_bool(&self, field: &str) -> Result<bool, CapsuleError> {
        match self.require(field)? {
            FieldValue::Bool(b) => Ok(*b),
            other => Err(mismatch(field, "bool", other)),
        }
    }

    pub fn get_int(&self, field: &str) -> Result<i64, CapsuleError> {
        match self.require(field)? {
            FieldValue::Int(i) => Ok(*i),
            other => Err(mismatch(field, "int", other)),
        }
    }

    pub fn get_float(&self, field: &str) -> Result<f64, CapsuleError> {
        match self.require(field)? {
            FieldValue::Float(f) => Ok(*f),
            other => Err(mismatch(field, "float", other)),
        }
    }

    /// Reads a float field captured from an `f32`.
    pub fn get_f32(&self, field: &str) -> Result<f32, CapsuleError> {
        self.get_float(field).map(|f| f as f32)
    }

    pub fn get_text(&self, field: &str) -> Result<&str, CapsuleError> {
        match self.require(field)? {
            FieldValue::Text(s) => Ok(s),
            other => Err(mismatch(field, "text", other)),
        }
    }

    pub fn get_list(&self, field: &str) -> Result<&[FieldValue], CapsuleError> {
        match self.require(field)? {
            FieldValue::List(items) => Ok(items),
            other => Err(mismatch(field, "list", other)),
        }
    }

    /// Reads a three-component float list, the capsule form of a position.
    pub fn get_vec3(&self, field: &str) -> Result<[f32; 3], CapsuleError> {
        let items = self.get_list(field)?;
        match items {
            [FieldValue::Float(x), FieldValue::Float(y), FieldValue::Float(z)] => {
                Ok([*x as f32, *y as f32, *z as f32])
            }
            _ => Err(CapsuleError::TypeMismatch {
                field: field.to_string(),
                expected: "list of 3 floats",
                found: "list",
            }),
        }
    }
}

fn mismatch(field: &str, expected: &'static str, found: &FieldValue) -> CapsuleError {
    CapsuleError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Field-by-field construction of a [`StateCapsule`].
#[derive(Debug, Default)]
pub struct CapsuleBuilder {
    fields: BTreeMap<String, FieldValue>,
}

impl CapsuleBuilder {
    /// Adds a field. A repeated name replaces the earlier value.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> StateCapsule {
        StateCapsule {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct AmmoSlot {
        kind: String,
        amount: i32,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct AmmoRecord {
        slots: Vec<AmmoSlot>,
        reserve_ratio: f32,
    }

    #[test]
    fn builder_and_typed_getters() {
        let capsule = StateCapsule::builder()
            .field("health", 40.0f32)
            .field("is_dead", false)
            .field("position", [1.0f32, 2.0, 3.0])
            .field("weapon", "axe")
            .build();

        assert_eq!(capsule.get_f32("health").unwrap(), 40.0);
        assert!(!capsule.get_bool("is_dead").unwrap());
        assert_eq!(capsule.get_vec3("position").unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(capsule.get_text("weapon").unwrap(), "axe");
        assert_eq!(capsule.len(), 4);
    }

    #[test]
    fn wrong_shape_is_reported_with_field_name() {
        let capsule = StateCapsule::builder().field("health", true).build();

        assert_eq!(
            capsule.get_float("health"),
            Err(CapsuleError::TypeMismatch {
                field: "health".to_string(),
                expected: "float",
                found: "bool",
            })
        );
        assert_eq!(
            capsule.get_bool("magazine"),
            Err(CapsuleError::MissingField {
                field: "magazine".to_string()
            })
        );
    }

    #[test]
    fn vec3_requires_exactly_three_floats() {
        let capsule = StateCapsule::builder()
            .field("position", vec![1.0f32, 2.0])
            .build();

        assert!(matches!(
            capsule.get_vec3("position"),
            Err(CapsuleError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn nested_record_round_trips_through_fields() {
        let record = AmmoRecord {
            slots: vec![
                AmmoSlot {
                    kind: "bullets".to_string(),
                    amount: 12,
                },
                AmmoSlot {
                    kind: "shells".to_string(),
                    amount: 0,
                },
            ],
            reserve_ratio: 0.25,
        };

        let capsule = StateCapsule::from_record(&record).unwrap();
        assert!(matches!(capsule.get_list("slots"), Ok(items) if items.len() == 2));

        let restored: AmmoRecord = capsule.to_record().unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn whole_floats_stay_floats() {
        let capsule = StateCapsule::from_record(&serde_json::json!({ "hp": 100.0 })).unwrap();
        assert_eq!(capsule.get_float("hp").unwrap(), 100.0);
    }

    #[test]
    fn scalars_are_not_records() {
        assert_eq!(
            StateCapsule::from_record(&5u8),
            Err(CapsuleError::NotARecord { found: "int" })
        );
    }

    #[test]
    fn null_fields_are_rejected() {
        let result = StateCapsule::from_record(&serde_json::json!({ "target": null }));
        assert!(matches!(
            result,
            Err(CapsuleError::Unrepresentable { field, .. }) if field == "target"
        ));
    }
}
