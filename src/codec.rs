//! Value codec: raw store cells <-> generic typed values.
//!
//! Decode and write validation both dispatch on the column's `Category`, so
//! the two sides can never drift apart.

use crate::catalog::{Category, ColumnDescriptor};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use thiserror::Error;

/// A driver-level cell before category decoding. MySQL hands most column
/// values back as bytes; numerics may arrive native depending on protocol.
#[derive(Clone, Debug, PartialEq)]
pub enum RawCell {
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Null,
}

/// Extract one cell from a row without committing to a column type.
pub fn raw_cell(row: &MySqlRow, idx: usize) -> RawCell {
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(idx) {
        return RawCell::Int(n);
    }
    if let Ok(Some(f)) = row.try_get::<Option<f64>, _>(idx) {
        return RawCell::Float(f);
    }
    if let Ok(Some(b)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return RawCell::Bytes(b);
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(idx) {
        return RawCell::Bytes(s.into_bytes());
    }
    RawCell::Null
}

/// Decode a raw cell per the column's category. `None` means the field is
/// omitted from the record entirely (no category matched).
///
/// Malformed numeric text decodes to zero rather than failing the read; the
/// stored value is beyond the client's control, so reads stay permissive
/// while writes stay strict.
pub fn decode(raw: RawCell, column: &ColumnDescriptor) -> Option<Value> {
    match raw {
        RawCell::Null => Some(Value::Null),
        RawCell::Int(n) => Some(Value::Number(n.into())),
        RawCell::Float(f) => Some(number_from_f64(f)),
        RawCell::Bytes(b) => match column.category {
            Category::Text => Some(Value::String(String::from_utf8_lossy(&b).into_owned())),
            Category::Integer => {
                let n = String::from_utf8_lossy(&b).trim().parse::<i64>().unwrap_or(0);
                Some(Value::Number(n.into()))
            }
            Category::Real => {
                let f = String::from_utf8_lossy(&b).trim().parse::<f64>().unwrap_or(0.0);
                Some(number_from_f64(f))
            }
            Category::Other => None,
        },
    }
}

fn number_from_f64(f: f64) -> Value {
    serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Why a client-supplied field was rejected.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    #[error("value kind does not match column type")]
    TypeMismatch,
    #[error("primary key is not client-settable")]
    PrimaryKeyImmutable,
    #[error("null not allowed")]
    NullNotAllowed,
}

/// Validate a client-supplied value against the column before a write.
/// Primary keys are rejected unconditionally; otherwise null is gated on
/// nullability and the scalar kind must match the column category exactly
/// (no cross-kind coercion).
pub fn validate_for_write(value: &Value, column: &ColumnDescriptor) -> Result<(), RejectReason> {
    if column.is_primary_key {
        return Err(RejectReason::PrimaryKeyImmutable);
    }
    if value.is_null() {
        return if column.nullable {
            Ok(())
        } else {
            Err(RejectReason::NullNotAllowed)
        };
    }
    let matches = match column.category {
        Category::Text => value.is_string(),
        Category::Integer => value.as_i64().is_some(),
        // An integer literal is a valid real.
        Category::Real => value.is_number(),
        Category::Other => false,
    };
    if matches {
        Ok(())
    } else {
        Err(RejectReason::TypeMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(declared: &str, nullable: bool, pk: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: "c".into(),
            declared_type: declared.into(),
            category: crate::catalog::categorize(declared),
            nullable,
            is_primary_key: pk,
            has_default: false,
        }
    }

    #[test]
    fn decode_text_bytes_verbatim() {
        let c = col("varchar(45)", true, false);
        assert_eq!(
            decode(RawCell::Bytes(b"Ann".to_vec()), &c),
            Some(json!("Ann"))
        );
    }

    #[test]
    fn decode_integer_bytes_parses_base10() {
        let c = col("int(11)", true, false);
        assert_eq!(decode(RawCell::Bytes(b"42".to_vec()), &c), Some(json!(42)));
        assert_eq!(decode(RawCell::Bytes(b"-7".to_vec()), &c), Some(json!(-7)));
    }

    #[test]
    fn decode_malformed_integer_text_yields_zero() {
        let c = col("int(11)", true, false);
        assert_eq!(
            decode(RawCell::Bytes(b"not-a-number".to_vec()), &c),
            Some(json!(0))
        );
    }

    #[test]
    fn decode_real_bytes_parses_f64() {
        let c = col("decimal(10,2)", true, false);
        assert_eq!(
            decode(RawCell::Bytes(b"3.5".to_vec()), &c),
            Some(json!(3.5))
        );
    }

    #[test]
    fn decode_malformed_real_text_yields_zero() {
        let c = col("double", true, false);
        assert_eq!(decode(RawCell::Bytes(b"oops".to_vec()), &c), Some(json!(0.0)));
    }

    #[test]
    fn decode_native_numerics_pass_through() {
        let c = col("int(11)", true, false);
        assert_eq!(decode(RawCell::Int(9), &c), Some(json!(9)));
        let c = col("double", true, false);
        assert_eq!(decode(RawCell::Float(1.25), &c), Some(json!(1.25)));
    }

    #[test]
    fn decode_null_ignores_nullability() {
        let c = col("varchar(45)", false, false);
        assert_eq!(decode(RawCell::Null, &c), Some(Value::Null));
    }

    #[test]
    fn decode_unknown_category_omits_field() {
        let c = col("datetime", true, false);
        assert_eq!(decode(RawCell::Bytes(b"2020-01-01".to_vec()), &c), None);
    }

    #[test]
    fn validate_rejects_primary_key_always() {
        let c = col("int(11)", false, true);
        assert_eq!(
            validate_for_write(&json!(1), &c),
            Err(RejectReason::PrimaryKeyImmutable)
        );
        assert_eq!(
            validate_for_write(&Value::Null, &c),
            Err(RejectReason::PrimaryKeyImmutable)
        );
    }

    #[test]
    fn validate_null_gated_on_nullability() {
        let nullable = col("varchar(45)", true, false);
        let not_null = col("varchar(45)", false, false);
        assert_eq!(validate_for_write(&Value::Null, &nullable), Ok(()));
        assert_eq!(
            validate_for_write(&Value::Null, &not_null),
            Err(RejectReason::NullNotAllowed)
        );
    }

    #[test]
    fn validate_kind_must_match_category() {
        let text = col("text", true, false);
        let int = col("int(11)", true, false);
        let real = col("float", true, false);

        assert_eq!(validate_for_write(&json!("ok"), &text), Ok(()));
        assert_eq!(
            validate_for_write(&json!(5), &text),
            Err(RejectReason::TypeMismatch)
        );

        assert_eq!(validate_for_write(&json!(5), &int), Ok(()));
        assert_eq!(
            validate_for_write(&json!(5.5), &int),
            Err(RejectReason::TypeMismatch)
        );
        assert_eq!(
            validate_for_write(&json!("5"), &int),
            Err(RejectReason::TypeMismatch)
        );

        assert_eq!(validate_for_write(&json!(5.5), &real), Ok(()));
        assert_eq!(validate_for_write(&json!(5), &real), Ok(()));
        assert_eq!(
            validate_for_write(&json!(true), &real),
            Err(RejectReason::TypeMismatch)
        );
    }

    #[test]
    fn validate_rejects_compound_values() {
        let text = col("text", true, false);
        assert_eq!(
            validate_for_write(&json!([1, 2]), &text),
            Err(RejectReason::TypeMismatch)
        );
        assert_eq!(
            validate_for_write(&json!({"a": 1}), &text),
            Err(RejectReason::TypeMismatch)
        );
    }
}
