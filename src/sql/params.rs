//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::mysql::{MySql, MySqlTypeInfo};
use sqlx::Database;

/// A value that can be bound to a MySQL query. Converts from serde_json::Value.
#[derive(Clone, Debug)]
pub enum MySqlBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl MySqlBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => MySqlBindValue::Null,
            Value::Bool(b) => MySqlBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MySqlBindValue::I64(i)
                } else {
                    MySqlBindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => MySqlBindValue::String(s.clone()),
            // Compound values never survive write validation; bind their JSON
            // text so the statement still has a well-formed parameter.
            Value::Array(_) | Value::Object(_) => MySqlBindValue::String(v.to_string()),
        }
    }
}

impl<'q> Encode<'q, MySql> for MySqlBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <MySql as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            MySqlBindValue::Null => {
                <Option<i64> as Encode<MySql>>::encode_by_ref(&None, buf)?
            }
            MySqlBindValue::Bool(b) => <bool as Encode<MySql>>::encode_by_ref(b, buf)?,
            MySqlBindValue::I64(n) => <i64 as Encode<MySql>>::encode_by_ref(n, buf)?,
            MySqlBindValue::F64(n) => <f64 as Encode<MySql>>::encode_by_ref(n, buf)?,
            MySqlBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<MySql>>::encode_by_ref(&s_ref, buf)?
            }
        })
    }

    fn produces(&self) -> Option<MySqlTypeInfo> {
        Some(match self {
            MySqlBindValue::Null => <str as sqlx::Type<MySql>>::type_info(),
            MySqlBindValue::Bool(_) => <bool as sqlx::Type<MySql>>::type_info(),
            MySqlBindValue::I64(_) => <i64 as sqlx::Type<MySql>>::type_info(),
            MySqlBindValue::F64(_) => <f64 as sqlx::Type<MySql>>::type_info(),
            MySqlBindValue::String(_) => <str as sqlx::Type<MySql>>::type_info(),
        })
    }
}

impl sqlx::Type<MySql> for MySqlBindValue {
    fn type_info() -> MySqlTypeInfo {
        <str as sqlx::Type<MySql>>::type_info()
    }

    fn compatible(_ty: &MySqlTypeInfo) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_picks_the_narrowest_scalar() {
        assert!(matches!(MySqlBindValue::from_json(&Value::Null), MySqlBindValue::Null));
        assert!(matches!(
            MySqlBindValue::from_json(&json!(5)),
            MySqlBindValue::I64(5)
        ));
        assert!(matches!(
            MySqlBindValue::from_json(&json!(2.5)),
            MySqlBindValue::F64(f) if f == 2.5
        ));
        assert!(matches!(
            MySqlBindValue::from_json(&json!("x")),
            MySqlBindValue::String(s) if s == "x"
        ));
        assert!(matches!(
            MySqlBindValue::from_json(&json!(true)),
            MySqlBindValue::Bool(true)
        ));
    }
}
