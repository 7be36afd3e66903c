use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::ApiError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Only columns named in `allowed` may appear in the payload; anything
/// else (password, reset fields, the id itself) is rejected outright.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::Validation("Payload must be a JSON object".to_string()))?;

    if obj.is_empty() {
        return Err(ApiError::Validation(
            "No fields provided for update".to_string(),
        ));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::Validation(format!("Unknown field: {key}")));
        }
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else {
                    return Err(ApiError::Validation(
                        "Unsupported numeric value".to_string(),
                    ));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(ApiError::Validation(
                    "Unsupported JSON value type".to_string(),
                ));
            }
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["name", "email", "birth_date"];

    #[test]
    fn builds_set_clause_and_where() {
        let payload = json!({"name": "Jane"});
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 7).unwrap();
        assert_eq!(update.sql, "UPDATE employees SET name = ? WHERE id = ?");
        assert_eq!(update.values.len(), 2);
    }

    #[test]
    fn date_strings_become_dates() {
        let payload = json!({"birth_date": "1990-01-01"});
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 1).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let payload = json!({"password": "sneaky"});
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 1).is_err());
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(build_update_sql("employees", &json!({}), ALLOWED, "id", 1).is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(build_update_sql("employees", &json!(["x"]), ALLOWED, "id", 1).is_err());
    }
}
