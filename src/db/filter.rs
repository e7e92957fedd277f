use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::AppError;

/// Field names are restricted to ASCII alphanumerics and `_` since they end
/// up inside a JSON path.
pub fn is_field_name(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Equality filter over document fields. Every clause must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    clauses: Vec<(String, Value)>,
}

impl TodoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<Self, AppError> {
        let field = field.into();
        if !is_field_name(&field) {
            return Err(AppError::BadRequest(format!("invalid filter field '{}'", field)));
        }
        self.clauses.push((field, value.into()));
        Ok(self)
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Builds a filter from query-string parameters, coercing each known todo
    /// field to its stored type. No parameters means no filter.
    pub fn from_query(params: &BTreeMap<String, String>) -> Result<Option<Self>, AppError> {
        if params.is_empty() {
            return Ok(None);
        }

        let mut filter = TodoFilter::new();
        for (field, raw) in params {
            let value = match field.as_str() {
                "userId" => raw
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| AppError::BadRequest(format!("userId must be an integer, got '{}'", raw)))?,
                "completed" => raw
                    .parse::<bool>()
                    .map(Value::from)
                    .map_err(|_| AppError::BadRequest(format!("completed must be true or false, got '{}'", raw)))?,
                "title" => Value::from(raw.as_str()),
                other => {
                    return Err(AppError::BadRequest(format!("unknown filter field '{}'", other)));
                }
            };
            filter = filter.eq(field.as_str(), value)?;
        }

        Ok(Some(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_query_is_no_filter() {
        assert_eq!(TodoFilter::from_query(&BTreeMap::new()).unwrap(), None);
    }

    #[test]
    fn known_fields_are_coerced() {
        let filter = TodoFilter::from_query(&params(&[
            ("userId", "4"),
            ("completed", "true"),
            ("title", "buy milk"),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(
            filter.clauses(),
            &[
                ("completed".to_string(), json!(true)),
                ("title".to_string(), json!("buy milk")),
                ("userId".to_string(), json!(4)),
            ]
        );
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            TodoFilter::from_query(&params(&[("userId", "four")])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            TodoFilter::from_query(&params(&[("completed", "yes")])),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            TodoFilter::from_query(&params(&[("owner", "1")])),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn field_names_cannot_escape_the_json_path() {
        assert!(TodoFilter::new().eq("title') OR 1=1 --", "x").is_err());
        assert!(TodoFilter::new().eq("", "x").is_err());
        assert!(TodoFilter::new().eq("priority", "high").is_ok());
    }
}
