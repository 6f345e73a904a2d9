use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOp, FilterWhereInfo};

/// Compiles a WHERE document into a parameterized SQL predicate.
///
/// The document is a flat map of column -> condition. A condition is either a
/// bare value (implicit equality) or an object of `$operator: data` pairs.
/// All conditions are combined with AND.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(0);
        filter_where.build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        if where_data.is_null() {
            return Ok(());
        }
        match where_data {
            Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause(
                "WHERE must be an object".to_string(),
            )),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        self.param_values.clear();
        self.conditions.clear();
        self.param_index = 0;

        self.parse_where_data(where_data)?;

        let mut sql_conditions = vec![];
        let conditions_snapshot = self.conditions.clone();
        for condition in &conditions_snapshot {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() {
            String::new()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, self.param_values.clone()))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Object(obj) => {
                for (key, value) in obj {
                    self.parse_field_condition(key, value)?;
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause(
                "Unsupported WHERE format".to_string(),
            )),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        validate_identifier(field).map_err(|_| FilterError::InvalidColumn(field.to_string()))?;

        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator,
                    data: op_val.clone(),
                });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$inci" => FilterOp::InCi,
            "$text" => FilterOp::Text,
            "$geowithin" => FilterOp::GeoWithin,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!(
                        "{} = {}",
                        quoted_column,
                        self.param(condition.data.clone())
                    ))
                }
            }
            FilterOp::Ne => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NOT NULL", quoted_column))
                } else {
                    Ok(format!(
                        "{} <> {}",
                        quoted_column,
                        self.param(condition.data.clone())
                    ))
                }
            }
            FilterOp::Gt => Ok(format!(
                "{} > {}",
                quoted_column,
                self.param(condition.data.clone())
            )),
            FilterOp::Gte => Ok(format!(
                "{} >= {}",
                quoted_column,
                self.param(condition.data.clone())
            )),
            FilterOp::Lt => Ok(format!(
                "{} < {}",
                quoted_column,
                self.param(condition.data.clone())
            )),
            FilterOp::Lte => Ok(format!(
                "{} <= {}",
                quoted_column,
                self.param(condition.data.clone())
            )),
            FilterOp::ILike => Ok(format!(
                "{} ILIKE {}",
                quoted_column,
                self.param(condition.data.clone())
            )),
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() {
                        return Ok("1=0".to_string());
                    }
                    let params: Vec<String> =
                        values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                } else {
                    Ok(format!(
                        "{} = {}",
                        quoted_column,
                        self.param(condition.data.clone())
                    ))
                }
            }
            FilterOp::InCi => self.build_in_ci(&quoted_column, &condition.data),
            FilterOp::Text => {
                let term = condition.data.as_str().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$text requires a string".to_string())
                })?;
                let param = self.param(Value::String(term.to_string()));
                Ok(format!(
                    "to_tsvector('english', coalesce({}, '')) @@ plainto_tsquery('english', {})",
                    quoted_column, param
                ))
            }
            FilterOp::GeoWithin => self.build_geo_within(&quoted_column, &condition.data),
        }
    }

    /// Case-insensitive exact membership: `"Tn"` matches `"TN"`, not `"TNX"`.
    fn build_in_ci(&mut self, quoted_column: &str, data: &Value) -> Result<String, FilterError> {
        let values = data.as_array().ok_or_else(|| {
            FilterError::InvalidOperatorData("$inci requires an array".to_string())
        })?;
        if values.is_empty() {
            return Ok("1=0".to_string());
        }
        let mut params = Vec::with_capacity(values.len());
        for v in values {
            let s = v.as_str().ok_or_else(|| {
                FilterError::InvalidOperatorData("$inci requires string values".to_string())
            })?;
            params.push(format!("LOWER({})", self.param(Value::String(s.to_string()))));
        }
        Ok(format!(
            "LOWER({}) IN ({})",
            quoted_column,
            params.join(", ")
        ))
    }

    /// Great-circle membership test against a `[longitude, latitude]` array
    /// column. The central angle between the stored point and the supplied
    /// center must not exceed the radius (already converted to radians).
    fn build_geo_within(&mut self, quoted_column: &str, data: &Value) -> Result<String, FilterError> {
        let center = data
            .get("center")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                FilterError::InvalidOperatorData(
                    "$geowithin requires a 2-element center array".to_string(),
                )
            })?;
        if center.len() != 2 {
            return Err(FilterError::InvalidOperatorData(
                "$geowithin requires a 2-element center array".to_string(),
            ));
        }
        let lon = center[0].as_f64().ok_or_else(|| {
            FilterError::InvalidOperatorData("$geowithin center must be numeric".to_string())
        })?;
        let lat = center[1].as_f64().ok_or_else(|| {
            FilterError::InvalidOperatorData("$geowithin center must be numeric".to_string())
        })?;
        let radius = data
            .get("radiusRadians")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                FilterError::InvalidOperatorData("$geowithin requires radiusRadians".to_string())
            })?;

        let lat_param = self.param(Value::from(lat));
        let lon_param = self.param(Value::from(lon));
        let radius_param = self.param(Value::from(radius));

        // Postgres arrays are 1-indexed: [1] = longitude, [2] = latitude
        Ok(format!(
            "acos(LEAST(1.0, GREATEST(-1.0, \
             sin(radians({lat})) * sin(radians({col}[2])) + \
             cos(radians({lat})) * cos(radians({col}[2])) * \
             cos(radians({col}[1] - {lon}))))) <= {radius}",
            lat = lat_param,
            lon = lon_param,
            radius = radius_param,
            col = quoted_column,
        ))
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
