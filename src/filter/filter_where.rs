use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};
use crate::database::schema::{Column, ColumnType, Resource};

/// Builds a parameterised WHERE clause from a `{ field: value | { $op: value } }`
/// filter specification.
pub struct FilterWhere<'r> {
    resource: &'r Resource,
    param_values: Vec<String>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl<'r> FilterWhere<'r> {
    pub fn new(resource: &'r Resource, starting_param_index: usize) -> Self {
        Self {
            resource,
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Parse and validate without generating SQL.
    pub fn parse(resource: &'r Resource, where_data: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let mut filter_where = Self::new(resource, 0);
        filter_where.parse_where_data(where_data)?;
        Ok(filter_where.conditions)
    }

    pub fn generate(
        resource: &'r Resource,
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<String>), FilterError> {
        let mut filter_where = Self::new(resource, starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null => Ok(()),
            Value::Object(obj) => {
                for (key, value) in obj {
                    self.parse_field_condition(key, value)?;
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("filter must be an object".to_string())),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        self.column(field)?;
        match value {
            Value::Object(obj) => self.parse_operator_object(field, obj),
            Value::Array(values) => {
                // Repeated plain keys: any of the given values
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator: FilterOp::In,
                    data: Value::Array(values.clone()),
                });
                Ok(())
            }
            _ => {
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator: FilterOp::Eq,
                    data: value.clone(),
                });
                Ok(())
            }
        }
    }

    fn parse_operator_object(&mut self, field: &str, obj: &Map<String, Value>) -> Result<(), FilterError> {
        if obj.is_empty() {
            return Err(FilterError::InvalidOperatorData {
                field: field.to_string(),
                reason: "empty condition".to_string(),
            });
        }
        for (op_key, op_val) in obj {
            let operator = FilterOp::from_key(op_key).ok_or_else(|| FilterError::UnsupportedOperator {
                field: field.to_string(),
                operator: op_key.clone(),
            })?;
            if op_val.is_object() {
                return Err(FilterError::InvalidOperatorData {
                    field: field.to_string(),
                    reason: format!("{} does not accept a nested object", op_key),
                });
            }
            self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator,
                data: op_val.clone(),
            });
        }
        Ok(())
    }

    fn column(&self, field: &str) -> Result<&'r Column, FilterError> {
        self.resource.column(field).ok_or_else(|| FilterError::InvalidColumn {
            resource: self.resource.name,
            field: field.to_string(),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let column = self.column(&condition.column)?;
        let quoted_column = format!("\"{}\"", column.name);
        let is_array = column.kind == ColumnType::TextArray;

        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    return Ok(format!("{} IS NULL", quoted_column));
                }
                let placeholder = self.param(column, &condition.data)?;
                if is_array {
                    Ok(format!("{} = ANY({})", placeholder, quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, placeholder))
                }
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                if is_array || condition.data.is_null() || condition.data.is_array() {
                    return Err(FilterError::InvalidOperatorData {
                        field: condition.column.clone(),
                        reason: format!("{} needs a single comparable value", condition.operator.to_sql()),
                    });
                }
                let placeholder = self.param(column, &condition.data)?;
                Ok(format!("{} {} {}", quoted_column, condition.operator.to_sql(), placeholder))
            }
            FilterOp::In => {
                let values = in_values(&condition.data);
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for value in &values {
                    placeholders.push(self.param(column, value)?);
                }
                if is_array {
                    Ok(format!("{} && ARRAY[{}]::text[]", quoted_column, placeholders.join(", ")))
                } else {
                    Ok(format!("{} IN ({})", quoted_column, placeholders.join(", ")))
                }
            }
        }
    }

    fn param(&mut self, column: &Column, value: &Value) -> Result<String, FilterError> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(FilterError::InvalidOperatorData {
                    field: column.name.to_string(),
                    reason: format!("unsupported value {}", other),
                })
            }
        };
        self.param_values.push(text);
        self.param_index += 1;
        Ok(format!("${}{}", self.param_index, column.kind.placeholder_cast()))
    }
}

/// `$in` accepts an array, or a comma separated string.
fn in_values(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(values) => values.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        Value::Null => vec![],
        other => vec![other.clone()],
    }
}
