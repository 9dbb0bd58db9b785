use super::error::FilterError;
use super::types::FilterOrderInfo;
use crate::database::schema::Resource;

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"-averageCost,name"` into sort keys; a leading `-` sorts descending.
    pub fn parse_sort_string(s: &str) -> Vec<FilterOrderInfo> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty() && *part != "-")
            .map(|part| match part.strip_prefix('-') {
                Some(column) => FilterOrderInfo::desc(column.trim()),
                None => FilterOrderInfo::asc(part.strip_prefix('+').unwrap_or(part)),
            })
            .collect()
    }

    pub fn validate(resource: &Resource, infos: &[FilterOrderInfo]) -> Result<(), FilterError> {
        for info in infos {
            if resource.column(&info.column).is_none() {
                return Err(FilterError::InvalidColumn {
                    resource: resource.name,
                    field: info.column.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::BOOTCAMPS;

    #[test]
    fn parses_direction_prefixes() {
        let infos = FilterOrder::parse_sort_string("-averageCost, name,,+createdAt");
        assert_eq!(
            infos,
            vec![
                FilterOrderInfo::desc("averageCost"),
                FilterOrderInfo::asc("name"),
                FilterOrderInfo::asc("createdAt"),
            ]
        );
    }

    #[test]
    fn generates_order_by() {
        let sql = FilterOrder::generate(&[FilterOrderInfo::desc("averageCost"), FilterOrderInfo::asc("name")]);
        assert_eq!(sql, "ORDER BY \"averageCost\" DESC, \"name\" ASC");
        assert!(FilterOrder::generate(&[]).is_empty());
    }

    #[test]
    fn rejects_unknown_sort_field() {
        let infos = FilterOrder::parse_sort_string("-bogus");
        assert!(FilterOrder::validate(&BOOTCAMPS, &infos).is_err());
    }
}
