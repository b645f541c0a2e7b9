use std::collections::HashMap;

use chrono::NaiveDate;

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{ColumnScope, FilterField, FilterValue, Predicate, SqlResult, ValueKind};
use crate::types::{ApplicationStatus, MobilityType};

/// A validated set of predicates built from an endpoint's allow-list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the allowed keys out of a query string.
    ///
    /// Empty values are skipped. Malformed ids, dates and enum values are
    /// rejected rather than silently dropped.
    pub fn from_query(query: &HashMap<String, String>, allowed: &[FilterField]) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        for field in allowed {
            let raw = std::iter::once(field.key())
                .chain(field.aliases().iter().copied())
                .find_map(|key| query.get(key))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());

            if let Some(raw) = raw {
                filter.predicates.push(Predicate {
                    field: *field,
                    value: Self::parse_value(*field, raw)?,
                });
            }
        }
        Ok(filter)
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.predicates.iter().find(|p| p.field == field).map(|p| &p.value)
    }

    /// Render against `scope`, numbering parameters from `starting_param_index`
    pub fn to_sql(&self, scope: &ColumnScope, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        FilterWhere::generate(&self.predicates, scope, starting_param_index)
    }

    fn parse_value(field: FilterField, raw: &str) -> Result<FilterValue, FilterError> {
        let invalid = || FilterError::InvalidValue {
            field: field.key(),
            value: raw.to_string(),
        };

        match field.kind() {
            ValueKind::Id => raw.parse::<i32>().map(FilterValue::Id).map_err(|_| invalid()),
            ValueKind::Date => parse_date(raw).map(FilterValue::Date).ok_or_else(invalid),
            ValueKind::MobilityType => raw
                .parse::<MobilityType>()
                .map(|t| FilterValue::Text(t.as_str().to_string()))
                .map_err(|_| invalid()),
            ValueKind::Status => raw
                .parse::<ApplicationStatus>()
                .map(|s| FilterValue::Text(s.as_str().to_string()))
                .map_err(|_| invalid()),
            ValueKind::Text => Ok(FilterValue::Text(raw.to_string())),
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part is kept)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    })
}
