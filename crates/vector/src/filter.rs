//! Metadata filter normalization.
//!
//! A flat `{field: value}` request mapping becomes the store's where-clause:
//! a single constraint passes through as `{field: value}`, two or more are
//! wrapped as `{"$and": [{f1: v1}, {f2: v2}, ...]}` in input order.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{Metadata, MetadataValue};

/// Store-level filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// `{field: value}` exact match
    Eq(String, MetadataValue),
    /// `{"$and": [...]}`
    And(Vec<WhereClause>),
}

impl WhereClause {
    /// Evaluate the clause against a record's metadata.
    /// A record lacking the filtered field never matches.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Eq(field, expected) => metadata
                .get(field)
                .is_some_and(|actual| actual.matches(expected)),
            Self::And(clauses) => clauses.iter().all(|c| c.matches(metadata)),
        }
    }

    /// JSON form in the store's query language
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for WhereClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Eq(field, value) => map.serialize_entry(field, value)?,
            Self::And(clauses) => map.serialize_entry("$and", clauses)?,
        }
        map.end()
    }
}

/// Normalize request filters into a where-clause; `None` when empty
pub fn normalize_filters(filters: &Metadata) -> Option<WhereClause> {
    let mut conditions: Vec<WhereClause> = filters
        .iter()
        .map(|(field, value)| WhereClause::Eq(field.clone(), value.clone()))
        .collect();

    match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(WhereClause::And(conditions)),
    }
}
