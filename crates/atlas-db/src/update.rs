//! # Partial Updates
//!
//! Compiles "only the fields the caller sent" into one parameterized
//! `UPDATE` statement.
//!
//! ```text
//! ProductPatch { name: Some("Whey 2kg"), stock: Some(12), .. }
//!       │  assignments()        (recognized columns only, fixed order)
//!       ▼
//! [("name", Text("Whey 2kg")), ("stock", Int(12))]
//!       │  UpdateBuilder::build("products", "id", 7)
//!       ▼
//! UPDATE products SET name = ?, stock = ?, updated_at = ? WHERE id = ?
//! ```
//!
//! Column names come from `&'static str` constants; values are always
//! bound, never formatted into SQL.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

/// A value bound into an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    OptInt(Option<i64>),
    Text(String),
    OptText(Option<String>),
    Timestamp(DateTime<Utc>),
}

/// Ordered `(column, value)` assignments for one row.
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    assignments: Vec<(&'static str, FieldValue)>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        UpdateBuilder::default()
    }

    /// Adds an assignment.
    pub fn set(&mut self, column: &'static str, value: FieldValue) -> &mut Self {
        self.assignments.push((column, value));
        self
    }

    /// Adds an assignment when `value` is present.
    pub fn set_some<T>(&mut self, column: &'static str, value: Option<T>, wrap: impl FnOnce(T) -> FieldValue) -> &mut Self {
        if let Some(value) = value {
            self.set(column, wrap(value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments.iter().map(|(column, _)| *column)
    }

    /// Builds `UPDATE {table} SET .. WHERE {key_column} = ?`.
    ///
    /// Callers check [`is_empty`](Self::is_empty) first; an empty builder
    /// yields invalid SQL.
    pub fn build(self, table: &'static str, key_column: &'static str, key: i64) -> QueryBuilder<'static, Sqlite> {
        let mut query = QueryBuilder::new(format!("UPDATE {table} SET "));

        let mut separated = query.separated(", ");
        for (column, value) in self.assignments {
            separated.push(format!("{column} = "));
            match value {
                FieldValue::Int(v) => separated.push_bind_unseparated(v),
                FieldValue::OptInt(v) => separated.push_bind_unseparated(v),
                FieldValue::Text(v) => separated.push_bind_unseparated(v),
                FieldValue::OptText(v) => separated.push_bind_unseparated(v),
                FieldValue::Timestamp(v) => separated.push_bind_unseparated(v),
            };
        }

        query.push(format!(" WHERE {key_column} = "));
        query.push_bind(key);
        query
    }
}
