//! AWQL query strings
//!
//! Services that accept `query` calls take a SQL-like query language instead
//! of a structured selector. [`QueryBuilder`] assembles the text form;
//! [`paged`] appends the LIMIT/OFFSET window the pager advances between
//! requests.
//!
//! The builder does no server-side validation: field names and predicate
//! syntax are passed through verbatim and judged by the API.

use crate::selector::SortOrder;

/// Append a paging window to a query string
///
/// Queries that already carry their own LIMIT clause should not be paged;
/// the caller is responsible for passing an unwindowed query.
pub fn paged(query: &str, offset: u32, limit: u32) -> String {
    format!("{} LIMIT {} OFFSET {}", query.trim_end(), limit, offset)
}

/// Builder for AWQL query text
///
/// # Example
///
/// ```rust,ignore
/// let query = QueryBuilder::new()
///     .select(["Id", "Name", "Status"])
///     .where_clause("Status = 'ENABLED'")
///     .order_by("Name", SortOrder::Ascending)
///     .build();
/// assert_eq!(query, "SELECT Id, Name, Status WHERE Status = 'ENABLED' ORDER BY Name ASC");
/// ```
#[derive(Debug, Default)]
pub struct QueryBuilder {
    fields: Vec<String>,
    conditions: Vec<String>,
    ordering: Vec<(String, SortOrder)>,
    limit: Option<(u32, u32)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add a WHERE condition; multiple conditions are joined with AND
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.ordering.push((field.into(), order));
        self
    }

    /// Fix a paging window into the query itself
    pub fn limit(mut self, offset: u32, count: u32) -> Self {
        self.limit = Some((offset, count));
        self
    }

    /// Render the query text
    pub fn build(self) -> String {
        let mut query = format!("SELECT {}", self.fields.join(", "));

        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }

        if !self.ordering.is_empty() {
            let clauses: Vec<String> = self
                .ordering
                .iter()
                .map(|(field, order)| {
                    let dir = match order {
                        SortOrder::Ascending => "ASC",
                        SortOrder::Descending => "DESC",
                    };
                    format!("{field} {dir}")
                })
                .collect();
            query.push_str(" ORDER BY ");
            query.push_str(&clauses.join(", "));
        }

        if let Some((offset, count)) = self.limit {
            query.push_str(&format!(" LIMIT {count} OFFSET {offset}"));
        }

        query
    }
}
