//! Structured query selectors and result pages
//!
//! A [`Selector`] names the fields to fetch plus optional predicates,
//! ordering, and a paging window. The server answers with a [`Page`]: the
//! entries inside the window and the total size of the full result set.
//!
//! All wire types serialize in camelCase to match the API's JSON convention.

use serde::{Deserialize, Serialize};

/// Comparison operators usable in predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    Contains,
}

/// A single filter condition on a field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub field: String,
    pub operator: PredicateOperator,
    pub values: Vec<String>,
}

impl Predicate {
    pub fn new(
        field: impl Into<String>,
        operator: PredicateOperator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sort direction for an ordering clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One ordering clause
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub sort_order: SortOrder,
}

/// Paging window: which slice of the full result set to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// Zero-based offset of the first entry to return
    pub start_index: u32,
    /// Maximum number of entries in the page
    pub number_results: u32,
}

/// A structured query against a service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Field names to populate on returned entities
    pub fields: Vec<String>,

    /// Filter conditions, combined with AND
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,

    /// Result ordering, applied in sequence
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordering: Vec<OrderBy>,

    /// Paging window; `None` lets the server apply its default page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl Selector {
    /// Start building a selector
    pub fn builder() -> SelectorBuilder {
        SelectorBuilder::default()
    }

    /// Return a copy of this selector with the given paging window
    pub fn with_paging(&self, start_index: u32, number_results: u32) -> Self {
        let mut selector = self.clone();
        selector.paging = Some(Paging { start_index, number_results });
        selector
    }
}

/// Fluent builder for [`Selector`]
#[derive(Debug, Default)]
pub struct SelectorBuilder {
    selector: Selector,
}

impl SelectorBuilder {
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.selector.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn predicate(
        mut self,
        field: impl Into<String>,
        operator: PredicateOperator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.selector.predicates.push(Predicate::new(field, operator, values));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, sort_order: SortOrder) -> Self {
        self.selector.ordering.push(OrderBy { field: field.into(), sort_order });
        self
    }

    pub fn paging(mut self, start_index: u32, number_results: u32) -> Self {
        self.selector.paging = Some(Paging { start_index, number_results });
        self
    }

    pub fn build(self) -> Selector {
        self.selector
    }
}

/// One page of a query result
///
/// `total_result_set_size` is the size of the full result set at the moment
/// this page was produced; it can change between pages while other writers
/// mutate the underlying data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,

    pub total_result_set_size: u32,

    #[serde(default)]
    pub start_index: u32,
}

impl<T> Page<T> {
    /// Whether the page contains no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in this page
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the builder produces the expected selector shape.
    #[test]
    fn test_selector_builder() {
        let selector = Selector::builder()
            .fields(["id", "name", "status"])
            .predicate("status", PredicateOperator::Equals, ["ENABLED"])
            .order_by("name", SortOrder::Ascending)
            .paging(0, 100)
            .build();

        assert_eq!(selector.fields, vec!["id", "name", "status"]);
        assert_eq!(selector.predicates.len(), 1);
        assert_eq!(selector.predicates[0].operator, PredicateOperator::Equals);
        assert_eq!(selector.ordering.len(), 1);
        assert_eq!(selector.paging, Some(Paging { start_index: 0, number_results: 100 }));
    }

    /// Tests `with_paging` replaces the window without touching the rest.
    #[test]
    fn test_with_paging_replaces_window() {
        let base = Selector::builder().fields(["id"]).paging(0, 50).build();
        let next = base.with_paging(50, 50);

        assert_eq!(base.paging, Some(Paging { start_index: 0, number_results: 50 }));
        assert_eq!(next.paging, Some(Paging { start_index: 50, number_results: 50 }));
        assert_eq!(next.fields, base.fields);
    }

    /// Tests the selector serializes in camelCase with empty sections
    /// omitted.
    #[test]
    fn test_selector_wire_format() {
        let selector = Selector::builder()
            .fields(["id"])
            .predicate("status", PredicateOperator::In, ["ENABLED", "PAUSED"])
            .paging(10, 20)
            .build();

        let value = serde_json::to_value(&selector).unwrap();
        assert_eq!(value["fields"][0], "id");
        assert_eq!(value["predicates"][0]["operator"], "IN");
        assert_eq!(value["paging"]["startIndex"], 10);
        assert_eq!(value["paging"]["numberResults"], 20);
        assert!(value.get("ordering").is_none());
    }

    /// Tests a page deserializes from the camelCase wire form, with missing
    /// entries treated as empty.
    #[test]
    fn test_page_deserialization() {
        let page: Page<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "entries": [{"id": 1}, {"id": 2}],
            "totalResultSetSize": 42,
            "startIndex": 0
        }))
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.total_result_set_size, 42);

        // An exhausted window comes back without an entries key at all
        let empty: Page<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "totalResultSetSize": 42,
            "startIndex": 42
        }))
        .unwrap();

        assert!(empty.is_empty());
    }
}
