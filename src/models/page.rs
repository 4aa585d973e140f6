//! Offset-based connection pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// A parsed ordering request: a field name with a direction.
///
/// The raw form is the field name, optionally prefixed with `-` to reverse
/// the sort (`"title"` ascending, `"-title"` descending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderSpec {
    /// Parses and checks the field against the aggregate's sortable set.
    pub fn parse_validated(raw: &str, sortable: &[&str]) -> Result<Self, String> {
        let spec = Self::parse(raw);
        if sortable.contains(&spec.field.as_str()) {
            Ok(spec)
        } else {
            Err(format!("Cannot order by '{}'.", spec.field))
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.strip_prefix('-').map_or_else(
            || Self {
                field: raw.to_string(),
                direction: SortDirection::Ascending,
            },
            |field| Self {
                field: field.to_string(),
                direction: SortDirection::Descending,
            },
        )
    }
}

/// Limit/offset window requested by the caller.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageRequest {
    #[must_use]
    pub fn offset_or_zero(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// The edges/page-info/total-count shape returned by list endpoints.
///
/// Page predicates are fixed once the window is known, so they are computed
/// here from the actual returned count rather than an assumed page size.
#[derive(Debug, Clone, Serialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: u64,
}

impl<T> Connection<T> {
    #[must_use]
    pub fn new(nodes: Vec<T>, total_count: u64, offset: u64) -> Self {
        let returned = nodes.len() as u64;
        Self {
            edges: nodes.into_iter().map(|node| Edge { node }).collect(),
            page_info: PageInfo {
                has_next_page: total_count > offset + returned,
                has_previous_page: offset > 0,
            },
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_spec_defaults_to_ascending() {
        let spec = OrderSpec::parse("title");
        assert_eq!(spec.field, "title");
        assert!(spec.direction.is_ascending());
    }

    #[test]
    fn order_spec_minus_marker_reverses() {
        let spec = OrderSpec::parse("-title");
        assert_eq!(spec.field, "title");
        assert_eq!(spec.direction, SortDirection::Descending);
    }

    #[test]
    fn order_spec_rejects_unknown_field() {
        let err = OrderSpec::parse_validated("-rating", &["id", "title"]).unwrap_err();
        assert_eq!(err, "Cannot order by 'rating'.");
        assert!(OrderSpec::parse_validated("-title", &["id", "title"]).is_ok());
    }

    #[test]
    fn connection_first_page_has_next() {
        let conn = Connection::new(vec![1], 3, 0);
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
        assert_eq!(conn.total_count, 3);
    }

    #[test]
    fn connection_last_page_has_previous_only() {
        // limit=1, offset=2 over a 3-row set
        let conn = Connection::new(vec![3], 3, 2);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[test]
    fn connection_empty_result() {
        let conn = Connection::<i32>::new(vec![], 0, 0);
        assert!(conn.edges.is_empty());
        assert!(!conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);

        // an empty window past the end still reports a previous page
        let conn = Connection::<i32>::new(vec![], 2, 5);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[test]
    fn connection_full_window() {
        let conn = Connection::new(vec![1, 2], 5, 2);
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
        assert_eq!(conn.edges.len(), 2);
    }
}
