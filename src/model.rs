use serde::{Deserialize, Serialize};

/// A single cell as delivered by the query backend.
pub type CellValue = serde_json::Value;

/// Tabular result handed over by the database backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Reported by the backend; window math uses `rows.len()` instead.
    #[serde(default)]
    pub row_count: usize,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// Number of rows actually present.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No columns or no rows: rendered as the empty state.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// `(reported, actual)` when the backend's `row_count` disagrees with the rows.
    pub fn row_count_mismatch(&self) -> Option<(usize, usize)> {
        (self.row_count != self.rows.len()).then_some((self.row_count, self.rows.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_payload() {
        let result: QueryResult = serde_json::from_value(json!({
            "columns": ["id", "name"],
            "rows": [[1, "alice"], [2, null]],
            "row_count": 2
        }))
        .unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
        assert_eq!(result.row_count_mismatch(), None);
    }

    #[test]
    fn missing_row_count_is_reported_as_mismatch() {
        let result: QueryResult = serde_json::from_value(json!({
            "columns": ["id"],
            "rows": [[1], [2], [3]]
        }))
        .unwrap();
        assert_eq!(result.row_count_mismatch(), Some((0, 3)));
    }

    #[test]
    fn empty_when_columns_or_rows_missing() {
        assert!(QueryResult::new(vec![], vec![vec![json!(1)]]).is_empty());
        assert!(QueryResult::new(vec!["a".into()], vec![]).is_empty());
    }
}
