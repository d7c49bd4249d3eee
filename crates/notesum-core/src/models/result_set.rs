use std::fmt;

use serde::{Deserialize, Serialize};

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("NULL"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Real(r) => write!(f, "{r}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// One row, in the column order of the executed query.
pub type Row = Vec<Scalar>;

/// Rows returned by one or more executed queries.
///
/// Column names are deliberately not kept: downstream consumers only see
/// values, in the order the query produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Append another result set, keeping both orders.
    pub fn extend(&mut self, other: ResultSet) {
        self.rows.extend(other.rows);
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl FromIterator<Row> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_display() {
        assert_eq!(Scalar::Null.to_string(), "NULL");
        assert_eq!(Scalar::Integer(42).to_string(), "42");
        assert_eq!(Scalar::Real(0.5).to_string(), "0.5");
        assert_eq!(Scalar::from("ibuprofen").to_string(), "ibuprofen");
        assert_eq!(Scalar::Blob(vec![1, 2, 3]).to_string(), "<blob 3 bytes>");
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
    }

    #[test]
    fn extend_preserves_order() {
        let mut first = ResultSet::new(vec![vec!["a".into()]]);
        first.extend(ResultSet::new(vec![vec!["b".into()], vec!["c".into()]]));
        let values: Vec<String> = first.rows().iter().map(|r| r[0].to_string()).collect();
        assert_eq!(values, ["a", "b", "c"]);
    }
}
