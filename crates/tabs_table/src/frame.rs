//! In-memory tabular dataset.

use serde::{Deserialize, Serialize};
use tabs_common::Value;

/// Errors raised by [`Frame`] operations.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No column with this name exists.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A column name appears twice.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one value per column.
    #[error("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        /// Index the row has (or would have) in the frame.
        row: usize,
        /// Number of columns.
        expected: usize,
        /// Number of values in the row.
        actual: usize,
    },

    /// A column does not have one value per row.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLength {
        /// The column being written.
        column: String,
        /// Number of rows.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}

/// A table of rows with named columns.
///
/// Every row holds exactly one [`Value`] per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Creates an empty frame with the given columns.
    pub fn new<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if names.contains(&column) {
                return Err(FrameError::DuplicateColumn(column));
            }
            names.push(column);
        }
        Ok(Self {
            columns: names,
            rows: Vec::new(),
        })
    }

    /// Creates a frame from columns and rows, checking row widths.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frame = Self::new(columns)?;
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), FrameError> {
        if row.len() != self.columns.len() {
            return Err(FrameError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, FrameError> {
        let idx = self.require(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// The value at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Removes the named column.
    pub fn drop_column(&mut self, name: &str) -> Result<(), FrameError> {
        let idx = self.require(name)?;
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        Ok(())
    }

    /// Replaces the named column's values, or appends the column if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), FrameError> {
        if values.len() != self.rows.len() {
            return Err(FrameError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Keeps only the rows for which `keep` returns `true`.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    fn require(&self, name: &str) -> Result<usize, FrameError> {
        self.column_index(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Frame {
        Frame::from_rows(
            ["first", "last", "age"],
            vec![
                vec!["Ada".into(), "Lovelace".into(), Value::Int(36)],
                vec!["Alan".into(), "Turing".into(), Value::Int(41)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn shape() {
        let f = people();
        assert_eq!(f.len(), 2);
        assert_eq!(f.width(), 3);
        assert!(!f.is_empty());
        assert_eq!(f.value(1, "last"), Some(&Value::from("Turing")));
    }

    #[test]
    fn duplicate_columns_rejected() {
        let err = Frame::new(["a", "a"]).unwrap_err();
        assert!(matches!(err, FrameError::DuplicateColumn(ref c) if c == "a"));
    }

    #[test]
    fn short_row_rejected() {
        let mut f = people();
        let err = f.push_row(vec!["Grace".into()]).unwrap_err();
        assert_eq!(err.to_string(), "row 2 has 1 values, expected 3");
    }

    #[test]
    fn drop_column_removes_values() {
        let mut f = people();
        f.drop_column("age").unwrap();
        assert_eq!(f.columns(), &["first".to_string(), "last".to_string()]);
        assert!(f.rows().iter().all(|r| r.len() == 2));
        assert!(f.drop_column("age").is_err());
    }

    #[test]
    fn set_column_appends_then_replaces() {
        let mut f = people();
        f.set_column("retired", vec![Value::Bool(true), Value::Bool(true)])
            .unwrap();
        assert_eq!(f.width(), 4);
        f.set_column("retired", vec![Value::Bool(false), Value::Bool(true)])
            .unwrap();
        assert_eq!(f.width(), 4);
        assert_eq!(f.value(0, "retired"), Some(&Value::Bool(false)));
    }

    #[test]
    fn set_column_wrong_length() {
        let mut f = people();
        let err = f.set_column("x", vec![Value::Null]).unwrap_err();
        assert!(matches!(err, FrameError::ColumnLength { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn column_and_retain() {
        let mut f = people();
        let ages: Vec<i64> = f
            .column("age")
            .unwrap()
            .into_iter()
            .filter_map(Value::as_int)
            .collect();
        assert_eq!(ages, vec![36, 41]);

        f.retain_rows(|row| row[2].as_int() > Some(40));
        assert_eq!(f.len(), 1);
        assert_eq!(f.value(0, "first"), Some(&Value::from("Alan")));
    }
}
