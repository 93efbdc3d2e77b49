//! Columnar query results.

use crate::utils::error::QueryError;

/// Values of one result column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Long(Vec<i64>),
    String(Vec<String>),
    Double(Vec<f64>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Long(v) => v.len(),
            Self::String(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named result column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn long(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            values: ColumnValues::Long(values),
        }
    }

    pub fn string(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            values: ColumnValues::String(values),
        }
    }

    pub fn double(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            values: ColumnValues::Double(values),
        }
    }
}

/// Result of one trace store query
///
/// Columns are addressed by their position in the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    query: String,
    columns: Vec<Column>,
    num_records: usize,
}

impl QueryResult {
    /// Build a result; the row count is taken from the first column
    pub fn new(query: impl Into<String>, columns: Vec<Column>) -> Self {
        let num_records = columns.first().map(|c| c.values.len()).unwrap_or(0);
        Self {
            query: query.into(),
            columns,
            num_records,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    fn column(&self, index: usize) -> Result<&ColumnValues, QueryError> {
        let values = self
            .columns
            .get(index)
            .map(|c| &c.values)
            .ok_or_else(|| QueryError::MissingColumn {
                query: self.query.clone(),
                index,
            })?;

        // Accessors index rows by position, so ragged columns are rejected here
        if values.len() != self.num_records {
            return Err(QueryError::ColumnLength {
                query: self.query.clone(),
                index,
                expected: self.num_records,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    fn type_error(&self, index: usize, expected: &'static str) -> QueryError {
        QueryError::ColumnType {
            query: self.query.clone(),
            index,
            expected,
        }
    }

    /// Signed integer values of column `index`
    pub fn long_values(&self, index: usize) -> Result<&[i64], QueryError> {
        match self.column(index)? {
            ColumnValues::Long(v) => Ok(v),
            _ => Err(self.type_error(index, "long")),
        }
    }

    /// String values of column `index`
    pub fn string_values(&self, index: usize) -> Result<&[String], QueryError> {
        match self.column(index)? {
            ColumnValues::String(v) => Ok(v),
            _ => Err(self.type_error(index, "string")),
        }
    }

    /// Floating-point values of column `index`
    pub fn double_values(&self, index: usize) -> Result<&[f64], QueryError> {
        match self.column(index)? {
            ColumnValues::Double(v) => Ok(v),
            _ => Err(self.type_error(index, "double")),
        }
    }
}
