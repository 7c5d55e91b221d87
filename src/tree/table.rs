use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("branch {name} has {len} entries, expected {expected}")]
    RaggedColumn {
        name: String,
        len: usize,
        expected: usize,
    },
}

/// Column-store table of branch values, one column per branch.
///
/// This mirrors how the access layer hands back tree contents: a value array
/// per branch, all of equal length. Rows correspond to events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchTable {
    /// Branch names, one per column, in tree order.
    pub branches: Vec<String>,
    /// Column values, indexed like `branches`.
    pub columns: Vec<Vec<f32>>,
}

impl BranchTable {
    /// Assemble a table from named columns, rejecting ragged input.
    pub fn new(branches: Vec<String>, columns: Vec<Vec<f32>>) -> Result<Self, TableError> {
        let expected = columns.first().map(|c| c.len()).unwrap_or(0);
        for (name, column) in branches.iter().zip(&columns) {
            if column.len() != expected {
                return Err(TableError::RaggedColumn {
                    name: name.clone(),
                    len: column.len(),
                    expected,
                });
            }
        }
        Ok(Self { branches, columns })
    }

    /// Number of events (rows).
    pub fn n_events(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Flatten the column store into plain rows, one `Vec` per event.
    ///
    /// Values appear in branch order, untransformed. The table itself is left
    /// untouched; the rows are fresh allocations.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        let n = self.n_events();
        let mut rows = Vec::with_capacity(n);
        for event in 0..n {
            let mut row = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                row.push(column[event]);
            }
            rows.push(row);
        }
        rows
    }
}
