// Wide (pivoted) tables whose columns are only known at runtime.
//
// Every pivot keeps its full column list even when it has no rows, so
// renderers never need a special case for "no columns".
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    /// One label per index column.
    pub keys: Vec<String>,
    /// One value per value column, in column order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub index_names: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn new(index_names: &[&str], columns: Vec<String>) -> Self {
        Self {
            index_names: index_names.iter().map(|s| s.to_string()).collect(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing values are filled with 0.
    pub fn push_row(&mut self, keys: Vec<String>, mut values: Vec<f64>) {
        values.resize(self.columns.len(), 0.0);
        self.rows.push(PivotRow { keys, values });
    }

    /// Append a column computed from each row's existing values.
    pub fn push_column<F>(&mut self, name: impl Into<String>, mut f: F)
    where
        F: FnMut(&PivotRow) -> f64,
    {
        self.columns.push(name.into());
        for row in &mut self.rows {
            let v = f(row);
            row.values.push(v);
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, keys: &[&str]) -> Option<&PivotRow> {
        self.rows
            .iter()
            .find(|r| r.keys.len() == keys.len() && r.keys.iter().zip(keys).all(|(a, b)| a == b))
    }

    /// Cell lookup by row keys and column name.
    pub fn value(&self, keys: &[&str], column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.row(keys).and_then(|r| r.values.get(col).copied())
    }

    /// Column labels including the index columns.
    pub fn header(&self) -> Vec<String> {
        self.index_names.iter().chain(self.columns.iter()).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
