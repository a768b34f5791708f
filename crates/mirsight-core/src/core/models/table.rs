use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableShapeError {
    #[error("Column '{0}' not found in table header")]
    MissingColumn(String),
    #[error("Row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A candidate-site table held as raw cells.
///
/// Input columns are carried through untouched; stages only append or overwrite their
/// own columns, so the written table mirrors the input plus the new features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CandidateTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableShapeError> {
        let expected = headers.len();
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != expected)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(TableShapeError::RaggedRow {
                row,
                expected,
                found,
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableShapeError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableShapeError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[column].as_str())
    }

    /// Creates the column if absent, then sets every cell of it to `default`.
    pub fn reset_column(&mut self, name: &str, default: &str) -> usize {
        let index = match self.headers.iter().position(|h| h == name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        for row in &mut self.rows {
            row[index] = default.to_string();
        }
        index
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        self.rows[row][column] = value;
    }

    /// A new table holding only the named columns, in the given order.
    pub fn project(&self, names: &[&str]) -> Result<Self, TableShapeError> {
        let indices = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>, _>>()?;

        let headers = names.iter().map(|name| name.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    /// Drops every row from `len` onwards.
    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> CandidateTable {
        CandidateTable::new(
            vec!["id".into(), "pos".into(), "extra".into()],
            vec![
                vec!["ENST1.1".into(), "10".into(), "a".into()],
                vec!["ENST2.1".into(), "20".into(), "b".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let result = CandidateTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        assert_eq!(
            result,
            Err(TableShapeError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn column_index_reports_missing_columns() {
        let table = sample_table();
        assert_eq!(table.column_index("pos"), Ok(1));
        assert_eq!(
            table.column_index("nope"),
            Err(TableShapeError::MissingColumn("nope".into()))
        );
    }

    #[test]
    fn reset_column_appends_new_column_with_default() {
        let mut table = sample_table();
        let index = table.reset_column("phylo_seed", "0.0");
        assert_eq!(index, 3);
        assert_eq!(table.headers().last().unwrap(), "phylo_seed");
        assert!(table.column(index).all(|cell| cell == "0.0"));
    }

    #[test]
    fn reset_column_overwrites_existing_column_in_place() {
        let mut table = sample_table();
        let index = table.reset_column("extra", "NA");
        assert_eq!(index, 2);
        assert_eq!(table.headers().len(), 3);
        assert_eq!(table.cell(0, 2), "NA");
        assert_eq!(table.cell(1, 2), "NA");
    }

    #[test]
    fn project_keeps_requested_columns_in_order() {
        let table = sample_table();
        let projected = table.project(&["pos", "id"]).unwrap();
        assert_eq!(projected.headers(), &["pos".to_string(), "id".to_string()]);
        assert_eq!(projected.cell(1, 0), "20");
        assert_eq!(projected.cell(1, 1), "ENST2.1");
    }

    #[test]
    fn truncate_drops_trailing_rows() {
        let mut table = sample_table();
        table.truncate(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0), "ENST1.1");
    }
}
