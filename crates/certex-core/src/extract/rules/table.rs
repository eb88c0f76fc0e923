//! Serial and date resolution over extracted table cells.
//!
//! A cell holding a serial keyword is a label. Its value is looked up in
//! the label cell itself, then in the next cell of the row, then down the
//! same column for as long as the cells keep validating.

use tracing::trace;

use super::dates::DateResolver;
use super::patterns::{has_serial_keyword, STANDALONE_TOKEN, TABLE_DATE_LABEL};
use super::serials::{
    context_noun, dedup_candidates, is_valid_serial, keyword_occurrences, segment_values,
    values_after_keyword, LocatedValue,
};
use super::FieldExtractor;
use crate::models::corpus::{Table, TableGrid};
use crate::models::result::{DateCandidate, SerialCandidate, SerialSource};

/// Table resolver.
pub struct TableResolver {
    dates: DateResolver,
}

impl TableResolver {
    pub fn new() -> Self {
        Self {
            dates: DateResolver::new(),
        }
    }

    /// Serial candidates found in the tables, in discovery order.
    ///
    /// Every candidate is tagged [`SerialSource::Table`]; its position is
    /// the discovery index.
    pub fn resolve(&self, grid: &TableGrid) -> Vec<SerialCandidate> {
        let mut found = Vec::new();

        for table in grid.tables() {
            for (r, row) in table.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if !is_label_cell(cell) {
                        continue;
                    }
                    let occurrences = keyword_occurrences(cell);
                    let Some(&(start, end)) = occurrences.first() else {
                        continue;
                    };
                    let stop = occurrences.get(1).map(|o| o.0).unwrap_or(cell.len());
                    let context = context_noun(&cell[..start]);

                    let mut values = values_after_keyword(&cell[end..stop], 0);
                    if values.is_empty() {
                        values = horizontal_values(row, c);
                    }
                    if values.is_empty() {
                        values = vertical_values(table, r, c);
                    }
                    if values.is_empty() {
                        trace!("Table label {:?} has no value", cell);
                    }

                    for v in values {
                        let position = found.len();
                        found.push(
                            SerialCandidate::new(v.value, SerialSource::Table, position)
                                .with_context(context),
                        );
                    }
                }
            }
        }

        dedup_candidates(found)
    }

    /// Date from a labelled date cell: the label cell itself, the cell to
    /// its right, or the cell below.
    pub fn resolve_date(&self, grid: &TableGrid) -> Option<DateCandidate> {
        for table in grid.tables() {
            for (r, row) in table.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let Some(label) = TABLE_DATE_LABEL.find(cell) else {
                        continue;
                    };
                    let below = table.get(r + 1).and_then(|next| next.get(c));
                    let found = self
                        .dates
                        .extract(&cell[label.end()..])
                        .or_else(|| row.get(c + 1).and_then(|n| self.dates.extract(n)))
                        .or_else(|| below.and_then(|n| self.dates.extract(n)));
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }
        None
    }
}

impl Default for TableResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A keyword-bearing cell that is not itself a valid serial such as `SN-001`.
fn is_label_cell(cell: &str) -> bool {
    has_serial_keyword(cell) && !(STANDALONE_TOKEN.is_match(cell) && is_valid_serial(cell))
}

fn horizontal_values(row: &[String], col: usize) -> Vec<LocatedValue> {
    match row.get(col + 1) {
        Some(next) if !is_label_cell(next) => segment_values(next, 0, SerialSource::Table),
        _ => Vec::new(),
    }
}

fn vertical_values(table: &Table, row: usize, col: usize) -> Vec<LocatedValue> {
    let mut values = Vec::new();
    for next in table.iter().skip(row + 1) {
        let Some(cell) = next.get(col) else { break };
        if is_label_cell(cell) {
            break;
        }
        let found = segment_values(cell, 0, SerialSource::Table);
        if found.is_empty() {
            break;
        }
        values.extend(found);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: Vec<Vec<&str>>) -> TableGrid {
        TableGrid::new(vec![rows])
    }

    fn rendered(grid: &TableGrid) -> Vec<String> {
        TableResolver::new()
            .resolve(grid)
            .iter()
            .map(SerialCandidate::render)
            .collect()
    }

    #[test]
    fn test_column_below_label() {
        let grid = grid(vec![
            vec!["Item", "Description"],
            vec!["Serial No", ""],
            vec!["SN-1", ""],
            vec!["SN-2", ""],
            vec!["SN-3", ""],
            vec!["", ""],
        ]);
        assert_eq!(rendered(&grid), vec!["SN-1", "SN-2", "SN-3"]);
    }

    #[test]
    fn test_value_right_of_label() {
        let grid = grid(vec![vec!["Ser.No.", "C789"]]);
        assert_eq!(rendered(&grid), vec!["C789"]);
    }

    #[test]
    fn test_column_stops_at_invalid_cell() {
        let grid = grid(vec![
            vec!["Serial Number"],
            vec!["AB1001"],
            vec!["AB1002"],
            vec!["Total"],
            vec!["AB1003"],
        ]);
        assert_eq!(rendered(&grid), vec!["AB1001", "AB1002"]);
    }

    #[test]
    fn test_label_neighbour_is_skipped() {
        let grid = grid(vec![vec!["S/N", "Ref No"], vec!["X1234", "Y5678"]]);
        assert_eq!(rendered(&grid), vec!["X1234", "Y5678"]);
    }

    #[test]
    fn test_value_inside_label_cell() {
        let grid = grid(vec![vec!["Tube S/N: 8194", "Model X"]]);
        assert_eq!(rendered(&grid), vec!["8194 (Tube)"]);
    }

    #[test]
    fn test_table_candidates_are_tagged() {
        let grid = grid(vec![vec!["Serial No", "AB1234"], vec!["S/N", "ab1234"]]);
        let found = TableResolver::new().resolve(&grid);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, SerialSource::Table);
        assert_eq!(found[0].value, "AB1234");
    }

    #[test]
    fn test_range_in_table() {
        let grid = grid(vec![vec!["Ser.Nos.", "A001-A010"]]);
        let found = TableResolver::new().resolve(&grid);
        assert_eq!(found[0].value, "A001-A010");
        assert_eq!(found[0].source, SerialSource::Table);
    }

    #[test]
    fn test_date_cells() {
        let resolver = TableResolver::new();

        let right = grid(vec![vec!["Issue Date", "2025-01-01"]]);
        assert_eq!(
            resolver.resolve_date(&right).map(|d| d.normalized()).as_deref(),
            Some("01/01/2025")
        );

        let below = grid(vec![vec!["Date", "Serial No"], vec!["12/05/2023", "X1234"]]);
        assert_eq!(
            resolver.resolve_date(&below).map(|d| d.normalized()).as_deref(),
            Some("12/05/2023")
        );

        let inline = grid(vec![vec!["Dated: May 12, 2023"]]);
        assert_eq!(
            resolver.resolve_date(&inline).map(|d| d.normalized()).as_deref(),
            Some("12/05/2023")
        );
    }

    #[test]
    fn test_empty_grid() {
        let resolver = TableResolver::new();
        assert!(resolver.resolve(&TableGrid::default()).is_empty());
        assert!(resolver.resolve_date(&TableGrid::default()).is_none());
    }
}
