//! Layout-aware table recovery from extracted PDF text.
//!
//! Text extraction keeps the visual column layout as runs of spaces or
//! tabs. A tab, or a run of at least `min_gap` spaces, starts a new cell;
//! single spaces stay inside a cell ("UPI/Grocer Store").
//!
//! Blank cells leave no text behind, so rows below the header are placed
//! by position: each header cell owns the stretch of line up to the
//! midpoint of the gap to its neighbours, and every data cell goes to the
//! column it overlaps most.

use crate::models::table::RawTable;
use crate::statement::HeaderResolver;

/// A run of text on one line with its character span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    /// First character position.
    pub start: usize,
    /// One past the last character position.
    pub end: usize,
    pub text: String,
}

/// Column regions taken from a header line.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    // Doubled character coordinates so gap midpoints stay integral.
    bounds: Vec<(i64, i64)>,
}

impl ColumnLayout {
    pub fn from_header(header: &[TextCell]) -> Self {
        let bounds = header
            .iter()
            .enumerate()
            .map(|(j, cell)| {
                let lo = match j {
                    0 => i64::MIN,
                    _ => (header[j - 1].end + cell.start) as i64,
                };
                let hi = header
                    .get(j + 1)
                    .map_or(i64::MAX, |next| (cell.end + next.start) as i64);
                (lo, hi)
            })
            .collect();

        Self { bounds }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Column whose region overlaps the cell most; the leftmost on ties.
    pub fn column_of(&self, cell: &TextCell) -> usize {
        let start = 2 * cell.start as i64;
        let end = 2 * cell.end as i64;

        let mut best = 0;
        let mut best_overlap = i64::MIN;
        for (j, &(lo, hi)) in self.bounds.iter().enumerate() {
            let overlap = end.min(hi) - start.max(lo);
            if overlap > best_overlap {
                best = j;
                best_overlap = overlap;
            }
        }
        best
    }

    /// Place a line's cells into one slot per column. Columns with no text
    /// stay `None`; cells landing in the same column are joined by a space.
    pub fn assign(&self, cells: &[TextCell]) -> Vec<Option<String>> {
        let mut row: Vec<Option<String>> = vec![None; self.len()];

        for cell in cells {
            let Some(slot) = row.get_mut(self.column_of(cell)) else {
                continue;
            };
            match slot {
                Some(text) => {
                    text.push(' ');
                    text.push_str(&cell.text);
                }
                None => *slot = Some(cell.text.clone()),
            }
        }

        row
    }
}

/// Recover a table from extracted text.
///
/// Lines up to and including the header chosen by `resolver` keep their
/// gap-split cells. Later lines are aligned to the header's columns when
/// the header is confident and has at least two cells.
pub fn split_rows(text: &str, min_gap: usize, resolver: &HeaderResolver) -> RawTable {
    let lines: Vec<Vec<TextCell>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_cells(line, min_gap))
        .collect();

    let table = RawTable::new(
        lines
            .iter()
            .map(|cells| cells.iter().map(|c| Some(c.text.clone())).collect())
            .collect(),
    );

    let Some(header) = resolver.resolve(&table).filter(|h| h.confident) else {
        return table;
    };
    let layout = ColumnLayout::from_header(&lines[header.index]);
    if layout.len() < 2 {
        return table;
    }

    let rows = table
        .rows()
        .iter()
        .zip(&lines)
        .enumerate()
        .map(|(i, (row, cells))| {
            if i > header.index {
                layout.assign(cells)
            } else {
                row.clone()
            }
        })
        .collect();

    RawTable::new(rows)
}

/// Split one line into cells with their positions.
pub fn split_cells(line: &str, min_gap: usize) -> Vec<TextCell> {
    let min_gap = min_gap.max(1);
    let mut cells = Vec::new();
    let mut current: Option<TextCell> = None;
    let mut spaces = 0;

    for (pos, ch) in line.chars().enumerate() {
        match ch {
            '\t' => {
                cells.extend(current.take());
                spaces = 0;
            }
            ' ' | '\u{00a0}' => spaces += 1,
            _ => {
                match current.as_mut() {
                    Some(cell) if spaces < min_gap => {
                        cell.text.extend(std::iter::repeat(' ').take(spaces));
                        cell.text.push(ch);
                        cell.end = pos + 1;
                    }
                    _ => {
                        cells.extend(current.take());
                        current = Some(TextCell {
                            start: pos,
                            end: pos + 1,
                            text: ch.to_string(),
                        });
                    }
                }
                spaces = 0;
            }
        }
    }
    cells.extend(current);

    cells
}

/// Split one line into cell texts.
pub fn split_line(line: &str, min_gap: usize) -> Vec<String> {
    split_cells(line, min_gap).into_iter().map(|c| c.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "Txn Date      Particulars              Withdrawal     Deposit      Balance";

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_split_line_on_gaps() {
        assert_eq!(
            split_line("01/04/2024   UPI/Grocer Store     450.00    10,550.00", 2),
            vec!["01/04/2024", "UPI/Grocer Store", "450.00", "10,550.00"]
        );
    }

    #[test]
    fn test_split_line_on_tabs() {
        assert_eq!(
            split_line("Date\tNarration\t\tDebit", 2),
            vec!["Date", "Narration", "Debit"]
        );
    }

    #[test]
    fn test_single_spaces_stay_in_cell() {
        assert_eq!(split_line("Statement of Account", 2), vec!["Statement of Account"]);
        assert_eq!(split_line("Txn Date  Particulars", 1), vec!["Txn", "Date", "Particulars"]);
    }

    #[test]
    fn test_cell_positions() {
        assert_eq!(
            split_cells("  Rent   5,000.00", 2),
            vec![
                TextCell { start: 2, end: 6, text: "Rent".to_string() },
                TextCell { start: 9, end: 17, text: "5,000.00".to_string() },
            ]
        );
    }

    #[test]
    fn test_blank_withdrawal_keeps_deposit_in_place() {
        let layout = ColumnLayout::from_header(&split_cells(HEADER, 2));
        let row = layout.assign(&split_cells(
            "02/04/2024    Salary                                3,000.00    98,000.00",
            2,
        ));

        assert_eq!(
            row,
            cells(&[Some("02/04/2024"), Some("Salary"), None, Some("3,000.00"), Some("98,000.00")])
        );
    }

    #[test]
    fn test_amount_wider_than_header() {
        let layout = ColumnLayout::from_header(&split_cells(HEADER, 2));
        let row = layout.assign(&split_cells(
            "05/04/2024    Opening Balance                                1,00,000.00",
            2,
        ));

        assert_eq!(
            row,
            cells(&[Some("05/04/2024"), Some("Opening Balance"), None, None, Some("1,00,000.00")])
        );
    }

    #[test]
    fn test_split_rows_aligns_after_header() {
        let text = format!(
            "IDFC FIRST Bank\n\n   \n{}\n01/04/2024    Rent                       5,000.00               95,000.00\n",
            HEADER
        );
        let table = split_rows(&text, 2, &HeaderResolver::new());

        assert_eq!(table.len(), 3);
        assert_eq!(table.row(0).unwrap(), cells(&[Some("IDFC FIRST Bank")]).as_slice());
        assert_eq!(table.row(1).unwrap().len(), 5);
        assert_eq!(
            table.row(2).unwrap(),
            cells(&[Some("01/04/2024"), Some("Rent"), Some("5,000.00"), None, Some("95,000.00")])
                .as_slice()
        );
    }

    #[test]
    fn test_split_rows_without_header_keeps_gap_cells() {
        let table = split_rows("alpha   beta\ngamma\n", 2, &HeaderResolver::new());
        assert_eq!(table.row(0).unwrap(), cells(&[Some("alpha"), Some("beta")]).as_slice());
        assert_eq!(table.row(1).unwrap(), cells(&[Some("gamma")]).as_slice());
    }
}
