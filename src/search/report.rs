//! Terminal rendering of search results.

use std::fmt;

use super::SearchMatches;
use crate::dataset::HarlequinDataset;
use crate::error::HarlequinError;
use crate::ir::ImageId;

/// One matched sample as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRow {
    pub sample_id: ImageId,
    pub index: usize,
    pub caption: String,
}

/// Search results ready for display.
///
/// `Display` renders a `sample_id` / `i` / `caption` table followed by the
/// match count. [`SearchReport::indices_only`] renders one index per line
/// for use in shell pipelines.
#[derive(Clone, Debug, Default)]
pub struct SearchReport {
    pub rows: Vec<SearchRow>,
}

const HEADERS: [&str; 3] = ["sample_id", "i", "caption"];

impl SearchReport {
    pub fn new(dataset: &HarlequinDataset, matches: &SearchMatches) -> Result<Self, HarlequinError> {
        let rows = matches
            .iter()
            .map(|(index, sample_id)| -> Result<SearchRow, HarlequinError> {
                let caption = dataset.get_image_annotation(sample_id)?.caption.clone();
                Ok(SearchRow {
                    sample_id,
                    index,
                    caption,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indices_only(&self) -> IndexList<'_> {
        IndexList(self)
    }

    fn cells(&self) -> Vec<[String; 3]> {
        self.rows
            .iter()
            .map(|row| {
                [
                    row.sample_id.to_string(),
                    row.index.to_string(),
                    row.caption.clone(),
                ]
            })
            .collect()
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.rows.is_empty() {
            let cells = self.cells();

            let mut widths = HEADERS.map(|h| h.chars().count());
            for row in &cells {
                for (width, cell) in widths.iter_mut().zip(row) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            write_row(f, &HEADERS.map(str::to_string), &widths)?;
            write_row(f, &widths.map(|w| "-".repeat(w)), &widths)?;
            for row in &cells {
                write_row(f, row, &widths)?;
            }
        }

        writeln!(f, "Found {} entries", self.rows.len())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String; 3], widths: &[usize; 3]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

/// Matched indices, one per line.
pub struct IndexList<'a>(&'a SearchReport);

impl fmt::Display for IndexList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0.rows {
            writeln!(f, "{}", row.index)?;
        }
        Ok(())
    }
}
