#![forbid(unsafe_code)]

//! Detached selection content.
//!
//! When a selection is populated, the covered characters are lifted off
//! their source surface into a [`SelectedContent`]: a cell-rect
//! footprint plus a row-major data string. From that point the content
//! lives on a transient overlay until commit or cancel.
//!
//! # Invariants
//!
//! 1. `data` always has exactly `region.height` lines of exactly
//!    `region.width` characters; construction pads short rows with
//!    spaces.
//! 2. Blanks inside the footprint are spaces in `data` and overwrite on
//!    commit (a lifted hole stays a hole).

use serde::{Deserialize, Serialize};

use glyphgrid_core::CellRect;

/// A block of characters detached from its source surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedContent {
    /// Cell footprint the content occupies.
    pub region: CellRect,
    /// Row-major text, rows joined by `\n`, padded to `region.width`.
    pub data: String,
}

impl SelectedContent {
    /// Build content from raw text with its top-left at `(x, y)`.
    ///
    /// The footprint is measured from the text: height is the line
    /// count, width the longest line. Short rows are padded with
    /// spaces so the rectangle is always fully described.
    #[must_use]
    pub fn new(x: i32, y: i32, text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let data = lines
            .iter()
            .map(|l| {
                let mut row: String = (*l).to_string();
                row.extend(std::iter::repeat_n(' ', width - l.chars().count()));
                row
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            region: CellRect::new(x, y, width as i32, lines.len() as i32),
            data,
        }
    }

    /// Width of the footprint in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.region.width
    }

    /// Height of the footprint in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.region.height
    }

    /// Whether the content holds no visible character at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data.chars().all(|c| c == ' ' || c == '\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_and_pads_ragged_rows() {
        let c = SelectedContent::new(2, 3, "ab\nx\nlong");
        assert_eq!(c.region, CellRect::new(2, 3, 4, 3));
        assert_eq!(c.data, "ab  \nx   \nlong");
    }

    #[test]
    fn test_single_cell() {
        let c = SelectedContent::new(0, 0, "A");
        assert_eq!(c.region, CellRect::new(0, 0, 1, 1));
        assert!(!c.is_blank());
    }

    #[test]
    fn test_blank_detection() {
        assert!(SelectedContent::new(0, 0, "  \n ").is_blank());
        assert!(!SelectedContent::new(0, 0, "  \n.").is_blank());
    }

    #[test]
    fn test_serde_round_trip() {
        let c = SelectedContent::new(-1, -1, "ab\ncd");
        let json = serde_json::to_string(&c).unwrap();
        let back: SelectedContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
