//! Element to cell matching for grid layouts.

use super::{Cell, MATCH_TOLERANCE};
use crate::elements::Element;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Positional tolerance in percentage points.
    pub tolerance: f64,
    /// Pair the i-th element with the i-th cell when nothing matches by position.
    pub index_fallback: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            tolerance: MATCH_TOLERANCE,
            index_fallback: true,
        }
    }
}

/// How a cell got its element. Indices refer to the element slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMatch {
    Positional(usize),
    Index(usize),
    Empty,
}

impl CellMatch {
    pub fn element_index(&self) -> Option<usize> {
        match self {
            CellMatch::Positional(i) | CellMatch::Index(i) => Some(*i),
            CellMatch::Empty => None,
        }
    }
}

/// Result of matching elements against the cells of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// One entry per cell, in cell order.
    pub cells: Vec<CellMatch>,
    /// Element indices not claimed by any cell, in element order.
    pub unplaced: Vec<usize>,
}

/// Whether an element's top-left corner sits on a cell's top-left corner.
pub fn in_cell(element: &Element, cell: &Cell, tolerance: f64) -> bool {
    (element.geometry.x - cell.x).abs() < tolerance && (element.geometry.y - cell.y).abs() < tolerance
}

/// Match elements to cells. Each element is claimed by at most one cell;
/// cells are visited in order.
pub fn assign(cells: &[Cell], elements: &[Element], options: &MatchOptions) -> Assignment {
    let mut claimed = vec![false; elements.len()];
    let matches_any: Vec<bool> = elements
        .iter()
        .map(|element| {
            cells
                .iter()
                .any(|cell| in_cell(element, cell, options.tolerance))
        })
        .collect();

    let mut result: Vec<CellMatch> = cells
        .iter()
        .map(|cell| {
            let found = elements
                .iter()
                .enumerate()
                .find(|(i, element)| !claimed[*i] && in_cell(element, cell, options.tolerance))
                .map(|(i, _)| i);
            match found {
                Some(i) => {
                    claimed[i] = true;
                    CellMatch::Positional(i)
                }
                None => CellMatch::Empty,
            }
        })
        .collect();

    if options.index_fallback {
        for (ci, slot) in result.iter_mut().enumerate() {
            if *slot != CellMatch::Empty || ci >= elements.len() {
                continue;
            }
            if !claimed[ci] && !matches_any[ci] && cells[ci].accepts_element(&elements[ci]) {
                claimed[ci] = true;
                *slot = CellMatch::Index(ci);
            }
        }
    }

    let unplaced = claimed
        .iter()
        .enumerate()
        .filter(|(_, claimed)| !**claimed)
        .map(|(i, _)| i)
        .collect();

    Assignment {
        cells: result,
        unplaced,
    }
}
