//! Validation errors raised before any solver is involved.

use thiserror::Error;

use crate::{CabId, DetourKind, RiderId};

/// Malformed optimisation input.
///
/// Every variant is detected before a program is formulated, so a
/// `ValidationError` never leaves a half-built model behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The fleet contained no cabs.
    #[error("at least one cab is required")]
    EmptyFleet,
    /// The request batch contained no riders.
    #[error("at least one ride request is required")]
    EmptyRequests,
    /// A cab identifier occurred more than once.
    #[error("cab {id} appears more than once")]
    DuplicateCab {
        /// Repeated identifier.
        id: CabId,
    },
    /// A rider identifier occurred more than once.
    #[error("rider {id} appears more than once")]
    DuplicateRider {
        /// Repeated identifier.
        id: RiderId,
    },
    /// A cab rating was negative or not finite.
    #[error("cab {cab} has invalid rating {rating}")]
    InvalidRating {
        /// Offending cab.
        cab: CabId,
        /// Rejected rating.
        rating: f64,
    },
    /// A rider's trip distance was negative or not finite.
    #[error("rider {rider} has invalid trip distance {distance}")]
    InvalidDistance {
        /// Offending rider.
        rider: RiderId,
        /// Rejected distance.
        distance: f64,
    },
    /// The cost rate or a weight was negative or not finite.
    #[error("{name} must be a finite, non-negative number (found {value})")]
    InvalidParameter {
        /// Parameter name as it appears in configuration.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The number of row or column labels of the detour table did not match
    /// the fleet or request batch.
    #[error("detour table labels {found} {axis} but {expected} were supplied")]
    DetourLabelCount {
        /// `"cabs"` or `"riders"`.
        axis: &'static str,
        /// Size of the fleet or request batch.
        expected: usize,
        /// Number of labels in the detour table.
        found: usize,
    },
    /// A detour matrix had the wrong number of rows.
    #[error("{kind} matrix has {found} rows, expected {expected}")]
    DetourRowCount {
        /// Matrix at fault.
        kind: DetourKind,
        /// Number of labelled cabs.
        expected: usize,
        /// Rows present.
        found: usize,
    },
    /// A detour matrix row had the wrong number of entries.
    #[error("{kind} matrix row {row} has {found} entries, expected {expected}")]
    DetourColumnCount {
        /// Matrix at fault.
        kind: DetourKind,
        /// Zero-based row index.
        row: usize,
        /// Number of labelled riders.
        expected: usize,
        /// Entries present.
        found: usize,
    },
    /// A detour entry was negative or not finite.
    #[error("{kind} entry [{row}][{column}] is invalid: {value}")]
    InvalidDetour {
        /// Matrix at fault.
        kind: DetourKind,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Rejected value.
        value: f64,
    },
    /// A fleet cab had no row in the detour table.
    #[error("no detour row for cab {cab}")]
    MissingDetourRow {
        /// Cab without detour metrics.
        cab: CabId,
    },
    /// A rider had no column in the detour table.
    #[error("no detour column for rider {rider}")]
    MissingDetourColumn {
        /// Rider without detour metrics.
        rider: RiderId,
    },
    /// A raw cost matrix had the wrong number of rows.
    #[error("cost matrix has {found} rows, expected {expected}")]
    CostRowCount {
        /// Number of labelled cabs.
        expected: usize,
        /// Rows present.
        found: usize,
    },
    /// A raw cost matrix row had the wrong number of entries.
    #[error("cost matrix row {row} has {found} entries, expected {expected}")]
    CostColumnCount {
        /// Zero-based row index.
        row: usize,
        /// Number of labelled riders.
        expected: usize,
        /// Entries present.
        found: usize,
    },
    /// A raw cost entry was negative or not finite.
    #[error("cost entry [{row}][{column}] is invalid: {value}")]
    InvalidCost {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Rejected value.
        value: f64,
    },
}
