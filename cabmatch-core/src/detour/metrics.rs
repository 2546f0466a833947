//! Labelled detour-distance and detour-time tables.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::IndexLookup;
use crate::{Cab, CabId, Rider, RiderId, ValidationError};

/// Which of the two detour matrices an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetourKind {
    /// Extra travel distance.
    Distance,
    /// Extra travel time.
    Time,
}

impl fmt::Display for DetourKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => f.write_str("detour distance"),
            Self::Time => f.write_str("detour time"),
        }
    }
}

/// Extra distance and time each cab incurs to pick up each rider.
///
/// Row `r` of both matrices belongs to `cab_ids[r]` and column `c` to
/// `rider_ids[c]`. The labels let the cost model line the table up with the
/// fleet and request lists regardless of their order.
///
/// # Examples
/// ```
/// use cabmatch_core::{CabId, DetourMetrics, RiderId};
///
/// # fn main() -> Result<(), cabmatch_core::ValidationError> {
/// let metrics = DetourMetrics::new(
///     vec![CabId::from("cab0"), CabId::from("cab1")],
///     vec![RiderId::from("rider0")],
///     vec![vec![1.0], vec![3.0]],
///     vec![vec![2.0], vec![5.0]],
/// )?;
/// assert_eq!(metrics.cab_ids.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetourMetrics {
    /// Row labels.
    pub cab_ids: Vec<CabId>,
    /// Column labels.
    pub rider_ids: Vec<RiderId>,
    /// `distance[row][column]`: extra distance in distance units.
    pub distance: Vec<Vec<f64>>,
    /// `time[row][column]`: extra time in minutes.
    pub time: Vec<Vec<f64>>,
}

/// Resolved row and column positions for one fleet / request pairing.
#[derive(Debug, Clone)]
pub(crate) struct DetourAlignment {
    /// `rows[i]` is the detour row of fleet cab `i`.
    pub(crate) rows: Vec<usize>,
    /// `columns[j]` is the detour column of request rider `j`.
    pub(crate) columns: Vec<usize>,
}

impl DetourMetrics {
    /// Validate and construct a labelled table.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when labels repeat, either matrix is
    /// not `cab_ids.len() × rider_ids.len()`, or an entry is negative or not
    /// finite.
    pub fn new(
        cab_ids: Vec<CabId>,
        rider_ids: Vec<RiderId>,
        distance: Vec<Vec<f64>>,
        time: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        let metrics = Self {
            cab_ids,
            rider_ids,
            distance,
            time,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// Label positional matrices with the order of `cabs` and `riders`.
    ///
    /// # Errors
    ///
    /// See [`DetourMetrics::new`].
    pub fn positional(
        cabs: &[Cab],
        riders: &[Rider],
        distance: Vec<Vec<f64>>,
        time: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            cabs.iter().map(|cab| cab.id.clone()).collect(),
            riders.iter().map(|rider| rider.id.clone()).collect(),
            distance,
            time,
        )
    }

    /// Re-check shape and value invariants, e.g. after deserialisation.
    ///
    /// # Errors
    ///
    /// See [`DetourMetrics::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cab_lookup()?;
        self.rider_lookup()?;
        self.check_matrix(DetourKind::Distance, &self.distance)?;
        self.check_matrix(DetourKind::Time, &self.time)
    }

    /// Look up the detour pair for a labelled row and column.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<(f64, f64)> {
        let distance = self.distance.get(row)?.get(column)?;
        let time = self.time.get(row)?.get(column)?;
        Some((*distance, *time))
    }

    /// Resolve every fleet cab and request rider to its row and column.
    pub(crate) fn align(
        &self,
        cabs: &[Cab],
        riders: &[Rider],
    ) -> Result<DetourAlignment, ValidationError> {
        self.validate()?;
        let cab_lookup = self.cab_lookup()?;
        let rider_lookup = self.rider_lookup()?;
        if cab_lookup.len() != cabs.len() {
            return Err(ValidationError::DetourLabelCount {
                axis: "cabs",
                expected: cabs.len(),
                found: cab_lookup.len(),
            });
        }
        if rider_lookup.len() != riders.len() {
            return Err(ValidationError::DetourLabelCount {
                axis: "riders",
                expected: riders.len(),
                found: rider_lookup.len(),
            });
        }

        let rows = cabs
            .iter()
            .map(|cab| {
                cab_lookup
                    .position(&cab.id)
                    .ok_or_else(|| ValidationError::MissingDetourRow {
                        cab: cab.id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let columns = riders
            .iter()
            .map(|rider| {
                rider_lookup
                    .position(&rider.id)
                    .ok_or_else(|| ValidationError::MissingDetourColumn {
                        rider: rider.id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DetourAlignment { rows, columns })
    }

    fn cab_lookup(&self) -> Result<IndexLookup<CabId>, ValidationError> {
        IndexLookup::try_from_keys(&self.cab_ids)
            .map_err(|id| ValidationError::DuplicateCab { id })
    }

    fn rider_lookup(&self) -> Result<IndexLookup<RiderId>, ValidationError> {
        IndexLookup::try_from_keys(&self.rider_ids)
            .map_err(|id| ValidationError::DuplicateRider { id })
    }

    fn check_matrix(&self, kind: DetourKind, matrix: &[Vec<f64>]) -> Result<(), ValidationError> {
        if matrix.len() != self.cab_ids.len() {
            return Err(ValidationError::DetourRowCount {
                kind,
                expected: self.cab_ids.len(),
                found: matrix.len(),
            });
        }
        for (row, entries) in matrix.iter().enumerate() {
            if entries.len() != self.rider_ids.len() {
                return Err(ValidationError::DetourColumnCount {
                    kind,
                    row,
                    expected: self.rider_ids.len(),
                    found: entries.len(),
                });
            }
            if let Some((column, value)) = entries
                .iter()
                .copied()
                .enumerate()
                .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
            {
                return Err(ValidationError::InvalidDetour {
                    kind,
                    row,
                    column,
                    value,
                });
            }
        }
        Ok(())
    }
}
