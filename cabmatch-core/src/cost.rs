//! Cost model turning fleet and request attributes into a cost matrix.
//!
//! The cost of cab `i` serving rider `j` is
//!
//! ```text
//! w1 * (traveling_cost_rate * distance[j]) + w2 * detour_distance[i][j] + w3 * detour_time[i][j]
//! ```
//!
//! The trip term is identical for every cab serving a given rider; the detour
//! terms are what set cabs apart. A zero weight switches its term off.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::IndexLookup;
use crate::{Cab, CabId, DetourMetrics, Rider, RiderId, ValidationError};

/// Traveling cost per distance unit used when none is configured.
pub const DEFAULT_TRAVELING_COST_RATE: f64 = 10.0;

/// Relative importance of the three cost components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostWeights {
    /// Weight of the rider's base trip cost (`w1`).
    pub trip: f64,
    /// Weight of the cab's detour distance (`w2`).
    pub detour_distance: f64,
    /// Weight of the cab's detour time (`w3`).
    pub detour_time: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            trip: 1.0,
            detour_distance: 1.0,
            detour_time: 1.0,
        }
    }
}

/// Tunable parameters of the [`CostModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CostParameters {
    /// Cost per distance unit of a rider's trip.
    pub traveling_cost_rate: f64,
    /// Component weights.
    pub weights: CostWeights,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            traveling_cost_rate: DEFAULT_TRAVELING_COST_RATE,
            weights: CostWeights::default(),
        }
    }
}

impl CostParameters {
    /// Check that the rate and every weight are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("traveling_cost_rate", self.traveling_cost_rate),
            ("trip_weight", self.weights.trip),
            ("detour_distance_weight", self.weights.detour_distance),
            ("detour_time_weight", self.weights.detour_time),
        ];
        match checks
            .into_iter()
            .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
        {
            Some((name, value)) => Err(ValidationError::InvalidParameter { name, value }),
            None => Ok(()),
        }
    }
}

/// Builds cost matrices from validated parameters.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use cabmatch_core::{
///     Cab, CabAttributes, CostModel, CostParameters, DetourMetrics, Rider, RiderAttributes,
///     RouteId,
/// };
///
/// # fn main() -> Result<(), cabmatch_core::ValidationError> {
/// let cab = Cab::new("cab0", CabAttributes { route: RouteId(0), rating: 4.0, occupancy: 0 })?;
/// let rider = Rider::new(
///     "rider0",
///     RiderAttributes {
///         source: Coord { x: 0.0, y: 0.0 },
///         destination: Coord { x: 1.0, y: 0.0 },
///         distance: 10.0,
///         route: RouteId(0),
///     },
/// )?;
/// let (cabs, riders) = (vec![cab], vec![rider]);
/// let detours = DetourMetrics::positional(&cabs, &riders, vec![vec![1.0]], vec![vec![2.0]])?;
///
/// let model = CostModel::new(CostParameters::default())?;
/// let matrix = model.build_matrix(&cabs, &riders, &detours)?;
/// assert_eq!(matrix.get(0, 0), Some(103.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    parameters: CostParameters,
}

impl CostModel {
    /// Validate `parameters` and construct a model.
    ///
    /// # Errors
    ///
    /// See [`CostParameters::validate`].
    pub fn new(parameters: CostParameters) -> Result<Self, ValidationError> {
        parameters.validate()?;
        Ok(Self { parameters })
    }

    /// Parameters the model was built with.
    #[must_use]
    pub const fn parameters(&self) -> &CostParameters {
        &self.parameters
    }

    /// Derive the `cabs.len() × riders.len()` cost matrix.
    ///
    /// Row `i` belongs to `cabs[i]` and column `j` to `riders[j]`; detours are
    /// looked up by identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when either list is empty, identifiers
    /// repeat, an entity fails its own validation, or the detour table does
    /// not cover the batch exactly.
    pub fn build_matrix(
        &self,
        cabs: &[Cab],
        riders: &[Rider],
        detours: &DetourMetrics,
    ) -> Result<CostMatrix, ValidationError> {
        if cabs.is_empty() {
            return Err(ValidationError::EmptyFleet);
        }
        if riders.is_empty() {
            return Err(ValidationError::EmptyRequests);
        }
        for cab in cabs {
            cab.validate()?;
        }
        for rider in riders {
            rider.validate()?;
        }
        IndexLookup::try_from_keys(cabs.iter().map(|cab| &cab.id))
            .map_err(|id| ValidationError::DuplicateCab { id })?;
        IndexLookup::try_from_keys(riders.iter().map(|rider| &rider.id))
            .map_err(|id| ValidationError::DuplicateRider { id })?;
        let alignment = detours.align(cabs, riders)?;

        let mut costs = Vec::with_capacity(cabs.len() * riders.len());
        for (i, (cab, &row)) in cabs.iter().zip(&alignment.rows).enumerate() {
            for (j, (rider, &column)) in riders.iter().zip(&alignment.columns).enumerate() {
                let (detour_distance, detour_time) =
                    detour_entry(detours, row, column, cab, rider)?;
                let value =
                    self.pair_cost(rider.attributes.distance, detour_distance, detour_time);
                // Finite inputs can still overflow once weighted.
                if !value.is_finite() {
                    return Err(ValidationError::InvalidCost {
                        row: i,
                        column: j,
                        value,
                    });
                }
                costs.push(value);
            }
        }

        log::info!(
            "built {}x{} cost matrix (rate {}, weights {:?})",
            cabs.len(),
            riders.len(),
            self.parameters.traveling_cost_rate,
            self.parameters.weights
        );
        Ok(CostMatrix {
            cab_ids: cabs.iter().map(|cab| cab.id.clone()).collect(),
            rider_ids: riders.iter().map(|rider| rider.id.clone()).collect(),
            costs,
        })
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "the cost formula is a weighted sum of real-valued terms"
    )]
    fn pair_cost(&self, trip_distance: f64, detour_distance: f64, detour_time: f64) -> f64 {
        let CostWeights {
            trip,
            detour_distance: distance_weight,
            detour_time: time_weight,
        } = self.parameters.weights;
        trip * (self.parameters.traveling_cost_rate * trip_distance)
            + distance_weight * detour_distance
            + time_weight * detour_time
    }
}

/// Detour distance and time for one aligned pair.
fn detour_entry(
    detours: &DetourMetrics,
    row: usize,
    column: usize,
    cab: &Cab,
    rider: &Rider,
) -> Result<(f64, f64), ValidationError> {
    detours.get(row, column).ok_or_else(|| {
        if detours.distance.get(row).is_some() && detours.time.get(row).is_some() {
            ValidationError::MissingDetourColumn {
                rider: rider.id.clone(),
            }
        } else {
            ValidationError::MissingDetourRow { cab: cab.id.clone() }
        }
    })
}

/// Dense cab × rider cost matrix for one optimisation run.
///
/// Entries are finite and non-negative. Row and column labels record which
/// cab and rider each index stands for.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CostMatrix {
    cab_ids: Vec<CabId>,
    rider_ids: Vec<RiderId>,
    costs: Vec<f64>,
}

impl CostMatrix {
    /// Wrap precomputed costs, e.g. from an external pricing service.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for empty or repeated labels, a shape
    /// that does not match the labels, or a negative or non-finite entry.
    pub fn from_rows(
        cab_ids: Vec<CabId>,
        rider_ids: Vec<RiderId>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        if cab_ids.is_empty() {
            return Err(ValidationError::EmptyFleet);
        }
        if rider_ids.is_empty() {
            return Err(ValidationError::EmptyRequests);
        }
        IndexLookup::try_from_keys(&cab_ids).map_err(|id| ValidationError::DuplicateCab { id })?;
        IndexLookup::try_from_keys(&rider_ids)
            .map_err(|id| ValidationError::DuplicateRider { id })?;
        if rows.len() != cab_ids.len() {
            return Err(ValidationError::CostRowCount {
                expected: cab_ids.len(),
                found: rows.len(),
            });
        }

        let mut costs = Vec::with_capacity(cab_ids.len() * rider_ids.len());
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != rider_ids.len() {
                return Err(ValidationError::CostColumnCount {
                    row,
                    expected: rider_ids.len(),
                    found: entries.len(),
                });
            }
            for (column, value) in entries.into_iter().enumerate() {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(ValidationError::InvalidCost { row, column, value });
                }
                costs.push(value);
            }
        }
        Ok(Self {
            cab_ids,
            rider_ids,
            costs,
        })
    }

    /// Number of cabs (rows).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.cab_ids.len()
    }

    /// Number of riders (columns).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.rider_ids.len()
    }

    /// Cost of cab `row` serving rider `column`.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if column >= self.columns() {
            return None;
        }
        self.costs.get(row * self.columns() + column).copied()
    }

    /// All costs of cab `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let width = self.columns();
        self.costs.get(row * width..(row + 1) * width)
    }

    /// Iterate over rows in fleet order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.costs.chunks(self.columns().max(1))
    }

    /// Row labels.
    #[must_use]
    pub fn cab_ids(&self) -> &[CabId] {
        &self.cab_ids
    }

    /// Column labels.
    #[must_use]
    pub fn rider_ids(&self) -> &[RiderId] {
        &self.rider_ids
    }
}

impl fmt::Display for CostMatrix {
    /// Labelled grid, one cab per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .cab_ids
            .iter()
            .map(|id| id.as_str().len())
            .max()
            .unwrap_or(0);
        let cell_width = self
            .rider_ids
            .iter()
            .map(|id| id.as_str().len())
            .chain(self.costs.iter().map(|cost| cost.to_string().len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:label_width$}", "")?;
        for rider in &self.rider_ids {
            write!(f, " {:>cell_width$}", rider.as_str())?;
        }
        for (cab, row) in self.cab_ids.iter().zip(self.iter_rows()) {
            writeln!(f)?;
            write!(f, "{:label_width$}", cab.as_str())?;
            for cost in row {
                write!(f, " {:>cell_width$}", cost.to_string())?;
            }
        }
        Ok(())
    }
}
