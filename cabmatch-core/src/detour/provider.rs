//! Detour provider trait for fleet / request pairs.

use crate::{Cab, Rider};

use super::error::DetourError;
use super::metrics::DetourMetrics;

/// Fetch detour metrics for every cab / rider pair of a run.
///
/// Implementers must return a table labelled with exactly the given cabs and
/// riders. Row order is free: the cost model aligns by identifier.
///
/// # Examples
///
/// ```rust
/// use cabmatch_core::{Cab, DetourError, DetourMetrics, DetourProvider, Rider};
///
/// struct ZeroDetours;
///
/// impl DetourProvider for ZeroDetours {
///     fn detour_metrics(
///         &self,
///         cabs: &[Cab],
///         riders: &[Rider],
///     ) -> Result<DetourMetrics, DetourError> {
///         if cabs.is_empty() || riders.is_empty() {
///             return Err(DetourError::EmptyInput);
///         }
///         let zeros = vec![vec![0.0; riders.len()]; cabs.len()];
///         DetourMetrics::positional(cabs, riders, zeros.clone(), zeros).map_err(|err| {
///             DetourError::Routing {
///                 message: err.to_string(),
///             }
///         })
///     }
/// }
///
/// let err = ZeroDetours.detour_metrics(&[], &[]).expect_err("empty input");
/// assert_eq!(err, DetourError::EmptyInput);
/// ```
pub trait DetourProvider {
    /// Return the detour table for `cabs` × `riders`.
    ///
    /// # Errors
    ///
    /// Implementations must return `Err(DetourError::EmptyInput)` when either
    /// slice is empty.
    fn detour_metrics(&self, cabs: &[Cab], riders: &[Rider])
    -> Result<DetourMetrics, DetourError>;
}

impl DetourProvider for DetourMetrics {
    /// Serve a precomputed table, checking that it covers the requested pairs.
    fn detour_metrics(
        &self,
        cabs: &[Cab],
        riders: &[Rider],
    ) -> Result<DetourMetrics, DetourError> {
        if cabs.is_empty() || riders.is_empty() {
            return Err(DetourError::EmptyInput);
        }
        self.align(cabs, riders)
            .map_err(|err| DetourError::Routing {
                message: err.to_string(),
            })?;
        Ok(self.clone())
    }
}
