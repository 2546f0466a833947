//! Self-contained input for one dispatch run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentError, AssignmentOutcome, AssignmentSolver};
use crate::program::MipBackend;
use crate::{
    Cab, CostMatrix, CostModel, CostParameters, DetourError, DetourMetrics, DetourProvider, Rider,
    ValidationError,
};

/// Fleet snapshot, ride requests and pricing for a single optimisation run.
///
/// Requests are usually deserialised from JSON; `parameters` falls back to
/// [`CostParameters::default`] when omitted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DispatchRequest {
    /// Available cabs; their order is the row order of the cost matrix.
    pub cabs: Vec<Cab>,
    /// Pending riders; their order is the column order of the cost matrix.
    pub riders: Vec<Rider>,
    /// Detour metrics for every cab / rider pair.
    pub detours: DetourMetrics,
    /// Rate and weights of the cost function.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: CostParameters,
}

impl DispatchRequest {
    /// Assemble a request, fetching detours from `provider`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`DetourError`].
    pub fn with_provider<P>(
        cabs: Vec<Cab>,
        riders: Vec<Rider>,
        provider: &P,
        parameters: CostParameters,
    ) -> Result<Self, DetourError>
    where
        P: DetourProvider + ?Sized,
    {
        let detours = provider.detour_metrics(&cabs, &riders)?;
        Ok(Self {
            cabs,
            riders,
            detours,
            parameters,
        })
    }

    /// Check the request without building a matrix.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate_detailed(&self) -> Result<(), ValidationError> {
        self.cost_matrix().map(|_| ())
    }

    /// Price every cab / rider pair.
    ///
    /// # Errors
    ///
    /// See [`CostModel::build_matrix`].
    pub fn cost_matrix(&self) -> Result<CostMatrix, ValidationError> {
        let model = CostModel::new(self.parameters)?;
        let matrix = model.build_matrix(&self.cabs, &self.riders, &self.detours)?;
        log::debug!("cost matrix:\n{matrix}");
        Ok(matrix)
    }
}

/// Price `request` and assign its riders using `backend`.
///
/// # Errors
///
/// See [`AssignmentSolver::dispatch`].
pub fn dispatch<B>(backend: B, request: &DispatchRequest) -> Result<AssignmentOutcome, AssignmentError>
where
    B: MipBackend,
{
    AssignmentSolver::new(backend).dispatch(request)
}
