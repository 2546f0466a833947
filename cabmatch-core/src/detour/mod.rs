//! Detour metrics supplied by an external routing collaborator.
//!
//! The `DetourProvider` trait abstracts the retrieval of the extra distance
//! and time a cab incurs to pick up each rider. Callers supply the fleet and
//! the request batch and receive a labelled [`DetourMetrics`] table.
//!
//! The cost model never recomputes detours; it only resolves labels and
//! checks that the table is complete.

mod error;
mod metrics;
mod provider;

pub use error::DetourError;
pub use metrics::{DetourKind, DetourMetrics};
pub use provider::DetourProvider;
