//! Mixed-integer backend for cabmatch built on `good_lp`.
//!
//! This crate provides [`LpBackend`], an implementation of the
//! [`MipBackend`](cabmatch_core::MipBackend) capability. Models record their
//! variables and constraints and hand the finished program to `good_lp`'s
//! pure-Rust `microlp` engine when solved, so no native solver library is
//! required.
//!
//! ```
//! use cabmatch_core::{AssignmentSolver, CabId, CostMatrix, RiderId};
//! use cabmatch_solver_lp::LpBackend;
//!
//! let matrix = CostMatrix::from_rows(
//!     vec![CabId::from("cab0"), CabId::from("cab1")],
//!     vec![RiderId::from("rider0")],
//!     vec![vec![12.0], vec![7.0]],
//! )
//! .expect("valid matrix");
//! let outcome = AssignmentSolver::new(LpBackend::default())
//!     .solve(matrix)
//!     .expect("solver available");
//! let assignment = outcome.assignment().expect("feasible");
//! assert_eq!(assignment.pairs()[0].cab.as_str(), "cab1");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod lp;

pub use backend::{DEFAULT_ENGINE, LpBackend, LpModel, SUPPORTED_ENGINES};
