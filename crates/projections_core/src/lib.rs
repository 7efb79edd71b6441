//! Household financial projection engine.
//!
//! Given a household's income and spending streams, bank, debt and
//! investment accounts, and a handful of run settings, this crate simulates
//! the household month by month and reports where the money goes:
//! - Paycheck withholding against federal, state, local and payroll
//!   schedules, with take-home amounts grossed back up exactly
//! - Employer retirement plans with the employee and combined limits
//! - A debt waterfall: minimums first, then interest-avoiding payments,
//!   then optional early payoff
//! - Surplus allocation into IRAs (limit-aware) and taxable accounts
//! - Year-end taxes with bracket inflation, capital gains and social
//!   security taxability, rolled into the next January's budget
//!
//! The entry point is [`run_projections`]:
//!
//! ```ignore
//! use projections_core::{run_projections, ProjectionInput};
//!
//! let input: ProjectionInput = serde_json::from_str(&body)?;
//! let projection = run_projections(&input)?;
//! println!("{}", serde_json::to_string(&projection.record)?);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod date_math;
pub mod error;
pub mod household;
pub mod irs;
pub mod simulation;
pub mod util;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{FlagsInput, PersonInput, ProjectionInput};
pub use error::{ConfigError, ProjectionError, SolveError};
pub use model::Projection;
pub use simulation::{run_projections, run_projections_from};
