//! Integration tests for the projection engine
//!
//! Tests are organized by topic:
//! - `taxes` - Year-end taxes, bracket inflation and filing status
//! - `allocation` - Surplus allocation across debt and investment accounts
//! - `projection` - End-to-end runs, including from raw JSON input

mod taxes;
