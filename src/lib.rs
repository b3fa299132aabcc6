//! Vacation period and eligibility engine
//!
//! This crate tracks collaborators, their vacation requests and approvals,
//! and derives for each collaborator the open accrual period, the days
//! enjoyed and remaining, and a situation describing how close the period
//! is to its legal deadlines.

#![warn(missing_docs)]

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod period;
pub mod services;
pub mod store;
pub mod telemetry;
