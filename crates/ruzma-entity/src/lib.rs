//! # ruzma-entity
//!
//! Domain entity models for Ruzma. [`milestone`] holds the database row,
//! [`deliverable`] holds the codec for the milestone's overloaded
//! `deliverable_link` column: shared links plus the revision-request ledger.

pub mod deliverable;
pub mod milestone;
