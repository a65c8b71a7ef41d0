//! Market data model and sources.
//!
//! [`models`] holds the vendor-agnostic daily bar representation consumed by the
//! scoring engine; [`providers`] holds the [`DataProvider`](providers::DataProvider)
//! contract and its concrete sources.

pub mod models;
pub mod providers;
