//! cadguide: browse, group, score, and compare a design-software catalog.
//!
//! The library core is two pure functions: [`processor::group_entries`]
//! clusters entries into product families and [`scorer::recommend`] ranks
//! entries against finalized quiz answers. Everything else loads data into
//! them or presents what they return.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error_handling;
pub mod output;
pub mod processor;
pub mod quiz;
pub mod scorer;
pub mod theme;
