//! tickscope: read-side query core for a KRC-20 token ledger
//!
//! The ledger tables are written by an external ingestion engine. This crate
//! reads them and derives balances, holder rankings, supply snapshots and
//! operation histories, exposed through [`explorer::Explorer`] and an
//! optional HTTP surface.

pub mod aggregate;
pub mod amount;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod ledger;
pub mod logger;
pub mod operations;
pub mod pagination;
pub mod repos;
pub mod store;
pub mod validation;

#[cfg(feature = "web")]
pub mod webserver;
