//! Derived views built from balance rows
//!
//! - `holders`: ranked holder pages for one token
//! - `portfolio`: cross-token top holders and the address catalog
//! - `snapshot`: full holder snapshot and supply summary
//!
//! Nothing here is cached; every call re-reads the ledger.

pub mod holders;
pub mod portfolio;
pub mod snapshot;

pub use holders::{HolderAggregator, HolderInfo};
pub use portfolio::HolderPortfolio;
pub use snapshot::{SnapshotBuilder, SnapshotHolder, SnapshotSummary, TokenSnapshot};
