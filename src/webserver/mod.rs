//! HTTP surface over the explorer
//!
//! Thin plumbing only: query parameters in, `Explorer` call, JSON envelope
//! out. All ledger semantics live in the core modules.

mod server;

pub mod middleware;
pub mod routes;
pub mod state;
pub mod utils;

pub use server::{build_app, shutdown, start_server};
pub use state::AppState;
