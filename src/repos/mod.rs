// Repositories: decoded, zero-filtered access to the raw ledger tables.

pub mod balances;
pub mod tokens;

pub use balances::BalanceRepository;
pub use tokens::TokenMetaRepository;
