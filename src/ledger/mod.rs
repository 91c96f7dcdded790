// Ledger domain types: decoded rows of the externally maintained ledger.

pub mod balance;
pub mod operation;
pub mod token;

pub use balance::{AddressBalance, AddressPortfolio, BalanceRecord, TokenBalance};
pub use operation::{
    Operation, OperationDetail, OperationIndexEntry, OperationScript, OperationState,
};
pub use token::{TokenListItem, TokenMeta};
