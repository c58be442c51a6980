pub mod auth;
pub mod balance;
pub mod config;
pub mod error;
pub mod exchange;
pub mod routes;
pub mod schemas;
pub mod settlement;
pub mod split;
pub mod store;
pub mod validation;

pub use balance::{compute_balances, Balances, MemberBalances};
pub use exchange::{generate_transactions, Exchange};
pub use settlement::{settle, settle_trip, SettlementResult};
pub use split::{resolve_weight, split_expense, Split};
