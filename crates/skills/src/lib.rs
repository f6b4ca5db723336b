//! Skills for the skiff demo agents.
//!
//! - [`book`]: index local books, search them, look them up on Open Library
//! - [`crypto`]: CoinGecko prices and trending coins
//! - [`trip`]: the multi-phase trip planner
//!
//! Plus the pure helpers they are built from ([`budget`], [`prompts`]) and the
//! plain adapters for the HTTP and document ports.

pub mod book;
pub mod budget;
pub mod crypto;
pub mod document;
pub mod http;
pub mod prompts;
pub mod trip;

#[cfg(test)]
mod testing;

pub use budget::{BudgetBreakdown, BudgetTier, TierName, compute_budget};
pub use document::PlainTextParser;
pub use http::ReqwestFetcher;
pub use trip::TripStores;
