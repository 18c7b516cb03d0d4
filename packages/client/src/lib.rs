//! Client core for the Play Hub staking and referral contracts.
//!
//! Everything here is single-threaded: shared handles are `Rc<RefCell<_>>`
//! and waiting happens through an injected [`clock::Clock`], so the embedding
//! event loop decides how sleeping is actually scheduled.

pub mod auth;
pub mod cache;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod contracts;
pub mod events;
pub mod orchestrator;
pub mod preferences;
pub mod reader;
pub mod retry;
pub mod store;
pub mod transport;
pub mod writer;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

#[cfg(test)]
mod tests;
