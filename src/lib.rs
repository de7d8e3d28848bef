//! Reputation-gated job network.
//!
//! The contract core keeps one serialized store of user profiles, job
//! postings, and applications. Every entry point is an atomic transition:
//! it validates against the current state before its first write, so a
//! failed call leaves the store untouched. The `sim` module drives the
//! contract the way a host ledger would, block by block, with receipts.

pub mod applications;
pub mod contract;
pub mod jobs;
pub mod profiles;
pub mod sim;
pub mod state;

pub use contract::{ContractError, JobNetwork};
pub use state::{Address, JobId, NetworkState, ProfileId};
