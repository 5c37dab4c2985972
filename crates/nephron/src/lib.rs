#![forbid(unsafe_code)]

//! Dynamic paired-donation exchange engine.
//!
//! The pool is a compatibility digraph that evolves in rounds: new arrivals
//! are admitted from a queue, a matching policy selects a vertex-disjoint set
//! of exchange cycles and donor chains, the matched pairs leave, and the
//! longest-waiting pairs attrite. Two policies are built in: finite-horizon
//! greedy lookahead over simulated futures, and a TD-learned linear value
//! function over standardized pool features.
//!
//! [`Pool`] drives the loop; the graph and enumeration primitives live in
//! [`nephron_graph`], re-exported here as [`graph`].

pub use nephron_graph as graph;

pub mod candidates;
pub mod config;
pub mod error;
pub mod features;
pub mod policy;
pub mod pool;
pub mod transition;

pub use candidates::{CandidateSet, CandidateSource, Enumerated};
pub use config::{PolicyKind, PoolConfig};
pub use error::{Error, Result};
pub use policy::{Action, MatchingPolicy};
pub use pool::{Pool, RoundReport};
pub use transition::{ArrivalQueue, TransitionOutcome};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
