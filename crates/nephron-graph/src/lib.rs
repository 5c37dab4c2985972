#![forbid(unsafe_code)]
//! Compatibility digraph and candidate enumeration for paired-donation
//! exchange pools.
//!
//! The container keeps donor-recipient pairs and non-directed donors in
//! insertion-ordered arenas with a stable name/index bijection; `alg` holds
//! the bounded cycle and chain enumeration that feeds matching policies.

pub mod alg;
mod error;
mod graph;

pub use alg::{Chain, Cycle};
pub use error::{Error, Result};
pub use graph::{ExchangeGraph, OutEdge};
