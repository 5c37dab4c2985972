#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("duplicate edge: {from} -> {to}")]
    DuplicateEdge { from: String, to: String },
    #[error("unknown vertex: {name}")]
    UnknownVertex { name: String },
    #[error("unknown non-directed donor: {name}")]
    UnknownNdd { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
