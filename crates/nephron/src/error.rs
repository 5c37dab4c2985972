#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parallel {kind} lists disagree: {items} candidates, {scores} scores")]
    MismatchedScores {
        kind: &'static str,
        items: usize,
        scores: usize,
    },
    #[error("cycle candidate {index} needs at least two distinct vertices")]
    MalformedCycle { index: usize },
    #[error("chain candidate {index} needs a donor followed by distinct pair vertices")]
    MalformedChain { index: usize },
    #[error(transparent)]
    Graph(#[from] nephron_graph::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
