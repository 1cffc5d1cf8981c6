use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RfError {
    #[error("a Yagi needs at least 2 elements, got {0}")]
    TooFewElements(usize),
    #[error("unknown cable: {0}")]
    UnknownCable(String),
}
