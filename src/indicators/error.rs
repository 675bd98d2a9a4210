use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("invalid period for {0}: must be greater than zero")]
    InvalidPeriod(&'static str),

    #[error("price bars out of order at index {0}")]
    OutOfOrder(usize),
}
