//! Error type shared by the solver, the point generators and the CLI.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq)]
pub enum TspError {
    #[error("no cities to visit")]
    EmptyInput,
    #[error("requested {requested} cities but only {available} points were supplied")]
    CityCountMismatch { requested: usize, available: usize },
    #[error("{cities} cities exceed the supported limit of {limit}")]
    TooManyCities { cities: usize, limit: usize },
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}
