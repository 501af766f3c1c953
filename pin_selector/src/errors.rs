use thiserror::Error;

use crate::CpuId;

#[derive(Error, Debug)]
pub enum PinError {
    #[error("Failed to materialize pin for CPU {cpu_id} at position {index}: {source}")]
    Materialize { cpu_id: CpuId, index: usize, source: Box<dyn std::error::Error + Send + Sync> },

    #[error("Operation '{0}' is not supported")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, PinError>;
