use pin_selector::CpuId;
use pin_selector::PinError;
use thiserror::Error;

/// Failures turning a configured CPU id into a core binding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AffinityError {
    #[error("CPU id {0} is negative")]
    NegativeCpu(CpuId),

    #[error("CPU id {cpu_id} is not one of the {available} cores visible to this process")]
    UnknownCpu { cpu_id: CpuId, available: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Pin selection error: {0}")]
    Pin(#[from] PinError),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
