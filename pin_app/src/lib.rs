//! # pin_app
//!
//! Host-side collaborators for `pin_selector`: core affinity, configuration,
//! logging and a worker rotation driver

pub mod affinity;
pub mod cli;
pub mod config_loader;
pub mod errors;
pub mod rotation;
pub mod tracing_setup;

pub use affinity::CoreAffinityFactory;
pub use errors::AffinityError;
pub use errors::AppError;
pub use errors::Result;
pub use rotation::Assignment;
pub use rotation::RotationSummary;
