//! # pin_selector
//!
//! Lock-free round-robin selection over a fixed list of CPU pins

pub mod errors;
pub mod factory;
pub mod handle;
pub mod selector;

pub use errors::PinError;
pub use errors::Result;
pub use factory::PinFactory;
pub use handle::CpuPin;
pub use selector::CyclicPinSelector;
pub use selector::PinIter;
pub use selector::PinTicket;
pub use selector::NO_PINS;

/// Integer CPU identifier as supplied by the caller
pub type CpuId = i32;
