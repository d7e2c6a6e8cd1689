pub mod error;
pub mod types;

#[cfg(feature = "espp")]
pub mod espp;

pub use error::EsppError;
pub use types::*;

/// Standard result type for all ESPP operations
pub type EsppResult<T> = Result<T, EsppError>;
