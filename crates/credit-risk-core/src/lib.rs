pub mod error;
pub mod types;

#[cfg(feature = "credit")]
pub mod config;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "portfolio")]
pub mod source;

#[cfg(feature = "credit")]
pub use config::AnalysisConfig;
pub use error::CreditRiskError;
pub use types::*;

/// Standard result type for all credit-risk operations
pub type CreditRiskResult<T> = Result<T, CreditRiskError>;
