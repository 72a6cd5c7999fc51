pub mod annual;
pub mod error;
pub mod portfolio;
pub mod schedule;
pub mod time_value;
pub mod types;

pub use error::LoanPortfolioError;
pub use types::*;

/// Standard result type for all loan-portfolio operations
pub type LoanPortfolioResult<T> = Result<T, LoanPortfolioError>;
