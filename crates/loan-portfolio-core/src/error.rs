use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanPortfolioError {
    #[error("Invalid loan terms: {field} — {reason}")]
    InvalidTerms { field: String, reason: String },

    #[error("Degenerate schedule: {0}")]
    DegenerateSchedule(String),

    #[error("Missing field '{field}' in portfolio record")]
    MissingField { field: String },

    #[error("Loan {loan_id}: {reason}")]
    InvalidLoanRecord { loan_id: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error for '{path}': {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for LoanPortfolioError {
    fn from(e: serde_json::Error) -> Self {
        LoanPortfolioError::SerializationError(e.to_string())
    }
}
