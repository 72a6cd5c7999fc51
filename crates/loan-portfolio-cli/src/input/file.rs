use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use loan_portfolio_core::portfolio::LoanRecord;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a loan portfolio CSV, one loan per row. Headers must match the
/// `LoanRecord` field names. A row missing a required column fails the
/// whole load rather than being skipped.
pub fn read_portfolio_csv(path: &str) -> Result<Vec<LoanRecord>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;

    let mut loans = Vec::new();
    for (idx, record) in reader.deserialize::<LoanRecord>().enumerate() {
        let loan = record
            .map_err(|e| format!("Row {} of '{}': {}", idx + 1, canonical.display(), e))?;
        loans.push(loan);
    }

    if loans.is_empty() {
        return Err(format!("No loan records found in '{}'", canonical.display()).into());
    }
    Ok(loans)
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
