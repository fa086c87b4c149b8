use crate::error::BingError;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Full diagnostic text for `err`: timestamp, the error itself and every source below it.
pub fn render(err: &dyn Error, at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", at.to_rfc3339());
    let _ = writeln!(out, "error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(out, "caused by: {cause}");
        source = cause.source();
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{err:#?}");
    out
}

/// Write the diagnostic for `err` to `path`, replacing any previous log.
pub fn write_error_log(path: &Path, err: &dyn Error) -> Result<(), BingError> {
    fs::write(path, render(err, Utc::now())).map_err(|e| BingError::io(path, e))
}
