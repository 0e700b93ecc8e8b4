//! Process-wide error type.
//!
//! Every fallible operation in this crate reports an `AppError` carrying the
//! exit code the binary should terminate with:
//!
//! - `2` — invalid arguments or input schema (bad window length, missing file,
//!   missing CSV column, canceled prompt)
//! - `3` — no usable data (unknown station, zero valid rows)
//! - `4` — internal/terminal failures (TUI init, debug bundle writes)
//!
//! An empty result set is never an error; it is a reportable outcome.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Invalid argument or input schema (exit code 2).
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// No usable data for the requested query (exit code 3).
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Internal or terminal-level failure (exit code 4).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
