//! Error types for the Oracle adapter.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// ORA-00028: your session has been killed.
pub const ORA_SESSION_KILLED: u32 = 28;
/// ORA-01012: not logged on.
pub const ORA_NOT_LOGGED_ON: u32 = 1012;
/// ORA-03113: end-of-file on communication channel.
pub const ORA_END_OF_FILE_ON_CHANNEL: u32 = 3113;
/// ORA-03114: not connected to ORACLE.
pub const ORA_NOT_CONNECTED: u32 = 3114;

/// Error codes after which the session is gone and a reconnect is required.
pub const LOST_CONNECTION_ERROR_CODES: [u32; 4] = [
    ORA_SESSION_KILLED,
    ORA_NOT_LOGGED_ON,
    ORA_END_OF_FILE_ON_CHANNEL,
    ORA_NOT_CONNECTED,
];

/// Error type for adapter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Oracle database error reported by the driver.
    #[error("ORA-{code:05}: {message}")]
    Oracle { code: u32, message: String },

    /// The driver could not be loaded or could not open a handle.
    #[error("Oracle driver unavailable: {message}")]
    DriverUnavailable { message: String },

    /// Invalid adapter configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Connection attempt did not complete in time.
    #[error("Connection to {database} timed out after {timeout:?}")]
    ConnectionTimeout {
        database: String,
        timeout: std::time::Duration,
    },

    /// DESC / synonym resolution failed.
    #[error("\"DESC {name}\" failed; does it exist? (object does not exist or is not a table/view)")]
    ObjectNotFound { name: String },

    /// Identifier cannot be used in generated SQL.
    #[error("Invalid identifier: {name}")]
    InvalidIdentifier { name: String },

    /// Type conversion error.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },

    /// Serialized attribute could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Column not found in a result row or table.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },
}

impl Error {
    /// Create an Oracle database error.
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        Self::Oracle {
            code,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a driver-unavailable error.
    pub fn driver_unavailable(message: impl Into<String>) -> Self {
        Self::DriverUnavailable {
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Create an object-not-found error.
    pub fn object_not_found(name: impl Into<String>) -> Self {
        Self::ObjectNotFound { name: name.into() }
    }

    /// The ORA- code carried by this error, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Oracle { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the error means the session was lost and a reconnect is needed.
    pub fn is_lost_connection(&self) -> bool {
        self.code()
            .is_some_and(|code| LOST_CONNECTION_ERROR_CODES.contains(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_connection_codes() {
        for code in LOST_CONNECTION_ERROR_CODES {
            assert!(Error::oracle(code, "gone").is_lost_connection());
        }
        assert!(!Error::oracle(942, "table or view does not exist").is_lost_connection());
        assert!(!Error::config("bad").is_lost_connection());
    }

    #[test]
    fn test_oracle_display_pads_code() {
        let err = Error::oracle(3113, "end-of-file on communication channel");
        assert_eq!(
            err.to_string(),
            "ORA-03113: end-of-file on communication channel"
        );
        assert_eq!(err.code(), Some(3113));
    }

    #[test]
    fn test_object_not_found_message() {
        let err = Error::object_not_found("missing_table");
        assert!(err.to_string().contains("DESC missing_table"));
        assert!(err.to_string().contains("not a table/view"));
    }
}
