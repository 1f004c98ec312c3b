//! Adapter configuration.
//!
//! [`AdapterConfig`] carries everything needed to open (and later re-open)
//! a session, plus the [`EmulationFlags`] that steer type mapping. Flags are
//! plain values owned by each adapter, so two adapters in one process can
//! run with different settings.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PREFETCH_ROWS: u32 = 100;
pub const DEFAULT_CURSOR_SHARING: &str = "similar";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_SEQUENCE_START_VALUE: u64 = 10_000;

/// Session privilege used at logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    /// Ordinary session.
    #[default]
    Normal,
    /// SYSDBA.
    Sysdba,
    /// SYSOPER.
    Sysoper,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Sysdba => write!(f, "SYSDBA"),
            Self::Sysoper => write!(f, "SYSOPER"),
        }
    }
}

/// Time zone used to interpret DATE and TIMESTAMP values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultTimezone {
    /// Values are UTC.
    #[default]
    Utc,
    /// Values are in the host's local zone.
    Local,
}

/// Switches controlling type emulation and literal handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulationFlags {
    /// Treat NUMBER(1) as boolean.
    pub emulate_booleans: bool,
    /// Treat CHAR(1) / VARCHAR2(1) and `*_flag` / `*_yn` VARCHAR2 columns as 'Y'/'N' booleans.
    pub emulate_booleans_from_strings: bool,
    /// Decode DATE values at midnight as dates.
    pub emulate_dates: bool,
    /// Classify DATE columns with a `date` name segment as dates.
    pub emulate_dates_by_column_name: bool,
    /// Classify `id` / `*_id` numeric columns as integers.
    pub emulate_integers_by_column_name: bool,
    /// Start value for sequences created alongside tables.
    pub default_sequence_start_value: u64,
    /// chrono pattern used to cast strings to dates.
    pub string_to_date_format: Option<String>,
    /// chrono pattern used to cast strings to times.
    pub string_to_time_format: Option<String>,
    /// Zone used when decoding date/time values.
    pub default_timezone: DefaultTimezone,
}

impl Default for EmulationFlags {
    fn default() -> Self {
        Self {
            emulate_booleans: true,
            emulate_booleans_from_strings: false,
            emulate_dates: false,
            emulate_dates_by_column_name: false,
            emulate_integers_by_column_name: false,
            default_sequence_start_value: DEFAULT_SEQUENCE_START_VALUE,
            string_to_date_format: None,
            string_to_time_format: None,
            default_timezone: DefaultTimezone::Utc,
        }
    }
}

/// Connection and session configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// TNS alias or easy-connect string.
    pub database: String,
    /// Logon user.
    pub username: String,
    /// Logon password.
    pub password: String,
    /// Schema switched to with `ALTER SESSION SET CURRENT_SCHEMA`.
    pub schema: Option<String>,
    /// Logon privilege.
    pub privilege: Privilege,
    /// Rows prefetched per round-trip.
    pub prefetch_rows: u32,
    /// `CURSOR_SHARING` session mode.
    pub cursor_sharing: String,
    /// Put the driver in non-blocking mode.
    pub allow_concurrency: bool,
    /// Reconnect and retry once after a lost connection (autocommit only).
    pub auto_retry: bool,
    /// Upper bound for opening a session.
    pub connect_timeout_secs: u64,
    /// Type emulation switches.
    #[serde(flatten)]
    pub flags: EmulationFlags,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            username: String::new(),
            password: String::new(),
            schema: None,
            privilege: Privilege::Normal,
            prefetch_rows: DEFAULT_PREFETCH_ROWS,
            cursor_sharing: DEFAULT_CURSOR_SHARING.to_string(),
            allow_concurrency: false,
            auto_retry: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            flags: EmulationFlags::default(),
        }
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("schema", &self.schema)
            .field("privilege", &self.privilege)
            .field("prefetch_rows", &self.prefetch_rows)
            .field("cursor_sharing", &self.cursor_sharing)
            .field("allow_concurrency", &self.allow_concurrency)
            .field("auto_retry", &self.auto_retry)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("flags", &self.flags)
            .finish()
    }
}

impl AdapterConfig {
    /// Create a configuration with logon credentials and defaults elsewhere.
    pub fn new(
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Set the current schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the logon privilege.
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = privilege;
        self
    }

    /// Set the prefetch row count.
    pub fn with_prefetch_rows(mut self, rows: u32) -> Self {
        self.prefetch_rows = rows;
        self
    }

    /// Set the cursor sharing mode.
    pub fn with_cursor_sharing(mut self, mode: impl Into<String>) -> Self {
        self.cursor_sharing = mode.into();
        self
    }

    /// Enable or disable non-blocking driver mode.
    pub fn with_allow_concurrency(mut self, allow: bool) -> Self {
        self.allow_concurrency = allow;
        self
    }

    /// Enable or disable reconnect-and-retry.
    pub fn with_auto_retry(mut self, auto_retry: bool) -> Self {
        self.auto_retry = auto_retry;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs();
        self
    }

    /// Replace the emulation flags.
    pub fn with_flags(mut self, flags: EmulationFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check the configuration before any connection attempt.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::config("username must not be empty"));
        }
        if self.prefetch_rows == 0 {
            return Err(Error::config("prefetch_rows must be greater than 0"));
        }
        if !matches!(
            self.cursor_sharing.to_lowercase().as_str(),
            "exact" | "similar" | "force"
        ) {
            return Err(Error::config(format!(
                "cursor_sharing must be one of exact, similar, force (got '{}')",
                self.cursor_sharing
            )));
        }
        if let Some(schema) = &self.schema {
            crate::sql::validate_identifier(schema)?;
        }
        if self.flags.default_sequence_start_value == 0 {
            return Err(Error::config(
                "default_sequence_start_value must be greater than 0",
            ));
        }
        Ok(())
    }
}
