//! Resilient connection: one driver session plus reconnect logic.
//!
//! A [`ResilientConnection`] owns exactly one driver handle. When a
//! statement fails because the session is gone (ORA-00028, ORA-01012,
//! ORA-03113, ORA-03114) the connection is marked inactive and, if
//! auto-retry is enabled *and* the session is in autocommit mode, it is
//! re-opened and the statement is retried once. Inside an explicit
//! transaction the error is always returned: work done before the drop is
//! lost with the session and cannot be replayed safely.
//!
//! All methods take `&mut self`; an instance must not be shared between
//! tasks without external synchronization. Use one connection per worker.

use std::pin::pin;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::driver::{Connector, DescribedObject, OracleDriver};
use crate::error::{Error, Result};
use crate::types::{LobLocator, QueryResult};

/// Statement used to check that the session is alive.
pub const PING_SQL: &str = "SELECT 1 FROM DUAL";

/// Restores autocommit when dropped, including when the owning future is
/// cancelled mid-commit.
struct AutocommitRestore<'a> {
    driver: &'a mut Box<dyn OracleDriver>,
}

impl Drop for AutocommitRestore<'_> {
    fn drop(&mut self) {
        self.driver.set_autocommit(true);
    }
}

/// A database session that reconnects after connection loss.
pub struct ResilientConnection {
    driver: Box<dyn OracleDriver>,
    connector: Arc<dyn Connector>,
    config: AdapterConfig,
    /// Last known good state; not a live check.
    active: bool,
}

impl ResilientConnection {
    /// Open a session and apply session settings.
    ///
    /// Fails fast on invalid configuration or when the driver cannot
    /// connect; nothing is deferred to the first query.
    pub async fn open(connector: Arc<dyn Connector>, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        let driver = new_session(connector.as_ref(), &config).await?;
        info!(
            database = %config.database,
            username = %config.username,
            "Oracle session established"
        );
        Ok(Self {
            driver,
            connector,
            config,
            active: true,
        })
    }

    /// The configuration used to open sessions.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Last known state of the session.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the session is in autocommit mode.
    pub fn autocommit(&self) -> bool {
        self.driver.autocommit()
    }

    /// Round-trip a trivial query.
    ///
    /// Marks the connection active on success; on failure marks it
    /// inactive and returns the driver error.
    pub async fn ping(&mut self) -> Result<bool> {
        match self.driver.exec(PING_SQL).await {
            Ok(_) => {
                self.active = true;
                Ok(true)
            }
            Err(e) => {
                self.active = false;
                Err(e)
            }
        }
    }

    /// Close the current session (errors ignored) and open a new one.
    pub async fn reset(&mut self) -> Result<()> {
        if let Err(e) = self.driver.logoff().await {
            debug!(error = %e, "logoff before reset failed");
        }
        match new_session(self.connector.as_ref(), &self.config).await {
            Ok(driver) => {
                self.driver = driver;
                self.active = true;
                info!(database = %self.config.database, "Oracle session re-established");
                Ok(())
            }
            Err(e) => {
                self.active = false;
                warn!(database = %self.config.database, error = %e, "reconnect failed");
                Err(e)
            }
        }
    }

    /// Log off; errors are ignored since the session is being discarded.
    pub async fn disconnect(&mut self) {
        if let Err(e) = self.driver.logoff().await {
            debug!(error = %e, "logoff failed");
        }
        self.active = false;
    }

    /// Execute a statement, retrying once after a lost connection when safe.
    ///
    /// `label` names the statement in logs.
    pub async fn execute(&mut self, sql: &str, label: &str) -> Result<QueryResult> {
        debug!(label, sql, "execute");
        let mut should_retry = self.should_retry();
        loop {
            match self.driver.exec(sql).await {
                Ok(result) => return Ok(result),
                Err(err) => self.recover(err, &mut should_retry).await?,
            }
        }
    }

    /// Resolve one level of a name through the driver, with the same retry
    /// policy as [`execute`](Self::execute).
    pub async fn describe(&mut self, name: &str) -> Result<Option<DescribedObject>> {
        let mut should_retry = self.should_retry();
        loop {
            match self.driver.describe(name).await {
                Ok(described) => return Ok(described),
                Err(err) => self.recover(err, &mut should_retry).await?,
            }
        }
    }

    /// Start a multi-statement transaction by turning autocommit off.
    pub fn begin_transaction(&mut self) {
        self.driver.set_autocommit(false);
    }

    /// Commit; autocommit is restored whether or not the commit succeeds.
    pub async fn commit(&mut self) -> Result<()> {
        let guard = AutocommitRestore {
            driver: &mut self.driver,
        };
        guard.driver.commit().await
    }

    /// Roll back; autocommit is restored whether or not the rollback succeeds.
    pub async fn rollback(&mut self) -> Result<()> {
        let guard = AutocommitRestore {
            driver: &mut self.driver,
        };
        guard.driver.rollback().await
    }

    /// Stream LOB content chunk by chunk.
    pub fn lob_stream<'a>(
        &'a mut self,
        lob: &'a LobLocator,
    ) -> impl Stream<Item = Result<Bytes>> + 'a {
        let amount = lob.effective_chunk_size();
        stream::try_unfold((self, 0u64), move |(conn, offset)| async move {
            let chunk = conn.driver.read_lob(lob, offset, amount).await?;
            if chunk.is_empty() {
                return Ok(None);
            }
            let next = offset + chunk.len() as u64;
            Ok::<_, Error>(Some((chunk, (conn, next))))
        })
    }

    /// Read the whole LOB into memory.
    pub async fn read_lob(&mut self, lob: &LobLocator) -> Result<Bytes> {
        let mut content = BytesMut::new();
        let mut chunks = pin!(self.lob_stream(lob));
        while let Some(chunk) = chunks.try_next().await? {
            content.extend_from_slice(&chunk);
        }
        Ok(content.freeze())
    }

    /// Write content through a locator selected `FOR UPDATE`.
    pub async fn write_lob(&mut self, lob: &LobLocator, data: &[u8]) -> Result<()> {
        debug!(bytes = data.len(), "write LOB");
        self.driver.write_lob(lob, data).await
    }

    fn should_retry(&self) -> bool {
        self.config.auto_retry && self.driver.autocommit()
    }

    /// Decide what to do after a failed call.
    ///
    /// Returns `Ok(())` when the caller should try again (at most once per
    /// call, tracked through `should_retry`), otherwise the error.
    async fn recover(&mut self, err: Error, should_retry: &mut bool) -> Result<()> {
        if !err.is_lost_connection() {
            return Err(err);
        }
        self.active = false;
        if !std::mem::take(should_retry) {
            warn!(error = %err, "connection lost");
            return Err(err);
        }
        warn!(error = %err, "connection lost, reconnecting and retrying once");
        if let Err(e) = self.reset().await {
            debug!(error = %e, "reset before retry failed");
        }
        Ok(())
    }
}

/// Open a driver session within the connect timeout and configure it.
async fn new_session(
    connector: &dyn Connector,
    config: &AdapterConfig,
) -> Result<Box<dyn OracleDriver>> {
    let connect = connector.connect(config);
    let mut driver = if config.connect_timeout_secs == 0 {
        connect.await?
    } else {
        tokio::time::timeout(config.connect_timeout(), connect)
            .await
            .map_err(|_| Error::ConnectionTimeout {
                database: config.database.clone(),
                timeout: config.connect_timeout(),
            })??
    };
    configure_session(driver.as_mut(), config).await?;
    Ok(driver)
}

/// Session settings issued once per physical session.
///
/// Date formats are fixed so literals never depend on client locale.
pub(crate) async fn configure_session(
    driver: &mut dyn OracleDriver,
    config: &AdapterConfig,
) -> Result<()> {
    driver
        .exec("ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD HH24:MI:SS'")
        .await?;
    if let Err(e) = driver
        .exec("ALTER SESSION SET NLS_TIMESTAMP_FORMAT = 'YYYY-MM-DD HH24:MI:SS'")
        .await
    {
        debug!(error = %e, "NLS_TIMESTAMP_FORMAT not applied");
    }
    driver.set_autocommit(true);
    let cursor_sharing = format!(
        "ALTER SESSION SET CURSOR_SHARING = {}",
        config.cursor_sharing.to_uppercase()
    );
    if let Err(e) = driver.exec(&cursor_sharing).await {
        debug!(error = %e, "CURSOR_SHARING not applied");
    }
    if let Some(schema) = config.schema.as_deref().filter(|s| !s.trim().is_empty()) {
        driver
            .exec(&format!("ALTER SESSION SET CURRENT_SCHEMA = {}", schema))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records statements; fails `ping` when told to.
    struct RecordingDriver {
        log: Arc<Mutex<Vec<String>>>,
        autocommit: bool,
        fail_with: Option<u32>,
    }

    #[async_trait::async_trait]
    impl OracleDriver for RecordingDriver {
        async fn exec(&mut self, sql: &str) -> Result<QueryResult> {
            self.log.lock().unwrap().push(sql.to_string());
            match self.fail_with {
                Some(code) if sql == PING_SQL => Err(Error::oracle(code, "failed")),
                _ => Ok(QueryResult::default()),
            }
        }
        fn set_autocommit(&mut self, autocommit: bool) {
            self.autocommit = autocommit;
        }
        fn autocommit(&self) -> bool {
            self.autocommit
        }
        async fn commit(&mut self) -> Result<()> {
            Err(Error::oracle(2091, "transaction rolled back"))
        }
        async fn rollback(&mut self) -> Result<()> {
            Ok(())
        }
        async fn logoff(&mut self) -> Result<()> {
            Ok(())
        }
        async fn read_lob(&mut self, _: &LobLocator, offset: u64, _: u32) -> Result<Bytes> {
            if offset == 0 {
                Ok(Bytes::from_static(b"abc"))
            } else {
                Ok(Bytes::new())
            }
        }
        async fn write_lob(&mut self, _: &LobLocator, _: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    struct RecordingConnector {
        log: Arc<Mutex<Vec<String>>>,
        fail_with: Option<u32>,
    }

    #[async_trait::async_trait]
    impl Connector for RecordingConnector {
        async fn connect(&self, _: &AdapterConfig) -> Result<Box<dyn OracleDriver>> {
            Ok(Box::new(RecordingDriver {
                log: Arc::clone(&self.log),
                autocommit: false,
                fail_with: self.fail_with,
            }))
        }
    }

    fn open(config: AdapterConfig, fail_with: Option<u32>) -> (ResilientConnection, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            log: Arc::clone(&log),
            fail_with,
        });
        let conn = tokio_test::block_on(ResilientConnection::open(connector, config)).unwrap();
        (conn, log)
    }

    #[test]
    fn test_session_setup_statements() {
        let (conn, log) = open(
            AdapterConfig::new("XE", "scott", "tiger").with_schema("HR"),
            None,
        );
        let log = log.lock().unwrap();
        assert_eq!(log[0], "ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD HH24:MI:SS'");
        assert!(log[1].contains("NLS_TIMESTAMP_FORMAT"));
        assert_eq!(log[2], "ALTER SESSION SET CURSOR_SHARING = SIMILAR");
        assert_eq!(log[3], "ALTER SESSION SET CURRENT_SCHEMA = HR");
        assert!(conn.autocommit());
        assert!(conn.is_active());
    }

    #[test]
    fn test_ping_failure_marks_inactive() {
        let (mut conn, _) = open(AdapterConfig::new("XE", "scott", "tiger"), Some(3113));
        let result = tokio_test::block_on(conn.ping());
        assert!(result.is_err());
        assert!(!conn.is_active());
    }

    #[test]
    fn test_commit_failure_restores_autocommit() {
        let (mut conn, _) = open(AdapterConfig::new("XE", "scott", "tiger"), None);
        conn.begin_transaction();
        assert!(!conn.autocommit());
        let result = tokio_test::block_on(conn.commit());
        assert!(matches!(result, Err(Error::Oracle { code: 2091, .. })));
        assert!(conn.autocommit());
    }

    #[test]
    fn test_read_lob_collects_chunks() {
        let (mut conn, _) = open(AdapterConfig::new("XE", "scott", "tiger"), None);
        let lob = LobLocator::new(vec![1], crate::types::LobKind::Clob, 3, 0);
        let content = tokio_test::block_on(conn.read_lob(&lob)).unwrap();
        assert_eq!(&content[..], b"abc");
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            log: Arc::clone(&log),
            fail_with: None,
        });
        let result = tokio_test::block_on(ResilientConnection::open(
            connector,
            AdapterConfig::new("XE", "", ""),
        ));
        assert!(matches!(result, Err(Error::Configuration { .. })));
        assert!(log.lock().unwrap().is_empty());
    }
}
