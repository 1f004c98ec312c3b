//! Scripted in-memory driver shared by the integration tests.
//!
//! Statements are answered from rules registered with [`Script::respond`]
//! (first rule whose pattern occurs in the SQL wins). Sequences, ROWNUM
//! pagination and LOB reads/writes are simulated; everything executed is
//! recorded in the statement log.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use oracle_enhanced_rs::{
    AdapterConfig, Column, Connector, DescribedObject, Error, LobKind, LobLocator, LobValue,
    ObjectKind, OracleAdapter, OracleDriver, OracleType, OracleValue, QueryResult, Result,
};

#[derive(Default)]
pub struct State {
    pub log: Vec<String>,
    rules: Vec<(String, std::result::Result<QueryResult, u32>)>,
    pub exec_failures: VecDeque<u32>,
    pub connect_failures: usize,
    pub connects: usize,
    pub logoffs: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub objects: HashMap<String, DescribedObject>,
    pub sequences: HashMap<String, i64>,
    pub lobs: HashMap<Vec<u8>, Vec<u8>>,
    pub lob_writes: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Handle used by tests to script and inspect the fake database.
#[derive(Clone, Default)]
pub struct Script(Arc<Mutex<State>>);

impl Script {
    pub fn new() -> Self {
        // RUST_LOG=oracle_enhanced_rs=debug shows executed statements.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Answer statements containing `pattern` with `result`.
    pub fn respond(&self, pattern: &str, result: QueryResult) -> &Self {
        self.state().rules.push((pattern.to_string(), Ok(result)));
        self
    }

    /// Fail statements containing `pattern` with ORA-`code`.
    pub fn fail(&self, pattern: &str, code: u32) -> &Self {
        self.state().rules.push((pattern.to_string(), Err(code)));
        self
    }

    /// Fail the next non-session statement with ORA-`code`.
    pub fn fail_next(&self, code: u32) -> &Self {
        self.state().exec_failures.push_back(code);
        self
    }

    /// Register a catalog object for `describe`.
    pub fn object(&self, name: &str, owner: &str, target: &str, kind: ObjectKind) -> &Self {
        self.state().objects.insert(
            name.to_uppercase(),
            DescribedObject {
                owner: owner.to_string(),
                name: target.to_string(),
                kind,
            },
        );
        self
    }

    /// Register `name` as a table of schema `HR`.
    pub fn table(&self, name: &str) -> &Self {
        self.object(name, "HR", &name.to_uppercase(), ObjectKind::Table)
    }

    /// Store LOB content behind `locator`.
    pub fn lob(&self, locator: &[u8], content: &[u8]) -> &Self {
        self.state().lobs.insert(locator.to_vec(), content.to_vec());
        self
    }

    /// Statements other than session setup.
    pub fn statements(&self) -> Vec<String> {
        self.state()
            .log
            .iter()
            .filter(|s| !s.starts_with("ALTER SESSION"))
            .cloned()
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(ScriptedConnector(self.clone()))
    }

    pub async fn adapter(&self, config: AdapterConfig) -> OracleAdapter {
        OracleAdapter::establish_connection(self.connector(), config)
            .await
            .expect("adapter should connect")
    }
}

pub fn config() -> AdapterConfig {
    AdapterConfig::new("FREEPDB1", "hr", "hr")
}

fn varchar(name: &str) -> Column {
    Column::new(name, OracleType::Varchar2 { max_size: Some(4000) })
}

/// Result with string columns; `None` is NULL.
pub fn text_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> QueryResult {
    QueryResult::new(
        columns.iter().map(|c| varchar(c)).collect(),
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.map_or(OracleValue::Null, |v| OracleValue::String(v.to_string())))
                    .collect()
            })
            .collect(),
    )
}

/// Rows of an `all_tab_columns` query: (name, type, limit, scale, nullable, default).
pub fn column_rows(
    columns: &[(&str, &str, Option<&str>, Option<&str>, bool, Option<&str>)],
) -> QueryResult {
    let rows: Vec<Vec<Option<&str>>> = columns
        .iter()
        .map(|(name, ty, limit, scale, nullable, default)| {
            vec![
                Some(*name),
                Some(*ty),
                *default,
                Some(if *nullable { "Y" } else { "N" }),
                *limit,
                *scale,
            ]
        })
        .collect();
    let refs: Vec<&[Option<&str>]> = rows.iter().map(Vec::as_slice).collect();
    text_rows(
        &["NAME", "SQL_TYPE", "DATA_DEFAULT", "NULLABLE", "LIMIT", "SCALE"],
        &refs,
    )
}

/// One-column result holding a LOB locator.
pub fn lob_row(column: &str, kind: LobKind, locator: &[u8], data: Option<&[u8]>) -> QueryResult {
    let locator = LobLocator::new(locator.to_vec(), kind, 0, 4);
    let lob = match data {
        Some(data) => LobValue::with_data(locator, data.to_vec()),
        None => LobValue::locator_only(locator),
    };
    let (data_type, value) = match kind {
        LobKind::Blob => (OracleType::Blob, OracleValue::Blob(lob)),
        _ => (OracleType::Clob, OracleValue::Clob(lob)),
    };
    QueryResult::new(vec![Column::new(column, data_type)], vec![vec![value]])
}

/// Numbered rows `1..=count` in a single `N` column.
pub fn numbered_rows(count: i64) -> QueryResult {
    QueryResult::new(
        vec![Column::new("N", OracleType::Number { precision: Some(10), scale: Some(0) })],
        (1..=count)
            .map(|n| vec![OracleValue::Number(n.to_string())])
            .collect(),
    )
}

struct ScriptedConnector(Script);

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _: &AdapterConfig) -> Result<Box<dyn OracleDriver>> {
        let mut state = self.0.state();
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(Error::oracle(12541, "TNS:no listener"));
        }
        state.connects += 1;
        Ok(Box::new(ScriptedDriver {
            script: self.0.clone(),
            autocommit: false,
        }))
    }
}

struct ScriptedDriver {
    script: Script,
    autocommit: bool,
}

/// Number following `marker` in `sql`.
fn number_after(sql: &str, marker: &str) -> Option<usize> {
    let start = sql.find(marker)? + marker.len();
    sql[start..]
        .trim_start()
        .split(|c: char| !c.is_ascii_digit())
        .next()?
        .parse()
        .ok()
}

impl ScriptedDriver {
    fn answer(state: &mut State, sql: &str) -> Result<QueryResult> {
        if let Some(rest) = sql.strip_prefix("CREATE SEQUENCE ") {
            let name = rest.split_whitespace().next().unwrap_or_default().to_lowercase();
            let start = number_after(sql, "START WITH").unwrap_or(1) as i64;
            state.sequences.insert(name, start);
            return Ok(QueryResult::default());
        }
        if let Some(rest) = sql.strip_prefix("SELECT ") {
            if let Some(seq) = rest.strip_suffix(".NEXTVAL id FROM dual") {
                let seq = seq.to_lowercase();
                let next = state
                    .sequences
                    .get_mut(&seq)
                    .ok_or_else(|| Error::oracle(2289, "sequence does not exist"))?;
                let value = *next;
                *next += 1;
                return Ok(QueryResult::new(
                    vec![Column::new("ID", OracleType::Number { precision: None, scale: None })],
                    vec![vec![OracleValue::Number(value.to_string())]],
                ));
            }
        }
        if let Some(inner) = sql
            .strip_prefix("SELECT * FROM (SELECT raw_sql_.*, ROWNUM raw_rnum_ FROM (")
            .and_then(|rest| rest.split(") raw_sql_").next())
        {
            let base = Self::answer(state, inner)?;
            let upper = number_after(sql, "ROWNUM <=").unwrap_or(usize::MAX);
            let offset = number_after(sql, "raw_rnum_ >").unwrap_or(0);
            let mut columns = base.columns.clone();
            columns.push(Column::new(
                "RAW_RNUM_",
                OracleType::Number { precision: None, scale: None },
            ));
            let rows = base
                .rows
                .iter()
                .enumerate()
                .take(upper)
                .skip(offset)
                .map(|(i, row)| {
                    let mut values = row.values().to_vec();
                    values.push(OracleValue::Number((i + 1).to_string()));
                    values
                })
                .collect();
            return Ok(QueryResult::new(columns, rows));
        }
        for (pattern, result) in &state.rules {
            if sql.contains(pattern.as_str()) {
                return result
                    .clone()
                    .map_err(|code| Error::oracle(code, format!("scripted failure for {pattern}")));
            }
        }
        Ok(QueryResult::default())
    }
}

#[async_trait]
impl OracleDriver for ScriptedDriver {
    async fn exec(&mut self, sql: &str) -> Result<QueryResult> {
        let mut state = self.script.state();
        state.log.push(sql.to_string());
        if sql.starts_with("ALTER SESSION") {
            return Ok(QueryResult::default());
        }
        if let Some(code) = state.exec_failures.pop_front() {
            return Err(Error::oracle(code, "scripted failure"));
        }
        Self::answer(&mut state, sql)
    }

    async fn describe(&mut self, name: &str) -> Result<Option<DescribedObject>> {
        let mut state = self.script.state();
        state.log.push(format!("DESCRIBE {name}"));
        if let Some(code) = state.exec_failures.pop_front() {
            return Err(Error::oracle(code, "scripted failure"));
        }
        Ok(state.objects.get(&name.to_uppercase()).cloned())
    }

    fn set_autocommit(&mut self, autocommit: bool) {
        self.autocommit = autocommit;
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    async fn commit(&mut self) -> Result<()> {
        self.script.state().commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.script.state().rollbacks += 1;
        Ok(())
    }

    async fn logoff(&mut self) -> Result<()> {
        self.script.state().logoffs += 1;
        Ok(())
    }

    async fn read_lob(&mut self, lob: &LobLocator, offset: u64, amount: u32) -> Result<Bytes> {
        let state = self.script.state();
        let content = state
            .lobs
            .get(&lob.locator)
            .ok_or_else(|| Error::oracle(22275, "invalid LOB locator specified"))?;
        let start = (offset as usize).min(content.len());
        let end = (start + amount as usize).min(content.len());
        Ok(Bytes::copy_from_slice(&content[start..end]))
    }

    async fn write_lob(&mut self, lob: &LobLocator, data: &[u8]) -> Result<()> {
        let mut state = self.script.state();
        state.lobs.insert(lob.locator.clone(), data.to_vec());
        state.lob_writes.push((lob.locator.clone(), data.to_vec()));
        Ok(())
    }
}
