//! 脚本化的内存数据库
//!
//! 会话与游标按脚本回放结果集和行，可以在任意一步注入失败，
//! 并把打开、关闭、释放、执行过的语句记录到共享的 [`Ledger`]。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use errors::{AppError, AppResult};

use crate::credential::AccessToken;
use crate::cursor::{ColumnError, Cursor, ResultSet, Row, StreamFault};
use crate::session::{ConnectionDescriptor, ConnectionProvisioner, Session};
use crate::statement::Statement;

/// 单元格
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Int(i64),
    Text(String),
    Null,
}

impl Cell {
    fn type_name(&self) -> &'static str {
        match self {
            Cell::Int(_) => "Int64",
            Cell::Text(_) => "Text",
            Cell::Null => "Null",
        }
    }
}

#[derive(Debug, Clone)]
enum RowStep {
    Row(Vec<Cell>),
    Fault(String),
}

/// 一个结果集的脚本
#[derive(Debug, Clone, Default)]
pub struct ScriptedSet {
    steps: Vec<RowStep>,
}

impl ScriptedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.steps.push(RowStep::Row(cells));
        self
    }

    /// 追加一行 `(id, createdAt, name)`
    pub fn product(self, id: i64, created_at: i64, name: &str) -> Self {
        self.row(vec![
            Cell::Int(id),
            Cell::Int(created_at),
            Cell::Text(name.to_string()),
        ])
    }

    /// 读到这一步时返回读取失败
    pub fn fault(mut self, msg: impl Into<String>) -> Self {
        self.steps.push(RowStep::Fault(msg.into()));
        self
    }
}

#[derive(Debug, Clone)]
enum SetStep {
    Set(ScriptedSet),
    Fault(String),
}

/// 游标脚本：结果集的序列
#[derive(Debug, Clone, Default)]
pub struct CursorScript {
    steps: Vec<SetStep>,
}

impl CursorScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, set: ScriptedSet) -> Self {
        self.steps.push(SetStep::Set(set));
        self
    }

    pub fn fault(mut self, msg: impl Into<String>) -> Self {
        self.steps.push(SetStep::Fault(msg.into()));
        self
    }
}

/// 资源使用记录
#[derive(Debug, Default)]
pub struct Ledger {
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
    sessions_dropped: AtomicUsize,
    cursors_opened: AtomicUsize,
    cursors_dropped: AtomicUsize,
    statements: Mutex<Vec<Statement>>,
    tokens: Mutex<Vec<String>>,
}

impl Ledger {
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    /// 显式调用 `close` 的次数
    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed.load(Ordering::SeqCst)
    }

    /// 被 drop 的会话数（无论是否显式关闭）
    pub fn sessions_dropped(&self) -> usize {
        self.sessions_dropped.load(Ordering::SeqCst)
    }

    pub fn cursors_opened(&self) -> usize {
        self.cursors_opened.load(Ordering::SeqCst)
    }

    pub fn cursors_dropped(&self) -> usize {
        self.cursors_dropped.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// 所有打开过的会话和游标都已释放
    pub fn all_released(&self) -> bool {
        self.sessions_opened() == self.sessions_dropped()
            && self.cursors_opened() == self.cursors_dropped()
    }
}

type ErrorFactory = Arc<dyn Fn() -> AppError + Send + Sync>;

/// 按脚本回放的连接提供者
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    script: CursorScript,
    connect_failure: Option<ErrorFactory>,
    execute_failure: Option<ErrorFactory>,
    delay: Option<Duration>,
    ledger: Arc<Ledger>,
}

impl ScriptedDatabase {
    pub fn new(script: CursorScript) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    /// 一个结果集中的若干商品
    pub fn with_products(products: &[(i64, i64, &str)]) -> Self {
        let set = products
            .iter()
            .fold(ScriptedSet::new(), |set, (id, created_at, name)| {
                set.product(*id, *created_at, name)
            });
        Self::new(CursorScript::new().set(set))
    }

    pub fn fail_connect(mut self, error: impl Fn() -> AppError + Send + Sync + 'static) -> Self {
        self.connect_failure = Some(Arc::new(error));
        self
    }

    pub fn fail_execute(mut self, error: impl Fn() -> AppError + Send + Sync + 'static) -> Self {
        self.execute_failure = Some(Arc::new(error));
        self
    }

    /// 每次读取结果集或行前等待
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn ledger(&self) -> Arc<Ledger> {
        self.ledger.clone()
    }
}

#[async_trait]
impl ConnectionProvisioner for ScriptedDatabase {
    async fn open_session(
        &self,
        _descriptor: &ConnectionDescriptor,
        token: &AccessToken,
        _timeout: Duration,
    ) -> AppResult<Box<dyn Session>> {
        if let Ok(mut tokens) = self.ledger.tokens.lock() {
            tokens.push(token.expose().to_string());
        }
        if let Some(error) = &self.connect_failure {
            return Err(error());
        }

        self.ledger.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            execute_failure: self.execute_failure.clone(),
            delay: self.delay,
            ledger: self.ledger.clone(),
            closed: false,
        }))
    }
}

struct ScriptedSession {
    script: CursorScript,
    execute_failure: Option<ErrorFactory>,
    delay: Option<Duration>,
    ledger: Arc<Ledger>,
    closed: bool,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&mut self, statement: &Statement) -> AppResult<Box<dyn Cursor + '_>> {
        if self.closed {
            return Err(AppError::connectivity("session is closed"));
        }
        if let Ok(mut statements) = self.ledger.statements.lock() {
            statements.push(statement.clone());
        }
        if let Some(error) = &self.execute_failure {
            return Err(error());
        }

        self.ledger.cursors_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedCursor {
            sets: self.script.steps.iter().cloned().collect(),
            current: None,
            delay: self.delay,
            ledger: self.ledger.clone(),
        }))
    }

    async fn close(&mut self) -> AppResult<()> {
        if !self.closed {
            self.closed = true;
            self.ledger.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.ledger.sessions_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedCursor {
    sets: VecDeque<SetStep>,
    current: Option<VecDeque<RowStep>>,
    delay: Option<Duration>,
    ledger: Arc<Ledger>,
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Cursor for ScriptedCursor {
    async fn next_result_set(&mut self) -> Result<Option<Box<dyn ResultSet + '_>>, StreamFault> {
        pause(self.delay).await;
        self.current = None;

        match self.sets.pop_front() {
            None => Ok(None),
            Some(SetStep::Fault(msg)) => Err(StreamFault::new(msg)),
            Some(SetStep::Set(set)) => {
                let rows = self.current.insert(set.steps.into_iter().collect());
                Ok(Some(Box::new(ScriptedResultSet {
                    rows,
                    delay: self.delay,
                })))
            }
        }
    }
}

impl Drop for ScriptedCursor {
    fn drop(&mut self) {
        self.ledger.cursors_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedResultSet<'a> {
    rows: &'a mut VecDeque<RowStep>,
    delay: Option<Duration>,
}

#[async_trait]
impl<'a> ResultSet for ScriptedResultSet<'a> {
    async fn next_row(&mut self) -> Result<Option<Box<dyn Row>>, StreamFault> {
        pause(self.delay).await;

        match self.rows.pop_front() {
            None => Ok(None),
            Some(RowStep::Row(cells)) => Ok(Some(Box::new(ScriptedRow(cells)))),
            Some(RowStep::Fault(msg)) => Err(StreamFault::new(msg)),
        }
    }
}

/// 脚本中的一行
#[derive(Debug, Clone)]
pub struct ScriptedRow(pub Vec<Cell>);

impl ScriptedRow {
    fn cell(&self, index: usize) -> Result<&Cell, ColumnError> {
        self.0.get(index).ok_or(ColumnError::OutOfRange {
            index,
            len: self.0.len(),
        })
    }
}

impl Row for ScriptedRow {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get_i64(&self, index: usize) -> Result<i64, ColumnError> {
        match self.cell(index)? {
            Cell::Int(value) => Ok(*value),
            Cell::Null => Err(ColumnError::Null { index }),
            other => Err(ColumnError::Mismatch {
                index,
                message: format!("expected Int64, found {}", other.type_name()),
            }),
        }
    }

    fn get_text(&self, index: usize) -> Result<String, ColumnError> {
        match self.cell(index)? {
            Cell::Text(value) => Ok(value.clone()),
            Cell::Null => Err(ColumnError::Null { index }),
            other => Err(ColumnError::Mismatch {
                index,
                message: format!("expected Text, found {}", other.type_name()),
            }),
        }
    }
}
