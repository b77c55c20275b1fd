//! PostgreSQL session and nested result cursor
//!
//! A statement's result stream is a flat sequence of rows and command
//! completions; each completion closes one result set.

use async_trait::async_trait;
use errors::{AppError, AppResult};
use futures::TryStreamExt;
use futures::stream::BoxStream;
use ports::{ColumnError, Cursor, Param, ResultSet, Row, Session, Statement, StreamFault};
use sqlx::postgres::{PgQueryResult, PgRow};
use sqlx::{Connection, Either, Executor, PgConnection, Row as _};
use tracing::debug;

use crate::error::{map_column_error, map_query_error, map_stream_error};

type Item = Either<PgQueryResult, PgRow>;
type RawStream<'c> = BoxStream<'c, Result<Item, sqlx::Error>>;

/// A live connection owned by one operation
pub struct PgSession {
    conn: Option<PgConnection>,
}

impl PgSession {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn: Some(conn) }
    }
}

#[async_trait]
impl Session for PgSession {
    async fn execute(&mut self, statement: &Statement) -> AppResult<Box<dyn Cursor + '_>> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| AppError::connectivity("Session is already closed"))?;

        let query = statement
            .params()
            .iter()
            .fold(sqlx::query::<sqlx::Postgres>(statement.sql()), |query, param| match *param {
                Param::Int64(value) => query.bind(value),
            });

        debug!(sql = statement.sql(), params = statement.params().len(), "Executing statement");

        let mut stream = conn.fetch_many(query);
        // A rejected statement fails on its first item
        let first = stream.try_next().await.map_err(map_query_error)?;

        Ok(Box::new(PgCursor::new(stream, first)))
    }

    async fn close(&mut self) -> AppResult<()> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .await
                .map_err(|e| AppError::connectivity(format!("Failed to close session: {}", e))),
            None => Ok(()),
        }
    }
}

/// Forward-only cursor over one statement's results
pub struct PgCursor<'c> {
    stream: RawStream<'c>,
    lookahead: Option<Item>,
    in_set: bool,
}

impl<'c> PgCursor<'c> {
    fn new(stream: RawStream<'c>, first: Option<Item>) -> Self {
        Self {
            stream,
            lookahead: first,
            in_set: false,
        }
    }

    async fn pull(&mut self) -> Result<Option<Item>, StreamFault> {
        if let Some(item) = self.lookahead.take() {
            return Ok(Some(item));
        }
        self.stream.try_next().await.map_err(map_stream_error)
    }

    /// Next row of the open set, or `None` once its completion is read
    async fn next_row_in_set(&mut self) -> Result<Option<PgRow>, StreamFault> {
        if !self.in_set {
            return Ok(None);
        }
        match self.pull().await? {
            Some(Either::Right(row)) => Ok(Some(row)),
            Some(Either::Left(_)) | None => {
                self.in_set = false;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<'c> Cursor for PgCursor<'c> {
    async fn next_result_set(&mut self) -> Result<Option<Box<dyn ResultSet + '_>>, StreamFault> {
        while self.next_row_in_set().await?.is_some() {}

        match self.pull().await? {
            None => Ok(None),
            Some(item) => {
                self.lookahead = Some(item);
                self.in_set = true;
                Ok(Some(Box::new(PgResultSet { cursor: self })))
            }
        }
    }
}

struct PgResultSet<'a, 'c> {
    cursor: &'a mut PgCursor<'c>,
}

#[async_trait]
impl<'a, 'c> ResultSet for PgResultSet<'a, 'c> {
    async fn next_row(&mut self) -> Result<Option<Box<dyn Row>>, StreamFault> {
        Ok(self
            .cursor
            .next_row_in_set()
            .await?
            .map(|row| Box::new(PgRecord(row)) as Box<dyn Row>))
    }
}

/// Positional access to a fetched row
pub struct PgRecord(PgRow);

impl Row for PgRecord {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get_i64(&self, index: usize) -> Result<i64, ColumnError> {
        self.0.try_get::<i64, _>(index).map_err(map_column_error)
    }

    fn get_text(&self, index: usize) -> Result<String, ColumnError> {
        self.0.try_get::<String, _>(index).map_err(map_column_error)
    }
}
