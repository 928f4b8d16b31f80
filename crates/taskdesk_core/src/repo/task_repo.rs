//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/create/update/mark-done/delete/due-today over `tasks`.
//! - Reject connections that were not initialized through `db::open_db*`.
//!
//! # Invariants
//! - Lists are ordered by `due_date ASC, id ASC`; NULL and empty dates sort
//!   first.
//! - Multi-id writes run inside a single transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{
    format_due_date, validate_title, Task, TaskCounts, TaskFilter, TaskId, TaskValidationError,
};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT id, title, due_date, done FROM tasks";
const REQUIRED_COLUMNS: [&str; 4] = ["id", "title", "due_date", "done"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Write rejected by field validation.
    Validation(TaskValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid task.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for tasks.
pub trait TaskRepository {
    /// Lists tasks passing `filter`, ordered by due date then id.
    fn list_tasks(&self, filter: TaskFilter) -> RepoResult<Vec<Task>>;
    /// Inserts a pending task and returns its new id.
    fn create_task(&self, title: &str, due_date: &str) -> RepoResult<TaskId>;
    /// Overwrites title and due date; no-op when `id` does not exist.
    fn update_task(&self, id: TaskId, title: &str, due_date: &str) -> RepoResult<()>;
    /// Marks every existing id done. Returns the number of rows touched.
    fn mark_done(&self, ids: &[TaskId]) -> RepoResult<usize>;
    /// Deletes every existing id. Returns the number of rows removed.
    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize>;
    /// Titles of pending tasks due on `today`, in id order.
    fn due_today(&self, today: NaiveDate) -> RepoResult<Vec<String>>;
    /// Total/done/pending row counts.
    fn counts(&self) -> RepoResult<TaskCounts>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_tasks(&self, filter: TaskFilter) -> RepoResult<Vec<Task>> {
        let predicate = match filter {
            TaskFilter::All => "",
            TaskFilter::Done => " WHERE done = 1",
            TaskFilter::Pending => " WHERE done = 0",
        };
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}{predicate} ORDER BY due_date ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn create_task(&self, title: &str, due_date: &str) -> RepoResult<TaskId> {
        validate_title(title)?;

        self.conn.execute(
            "INSERT INTO tasks (title, due_date, done) VALUES (?1, ?2, 0);",
            params![title, due_date],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=task_create module=repo status=ok task_id={id}");
        Ok(id)
    }

    fn update_task(&self, id: TaskId, title: &str, due_date: &str) -> RepoResult<()> {
        validate_title(title)?;

        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?1, due_date = ?2 WHERE id = ?3;",
            params![title, due_date, id],
        )?;
        debug!("event=task_update module=repo status=ok task_id={id} changed={changed}");
        Ok(())
    }

    fn mark_done(&self, ids: &[TaskId]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE tasks SET done = 1 WHERE id = ?1;")?;
            for id in ids {
                changed += stmt.execute([*id])?;
            }
        }
        tx.commit()?;
        debug!(
            "event=task_mark_done module=repo status=ok requested={} changed={changed}",
            ids.len()
        );
        Ok(changed)
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM tasks WHERE id = ?1;")?;
            for id in ids {
                removed += stmt.execute([*id])?;
            }
        }
        tx.commit()?;
        debug!(
            "event=task_delete module=repo status=ok requested={} removed={removed}",
            ids.len()
        );
        Ok(removed)
    }

    fn due_today(&self, today: NaiveDate) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM tasks WHERE due_date = ?1 AND done = 0 ORDER BY id ASC;")?;
        let titles = stmt
            .query_map([format_due_date(today)], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    fn counts(&self) -> RepoResult<TaskCounts> {
        let (total, done): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(done), 0) FROM tasks;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative task count `{total}`")))?;
        let done = u64::try_from(done)
            .map_err(|_| RepoError::InvalidData(format!("negative done count `{done}`")))?;
        Ok(TaskCounts {
            total,
            done,
            pending: total.saturating_sub(done),
        })
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done for id {id}"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        due_date: row.get::<_, Option<String>>("due_date")?.unwrap_or_default(),
        done,
    };
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("task {id} failed validation: {err}"))
    })?;
    Ok(task)
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
