//! SQLite-backed task/session repository.
//!
//! Tasks form a forest via optional parent links; the parent chain is
//! resolved recursively on read with an explicit visited set, so a corrupt
//! hierarchy fails loudly instead of looping. Sessions reference a task and
//! stay open until an end time is recorded (`ended_at = 0` means open).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::DatabaseError;

/// Database file name inside the data directory.
pub const DB_FILE: &str = "flower.db";

/// A task with its parent chain resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub parent: Option<Box<Task>>,
}

/// Input for [`Database::create_task`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
}

/// A work session tracked against a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: i64,
    pub task: Task,
    pub started_at: DateTime<Utc>,
    /// `None` while the session is open.
    pub ended_at: Option<DateTime<Utc>>,
}

/// Which sessions [`Database::list_sessions`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFilter {
    All,
    Open,
    Closed,
}

struct TaskRow {
    id: i64,
    name: String,
    description: String,
    parent_id: Option<i64>,
}

type SessionRow = (i64, i64, i64, i64);

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// SQLite repository for tasks and sessions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<dir>/flower.db`, creating the schema if
    /// it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(dir.join(DB_FILE))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                parent_id   INTEGER REFERENCES tasks(id)
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id    INTEGER NOT NULL REFERENCES tasks(id),
                started_at INTEGER NOT NULL,
                ended_at   INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);",
        )
    }

    // ── Tasks ────────────────────────────────────────────────────────

    fn task_row(&self, id: i64) -> Result<Option<TaskRow>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description, parent_id FROM tasks WHERE id = ?1",
                params![id],
                |row| {
                    Ok(TaskRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        parent_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn resolve_task(&self, id: i64, visited: &mut HashSet<i64>) -> Result<Task, DatabaseError> {
        if !visited.insert(id) {
            return Err(DatabaseError::Cycle { id });
        }
        let row = self.task_row(id)?.ok_or(DatabaseError::NotFound)?;
        let parent = match row.parent_id {
            Some(parent_id) => Some(Box::new(self.resolve_task(parent_id, visited)?)),
            None => None,
        };
        Ok(Task {
            id: row.id,
            name: row.name,
            description: row.description,
            parent,
        })
    }

    /// Insert a task and return it with its generated id.
    ///
    /// A given parent must exist, and linking to it must not create a
    /// cycle.
    pub fn create_task(&self, new: &NewTask) -> Result<Task, DatabaseError> {
        if let Some(parent_id) = new.parent_id {
            self.task_row(parent_id)?.ok_or(DatabaseError::NotFound)?;
            // The parent's own chain could already be corrupt.
            if self.detect_parent_cycle(parent_id)? {
                return Err(DatabaseError::Cycle { id: parent_id });
            }
        }
        self.conn.execute(
            "INSERT INTO tasks (name, description, parent_id) VALUES (?1, ?2, ?3)",
            params![new.name, new.description, new.parent_id],
        )?;
        self.get_task(self.conn.last_insert_rowid())
    }

    /// Fetch a task with its full parent chain.
    pub fn get_task(&self, id: i64) -> Result<Task, DatabaseError> {
        let mut visited = HashSet::new();
        self.resolve_task(id, &mut visited)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT id FROM tasks ORDER BY id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        ids.into_iter().map(|id| self.get_task(id)).collect()
    }

    /// Re-link a task's parent. The link is applied and verified; a link
    /// that closes a cycle is rolled back and rejected.
    pub fn set_task_parent(
        &self,
        id: i64,
        parent_id: Option<i64>,
    ) -> Result<Task, DatabaseError> {
        self.task_row(id)?.ok_or(DatabaseError::NotFound)?;
        if let Some(parent_id) = parent_id {
            self.task_row(parent_id)?.ok_or(DatabaseError::NotFound)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE tasks SET parent_id = ?1 WHERE id = ?2",
            params![parent_id, id],
        )?;
        if let Some(parent_id) = parent_id {
            if self.detect_parent_cycle(parent_id)? {
                tx.rollback()?;
                return Err(DatabaseError::Cycle { id });
            }
        }
        tx.commit()?;
        self.get_task(id)
    }

    /// Delete a task by id. Deleting an absent id is `NotFound`.
    pub fn delete_task(&self, id: i64) -> Result<(), DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    /// Delete every task, returning how many were removed.
    pub fn delete_all_tasks(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM tasks", [])?)
    }

    /// Walk the ancestor chain starting at `parent_id`, reporting whether
    /// it revisits a node. A missing ancestor terminates the walk without
    /// a cycle.
    pub fn detect_parent_cycle(&self, parent_id: i64) -> Result<bool, DatabaseError> {
        let mut visited = HashSet::new();
        let mut current = parent_id;
        loop {
            if !visited.insert(current) {
                return Ok(true);
            }
            let row = match self.task_row(current)? {
                Some(row) => row,
                None => return Ok(false),
            };
            match row.parent_id {
                Some(parent_id) => current = parent_id,
                None => return Ok(false),
            }
        }
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Open a session for a task. The task must exist.
    pub fn start_session(
        &self,
        task_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Session, DatabaseError> {
        let task = self.get_task(task_id)?;
        let started_at = now.timestamp();
        self.conn.execute(
            "INSERT INTO sessions (task_id, started_at, ended_at) VALUES (?1, ?2, 0)",
            params![task_id, started_at],
        )?;
        Ok(Session {
            id: self.conn.last_insert_rowid(),
            task,
            started_at: timestamp(started_at),
            ended_at: None,
        })
    }

    /// Record an end time on a session. Stopping an absent id is
    /// `NotFound`.
    pub fn stop_session(&self, id: i64, now: DateTime<Utc>) -> Result<Session, DatabaseError> {
        let affected = self.conn.execute(
            "UPDATE sessions SET ended_at = ?1 WHERE id = ?2",
            params![now.timestamp(), id],
        )?;
        if affected == 0 {
            return Err(DatabaseError::NotFound);
        }
        self.get_session(id)
    }

    pub fn get_session(&self, id: i64) -> Result<Session, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, task_id, started_at, ended_at FROM sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?
            .ok_or(DatabaseError::NotFound)?;
        self.session_from_row(row)
    }

    /// List sessions ordered by start time ascending.
    pub fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<Session>, DatabaseError> {
        let sql = match filter {
            SessionFilter::All => {
                "SELECT id, task_id, started_at, ended_at FROM sessions
                 ORDER BY started_at ASC"
            }
            SessionFilter::Open => {
                "SELECT id, task_id, started_at, ended_at FROM sessions
                 WHERE ended_at = 0 ORDER BY started_at ASC"
            }
            SessionFilter::Closed => {
                "SELECT id, task_id, started_at, ended_at FROM sessions
                 WHERE ended_at <> 0 ORDER BY started_at ASC"
            }
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<SessionRow>, _>>()?;
        drop(stmt);

        rows.into_iter()
            .map(|row| self.session_from_row(row))
            .collect()
    }

    fn session_from_row(&self, row: SessionRow) -> Result<Session, DatabaseError> {
        let (id, task_id, started_at, ended_at) = row;
        let task = self.get_task(task_id)?;
        Ok(Session {
            id,
            task,
            started_at: timestamp(started_at),
            ended_at: (ended_at != 0).then(|| timestamp(ended_at)),
        })
    }
}
