//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `tasks` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `recur_every` and `recur_unit` are persisted together or not at all.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{
    FrequencyUnit, IntervalRule, Recurrence, Task, TaskCategory, TaskId, TaskValidationError,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    category,
    color,
    notes,
    duration_mins,
    is_flexible,
    active,
    recur_every,
    recur_unit,
    recur_anchor_date,
    recur_count,
    recur_until,
    last_done_at,
    next_due_at,
    is_deleted
FROM tasks";

const REQUIRED_TASK_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "category",
    "color",
    "notes",
    "duration_mins",
    "is_flexible",
    "active",
    "recur_every",
    "recur_unit",
    "recur_anchor_date",
    "recur_count",
    "recur_until",
    "last_done_at",
    "next_due_at",
    "is_deleted",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; apply migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
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

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub category: Option<TaskCategory>,
    pub active_only: bool,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId, include_deleted: bool) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn soft_delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection after verifying the schema it carries.
    ///
    /// # Errors
    /// Rejects connections whose `user_version` does not match this binary,
    /// or whose `tasks` table is absent or missing required columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks'
            );",
            [],
            |row| row.get(0),
        )?;
        if table_exists == 0 {
            return Err(RepoError::MissingRequiredTable("tasks"));
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('tasks');")?;
        let mut rows = stmt.query([])?;
        let mut present = Vec::new();
        while let Some(row) = rows.next()? {
            present.push(row.get::<_, String>(0)?);
        }
        for column in REQUIRED_TASK_COLUMNS {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "tasks",
                    column,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let recurrence = RecurrenceColumns::from_task(task);
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                name,
                category,
                color,
                notes,
                duration_mins,
                is_flexible,
                active,
                recur_every,
                recur_unit,
                recur_anchor_date,
                recur_count,
                recur_until,
                last_done_at,
                next_due_at,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
            params![
                task.uuid.to_string(),
                task.name.as_str(),
                category_to_db(task.category),
                task.color.as_deref(),
                task.notes.as_deref(),
                task.duration_mins,
                bool_to_int(task.is_flexible),
                bool_to_int(task.active),
                recurrence.every,
                recurrence.unit,
                recurrence.anchor_date,
                recurrence.count,
                recurrence.until,
                task.last_done_at.map(|at| at.to_rfc3339()),
                task.next_due_at.map(|due| due.to_string()),
                bool_to_int(task.is_deleted),
            ],
        )?;

        Ok(task.uuid)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let recurrence = RecurrenceColumns::from_task(task);
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?1,
                category = ?2,
                color = ?3,
                notes = ?4,
                duration_mins = ?5,
                is_flexible = ?6,
                active = ?7,
                recur_every = ?8,
                recur_unit = ?9,
                recur_anchor_date = ?10,
                recur_count = ?11,
                recur_until = ?12,
                last_done_at = ?13,
                next_due_at = ?14,
                is_deleted = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?16;",
            params![
                task.name.as_str(),
                category_to_db(task.category),
                task.color.as_deref(),
                task.notes.as_deref(),
                task.duration_mins,
                bool_to_int(task.is_flexible),
                bool_to_int(task.active),
                recurrence.every,
                recurrence.unit,
                recurrence.anchor_date,
                recurrence.count,
                recurrence.until,
                task.last_done_at.map(|at| at.to_rfc3339()),
                task.next_due_at.map(|due| due.to_string()),
                bool_to_int(task.is_deleted),
                task.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId, include_deleted: bool) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        if query.active_only {
            sql.push_str(" AND active = 1");
        }

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category_to_db(category).to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn soft_delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Flattened recurrence column values for one task.
struct RecurrenceColumns {
    every: Option<f64>,
    unit: Option<&'static str>,
    anchor_date: Option<String>,
    count: Option<u32>,
    until: Option<String>,
}

impl RecurrenceColumns {
    fn from_task(task: &Task) -> Self {
        match task.recurrence.as_ref().map(Recurrence::rule) {
            Some(rule) => Self {
                every: Some(rule.every),
                unit: Some(unit_to_db(rule.unit)),
                anchor_date: rule.anchor_date.map(|date| date.to_string()),
                count: rule.count,
                until: rule.until.map(|date| date.to_string()),
            },
            None => Self {
                every: None,
                unit: None,
                anchor_date: None,
                count: None,
                until: None,
            },
        }
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let category_text: String = row.get("category")?;
    let category = parse_category(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category"
        ))
    })?;

    let recurrence = parse_recurrence_columns(row)?;

    let last_done_at = match row.get::<_, Option<String>>("last_done_at")? {
        Some(value) => Some(parse_timestamp(&value, "last_done_at")?),
        None => None,
    };
    let next_due_at = match row.get::<_, Option<String>>("next_due_at")? {
        Some(value) => Some(parse_date(&value, "next_due_at")?),
        None => None,
    };

    let task = Task {
        uuid,
        name: row.get("name")?,
        category,
        color: row.get("color")?,
        notes: row.get("notes")?,
        duration_mins: row.get("duration_mins")?,
        is_flexible: parse_bool_column(row.get("is_flexible")?, "is_flexible")?,
        active: parse_bool_column(row.get("active")?, "active")?,
        recurrence,
        last_done_at,
        next_due_at,
        is_deleted: parse_bool_column(row.get("is_deleted")?, "is_deleted")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_recurrence_columns(row: &Row<'_>) -> RepoResult<Option<Recurrence>> {
    let every: Option<f64> = row.get("recur_every")?;
    let unit_text: Option<String> = row.get("recur_unit")?;

    let (every, unit_text) = match (every, unit_text) {
        (Some(every), Some(unit)) => (every, unit),
        (None, None) => return Ok(None),
        _ => {
            return Err(RepoError::InvalidData(
                "recur_every and recur_unit must be set together".to_string(),
            ));
        }
    };

    let unit = parse_unit(&unit_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency unit `{unit_text}` in tasks.recur_unit"
        ))
    })?;

    let anchor_date = match row.get::<_, Option<String>>("recur_anchor_date")? {
        Some(value) => Some(parse_date(&value, "recur_anchor_date")?),
        None => None,
    };
    let until = match row.get::<_, Option<String>>("recur_until")? {
        Some(value) => Some(parse_date(&value, "recur_until")?),
        None => None,
    };

    Ok(Some(Recurrence::Interval(IntervalRule {
        every,
        unit,
        anchor_date,
        count: row.get("recur_count")?,
        until,
    })))
}

fn parse_timestamp(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid RFC3339 timestamp `{value}` in tasks.{column}"
            ))
        })
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    value.parse::<NaiveDate>().map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in tasks.{column}"))
    })
}

fn parse_bool_column(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in tasks.{column}"
        ))),
    }
}

fn category_to_db(category: TaskCategory) -> &'static str {
    match category {
        TaskCategory::Hair => "hair",
        TaskCategory::Nails => "nails",
        TaskCategory::Lashes => "lashes",
        TaskCategory::Skin => "skin",
        TaskCategory::Brows => "brows",
        TaskCategory::Waxing => "waxing",
        TaskCategory::Other => "other",
    }
}

fn parse_category(value: &str) -> Option<TaskCategory> {
    match value {
        "hair" => Some(TaskCategory::Hair),
        "nails" => Some(TaskCategory::Nails),
        "lashes" => Some(TaskCategory::Lashes),
        "skin" => Some(TaskCategory::Skin),
        "brows" => Some(TaskCategory::Brows),
        "waxing" => Some(TaskCategory::Waxing),
        "other" => Some(TaskCategory::Other),
        _ => None,
    }
}

fn unit_to_db(unit: FrequencyUnit) -> &'static str {
    match unit {
        FrequencyUnit::Days => "days",
        FrequencyUnit::Weeks => "weeks",
        FrequencyUnit::Months => "months",
    }
}

fn parse_unit(value: &str) -> Option<FrequencyUnit> {
    match value {
        "days" => Some(FrequencyUnit::Days),
        "weeks" => Some(FrequencyUnit::Weeks),
        "months" => Some(FrequencyUnit::Months),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
