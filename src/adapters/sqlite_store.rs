use crate::domain::model::{ImportRecord, RecordType};
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, TimetableError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lectures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lecture_date TEXT NOT NULL,
    lecture_time TEXT NOT NULL,
    faculty_id TEXT NOT NULL,
    faculty_email TEXT NOT NULL,
    subject TEXT NOT NULL,
    room TEXT NOT NULL,
    academic_year TEXT NOT NULL,
    branch TEXT NOT NULL,
    year TEXT NOT NULL,
    section TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS lecture_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    day TEXT NOT NULL,
    lecture_time TEXT NOT NULL,
    name TEXT NOT NULL,
    faculty_id TEXT NOT NULL,
    faculty_email TEXT NOT NULL,
    subject TEXT NOT NULL,
    room TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS invigilations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exam_date TEXT NOT NULL,
    exam_time TEXT NOT NULL,
    faculty_id TEXT NOT NULL,
    faculty_email TEXT NOT NULL,
    exam TEXT NOT NULL,
    room TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS faculty_leave_master (
    employee_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    department TEXT NOT NULL,
    faculty_email TEXT NOT NULL,
    total_leaves REAL NOT NULL,
    cl REAL NOT NULL,
    el REAL NOT NULL,
    ml REAL NOT NULL
);
";

const INSERT_LECTURE: &str = "INSERT INTO lectures (lecture_date, lecture_time, faculty_id, faculty_email, subject, room, academic_year, branch, year, section) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
const INSERT_TEMPLATE: &str = "INSERT INTO lecture_templates (day, lecture_time, name, faculty_id, faculty_email, subject, room) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const INSERT_INVIGILATION: &str = "INSERT INTO invigilations (exam_date, exam_time, faculty_id, faculty_email, exam, room) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPSERT_LEAVE: &str = "INSERT OR REPLACE INTO faculty_leave_master (employee_id, name, department, faculty_email, total_leaves, cl, el, ml) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

fn table_name(record_type: RecordType) -> &'static str {
    match record_type {
        RecordType::Lecture => "lectures",
        RecordType::LectureTemplate => "lecture_templates",
        RecordType::Invigilation => "invigilations",
        RecordType::FacultyLeaveMaster => "faculty_leave_master",
    }
}

/// SQLite-backed record store. Tables are created on open.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TimetableError::ProcessingError {
            message: "SQLite connection lock poisoned".to_string(),
        })
    }
}

fn insert_one(conn: &Connection, record: &ImportRecord) -> rusqlite::Result<usize> {
    match record {
        ImportRecord::Lecture(l) => conn.prepare_cached(INSERT_LECTURE)?.execute(params![
            l.date.format("%Y-%m-%d").to_string(),
            l.time.format("%H:%M").to_string(),
            l.faculty_id,
            l.faculty_email,
            l.subject,
            l.room,
            l.academic_year,
            l.branch,
            l.year,
            l.section,
        ]),
        ImportRecord::LectureTemplate(t) => conn.prepare_cached(INSERT_TEMPLATE)?.execute(params![
            t.day.to_string(),
            t.time.format("%H:%M").to_string(),
            t.name,
            t.faculty_id,
            t.faculty_email,
            t.subject,
            t.room,
        ]),
        ImportRecord::Invigilation(i) => {
            conn.prepare_cached(INSERT_INVIGILATION)?.execute(params![
                i.date.format("%Y-%m-%d").to_string(),
                i.time.format("%H:%M").to_string(),
                i.faculty_id,
                i.faculty_email,
                i.exam,
                i.room,
            ])
        }
        ImportRecord::FacultyLeaveMaster(f) => conn.prepare_cached(UPSERT_LEAVE)?.execute(params![
            f.employee_id,
            f.name,
            f.department,
            f.faculty_email,
            f.total_leaves,
            f.cl,
            f.el,
            f.ml,
        ]),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, records: &[ImportRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        for record in records {
            written += insert_one(&tx, record)?;
        }
        tx.commit()?;
        tracing::debug!("Inserted {} rows into SQLite", written);
        Ok(written)
    }

    async fn count(&self, record_type: RecordType) -> Result<usize> {
        let conn = self.lock()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table_name(record_type));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
