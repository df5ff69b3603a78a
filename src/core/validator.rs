//! Per-record-type validation of canonical rows.
//!
//! Every rule is checked independently so a single row can report several
//! problems at once. Format rules only run on non-blank values, so a blank
//! required field produces exactly one "missing" error.

use crate::domain::model::{
    CanonicalRecord, FacultyLeave, ImportRecord, ImportReport, Invigilation, Lecture,
    LectureTemplate, RecordType, ValidationError,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DMY_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());
static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});
static ACADEMIC_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{4}$").unwrap());
static BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 \-]{2,20}$").unwrap());

const YEARS: &[&str] = &["1", "2", "3", "4", "I"];
const SECTIONS: &[&str] = &["s1", "s2"];

struct RowCheck<'a> {
    record: &'a CanonicalRecord,
    row: usize,
    errors: Vec<ValidationError>,
}

impl<'a> RowCheck<'a> {
    fn new(record: &'a CanonicalRecord) -> Self {
        Self {
            record,
            row: record.row_number(),
            errors: Vec::new(),
        }
    }

    fn invalid(&mut self, field: &str, value: &str, expected: &str) {
        self.errors
            .push(ValidationError::invalid_value(self.row, field, value, expected));
    }

    /// Required, non-blank value.
    fn text(&mut self, field: &str) -> Option<&'a str> {
        let record = self.record;
        match record.get(field) {
            Some(value) if !value.trim().is_empty() => Some(value.trim()),
            _ => {
                self.errors
                    .push(ValidationError::missing_field(self.row, field));
                None
            }
        }
    }

    fn owned(&mut self, field: &str) -> Option<String> {
        self.text(field).map(str::to_string)
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.text(field)?;
        let parsed = if ISO_DATE.is_match(value) {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
        } else if DMY_DATE.is_match(value) {
            NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
        } else {
            None
        };
        if parsed.is_none() {
            self.invalid(field, value, "expected a date as YYYY-MM-DD or DD/MM/YYYY");
        }
        parsed
    }

    fn time(&mut self, field: &str) -> Option<NaiveTime> {
        let value = self.text(field)?;
        let parsed = TIME_24H.captures(value).and_then(|caps| {
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        });
        if parsed.is_none() {
            self.invalid(field, value, "expected 24-hour time as HH:MM");
        }
        parsed
    }

    fn email(&mut self, field: &str) -> Option<String> {
        let value = self.text(field)?;
        if EMAIL.is_match(value) {
            Some(value.to_string())
        } else {
            self.invalid(field, value, "expected a valid email address");
            None
        }
    }

    fn pattern(&mut self, field: &str, re: &Regex, expected: &str) -> Option<String> {
        let value = self.text(field)?;
        if re.is_match(value) {
            Some(value.to_string())
        } else {
            self.invalid(field, value, expected);
            None
        }
    }

    /// Case-insensitive membership; returns the allowed spelling.
    fn one_of(&mut self, field: &str, allowed: &[&str]) -> Option<String> {
        let value = self.text(field)?;
        match allowed.iter().find(|a| a.eq_ignore_ascii_case(value)) {
            Some(matched) => Some((*matched).to_string()),
            None => {
                self.invalid(
                    field,
                    value,
                    &format!("expected one of {}", allowed.join(", ")),
                );
                None
            }
        }
    }

    fn weekday(&mut self, field: &str) -> Option<Weekday> {
        let value = self.text(field)?;
        // chrono 接受完整名稱與三字母縮寫，不分大小寫
        match value.parse::<Weekday>() {
            Ok(day) => Some(day),
            Err(_) => {
                self.invalid(field, value, "expected a weekday name such as Monday or Mon");
                None
            }
        }
    }

    fn non_negative(&mut self, field: &str) -> Option<f64> {
        let value = self.text(field)?;
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                self.invalid(field, value, "expected a non-negative number");
                None
            }
        }
    }

    fn finish(self, record: Option<ImportRecord>) -> Result<ImportRecord, Vec<ValidationError>> {
        match record {
            Some(record) if self.errors.is_empty() => Ok(record),
            _ => Err(self.errors),
        }
    }
}

/// Validates one canonical row and, when every rule passes, builds its typed record.
pub fn validate_record(
    record: &CanonicalRecord,
    record_type: RecordType,
) -> Result<ImportRecord, Vec<ValidationError>> {
    let mut check = RowCheck::new(record);

    let typed = match record_type {
        RecordType::Lecture => {
            let date = check.date("date");
            let time = check.time("time");
            let faculty_id = check.owned("faculty_id");
            let faculty_email = check.email("faculty_email");
            let subject = check.owned("subject");
            let room = check.owned("room");
            let academic_year =
                check.pattern("academic_year", &ACADEMIC_YEAR, "expected YYYY-YYYY");
            let branch = check.pattern(
                "branch",
                &BRANCH,
                "expected 2-20 letters, digits, spaces or hyphens",
            );
            let year = check.one_of("year", YEARS);
            let section = check.one_of("section", SECTIONS);

            if let (
                Some(date),
                Some(time),
                Some(faculty_id),
                Some(faculty_email),
                Some(subject),
                Some(room),
                Some(academic_year),
                Some(branch),
                Some(year),
                Some(section),
            ) = (
                date,
                time,
                faculty_id,
                faculty_email,
                subject,
                room,
                academic_year,
                branch,
                year,
                section,
            ) {
                Some(ImportRecord::Lecture(Lecture {
                    date,
                    time,
                    faculty_id,
                    faculty_email,
                    subject,
                    room,
                    academic_year,
                    branch,
                    year,
                    section,
                }))
            } else {
                None
            }
        }
        RecordType::LectureTemplate => {
            let day = check.weekday("day");
            let time = check.time("time");
            let name = check.owned("name");
            let faculty_id = check.owned("faculty_id");
            let faculty_email = check.email("faculty_email");
            let subject = check.owned("subject");
            let room = check.owned("room");

            if let (
                Some(day),
                Some(time),
                Some(name),
                Some(faculty_id),
                Some(faculty_email),
                Some(subject),
                Some(room),
            ) = (day, time, name, faculty_id, faculty_email, subject, room)
            {
                Some(ImportRecord::LectureTemplate(LectureTemplate {
                    day,
                    time,
                    name,
                    faculty_id,
                    faculty_email,
                    subject,
                    room,
                }))
            } else {
                None
            }
        }
        RecordType::Invigilation => {
            let date = check.date("date");
            let time = check.time("time");
            let faculty_id = check.owned("faculty_id");
            let faculty_email = check.email("faculty_email");
            let exam = check.owned("exam");
            let room = check.owned("room");

            if let (
                Some(date),
                Some(time),
                Some(faculty_id),
                Some(faculty_email),
                Some(exam),
                Some(room),
            ) = (date, time, faculty_id, faculty_email, exam, room)
            {
                Some(ImportRecord::Invigilation(Invigilation {
                    date,
                    time,
                    faculty_id,
                    faculty_email,
                    exam,
                    room,
                }))
            } else {
                None
            }
        }
        RecordType::FacultyLeaveMaster => {
            let employee_id = check.owned("employee_id");
            let name = check.owned("name");
            let department = check.owned("department");
            let faculty_email = check.email("faculty_email");
            let total_leaves = check.non_negative("total_leaves");
            let cl = check.non_negative("cl");
            let el = check.non_negative("el");
            let ml = check.non_negative("ml");
            // total_leaves 與 cl + el + ml 不做加總比對，待確認

            if let (
                Some(employee_id),
                Some(name),
                Some(department),
                Some(faculty_email),
                Some(total_leaves),
                Some(cl),
                Some(el),
                Some(ml),
            ) = (
                employee_id,
                name,
                department,
                faculty_email,
                total_leaves,
                cl,
                el,
                ml,
            ) {
                Some(ImportRecord::FacultyLeaveMaster(FacultyLeave {
                    employee_id,
                    name,
                    department,
                    faculty_email,
                    total_leaves,
                    cl,
                    el,
                    ml,
                }))
            } else {
                None
            }
        }
    };

    check.finish(typed)
}

/// Validates every row and returns all errors in row order; empty means all valid.
pub fn validate_records(
    records: &[CanonicalRecord],
    record_type: RecordType,
) -> Vec<ValidationError> {
    records
        .iter()
        .filter_map(|r| validate_record(r, record_type).err())
        .flatten()
        .collect()
}

/// Splits rows into typed records and errors. A row never lands in both.
pub fn build_report(records: Vec<CanonicalRecord>, record_type: RecordType) -> ImportReport {
    let rows_read = records.len();
    let mut typed = Vec::with_capacity(rows_read);
    let mut errors = Vec::new();

    for record in &records {
        match validate_record(record, record_type) {
            Ok(valid) => typed.push(valid),
            Err(row_errors) => errors.extend(row_errors),
        }
    }

    ImportReport {
        record_type,
        rows_read,
        records: typed,
        errors,
    }
}
