use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Lecture,
    LectureTemplate,
    Invigilation,
    FacultyLeaveMaster,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::Lecture,
        RecordType::LectureTemplate,
        RecordType::Invigilation,
        RecordType::FacultyLeaveMaster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Lecture => "lecture",
            RecordType::LectureTemplate => "lecture_template",
            RecordType::Invigilation => "invigilation",
            RecordType::FacultyLeaveMaster => "faculty_leave_master",
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Lecture => &[
                "date",
                "time",
                "faculty_id",
                "faculty_email",
                "subject",
                "room",
                "academic_year",
                "branch",
                "year",
                "section",
            ],
            RecordType::LectureTemplate => &[
                "day",
                "time",
                "name",
                "faculty_id",
                "faculty_email",
                "subject",
                "room",
            ],
            RecordType::Invigilation => {
                &["date", "time", "faculty_id", "faculty_email", "exam", "room"]
            }
            RecordType::FacultyLeaveMaster => &[
                "employee_id",
                "name",
                "department",
                "faculty_email",
                "total_leaves",
                "cl",
                "el",
                "ml",
            ],
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown record type '{}' (expected one of: lecture, lecture_template, invigilation, faculty_leave_master)",
                    s
                )
            })
    }
}

/// One data row after header normalization: canonical field name → trimmed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// 實體行號減 2；空白列雖被略過仍佔行號
    pub index: usize,
    pub fields: HashMap<String, String>,
}

impl CanonicalRecord {
    pub fn new(index: usize, fields: HashMap<String, String>) -> Self {
        Self { index, fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Row number as shown to the uploader: 1-based, counting the header line.
    pub fn row_number(&self) -> usize {
        self.index + 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,
    pub message: String,
}

impl ValidationError {
    pub fn missing_field(row: usize, field: &str) -> Self {
        Self {
            row,
            message: format!("Row {}: Missing required field '{}'", row, field),
        }
    }

    pub fn invalid_value(row: usize, field: &str, value: &str, expected: &str) -> Self {
        Self {
            row,
            message: format!("Row {}: Invalid {} '{}': {}", row, field, value, expected),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub faculty_id: String,
    pub faculty_email: String,
    pub subject: String,
    pub room: String,
    pub academic_year: String,
    pub branch: String,
    /// "1".."4" or "I"，已轉大寫
    pub year: String,
    /// "s1" / "s2"，已轉小寫
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureTemplate {
    pub day: Weekday,
    pub time: NaiveTime,
    pub name: String,
    pub faculty_id: String,
    pub faculty_email: String,
    pub subject: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invigilation {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub faculty_id: String,
    pub faculty_email: String,
    pub exam: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyLeave {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub faculty_email: String,
    pub total_leaves: f64,
    pub cl: f64,
    pub el: f64,
    pub ml: f64,
}

/// A row that passed validation, typed per record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportRecord {
    Lecture(Lecture),
    LectureTemplate(LectureTemplate),
    Invigilation(Invigilation),
    FacultyLeaveMaster(FacultyLeave),
}

impl ImportRecord {
    pub fn record_type(&self) -> RecordType {
        match self {
            ImportRecord::Lecture(_) => RecordType::Lecture,
            ImportRecord::LectureTemplate(_) => RecordType::LectureTemplate,
            ImportRecord::Invigilation(_) => RecordType::Invigilation,
            ImportRecord::FacultyLeaveMaster(_) => RecordType::FacultyLeaveMaster,
        }
    }

    pub fn faculty_email(&self) -> &str {
        match self {
            ImportRecord::Lecture(r) => &r.faculty_email,
            ImportRecord::LectureTemplate(r) => &r.faculty_email,
            ImportRecord::Invigilation(r) => &r.faculty_email,
            ImportRecord::FacultyLeaveMaster(r) => &r.faculty_email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub record_type: RecordType,
    pub rows_read: usize,
    pub records: Vec<ImportRecord>,
    pub errors: Vec<ValidationError>,
}

impl ImportReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub balances_published: usize,
    pub balances_failed: usize,
}

/// Leave snapshot pushed to the realtime database for the mobile app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub total_leaves: f64,
    pub cl: f64,
    pub el: f64,
    pub ml: f64,
}

impl From<&FacultyLeave> for LeaveBalance {
    fn from(leave: &FacultyLeave) -> Self {
        Self {
            employee_id: leave.employee_id.clone(),
            name: leave.name.clone(),
            department: leave.department.clone(),
            total_leaves: leave.total_leaves,
            cl: leave.cl,
            el: leave.el,
            ml: leave.ml,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    fn title_case(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            other => Err(format!(
                "unknown leave status '{}' (expected pending, approved or rejected)",
                other
            )),
        }
    }
}

/// A change to a faculty member's leave application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveUpdate {
    pub faculty_email: String,
    pub leave_type: String,
    pub from: String,
    pub to: String,
    pub status: LeaveStatus,
    pub remarks: Option<String>,
}

impl LeaveUpdate {
    pub fn to_notification(&self) -> PushNotification {
        let mut body = format!(
            "Your {} leave from {} to {} has been {}.",
            self.leave_type,
            self.from,
            self.to,
            self.status.as_str()
        );
        if let Some(remarks) = self.remarks.as_deref().filter(|r| !r.trim().is_empty()) {
            body.push_str(&format!(" Remarks: {}", remarks.trim()));
        }

        let data = HashMap::from([
            ("type".to_string(), "leave_update".to_string()),
            ("status".to_string(), self.status.as_str().to_string()),
            ("leave_type".to_string(), self.leave_type.clone()),
            ("from".to_string(), self.from.clone()),
            ("to".to_string(), self.to.clone()),
        ]);

        PushNotification {
            title: format!("Leave {}", self.status.title_case()),
            body,
            data,
        }
    }
}
