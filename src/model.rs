use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type StudentId = u64;
pub type ExamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub password: String,
    pub role: Role,
}

/// Attendance status for one student on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
}

impl Mark {
    pub fn parse(code: &str) -> Option<Mark> {
        match code.trim() {
            "P" => Some(Mark::Present),
            "A" => Some(Mark::Absent),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Mark::Present => "P",
            Mark::Absent => "A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub roll: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub id: ExamId,
    pub student_id: StudentId,
    pub subject: String,
    pub marks: f64,
    pub max_marks: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeAccount {
    pub total: f64,
    pub paid: f64,
    #[serde(default)]
    pub history: Vec<Payment>,
}

impl FeeAccount {
    pub fn balance(&self) -> f64 {
        self.total - self.paid
    }
}

pub type Credentials = BTreeMap<String, Credential>;
/// student id -> (YYYY-MM-DD -> mark)
pub type AttendanceBook = BTreeMap<StudentId, BTreeMap<String, Mark>>;
pub type FeeBook = BTreeMap<StudentId, FeeAccount>;

/// An exam record joined with the student's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRow {
    #[serde(flatten)]
    pub record: ExamRecord,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeView {
    pub total: f64,
    pub paid: f64,
    pub balance: f64,
    pub history: Vec<Payment>,
}

impl From<&FeeAccount> for FeeView {
    fn from(acc: &FeeAccount) -> Self {
        FeeView {
            total: acc.total,
            paid: acc.paid,
            balance: acc.balance(),
            history: acc.history.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub exam_records: usize,
    pub present_today: usize,
}
