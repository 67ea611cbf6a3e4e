//! In-memory data store for students, attendance, exams and fees.
//!
//! A [`DataStore`] is opened once over a data directory and owns all five
//! collections. Every mutating call runs against a staged copy that only
//! becomes live after the whole batch has been written to disk.

use crate::db::{self, Collections, LoadReport};
use crate::error::{Result, StoreError};
use crate::model::{
    Credential, DashboardSummary, ExamId, ExamRecord, ExamRow, FeeAccount, FeeView, Mark,
    Payment, Role, Student, StudentId,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_PASSWORD: &str = "1234";
pub const UNKNOWN_STUDENT_NAME: &str = "?";

#[derive(Debug, Clone)]
struct State {
    data: Collections,
    next_student_id: StudentId,
    next_exam_id: ExamId,
}

pub struct DataStore {
    dir: PathBuf,
    state: State,
    load_report: LoadReport,
}

/// Field values for creating or updating a student, before trimming.
#[derive(Debug, Clone, Default)]
pub struct StudentInput<'a> {
    pub roll: &'a str,
    pub name: &'a str,
    pub class_label: &'a str,
    pub contact: &'a str,
}

impl DataStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        db::open_data_dir(&dir)?;
        let (mut data, load_report) = db::load_all(&dir);

        if data.credentials.is_empty() {
            for (username, role) in [("admin", Role::Admin), ("teacher", Role::Teacher)] {
                data.credentials.insert(
                    username.to_string(),
                    Credential {
                        password: DEFAULT_PASSWORD.to_string(),
                        role,
                    },
                );
            }
            // Only the credentials file: a corrupt sibling must not be overwritten here.
            db::save_credentials(&dir, &data.credentials)?;
            tracing::info!(dir = %dir.display(), "seeded default accounts");
        }

        let next_student_id = data.students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let next_exam_id = data.exams.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        tracing::debug!(
            students = data.students.len(),
            exams = data.exams.len(),
            next_student_id,
            next_exam_id,
            "data store opened"
        );

        Ok(DataStore {
            dir,
            state: State {
                data,
                next_student_id,
                next_exam_id,
            },
            load_report,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn collections(&self) -> &Collections {
        &self.state.data
    }

    fn commit<T>(&mut self, apply: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut staged = self.state.clone();
        let out = apply(&mut staged)?;
        if let Err(e) = db::save_all(&self.dir, &staged.data) {
            tracing::error!(error = %format!("{e:#}"), "persist failed, changes discarded");
            return Err(StoreError::Storage(e));
        }
        self.state = staged;
        Ok(out)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Role> {
        match self.state.data.credentials.get(username) {
            Some(c) if c.password == password => Ok(c.role),
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    // ---- students ----

    pub fn list_students(&self) -> &[Student] {
        &self.state.data.students
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.state.data.students.iter().find(|s| s.id == id)
    }

    pub fn create_student(&mut self, input: StudentInput<'_>) -> Result<Student> {
        let fields = clean_student_fields(&input)?;
        self.commit(|st| {
            if st.data.students.iter().any(|s| s.roll == fields.roll) {
                return Err(StoreError::DuplicateRoll(fields.roll.clone()));
            }
            let student = Student {
                id: st.next_student_id,
                roll: fields.roll,
                name: fields.name,
                class_label: fields.class_label,
                contact: fields.contact,
            };
            st.next_student_id += 1;
            st.data.students.push(student.clone());
            st.data.fees.entry(student.id).or_default();
            Ok(student)
        })
    }

    pub fn update_student(&mut self, id: StudentId, input: StudentInput<'_>) -> Result<Student> {
        let fields = clean_student_fields(&input)?;
        self.commit(|st| {
            if !st.data.students.iter().any(|s| s.id == id) {
                return Err(StoreError::student_not_found(id));
            }
            if st
                .data
                .students
                .iter()
                .any(|s| s.roll == fields.roll && s.id != id)
            {
                return Err(StoreError::DuplicateRoll(fields.roll.clone()));
            }
            let Some(student) = st.data.students.iter_mut().find(|s| s.id == id) else {
                return Err(StoreError::student_not_found(id));
            };
            student.roll = fields.roll;
            student.name = fields.name;
            student.class_label = fields.class_label;
            student.contact = fields.contact;
            Ok(student.clone())
        })
    }

    pub fn delete_student(&mut self, id: StudentId) -> Result<()> {
        self.commit(|st| {
            let before = st.data.students.len();
            st.data.students.retain(|s| s.id != id);
            if st.data.students.len() == before {
                return Err(StoreError::student_not_found(id));
            }
            st.data.attendance.remove(&id);
            st.data.exams.retain(|e| e.student_id != id);
            st.data.fees.remove(&id);
            Ok(())
        })?;
        tracing::info!(student_id = id, "student deleted with dependent records");
        Ok(())
    }

    pub fn search_students(&self, query: &str) -> Vec<Student> {
        let q = query.trim().to_lowercase();
        self.state
            .data
            .students
            .iter()
            .filter(|s| {
                q.is_empty()
                    || s.name.to_lowercase().contains(&q)
                    || s.roll.to_lowercase().contains(&q)
            })
            .cloned()
            .collect()
    }

    // ---- attendance ----

    /// Applies a whole day's marks in one write. Nothing is applied unless every
    /// entry is valid.
    pub fn set_attendance(&mut self, date: &str, marks: &BTreeMap<StudentId, String>) -> Result<()> {
        let date = parse_date(date)?;
        let mut parsed = Vec::with_capacity(marks.len());
        for (sid, code) in marks {
            let Some(mark) = Mark::parse(code) else {
                return Err(StoreError::validation(format!(
                    "attendance status must be P or A (student {sid})"
                )));
            };
            if self.student(*sid).is_none() {
                return Err(StoreError::student_not_found(*sid));
            }
            parsed.push((*sid, mark));
        }
        self.commit(|st| {
            for (sid, mark) in parsed {
                st.data
                    .attendance
                    .entry(sid)
                    .or_default()
                    .insert(date.clone(), mark);
            }
            Ok(())
        })
    }

    /// Marks for every current student on `date`; unrecorded students read as absent.
    pub fn get_attendance(&self, date: &str) -> Result<BTreeMap<StudentId, Mark>> {
        let date = parse_date(date)?;
        Ok(self
            .state
            .data
            .students
            .iter()
            .map(|s| (s.id, self.mark_on(s.id, &date).unwrap_or(Mark::Absent)))
            .collect())
    }

    fn mark_on(&self, sid: StudentId, date: &str) -> Option<Mark> {
        self.state
            .data
            .attendance
            .get(&sid)
            .and_then(|days| days.get(date))
            .copied()
    }

    // ---- exams ----

    pub fn add_exam_record(
        &mut self,
        student_id: StudentId,
        subject: &str,
        marks: &str,
        max_marks: &str,
        date: &str,
    ) -> Result<ExamRecord> {
        let marks = parse_number("marks", marks)?;
        let max_marks = parse_number("max marks", max_marks)?;
        if self.student(student_id).is_none() {
            return Err(StoreError::student_not_found(student_id));
        }
        let date = match date.trim() {
            "" => today(),
            d => d.to_string(),
        };
        let subject = subject.trim().to_string();
        self.commit(|st| {
            let rec = ExamRecord {
                id: st.next_exam_id,
                student_id,
                subject,
                marks,
                max_marks,
                date,
            };
            st.next_exam_id += 1;
            st.data.exams.push(rec.clone());
            Ok(rec)
        })
    }

    pub fn list_all_exams(&self) -> Vec<ExamRow> {
        self.exam_rows(|_| true)
    }

    pub fn list_exams_for_student(&self, student_id: StudentId) -> Vec<ExamRow> {
        self.exam_rows(|e| e.student_id == student_id)
    }

    fn exam_rows(&self, keep: impl Fn(&ExamRecord) -> bool) -> Vec<ExamRow> {
        let names: BTreeMap<StudentId, &str> = self
            .state
            .data
            .students
            .iter()
            .map(|s| (s.id, s.name.as_str()))
            .collect();
        self.state
            .data
            .exams
            .iter()
            .filter(|e| keep(e))
            .map(|e| ExamRow {
                record: e.clone(),
                student_name: names
                    .get(&e.student_id)
                    .copied()
                    .unwrap_or(UNKNOWN_STUDENT_NAME)
                    .to_string(),
            })
            .collect()
    }

    // ---- fees ----

    pub fn set_total_fee(&mut self, student_id: StudentId, total: &str) -> Result<FeeView> {
        let total = parse_number("total", total)?;
        if self.student(student_id).is_none() {
            return Err(StoreError::student_not_found(student_id));
        }
        self.commit(|st| {
            let acc = st.data.fees.entry(student_id).or_default();
            acc.total = total;
            Ok(FeeView::from(&*acc))
        })
    }

    /// Records a payment dated today. Overpayment and negative amounts are accepted.
    pub fn add_payment(&mut self, student_id: StudentId, amount: &str) -> Result<FeeView> {
        let amount = parse_number("amount", amount)?;
        if self.student(student_id).is_none() {
            return Err(StoreError::student_not_found(student_id));
        }
        let date = today();
        self.commit(|st| {
            let acc = st.data.fees.entry(student_id).or_default();
            acc.paid += amount;
            acc.history.push(Payment { date, amount });
            Ok(FeeView::from(&*acc))
        })
    }

    pub fn get_fee_view(&self, student_id: StudentId) -> FeeView {
        match self.state.data.fees.get(&student_id) {
            Some(acc) => FeeView::from(acc),
            None => FeeView::from(&FeeAccount::default()),
        }
    }

    // ---- dashboard ----

    pub fn dashboard(&self, today: &str) -> Result<DashboardSummary> {
        let today = parse_date(today)?;
        let present_today = self
            .state
            .data
            .students
            .iter()
            .filter(|s| self.mark_on(s.id, &today) == Some(Mark::Present))
            .count();
        Ok(DashboardSummary {
            total_students: self.state.data.students.len(),
            exam_records: self.state.data.exams.len(),
            present_today,
        })
    }

    /// Re-reads every collection from disk, e.g. after a backup was restored.
    pub fn reload(&mut self) -> Result<()> {
        *self = DataStore::open(self.dir.clone())?;
        Ok(())
    }
}

struct StudentFields {
    roll: String,
    name: String,
    class_label: String,
    contact: String,
}

fn clean_student_fields(input: &StudentInput<'_>) -> Result<StudentFields> {
    let fields = StudentFields {
        roll: input.roll.trim().to_string(),
        name: input.name.trim().to_string(),
        class_label: input.class_label.trim().to_string(),
        contact: input.contact.trim().to_string(),
    };
    if fields.roll.is_empty() || fields.name.is_empty() {
        return Err(StoreError::validation("roll number and name are required"));
    }
    Ok(fields)
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(StoreError::validation(format!("{field} must be a number"))),
    }
}

fn parse_date(raw: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| StoreError::validation("date must be YYYY-MM-DD"))
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
