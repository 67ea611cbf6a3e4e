use crate::model::{AttendanceBook, Credentials, ExamRecord, FeeBook, Student};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Students,
    Attendance,
    Exams,
    Fees,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Students,
        Collection::Attendance,
        Collection::Exams,
        Collection::Fees,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Students => "students",
            Collection::Attendance => "attendance",
            Collection::Exams => "exams",
            Collection::Fees => "fees",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Students => "students.json",
            Collection::Attendance => "attendance.json",
            Collection::Exams => "exams.json",
            Collection::Fees => "fees.json",
        }
    }

    /// Serialized form of the collection when it holds no records.
    pub fn empty_json(self) -> &'static str {
        match self {
            Collection::Students | Collection::Exams => "[]",
            Collection::Users | Collection::Attendance | Collection::Fees => "{}",
        }
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// The five persisted record sets, held together in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub credentials: Credentials,
    pub students: Vec<Student>,
    pub attendance: AttendanceBook,
    pub exams: Vec<ExamRecord>,
    pub fees: FeeBook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Absent,
    /// The file exists but could not be read or parsed; an empty default was used.
    Corrupt(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    entries: Vec<(Collection, LoadOutcome)>,
}

impl LoadReport {
    pub fn outcome(&self, collection: Collection) -> Option<&LoadOutcome> {
        self.entries
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, o)| o)
    }

    pub fn corrupt(&self) -> impl Iterator<Item = (Collection, &str)> {
        self.entries.iter().filter_map(|(c, o)| match o {
            LoadOutcome::Corrupt(reason) => Some((*c, reason.as_str())),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.corrupt().next().is_none()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for (c, o) in &self.entries {
            let v = match o {
                LoadOutcome::Loaded => serde_json::json!({ "status": "loaded" }),
                LoadOutcome::Absent => serde_json::json!({ "status": "absent" }),
                LoadOutcome::Corrupt(reason) => {
                    serde_json::json!({ "status": "corrupt", "reason": reason })
                }
            };
            out.insert(c.as_str().to_string(), v);
        }
        serde_json::Value::Object(out)
    }
}

pub fn open_data_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory {}", dir.to_string_lossy()))
}

pub fn load_all(dir: &Path) -> (Collections, LoadReport) {
    let mut report = LoadReport::default();
    let mut track = |c: Collection, outcome: LoadOutcome| {
        if let LoadOutcome::Corrupt(reason) = &outcome {
            tracing::warn!(
                collection = c.as_str(),
                %reason,
                "collection unreadable, starting from empty"
            );
        }
        report.entries.push((c, outcome));
    };

    let (credentials, o) = load_collection(&Collection::Users.path_in(dir));
    track(Collection::Users, o);
    let (students, o) = load_collection(&Collection::Students.path_in(dir));
    track(Collection::Students, o);
    let (attendance, o) = load_collection(&Collection::Attendance.path_in(dir));
    track(Collection::Attendance, o);
    let (exams, o) = load_collection(&Collection::Exams.path_in(dir));
    track(Collection::Exams, o);
    let (fees, o) = load_collection(&Collection::Fees.path_in(dir));
    track(Collection::Fees, o);

    (
        Collections {
            credentials,
            students,
            attendance,
            exams,
            fees,
        },
        report,
    )
}

fn load_collection<T: DeserializeOwned + Default>(path: &Path) -> (T, LoadOutcome) {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return (T::default(), LoadOutcome::Absent),
        Err(e) => return (T::default(), LoadOutcome::Corrupt(e.to_string())),
    };
    match serde_json::from_str(&text) {
        Ok(v) => (v, LoadOutcome::Loaded),
        Err(e) => (T::default(), LoadOutcome::Corrupt(e.to_string())),
    }
}

/// Writes every collection. All temp files are written before any rename so a
/// serialization or disk failure leaves the previous files in place.
pub fn save_all(dir: &Path, data: &Collections) -> anyhow::Result<()> {
    let staged = [
        stage_json(&Collection::Users.path_in(dir), &data.credentials)?,
        stage_json(&Collection::Students.path_in(dir), &data.students)?,
        stage_json(&Collection::Attendance.path_in(dir), &data.attendance)?,
        stage_json(&Collection::Exams.path_in(dir), &data.exams)?,
        stage_json(&Collection::Fees.path_in(dir), &data.fees)?,
    ];
    for (tmp, dst) in &staged {
        std::fs::rename(tmp, dst).with_context(|| {
            format!("failed to move {} into place", dst.to_string_lossy())
        })?;
    }
    Ok(())
}

pub fn save_credentials(dir: &Path, credentials: &Credentials) -> anyhow::Result<()> {
    let (tmp, dst) = stage_json(&Collection::Users.path_in(dir), credentials)?;
    std::fs::rename(&tmp, &dst)
        .with_context(|| format!("failed to move {} into place", dst.to_string_lossy()))
}

fn stage_json<T: Serialize>(dst: &Path, value: &T) -> anyhow::Result<(PathBuf, PathBuf)> {
    let tmp = tmp_path(dst);
    let text = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", dst.to_string_lossy()))?;
    let mut f = File::create(&tmp)
        .with_context(|| format!("failed to create {}", tmp.to_string_lossy()))?;
    f.write_all(text.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
    f.flush()
        .with_context(|| format!("failed to flush {}", tmp.to_string_lossy()))?;
    Ok((tmp, dst.to_path_buf()))
}

pub(crate) fn tmp_path(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dst.with_file_name(name)
}
