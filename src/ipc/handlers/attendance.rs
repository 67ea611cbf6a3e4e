use crate::ipc::helpers::{
    get_required_str, parse_student_id, with_store, Failure, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentId;
use crate::store::DataStore;
use serde_json::json;
use std::collections::BTreeMap;

/// `marks` arrives as `{"<studentId>": "P" | "A"}` or `[{"studentId", "status"}]`.
fn parse_marks(v: Option<&serde_json::Value>) -> Result<BTreeMap<StudentId, String>, HandlerErr> {
    let mut out = BTreeMap::new();
    match v {
        Some(serde_json::Value::Object(map)) => {
            for (k, status) in map {
                let sid = k
                    .trim()
                    .parse::<StudentId>()
                    .map_err(|_| HandlerErr::bad_params(format!("invalid student id: {}", k)))?;
                let Some(code) = status.as_str() else {
                    return Err(HandlerErr::bad_params("status must be a string"));
                };
                out.insert(sid, code.to_string());
            }
        }
        Some(serde_json::Value::Array(rows)) => {
            for row in rows {
                let Some(sid) = row.get("studentId").and_then(parse_student_id) else {
                    return Err(HandlerErr::bad_params("each mark needs a studentId"));
                };
                let Some(code) = row.get("status").and_then(|v| v.as_str()) else {
                    return Err(HandlerErr::bad_params("each mark needs a status"));
                };
                out.insert(sid, code.to_string());
            }
        }
        _ => return Err(HandlerErr::bad_params("missing marks")),
    }
    Ok(out)
}

fn attendance_get(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let date = get_required_str(params, "date")?;
    let marks = store.get_attendance(&date)?;
    let rows: Vec<serde_json::Value> = store
        .list_students()
        .iter()
        .map(|s| {
            json!({
                "studentId": s.id,
                "roll": s.roll,
                "name": s.name,
                "status": marks.get(&s.id).map(|m| m.code()).unwrap_or("A"),
            })
        })
        .collect();
    Ok(json!({ "date": date.trim(), "rows": rows }))
}

fn attendance_save_all(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let date = get_required_str(params, "date")?;
    let marks = parse_marks(params.get("marks"))?;
    store.set_attendance(&date, &marks)?;
    Ok(json!({ "saved": marks.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.get" => Some(with_store(state, req, attendance_get)),
        "attendance.saveAll" => Some(with_store(state, req, attendance_save_all)),
        _ => None,
    }
}
