use crate::ipc::helpers::{
    get_numeric_text, get_str_or_empty, get_student_id, parse_student_id, with_store, Failure,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::DataStore;
use serde_json::json;

fn exams_list(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let rows = match params.get("studentId") {
        None | Some(serde_json::Value::Null) => store.list_all_exams(),
        Some(v) => {
            let sid = parse_student_id(v)
                .ok_or_else(|| HandlerErr::bad_params("studentId must be a student id"))?;
            store.list_exams_for_student(sid)
        }
    };
    Ok(json!({ "exams": rows }))
}

fn exams_add(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    let subject = get_str_or_empty(params, "subject")?;
    let date = get_str_or_empty(params, "date")?;
    let record = store.add_exam_record(
        student_id,
        &subject,
        &get_numeric_text(params, "marks"),
        &get_numeric_text(params, "maxMarks"),
        &date,
    )?;
    Ok(json!({ "examId": record.id, "exam": record }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exams.list" => Some(with_store(state, req, exams_list)),
        "exams.add" => Some(with_store(state, req, exams_add)),
        _ => None,
    }
}
