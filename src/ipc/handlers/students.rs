use crate::ipc::helpers::{get_str_or_empty, get_student_id, with_store, Failure, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::store::{DataStore, StudentInput};
use serde_json::json;

struct StudentForm {
    roll: String,
    name: String,
    class_label: String,
    contact: String,
}

impl StudentForm {
    fn from_params(params: &serde_json::Value) -> Result<Self, HandlerErr> {
        Ok(StudentForm {
            roll: get_str_or_empty(params, "roll")?,
            name: get_str_or_empty(params, "name")?,
            class_label: get_str_or_empty(params, "class")?,
            contact: get_str_or_empty(params, "contact")?,
        })
    }

    fn input(&self) -> StudentInput<'_> {
        StudentInput {
            roll: &self.roll,
            name: &self.name,
            class_label: &self.class_label,
            contact: &self.contact,
        }
    }
}

fn students_json(students: &[Student]) -> serde_json::Value {
    json!({ "students": students })
}

fn students_list(
    store: &mut DataStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    Ok(students_json(store.list_students()))
}

fn students_search(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let query = get_str_or_empty(params, "query")?;
    Ok(students_json(&store.search_students(&query)))
}

fn students_create(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let form = StudentForm::from_params(params)?;
    let student = store.create_student(form.input())?;
    Ok(json!({ "studentId": student.id, "student": student }))
}

fn students_update(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    let form = StudentForm::from_params(params)?;
    let student = store.update_student(student_id, form.input())?;
    Ok(json!({ "student": student }))
}

fn students_delete(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    store.delete_student(student_id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_store(state, req, students_list)),
        "students.search" => Some(with_store(state, req, students_search)),
        "students.create" => Some(with_store(state, req, students_create)),
        "students.update" => Some(with_store(state, req, students_update)),
        "students.delete" => Some(with_store(state, req, students_delete)),
        _ => None,
    }
}
