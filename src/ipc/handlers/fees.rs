use crate::ipc::helpers::{get_numeric_text, get_student_id, with_store, Failure};
use crate::ipc::types::{AppState, Request};
use crate::store::DataStore;
use serde_json::json;

fn fees_get(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    Ok(json!({ "studentId": student_id, "fee": store.get_fee_view(student_id) }))
}

fn fees_set_total(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    let view = store.set_total_fee(student_id, &get_numeric_text(params, "total"))?;
    Ok(json!({ "studentId": student_id, "fee": view }))
}

fn fees_add_payment(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let student_id = get_student_id(params, "studentId")?;
    let view = store.add_payment(student_id, &get_numeric_text(params, "amount"))?;
    Ok(json!({ "studentId": student_id, "fee": view }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "fees.get" => Some(with_store(state, req, fees_get)),
        "fees.setTotal" => Some(with_store(state, req, fees_set_total)),
        "fees.addPayment" => Some(with_store(state, req, fees_add_payment)),
        _ => None,
    }
}
