use crate::error::StoreError;
use crate::ipc::error::{err, store_err};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentId;
use crate::store::DataStore;

#[derive(Debug)]
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

/// Either a malformed request or a rejected store operation.
pub enum Failure {
    Handler(HandlerErr),
    Store(StoreError),
}

impl From<HandlerErr> for Failure {
    fn from(e: HandlerErr) -> Self {
        Failure::Handler(e)
    }
}

impl From<StoreError> for Failure {
    fn from(e: StoreError) -> Self {
        Failure::Store(e)
    }
}

impl Failure {
    pub fn response(self, id: &str) -> serde_json::Value {
        match self {
            Failure::Handler(e) => e.response(id),
            Failure::Store(e) => store_err(id, &e),
        }
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Optional text field; absent or null reads as empty so the store can validate it.
pub fn get_str_or_empty(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

/// Numeric form input. Accepts JSON numbers or the raw text the user typed.
pub fn get_numeric_text(params: &serde_json::Value, key: &str) -> String {
    match params.get(key) {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

pub fn parse_student_id(v: &serde_json::Value) -> Option<StudentId> {
    match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_student_id(params: &serde_json::Value, key: &str) -> Result<StudentId, HandlerErr> {
    params
        .get(key)
        .and_then(parse_student_id)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn with_store<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut DataStore, &serde_json::Value) -> Result<serde_json::Value, Failure>,
{
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(store, &req.params) {
        Ok(result) => crate::ipc::error::ok(&req.id, result),
        Err(failure) => failure.response(&req.id),
    }
}
