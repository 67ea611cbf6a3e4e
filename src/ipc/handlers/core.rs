use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{get_str_or_empty, with_store, Failure};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, DataStore};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.store.as_ref().map(|s| s.dir().to_string_lossy().to_string()),
            "load": state.store.as_ref().map(|s| s.load_report().to_json()),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match DataStore::open(&path) {
        Ok(opened) => {
            let load = opened.load_report().to_json();
            tracing::info!(path = %path.display(), "workspace selected");
            state.store = Some(opened);
            // Credentials belong to the workspace; a new one needs a new login.
            state.session = None;
            ok(
                &req.id,
                json!({ "workspacePath": path.to_string_lossy(), "load": load }),
            )
        }
        Err(e) => store_err(&req.id, &e),
    }
}

fn dashboard_summary(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let date = match get_str_or_empty(params, "date")?.trim() {
        "" => store::today(),
        d => d.to_string(),
    };
    let summary = store.dashboard(&date)?;
    Ok(json!({ "date": date.trim(), "summary": summary }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "dashboard.summary" => Some(with_store(state, req, dashboard_summary)),
        _ => None,
    }
}
