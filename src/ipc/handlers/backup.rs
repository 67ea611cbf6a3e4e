use crate::backup;
use crate::ipc::helpers::{get_required_str, with_store, Failure, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::DataStore;
use serde_json::json;
use std::path::PathBuf;

fn export_bundle(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let summary = backup::export_bundle(store.dir(), &out_path).map_err(|e| HandlerErr {
        code: "backup_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    Ok(json!({
        "outPath": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
    }))
}

fn import_bundle(
    store: &mut DataStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, Failure> {
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let summary = backup::import_bundle(&in_path, store.dir()).map_err(|e| HandlerErr {
        code: "restore_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    store.reload()?;
    Ok(json!({
        "bundleFormatDetected": summary.bundle_format_detected,
        "restored": summary.restored,
        "load": store.load_report().to_json(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(with_store(state, req, export_bundle)),
        "backup.importBundle" => Some(with_store(state, req, import_bundle)),
        _ => None,
    }
}
