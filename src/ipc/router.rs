use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use crate::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    /// Any logged-in role.
    Staff,
    Admin,
}

fn access_for(method: &str) -> Option<Access> {
    let access = match method {
        "health" | "workspace.select" | "auth.login" | "auth.logout" | "auth.whoami" => {
            Access::Public
        }
        "dashboard.summary"
        | "students.list"
        | "students.search"
        | "attendance.get"
        | "attendance.saveAll"
        | "exams.list"
        | "exams.add" => Access::Staff,
        "students.create"
        | "students.update"
        | "students.delete"
        | "fees.get"
        | "fees.setTotal"
        | "fees.addPayment"
        | "backup.exportBundle"
        | "backup.importBundle" => Access::Admin,
        _ => return None,
    };
    Some(access)
}

fn authorize(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    let Some(access) = access_for(&req.method) else {
        return Ok(());
    };
    if access == Access::Public {
        return Ok(());
    }
    let Some(session) = state.session.as_ref() else {
        return Err(err(&req.id, "not_logged_in", "log in first", None));
    };
    if access == Access::Admin && session.role != Role::Admin {
        tracing::warn!(method = %req.method, role = %session.role, "forbidden");
        return Err(err(
            &req.id,
            "forbidden",
            format!("{} requires the admin role", req.method),
            None,
        ));
    }
    Ok(())
}

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    if let Err(resp) = authorize(state, &req) {
        return resp;
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::auth::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::attendance::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::exams::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::fees::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::backup::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
