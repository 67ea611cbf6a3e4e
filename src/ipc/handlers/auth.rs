use crate::ipc::error::{err, ok, store_err};
use crate::ipc::types::{AppState, Request, Session};
use serde_json::json;
use uuid::Uuid;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    // The login form trims both fields before checking them.
    let username = req
        .params
        .get("username")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim();
    let password = req
        .params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim();

    match store.authenticate(username, password) {
        Ok(role) => {
            let session = Session {
                id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                role,
            };
            tracing::info!(username, %role, "login");
            let result = json!({
                "sessionId": session.id,
                "username": session.username,
                "role": role,
            });
            state.session = Some(session);
            ok(&req.id, result)
        }
        Err(e) => {
            tracing::warn!(username, "login rejected");
            store_err(&req.id, &e)
        }
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was = state.session.take();
    ok(&req.id, json!({ "loggedOut": was.is_some() }))
}

fn handle_whoami(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = state.session.as_ref().map(|s| {
        json!({
            "sessionId": s.id,
            "username": s.username,
            "role": s.role,
        })
    });
    ok(&req.id, json!({ "session": session }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "auth.whoami" => Some(handle_whoami(state, req)),
        _ => None,
    }
}
