use crate::model::Role;
use crate::store::DataStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub role: Role,
}

pub struct AppState {
    pub store: Option<DataStore>,
    pub session: Option<Session>,
}
