// Register/login/logout, parametrized by `Role` so the same logic
// serves both the developer and player lobbies against their own
// disjoint store collections and session tables.

use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{Document, LobbyError, Role, Session, StoreClientError, StorePort};
use crate::use_cases::password::sha256_hex;
use crate::use_cases::session_table::SessionTable;

pub struct Registered {
    pub user_id: String,
    pub name: String,
}

pub async fn register(
    store: &dyn StorePort,
    role: Role,
    username: &str,
    password: &str,
) -> Result<Registered, LobbyError> {
    if username.is_empty() {
        return Err(LobbyError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(LobbyError::MissingField("password"));
    }

    let existing = find_by_username(store, role, username).await?;
    if existing.is_some() {
        return Err(LobbyError::AlreadyExists);
    }

    let mut data = Document::new();
    data.insert("username".to_string(), json!(username));
    data.insert("passwordHash".to_string(), json!(sha256_hex(password)));

    let created = store
        .create(role.collection(), data)
        .await
        .map_err(store_err)?;
    let user_id = created["id"].as_str().unwrap_or_default().to_string();

    Ok(Registered {
        user_id,
        name: username.to_string(),
    })
}

pub async fn login(
    store: &dyn StorePort,
    sessions: &SessionTable,
    role: Role,
    username: &str,
    password: &str,
) -> Result<Session, LobbyError> {
    let record = find_by_username(store, role, username)
        .await?
        .ok_or(LobbyError::InvalidCredentials)?;

    let stored_hash = record.get("passwordHash").and_then(Value::as_str);
    if stored_hash != Some(sha256_hex(password).as_str()) {
        return Err(LobbyError::InvalidCredentials);
    }

    if record.get("online") == Some(&Value::Bool(true)) {
        return Err(LobbyError::AlreadyOnline);
    }

    let user_id = record["id"].as_str().unwrap_or_default().to_string();

    let mut patch = Document::new();
    patch.insert("online".to_string(), json!(true));
    patch.insert("lastLoginAt".to_string(), json!(Utc::now().to_rfc3339()));
    store
        .update(role.collection(), &user_id, patch)
        .await
        .map_err(store_err)?;

    let session = Session {
        session_id: Uuid::new_v4().to_string(),
        user_id,
        name: username.to_string(),
    };
    sessions.insert(session.clone()).await;
    Ok(session)
}

pub async fn logout(
    store: &dyn StorePort,
    sessions: &SessionTable,
    role: Role,
    session_id: &str,
) -> Result<(), LobbyError> {
    let session = sessions
        .remove(session_id)
        .await
        .ok_or(LobbyError::InvalidSession)?;

    let mut patch = Document::new();
    patch.insert("online".to_string(), json!(false));
    match store.update(role.collection(), &session.user_id, patch).await {
        Ok(_) | Err(StoreClientError::NotFound) => Ok(()),
        Err(e) => Err(store_err(e)),
    }
}

async fn find_by_username(
    store: &dyn StorePort,
    role: Role,
    username: &str,
) -> Result<Option<Document>, LobbyError> {
    let mut filter = Document::new();
    filter.insert("username".to_string(), json!(username));
    let matches = store
        .query(role.collection(), filter)
        .await
        .map_err(store_err)?;
    Ok(matches.into_iter().next())
}

fn store_err(e: StoreClientError) -> LobbyError {
    match e {
        StoreClientError::NotFound => LobbyError::GameNotFound,
        StoreClientError::Transport(msg) => LobbyError::Store(msg),
        StoreClientError::Upstream(msg) => LobbyError::Store(msg),
    }
}
