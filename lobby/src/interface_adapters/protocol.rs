// Maps one `protocol::Request` onto a lobby use case and back onto a
// `protocol::Response`. `state.role` narrows the verb set: developer
// and player lobbies share this single dispatcher, differing only in
// which `action` strings they accept.

use protocol::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{LobbyError, Role};
use crate::use_cases::{auth, games, rooms};

use super::state::{AppState, ConnectionState};

pub async fn dispatch(state: &AppState, conn: &mut ConnectionState, request: Request) -> Response {
    let action = request.action.as_str();

    if action != "register" && action != "login" {
        match require_session(state, conn, &request).await {
            Ok(_) => {}
            Err(e) => return error_response(e),
        }
    }

    let result = match action {
        "register" => handle_register(state, request).await,
        "login" => handle_login(state, conn, request).await,
        "logout" => handle_logout(state, conn).await,
        "list-games" => handle_list_games(state, conn).await,
        "upload-game" if state.role == Role::Developer => handle_upload_game(state, conn, request).await,
        "update-game" if state.role == Role::Developer => handle_update_game(state, request).await,
        "delete-game" if state.role == Role::Developer => handle_delete_game(state, request).await,
        "rooms" if state.role == Role::Player => handle_rooms(state, conn).await,
        "create-room" if state.role == Role::Player => handle_create_room(state, conn, request).await,
        "join-room" if state.role == Role::Player => handle_join_room(state, conn, request).await,
        "delete-room" if state.role == Role::Player => handle_delete_room(state, conn, request).await,
        other => Err(LobbyError::UnknownAction(other.to_string())),
    };

    match result {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

fn error_response(e: LobbyError) -> Response {
    Response::error(e.message())
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn handle_register(state: &AppState, request: Request) -> Result<Response, LobbyError> {
    let creds: Credentials =
        serde_json::from_value(request.data).map_err(|_| LobbyError::MissingField("username"))?;
    let registered = auth::register(state.store.as_ref(), state.role, &creds.username, &creds.password).await?;
    Ok(Response::ok(json!({"userId": registered.user_id, "name": registered.name})))
}

async fn handle_login(
    state: &AppState,
    conn: &mut ConnectionState,
    request: Request,
) -> Result<Response, LobbyError> {
    let creds: Credentials =
        serde_json::from_value(request.data).map_err(|_| LobbyError::MissingField("username"))?;
    let session = auth::login(
        state.store.as_ref(),
        &state.sessions,
        state.role,
        &creds.username,
        &creds.password,
    )
    .await?;
    conn.session_id = Some(session.session_id.clone());
    Ok(Response::ok(
        json!({"sessionID": session.session_id, "userId": session.user_id, "name": session.name}),
    ))
}

async fn handle_logout(state: &AppState, conn: &mut ConnectionState) -> Result<Response, LobbyError> {
    if let Some(session_id) = conn.session_id.take() {
        auth::logout(state.store.as_ref(), &state.sessions, state.role, &session_id).await?;
    }
    Ok(Response::ok_empty())
}

async fn handle_list_games(state: &AppState, conn: &ConnectionState) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let summaries = match state.role {
        Role::Developer => games::list_games_for_owner(state.store.as_ref(), &session.name).await?,
        Role::Player => games::list_all_games(state.store.as_ref()).await?,
    };
    let data = summaries
        .into_iter()
        .map(|g| match state.role {
            Role::Developer => json!({"gameId": g.game_id, "gameName": g.game_name, "owner": g.owner}),
            Role::Player => json!({
                "gameId": g.game_id,
                "gameName": g.game_name,
                "owner": g.owner,
                "description": g.description,
            }),
        })
        .collect::<Vec<_>>();
    Ok(Response::ok(json!(data)))
}

#[derive(Deserialize)]
struct UploadPayload {
    #[serde(rename = "gameName")]
    game_name: String,
    files: Vec<UploadFilePayload>,
}

#[derive(Deserialize)]
struct UploadFilePayload {
    filename: String,
    content: String,
}

async fn handle_upload_game(
    state: &AppState,
    conn: &ConnectionState,
    request: Request,
) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let payload: UploadPayload =
        serde_json::from_value(request.data).map_err(|_| LobbyError::NotEnoughFiles)?;
    let files: Vec<games::UploadFile> = payload
        .files
        .into_iter()
        .map(|f| games::UploadFile {
            filename: f.filename,
            content_b64: f.content,
        })
        .collect();
    let uploaded = games::upload_game(
        state.store.as_ref(),
        &state.games_root,
        &session.name,
        &payload.game_name,
        &files,
    )
    .await?;
    Ok(Response::ok(json!({"gameId": uploaded.game_id, "folder": uploaded.folder})))
}

async fn handle_update_game(state: &AppState, request: Request) -> Result<Response, LobbyError> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(rename = "gameId")]
        game_id: String,
        files: Vec<UploadFilePayload>,
    }
    let payload: Payload = serde_json::from_value(request.data).map_err(|_| LobbyError::GameNotFound)?;
    let files: Vec<games::UploadFile> = payload
        .files
        .into_iter()
        .map(|f| games::UploadFile {
            filename: f.filename,
            content_b64: f.content,
        })
        .collect();
    games::update_game(state.store.as_ref(), &payload.game_id, &files).await?;
    Ok(Response::ok_empty())
}

async fn handle_delete_game(state: &AppState, request: Request) -> Result<Response, LobbyError> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(rename = "gameId")]
        game_id: String,
    }
    let payload: Payload = serde_json::from_value(request.data).map_err(|_| LobbyError::GameNotFound)?;
    games::delete_game(state.store.as_ref(), &payload.game_id).await?;
    Ok(Response::ok_empty())
}

async fn handle_rooms(state: &AppState, conn: &ConnectionState) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let rooms = rooms::list_rooms(state.store.as_ref(), &session.name).await?;
    Ok(Response::ok(json!(rooms)))
}

#[derive(Deserialize)]
struct CreateRoomPayload {
    #[serde(rename = "gameId")]
    game_id: String,
    #[serde(default = "default_visibility")]
    visibility: String,
    #[serde(default)]
    invite: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_visibility() -> String {
    "public".to_string()
}

async fn handle_create_room(
    state: &AppState,
    conn: &ConnectionState,
    request: Request,
) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let payload: CreateRoomPayload =
        serde_json::from_value(request.data).map_err(|_| LobbyError::GameNotFound)?;
    let created = rooms::create_room(
        state.store.clone(),
        state.room_registry.clone(),
        state.spawner.as_ref(),
        &state.host,
        state.ports.as_ref(),
        &session.name,
        &payload.game_id,
        &payload.visibility,
        payload.invite.as_deref(),
        payload.seed,
    )
    .await?;
    Ok(Response::ok(json!({"id": created.id, "port": created.port})))
}

#[derive(Deserialize)]
struct JoinRoomPayload {
    id: String,
    role: String,
}

async fn handle_join_room(
    state: &AppState,
    conn: &ConnectionState,
    request: Request,
) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let payload: JoinRoomPayload =
        serde_json::from_value(request.data).map_err(|_| LobbyError::RoomNotFound)?;
    let joined = rooms::join_room(
        state.store.as_ref(),
        state.room_registry.as_ref(),
        &payload.id,
        &session.name,
        &payload.role,
    )
    .await?;
    Ok(Response::ok(json!({
        "id": joined.id,
        "port": joined.port,
        "role": joined.role,
        "clientCode": joined.client_code_b64,
        "gameName": joined.game_name,
        "owner": joined.owner,
    })))
}

#[derive(Deserialize)]
struct DeleteRoomPayload {
    id: String,
}

async fn handle_delete_room(
    state: &AppState,
    conn: &ConnectionState,
    request: Request,
) -> Result<Response, LobbyError> {
    let session = current_session(state, conn).await?;
    let payload: DeleteRoomPayload =
        serde_json::from_value(request.data).map_err(|_| LobbyError::RoomNotFound)?;
    rooms::delete_room(state.store.as_ref(), state.room_registry.as_ref(), &payload.id, &session.name).await?;
    Ok(Response::ok_empty())
}

async fn current_session(
    state: &AppState,
    conn: &ConnectionState,
) -> Result<crate::domain::Session, LobbyError> {
    let session_id = conn.session_id.as_deref().ok_or(LobbyError::MissingSession)?;
    state
        .sessions
        .get(session_id)
        .await
        .ok_or(LobbyError::InvalidSession)
}

async fn require_session(
    state: &AppState,
    conn: &ConnectionState,
    request: &Request,
) -> Result<(), LobbyError> {
    let claimed = request
        .data
        .get("sessionID")
        .and_then(|v| v.as_str())
        .ok_or(LobbyError::MissingSession)?;
    match &conn.session_id {
        Some(bound) if bound == claimed => {}
        _ => return Err(LobbyError::InvalidSession),
    }
    if state.sessions.get(claimed).await.is_none() {
        return Err(LobbyError::InvalidSession);
    }
    Ok(())
}
