// Drives a real player lobby (and a real store behind it) over raw TCP
// connections, exercising registration/login/room-listing end to end.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use lobby::domain::Role;
use protocol::{Request, Response, Status, read_frame, write_frame};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};

async fn spawn_store() -> std::net::SocketAddr {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("store.json");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        store::run_with_listener(listener, &data_path).await;
        drop(dir);
    });
    addr
}

async fn spawn_lobby(role: Role, store_addr: std::net::SocketAddr) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store_addr = store_addr.to_string();
    let games_dir = tempfile::tempdir().unwrap();

    tokio::spawn(async move {
        let games_root = games_dir.path().to_path_buf();
        lobby::frameworks::server::run_with_listener(listener, role, &store_addr, games_root).await;
        drop(games_dir);
    });
    addr
}

async fn roundtrip(stream: &mut TcpStream, action: &str, data: serde_json::Value) -> Response {
    write_frame(
        stream,
        &Request {
            action: action.to_string(),
            data,
        },
    )
    .await
    .unwrap();
    read_frame(stream).await.unwrap()
}

#[tokio::test]
async fn register_then_login_then_list_games_is_empty() {
    let store_addr = spawn_store().await;
    let lobby_addr = spawn_lobby(Role::Developer, store_addr).await;
    let mut conn = TcpStream::connect(lobby_addr).await.unwrap();

    let registered = roundtrip(
        &mut conn,
        "register",
        json!({"username": "alice", "password": "pw"}),
    )
    .await;
    assert_eq!(registered.status, Status::Success);

    let logged_in = roundtrip(
        &mut conn,
        "login",
        json!({"username": "alice", "password": "pw"}),
    )
    .await;
    assert_eq!(logged_in.status, Status::Success);
    let session_id = logged_in.data.unwrap()["sessionID"].as_str().unwrap().to_string();

    let games = roundtrip(&mut conn, "list-games", json!({"sessionID": session_id})).await;
    assert_eq!(games.status, Status::Success);
    assert_eq!(games.data.unwrap().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn second_login_without_logout_is_rejected() {
    let store_addr = spawn_store().await;
    let lobby_addr = spawn_lobby(Role::Player, store_addr).await;

    let mut first = TcpStream::connect(lobby_addr).await.unwrap();
    roundtrip(&mut first, "register", json!({"username": "bob", "password": "pw"})).await;
    let first_login = roundtrip(&mut first, "login", json!({"username": "bob", "password": "pw"})).await;
    assert_eq!(first_login.status, Status::Success);

    let mut second = TcpStream::connect(lobby_addr).await.unwrap();
    let second_login = roundtrip(&mut second, "login", json!({"username": "bob", "password": "pw"})).await;
    assert_eq!(second_login.status, Status::Error);
    assert_eq!(second_login.error_msg.unwrap(), "User already online.");
}

#[tokio::test]
async fn actions_without_a_session_are_rejected() {
    let store_addr = spawn_store().await;
    let lobby_addr = spawn_lobby(Role::Developer, store_addr).await;
    let mut conn = TcpStream::connect(lobby_addr).await.unwrap();

    let response = roundtrip(&mut conn, "list-games", json!({})).await;
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.error_msg.unwrap(), "Missing sessionID.");
}

#[tokio::test]
async fn upload_game_then_list_games_shows_owner_only() {
    let store_addr = spawn_store().await;
    let lobby_addr = spawn_lobby(Role::Developer, store_addr).await;
    let mut conn = TcpStream::connect(lobby_addr).await.unwrap();

    roundtrip(&mut conn, "register", json!({"username": "alice", "password": "pw"})).await;
    let login = roundtrip(&mut conn, "login", json!({"username": "alice", "password": "pw"})).await;
    let session_id = login.data.unwrap()["sessionID"].as_str().unwrap().to_string();

    let uploaded = roundtrip(
        &mut conn,
        "upload-game",
        json!({
            "sessionID": session_id,
            "gameName": "tet",
            "files": [
                {"filename": "server.py", "content": BASE64.encode(b"print('server')")},
                {"filename": "client.py", "content": BASE64.encode(b"print('client')")},
            ],
        }),
    )
    .await;
    assert_eq!(uploaded.status, Status::Success);

    let games = roundtrip(&mut conn, "list-games", json!({"sessionID": session_id})).await;
    let games = games.data.unwrap();
    let games = games.as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["owner"], json!("alice"));
}
