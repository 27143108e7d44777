//! End-to-end checks against a live server on an ephemeral port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use tic_tac_toe_core::{ClientEvent, Mark, MoveRequest, ServerEvent, Winner};
use tic_tac_toe_server::{app, app_state::AppState, config::ServerConfig, game::DisconnectReport};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;
use tungstenite::Message;
use uuid::Uuid;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (SocketAddr, Arc<AppState>) {
    let state = Arc::new(AppState::new(DisconnectReport::TurnDerived));
    let router = app(Arc::clone(&state), &ServerConfig::default()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: SocketAddr) -> Client {
    let (socket, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    socket
}

async fn send(client: &mut Client, event: &ClientEvent) {
    let text = serde_json::to_string(event).unwrap();
    client.send(Message::Text(text.into())).await.unwrap();
}

async fn send_raw(client: &mut Client, text: &str) {
    client.send(Message::Text(text.to_string().into())).await.unwrap();
}

async fn recv(client: &mut Client) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for server event")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

fn play(room: &str, index: usize, player: Mark) -> ClientEvent {
    ClientEvent::MakeMove(MoveRequest {
        room_id: room.into(),
        index,
        player,
    })
}

/// Creates room `room` with `x` and joins it with `o`, draining the setup events.
async fn seat_players(room: &str, x: &mut Client, o: &mut Client) {
    send(x, &ClientEvent::CreateRoom(room.into())).await;
    assert_eq!(
        recv(x).await,
        ServerEvent::PlayerAssignment {
            player: Mark::X,
            turn: Mark::X
        }
    );

    send(o, &ClientEvent::JoinRoom(room.into())).await;
    assert_eq!(
        recv(o).await,
        ServerEvent::PlayerAssignment {
            player: Mark::O,
            turn: Mark::X
        }
    );
    for client in [&mut *x, &mut *o] {
        assert!(matches!(recv(client).await, ServerEvent::UpdateBoard(_)));
        assert_eq!(recv(client).await, ServerEvent::BothPlayersJoined);
    }
}

#[tokio::test]
async fn full_game_is_relayed_to_both_players() {
    let (addr, _) = spawn_server().await;
    let mut x = connect(addr).await;
    let mut o = connect(addr).await;
    seat_players("match", &mut x, &mut o).await;

    let moves = [(0, Mark::X), (3, Mark::O), (1, Mark::X), (4, Mark::O), (2, Mark::X)];
    for (step, (index, mark)) in moves.into_iter().enumerate() {
        let mover = if mark == Mark::X { &mut x } else { &mut o };
        send(mover, &play("match", index, mark)).await;

        for client in [&mut x, &mut o] {
            let ServerEvent::UpdateBoard(update) = recv(client).await else {
                panic!("expected board update");
            };
            assert_eq!(update.board.get(index), Some(mark));
            if step == moves.len() - 1 {
                assert_eq!(update.winner, Some(Winner::X));
                assert_eq!(update.turn, None);
            } else {
                assert_eq!(update.turn, Some(mark.opponent()));
            }
        }
    }
}

#[tokio::test]
async fn errors_go_only_to_the_sender() {
    let (addr, _) = spawn_server().await;
    let mut x = connect(addr).await;
    let mut o = connect(addr).await;
    seat_players("r1", &mut x, &mut o).await;

    send(&mut o, &ClientEvent::CreateRoom("r1".into())).await;
    assert_eq!(
        recv(&mut o).await,
        ServerEvent::RoomError {
            message: "Room already exists".into()
        }
    );

    send(&mut o, &play("r1", 4, Mark::O)).await;
    assert!(matches!(recv(&mut o).await, ServerEvent::MoveError { .. }));

    send_raw(
        &mut o,
        r#"{"event":"makeMove","data":{"roomId":"r1","index":"four","player":"O"}}"#,
    )
    .await;
    assert!(matches!(recv(&mut o).await, ServerEvent::MoveError { .. }));

    // Noise is ignored and the connection stays usable.
    send_raw(&mut o, "hello").await;
    let mut third = connect(addr).await;
    send(&mut third, &ClientEvent::JoinRoom("r1".into())).await;
    assert_eq!(
        recv(&mut third).await,
        ServerEvent::RoomError {
            message: "Room is full".into()
        }
    );

    // X saw none of it; its next event is its own move.
    send(&mut x, &play("r1", 4, Mark::X)).await;
    assert!(matches!(recv(&mut x).await, ServerEvent::UpdateBoard(_)));
    assert!(matches!(recv(&mut o).await, ServerEvent::UpdateBoard(_)));
}

#[tokio::test]
async fn closing_a_connection_notifies_the_remaining_player() {
    let (addr, state) = spawn_server().await;
    let mut x = connect(addr).await;
    let mut o = connect(addr).await;
    seat_players("g", &mut x, &mut o).await;

    o.close(None).await.unwrap();
    assert_eq!(
        recv(&mut x).await,
        ServerEvent::PlayerDisconnected { player: Mark::O }
    );

    let member_count = state
        .coordinator
        .read()
        .await
        .room("g")
        .map(|room| room.member_count());
    assert_eq!(member_count, Some(1));
    assert_eq!(state.reap().await, vec!["g".to_string()]);
}

#[tokio::test]
async fn health_reports_room_and_session_counts() {
    let state = Arc::new(AppState::new(DisconnectReport::TurnDerived));
    state
        .dispatch(Uuid::new_v4(), ClientEvent::CreateRoom("lobby".into()))
        .await;
    let router = app(Arc::clone(&state), &ServerConfig::default()).unwrap();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["rooms"], 1);
    assert_eq!(health["sessions"], 1);
}
