use std::collections::HashMap;

use tic_tac_toe_core::{ClientEvent, Mark, MoveRequest, ServerEvent};
use tracing::{debug, info, warn};

use super::error::{MoveRejection, RoomError};
use super::models::{DisconnectReport, Member, Room, Session, SessionId};

/// One outgoing event for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub to: SessionId,
    pub event: ServerEvent,
}

/// Owns every room and session. Each call runs to completion and returns the
/// events to deliver; the caller does the I/O.
#[derive(Debug, Default)]
pub struct Coordinator {
    rooms: HashMap<String, Room>,
    sessions: HashMap<SessionId, Session>,
    disconnect_report: DisconnectReport,
}

impl Coordinator {
    pub fn new(disconnect_report: DisconnectReport) -> Self {
        Coordinator {
            disconnect_report,
            ..Default::default()
        }
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, session: SessionId) -> Option<&Session> {
        self.sessions.get(&session)
    }

    pub fn connect(&mut self, session: SessionId) {
        self.sessions.entry(session).or_default();
    }

    pub fn handle(&mut self, session: SessionId, event: ClientEvent) -> Vec<Envelope> {
        self.connect(session);

        let mut out = Vec::new();
        let result = match event {
            ClientEvent::CreateRoom(room_id) => self.create_room(session, room_id, &mut out),
            ClientEvent::JoinRoom(room_id) => self.join_room(session, room_id, &mut out),
            ClientEvent::MakeMove(request) => self.make_move(request, &mut out),
            ClientEvent::RestartGame(room_id) => {
                self.restart_game(&room_id, &mut out);
                Ok(())
            }
        };

        if let Err(err) = result {
            out.push(Envelope {
                to: session,
                event: error_event(err),
            });
        }
        out
    }

    /// Reply for a `makeMove` frame that could not be decoded.
    pub fn reject_malformed_move(&self, session: SessionId) -> Vec<Envelope> {
        vec![Envelope {
            to: session,
            event: error_event(RoomError::InvalidMove(MoveRejection::Malformed)),
        }]
    }

    fn create_room(
        &mut self,
        session: SessionId,
        room_id: String,
        out: &mut Vec<Envelope>,
    ) -> Result<(), RoomError> {
        if self.rooms.contains_key(&room_id) {
            debug!("Create rejected: room {} already exists", room_id);
            return Err(RoomError::RoomExists);
        }

        let mut room = Room::default();
        room.members.push(Member {
            session,
            mark: Mark::X,
        });
        let turn = room.next_mark;
        self.rooms.insert(room_id.clone(), room);
        self.enroll(session, &room_id, Mark::X);

        info!("🆕 Room {} created by session {}", room_id, session);
        out.push(Envelope {
            to: session,
            event: ServerEvent::PlayerAssignment {
                player: Mark::X,
                turn,
            },
        });
        Ok(())
    }

    fn join_room(
        &mut self,
        session: SessionId,
        room_id: String,
        out: &mut Vec<Envelope>,
    ) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(&room_id).ok_or(RoomError::RoomNotFound)?;

        if let Some(mark) = room.mark_of(session) {
            debug!("Session {} is already in room {}", session, room_id);
            out.push(Envelope {
                to: session,
                event: ServerEvent::PlayerAssignment {
                    player: mark,
                    turn: room.next_mark,
                },
            });
            out.push(Envelope {
                to: session,
                event: ServerEvent::UpdateBoard(room.board_update()),
            });
            return Ok(());
        }

        if room.is_full() {
            debug!("Join rejected: room {} is full", room_id);
            return Err(RoomError::RoomFull);
        }

        let mark = if room.members.is_empty() {
            Mark::X
        } else {
            Mark::O
        };
        room.members.push(Member { session, mark });
        info!(
            "✅ Session {} joined room {} as {:?} ({} members)",
            session,
            room_id,
            mark,
            room.member_count()
        );

        out.push(Envelope {
            to: session,
            event: ServerEvent::PlayerAssignment {
                player: mark,
                turn: room.next_mark,
            },
        });
        let update = room.board_update();
        broadcast(room, ServerEvent::UpdateBoard(update), out);
        if room.is_full() {
            broadcast(room, ServerEvent::BothPlayersJoined, out);
        }

        self.enroll(session, &room_id, mark);
        Ok(())
    }

    fn make_move(&mut self, request: MoveRequest, out: &mut Vec<Envelope>) -> Result<(), RoomError> {
        let MoveRequest {
            room_id,
            index,
            player,
        } = request;

        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::InvalidMove(MoveRejection::RoomNotFound))?;
        let result = room
            .apply_move(index, player)
            .map_err(RoomError::InvalidMove)?;

        if result.is_decided() {
            info!("🏁 Room {} finished: {:?}", room_id, result);
        }
        let update = room.board_update();
        broadcast(room, ServerEvent::UpdateBoard(update), out);
        Ok(())
    }

    /// One-shot restart: members see an empty board, then the room is gone.
    fn restart_game(&mut self, room_id: &str, out: &mut Vec<Envelope>) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!("Restart ignored: room {} not found", room_id);
            return;
        };

        room.reset();
        let update = room.board_update();
        broadcast(room, ServerEvent::UpdateBoard(update), out);
        self.destroy_room(room_id);
        info!("🔄 Room {} restarted and closed", room_id);
    }

    /// Safe to call more than once, and after the rooms are already gone.
    pub fn disconnect(&mut self, session: SessionId) -> Vec<Envelope> {
        let mut out = Vec::new();
        let Some(state) = self.sessions.remove(&session) else {
            return out;
        };

        for (room_id, held) in state.rooms {
            let Some(room) = self.rooms.get_mut(&room_id) else {
                continue;
            };
            room.members.retain(|member| member.session != session);

            if room.members.is_empty() {
                self.rooms.remove(&room_id);
                info!("🗑️ Room {} removed: last member left", room_id);
                continue;
            }

            let player = match self.disconnect_report {
                DisconnectReport::TurnDerived => room.next_mark.opponent(),
                DisconnectReport::SessionMark => held,
            };
            info!("🔌 Session {} left room {} (reported as {:?})", session, room_id, player);
            broadcast(room, ServerEvent::PlayerDisconnected { player }, &mut out);
        }
        out
    }

    /// Removes every room that does not have two members. Returns their ids.
    pub fn reap(&mut self) -> Vec<String> {
        let abandoned: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| !room.is_full())
            .map(|(room_id, _)| room_id.clone())
            .collect();

        for room_id in &abandoned {
            self.destroy_room(room_id);
        }
        abandoned
    }

    fn enroll(&mut self, session: SessionId, room_id: &str, mark: Mark) {
        self.sessions
            .entry(session)
            .or_default()
            .rooms
            .insert(room_id.to_string(), mark);
    }

    fn destroy_room(&mut self, room_id: &str) {
        let Some(room) = self.rooms.remove(room_id) else {
            return;
        };
        for member in room.sessions() {
            match self.sessions.get_mut(&member) {
                Some(state) => {
                    state.rooms.remove(room_id);
                }
                None => warn!("Room {} listed unknown session {}", room_id, member),
            }
        }
    }
}

fn broadcast(room: &Room, event: ServerEvent, out: &mut Vec<Envelope>) {
    out.extend(room.sessions().map(|to| Envelope {
        to,
        event: event.clone(),
    }));
}

fn error_event(err: RoomError) -> ServerEvent {
    let message = err.to_string();
    match err {
        RoomError::InvalidMove(_) => ServerEvent::MoveError { message },
        _ => ServerEvent::RoomError { message },
    }
}
