//! Text front end: prints the board and turns typed cell numbers into moves.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tic_tac_toe_core::{ServerEvent, Winner};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::game_service::{GameService, OnlineGame};
use crate::local_game::LocalGame;
use crate::selector::HUMAN;
use crate::stats::KeyValueStore;

const HELP: &str = "Type a cell 1-9, `r` to restart, `q` to quit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cell(usize),
    Restart,
    Quit,
}

/// Cells are typed 1-9 and map to board indices 0-8.
pub fn parse_command(input: &str) -> Option<Command> {
    match input.trim() {
        "q" | "quit" | "exit" => Some(Command::Quit),
        "r" | "restart" => Some(Command::Restart),
        other => match other.parse::<usize>() {
            Ok(cell @ 1..=9) => Some(Command::Cell(cell - 1)),
            _ => None,
        },
    }
}

fn result_line(winner: Winner) -> String {
    match winner {
        Winner::Draw => "It's a draw!".to_string(),
        mark => format!("Player {} wins!", mark),
    }
}

pub fn run_local<S: KeyValueStore>(game: &mut LocalGame<S>) -> Result<()> {
    println!("You are {}. {}", HUMAN, HELP);
    println!("{}", game.board());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush().context("flushing stdout")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("reading stdin")?;

        match parse_command(&line) {
            Some(Command::Quit) => return Ok(()),
            Some(Command::Restart) => {
                game.restart();
                debug!("Local game restarted with {:?}", game.strategy());
                println!("{}", game.board());
            }
            Some(Command::Cell(index)) => match game.play(index) {
                Ok(reply) => {
                    if let Some(cell) = reply {
                        println!("Computer plays {}", cell + 1);
                    }
                    println!("{}", game.board());
                    if let Some(winner) = game.winner() {
                        println!("{}", result_line(winner));
                        let stats = game.stats().stats(HUMAN);
                        println!(
                            "You: {} wins, {} draws, {} games. `r` to play again.",
                            stats.wins, stats.draws, stats.games_played
                        );
                    }
                }
                Err(e) => println!("{}", e),
            },
            None => println!("{}", HELP),
        }
    }
}

pub async fn run_online(server: &str, room_id: &str, create: bool) -> Result<()> {
    let (service, mut events) = GameService::connect(server)
        .await
        .with_context(|| format!("connecting to {}", server))?;
    if create {
        service.create_room(room_id).await?;
    } else {
        service.join_room(room_id).await?;
    }

    let mut game = OnlineGame::new(room_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Room {}. {}", room_id, HELP);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    println!("Connection closed by server.");
                    break;
                };
                game.apply(&event);
                render_online(&game, &event);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Restart) => {
                        service.restart_game(room_id).await?;
                        println!("Room {} closed after restart. Create or join again to keep playing.", room_id);
                    }
                    Some(Command::Cell(index)) => match game.player {
                        Some(player) => service.make_move(room_id, index, player).await?,
                        None => println!("No seat in room {} yet.", room_id),
                    },
                    None => println!("{}", HELP),
                }
            }
        }
    }

    if let Err(e) = service.close().await {
        debug!("Closing socket: {}", e);
    }
    Ok(())
}

fn render_online(game: &OnlineGame, event: &ServerEvent) {
    match event {
        ServerEvent::PlayerAssignment { player, .. } => println!("You are {}.", player),
        ServerEvent::UpdateBoard(_) => {
            println!("{}", game.board);
            match (game.winner, game.turn) {
                (Some(winner), _) => println!("{}", result_line(winner)),
                (None, Some(turn)) if game.is_my_turn() => println!("Your move ({}).", turn),
                (None, Some(turn)) => println!("Waiting for {}.", turn),
                (None, None) => {}
            }
        }
        _ => {
            if let Some(notice) = &game.notice {
                println!("{}", notice);
            }
        }
    }
}
