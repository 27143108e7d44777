pub mod game_service;
pub mod local_game;
pub mod selector;
pub mod stats;
pub mod terminal;
