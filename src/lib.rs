pub mod bot;
pub mod controller;
pub mod game;
pub mod heuristic;
pub mod history;
pub mod session;
pub mod web;
pub mod win;

pub use bot::*;
pub use controller::*;
pub use game::*;
pub use heuristic::{Candidate, HeuristicState, choose_move};
pub use history::HistoryManager;
pub use session::*;
pub use win::check_winner;
