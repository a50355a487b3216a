use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::controller::{
    GameEvent, Phase, Resolution, SharedController, TurnController, lock_controller, run_deferred,
};
use crate::game::{GameError, PlayerIdentity, Position};
use crate::session::{GameMode, SessionConfig};

#[derive(Clone)]
pub struct AppState {
    controller: SharedController,
}

impl AppState {
    pub fn new(config: SessionConfig) -> Self {
        AppState {
            controller: Arc::new(Mutex::new(TurnController::new(config))),
        }
    }

    pub fn controller(&self) -> &SharedController {
        &self.controller
    }
}

#[derive(Serialize)]
pub struct GameResponse {
    /// `grid[x][y]`: 0 empty, otherwise the player's ordinal
    grid: Vec<Vec<u8>>,
    grid_size: usize,
    current_player: PlayerIdentity,
    last_move: Option<Position>,
    phase: Phase,
    mode: Option<GameMode>,
    winner: Option<PlayerIdentity>,
    played: usize,
    undone: usize,
    events: Vec<GameEvent>,
    message: String,
}

#[derive(Serialize, Deserialize)]
pub struct MoveRequest {
    /// Signed so clicks in the board margin arrive as out-of-bounds moves
    x: i64,
    y: i64,
}

#[derive(Serialize, Deserialize)]
pub struct ModeRequest {
    mode: GameMode,
}

struct ApiError(GameError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            GameError::OutOfBounds { .. } | GameError::GridTooSmall(_) => StatusCode::BAD_REQUEST,
            GameError::CellOccupied(_)
            | GameError::HistoryExhausted
            | GameError::InvalidTransition { .. } => StatusCode::CONFLICT,
        };
        (
            status,
            Json(serde_json::json!({
                "error": self.0.to_string()
            })),
        )
            .into_response()
    }
}

fn drain_events(rx: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}

fn game_response(game: &TurnController, events: Vec<GameEvent>, message: String) -> GameResponse {
    let session = game.session();
    GameResponse {
        grid: session.current().ordinals(),
        grid_size: session.grid_size().max_index(),
        current_player: session.mover().identity(),
        last_move: session.current().last_move(),
        phase: game.phase(),
        mode: session.mode(),
        winner: session.winner().map(|p| p.identity()),
        played: session.history().played().len(),
        undone: session.history().undone().len(),
        events,
        message,
    }
}

fn turn_message(game: &TurnController) -> String {
    match game.phase() {
        Phase::ChoosingMode => "Choose a game mode".to_string(),
        Phase::Ended => match game.session().winner() {
            Some(winner) => format!("{} wins!", winner.identity().name),
            None => "Game over".to_string(),
        },
        Phase::Ready | Phase::Resolving => format!("{} to play", game.mover().identity().name),
    }
}

/// Run one synchronous command against the controller and collect the
/// events it raised
fn run_command<F>(app_state: &AppState, command: F) -> Result<Json<GameResponse>, ApiError>
where
    F: FnOnce(&mut TurnController) -> Result<(), GameError>,
{
    let mut game = lock_controller(&app_state.controller);
    let mut rx = game.subscribe();
    command(&mut *game).map_err(ApiError)?;
    let message = turn_message(&game);
    Ok(Json(game_response(&game, drain_events(&mut rx), message)))
}

async fn get_game_state(State(app_state): State<AppState>) -> Json<GameResponse> {
    let game = lock_controller(&app_state.controller);
    let message = turn_message(&game);
    Json(game_response(&game, Vec::new(), message))
}

async fn restart(State(app_state): State<AppState>) -> Result<Json<GameResponse>, ApiError> {
    run_command(&app_state, |game| {
        game.restart();
        Ok(())
    })
}

async fn choose_mode(
    State(app_state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    run_command(&app_state, |game| game.choose_mode(req.mode))
}

async fn undo(State(app_state): State<AppState>) -> Result<Json<GameResponse>, ApiError> {
    run_command(&app_state, |game| game.undo())
}

async fn redo(State(app_state): State<AppState>) -> Result<Json<GameResponse>, ApiError> {
    run_command(&app_state, |game| game.redo())
}

#[axum::debug_handler]
async fn make_move(
    State(app_state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut rx = {
        let mut game = lock_controller(&app_state.controller);
        let rx = game.subscribe();
        let pos = game.session().grid_size().position(req.x, req.y).map_err(ApiError)?;
        game.place_move(pos).map_err(ApiError)?;
        rx
    }; // Guard dropped here, other commands see `Resolving` until judged

    let resolution = run_deferred(&app_state.controller).await;

    let game = lock_controller(&app_state.controller);
    let message = match resolution {
        Resolution::NoMove => "Computer could not find a move".to_string(),
        _ => turn_message(&game),
    };
    Ok(Json(game_response(&game, drain_events(&mut rx), message)))
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/game-state", get(get_game_state))
        .route("/api/restart", post(restart))
        .route("/api/mode", post(choose_mode))
        .route("/api/move", post(make_move))
        .route("/api/undo", post(undo))
        .route("/api/redo", post(redo))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

pub async fn run_server(
    config: SessionConfig,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, grid = %config.grid_size, "gobang server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
