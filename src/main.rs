mod auth;
mod config;
mod db;
mod error;
mod game;
mod levels;
mod models;
mod routes;
mod utils;
mod websocket;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use config::Config;
use dashmap::DashMap;
use db::{MemoryProgressStore, PgProgressStore, ProgressStore};
use game::{GameSession, GridGenerator, SessionSettings, SessionStatus};
use levels::LevelCatalog;
use tokio::sync::mpsc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use websocket::messages::ServerMessage;

/// How often running attempts are ticked
pub const SESSION_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// How long a finished attempt stays available for a restart
pub const FINISHED_SESSION_GRACE_PERIOD: Duration = Duration::from_secs(600);

/// A level attempt bound to one WebSocket connection
#[derive(Debug)]
pub struct ActiveSession {
    pub session_id: Uuid,
    pub player_id: String,
    pub game: GameSession,
    pub tx: mpsc::Sender<ServerMessage>,
}

/// Application state shared across all handlers
pub struct AppState {
    pub levels: LevelCatalog,
    pub progress: Arc<dyn ProgressStore>,
    pub generator: GridGenerator,
    pub settings: SessionSettings,
    /// Attempts in progress, keyed by session id
    pub sessions: DashMap<Uuid, ActiveSession>,
}

impl AppState {
    pub fn new(config: &Config, levels: LevelCatalog, progress: Arc<dyn ProgressStore>) -> Self {
        Self {
            generator: config.game.generator(),
            settings: config.game.session_settings(),
            levels,
            progress,
            sessions: DashMap::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordsearch_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting word search backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Progress goes to Postgres when a database is configured
    let progress: Arc<dyn ProgressStore> = match config.database_url() {
        Some(url) => {
            let db = db::create_pool(url, config.database.max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&db).await?;
            tracing::info!("Database migrations completed");

            Arc::new(PgProgressStore::new(db, config.game.max_level))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Player progress is kept in memory only.");
            Arc::new(MemoryProgressStore::new(config.game.max_level))
        }
    };

    // Load level definitions
    let levels = match LevelCatalog::load(&config.game.levels_dir, config.game.max_level).await {
        Ok(levels) => levels,
        Err(e) => {
            tracing::warn!("Failed to load levels: {:#}. Every level uses the default word list.", e);
            LevelCatalog::empty(config.game.max_level)
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(&config, levels, progress));

    // Spawn background task driving level timers
    let timer_state = state.clone();
    tokio::spawn(async move {
        session_timer_task(timer_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new(&config.server.frontend_dir);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Game frontend: http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that ticks running attempts once a second
async fn session_timer_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_TICK_INTERVAL);

    loop {
        interval.tick().await;

        for (tx, message) in sweep_sessions(&state.sessions, Instant::now()) {
            let _ = tx.send(message).await;
        }
    }
}

/// Advance every attempt to `now`: ticks running clocks, ends attempts whose
/// time ran out, and drops finished or abandoned ones after the grace period.
/// Returns the messages to deliver; no session lock is held once it returns.
fn sweep_sessions(
    sessions: &DashMap<Uuid, ActiveSession>,
    now: Instant,
) -> Vec<(mpsc::Sender<ServerMessage>, ServerMessage)> {
    let mut outbox = Vec::new();
    let mut sessions_to_remove = Vec::new();

    for mut entry in sessions.iter_mut() {
        let session = entry.value_mut();

        if session.tx.is_closed() {
            sessions_to_remove.push(session.session_id);
            continue;
        }

        match session.game.status() {
            SessionStatus::Playing => {
                let message = match session.game.expire_if_due(now) {
                    Some(completion) => {
                        tracing::info!(
                            "Player {} ran out of time on level {}",
                            session.player_id,
                            session.game.level().level
                        );
                        ServerMessage::level_complete(&completion, None)
                    }
                    None => ServerMessage::TimerTick {
                        time_remaining: session.game.time_remaining(now).as_secs(),
                    },
                };
                outbox.push((session.tx.clone(), message));
            }
            SessionStatus::Paused => {}
            SessionStatus::Won | SessionStatus::TimedOut => {
                let expired = session.game.finished_at().is_some_and(|at| {
                    now.saturating_duration_since(at) > FINISHED_SESSION_GRACE_PERIOD
                });
                if expired {
                    sessions_to_remove.push(session.session_id);
                }
            }
        }
    }

    for session_id in sessions_to_remove {
        if sessions.remove(&session_id).is_some() {
            tracing::debug!("Removed session {}", session_id);
        }
    }

    outbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Difficulty, Direction, GenerationResult, Grid, LevelData, WordPlacement};

    fn game(now: Instant) -> GameSession {
        let level = LevelData {
            level: 1,
            difficulty: Difficulty::Easy,
            grid_size: 4,
            time_limit: 30,
            words: vec!["CAT".to_string()],
        };
        let grid = Grid::parse(&["CATD", "XYZO", "QRSG", "LMNP"]).unwrap();
        let placements =
            vec![WordPlacement::new("CAT", Cell::new(0, 0), Direction::Horizontal).unwrap()];
        let result = GenerationResult::new(grid, placements).unwrap();
        GameSession::new(level, result, SessionSettings::default(), now)
    }

    // Helper function to register a test session
    fn insert_session(
        sessions: &DashMap<Uuid, ActiveSession>,
        now: Instant,
    ) -> (Uuid, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let session_id = Uuid::new_v4();
        sessions.insert(
            session_id,
            ActiveSession {
                session_id,
                player_id: "tester".to_string(),
                game: game(now),
                tx,
            },
        );
        (session_id, rx)
    }

    #[test]
    fn test_sweep_ticks_running_sessions() {
        let sessions = DashMap::new();
        let t0 = Instant::now();
        let (_id, _rx) = insert_session(&sessions, t0);

        let outbox = sweep_sessions(&sessions, t0 + Duration::from_secs(10));
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].1, ServerMessage::TimerTick { time_remaining: 20 });
    }

    #[test]
    fn test_sweep_ends_expired_sessions_once() {
        let sessions = DashMap::new();
        let t0 = Instant::now();
        let (id, _rx) = insert_session(&sessions, t0);

        let outbox = sweep_sessions(&sessions, t0 + Duration::from_secs(31));
        assert_eq!(outbox.len(), 1);
        match &outbox[0].1 {
            ServerMessage::LevelComplete { won, .. } => assert!(!won),
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(
            sessions.get(&id).unwrap().game.status(),
            SessionStatus::TimedOut
        );

        // Finished attempts stay quiet until they are dropped
        assert!(sweep_sessions(&sessions, t0 + Duration::from_secs(32)).is_empty());
        assert!(sessions.contains_key(&id));

        sweep_sessions(
            &sessions,
            t0 + Duration::from_secs(32) + FINISHED_SESSION_GRACE_PERIOD,
        );
        assert!(!sessions.contains_key(&id));
    }

    #[test]
    fn test_sweep_skips_paused_sessions() {
        let sessions = DashMap::new();
        let t0 = Instant::now();
        let (id, _rx) = insert_session(&sessions, t0);
        sessions.get_mut(&id).unwrap().game.pause(t0).unwrap();

        assert!(sweep_sessions(&sessions, t0 + Duration::from_secs(100)).is_empty());
        assert_eq!(sessions.get(&id).unwrap().game.status(), SessionStatus::Paused);
    }

    #[test]
    fn test_sweep_drops_sessions_without_a_connection() {
        let sessions = DashMap::new();
        let t0 = Instant::now();
        let (id, rx) = insert_session(&sessions, t0);
        drop(rx);

        assert!(sweep_sessions(&sessions, t0).is_empty());
        assert!(!sessions.contains_key(&id));
    }
}
