use crate::{
    auth::PlayerId,
    error::GameError,
    game::{
        session::{HintReport, SelectionReport},
        Completion, GameSession, GridGenerator, SelectionOutcome,
    },
    models::{GenerationResult, LevelData},
    websocket::messages::{ClientMessage, ServerMessage},
    ActiveSession, AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use rand::{rngs::StdRng, SeedableRng};
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

/// WebSocket upgrade handler for an identified player
pub async fn handle_websocket(
    player: PlayerId,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection requested by player {}", player.as_str());
    ws.on_upgrade(move |socket| handle_socket(socket, state, player))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, player: PlayerId) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    tracing::info!("WebSocket connection established for player {}", player.as_str());

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let player_for_recv = player.clone();
    let state_for_recv = state.clone();
    let tx_for_recv = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut current: Option<Uuid> = None;
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) = handle_client_message(
                            client_msg,
                            &state_for_recv,
                            &tx_for_recv,
                            &player_for_recv,
                            &mut current,
                        )
                        .await
                        {
                            tracing::debug!("Refused message from {}: {}", player_for_recv.as_str(), e);
                            let error_msg = ServerMessage::Error {
                                message: e.to_string(),
                            };
                            let _ = tx_for_recv.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx_for_recv.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected: {}", player_for_recv.as_str());
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    // Drop any attempt still bound to this connection
    state.sessions.retain(|_, session| !session.tx.same_channel(&tx));

    tracing::info!("WebSocket connection closed for player {}", player.as_str());
}

/// Messages produced by one game action, plus the end of the attempt if it ended
struct Outcome {
    level: u32,
    messages: Vec<ServerMessage>,
    completion: Option<Completion>,
}

/// Handle individual client messages
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    player: &PlayerId,
    current: &mut Option<Uuid>,
) -> anyhow::Result<()> {
    let now = Instant::now();

    match msg {
        ClientMessage::StartLevel { level } => {
            let data = state.levels.level(level).ok_or(GameError::UnknownLevel(level))?;
            let progress = state.progress.load(player.as_str()).await?;
            if !progress.is_unlocked(level) {
                return Err(GameError::LevelLocked(level).into());
            }

            tracing::info!("Player {} starting level {}", player.as_str(), level);
            let result = generate(state.generator.clone(), &data).await?;

            if let Some(previous) = current.take() {
                state.sessions.remove(&previous);
            }

            let session_id = Uuid::new_v4();
            let game = GameSession::new(data, result, state.settings, Instant::now());
            let started = level_started(session_id, &game);
            state.sessions.insert(
                session_id,
                ActiveSession {
                    session_id,
                    player_id: player.as_str().to_string(),
                    game,
                    tx: tx.clone(),
                },
            );
            *current = Some(session_id);
            tx.send(started).await?;
            finish_if_complete(state, tx, player, *current).await?;
        }
        ClientMessage::SelectCells { cells } => {
            let outcome = with_game(state, *current, |game| {
                let report = game.submit(&cells, now)?;
                Ok(selection_outcome(game, report))
            })?;
            deliver(state, tx, player, outcome).await?;
        }
        ClientMessage::PointerDown { cell } => {
            let cells = with_game(state, *current, |game| game.pointer_down(cell))?;
            tx.send(ServerMessage::SelectionUpdated { cells }).await?;
        }
        ClientMessage::PointerMove { cell } => {
            let cells = with_game(state, *current, |game| game.pointer_move(cell))?;
            if let Some(cells) = cells {
                tx.send(ServerMessage::SelectionUpdated { cells }).await?;
            }
        }
        ClientMessage::PointerUp => {
            let outcome = with_game(state, *current, |game| {
                let report = game.pointer_up(now)?;
                Ok(selection_outcome(game, report))
            })?;
            deliver(state, tx, player, outcome).await?;
        }
        ClientMessage::UseHint => {
            let outcome = with_game(state, *current, |game| {
                let report = game.use_hint(&mut rand::rng(), now)?;
                Ok(hint_outcome(game, report))
            })?;
            deliver(state, tx, player, outcome).await?;
        }
        ClientMessage::Pause => {
            let left = with_game(state, *current, |game| game.pause(now))?;
            tx.send(ServerMessage::Paused {
                time_remaining: left.as_secs(),
            })
            .await?;
        }
        ClientMessage::Resume => {
            let left = with_game(state, *current, |game| game.resume(now))?;
            tx.send(ServerMessage::Resumed {
                time_remaining: left.as_secs(),
            })
            .await?;
        }
        ClientMessage::Restart => {
            let data = with_game(state, *current, |game| Ok(game.level().clone()))?;
            let result = generate(state.generator.clone(), &data).await?;
            let session_id = current.ok_or(GameError::NoActiveSession)?;
            let started = with_game(state, *current, |game| {
                game.restart(result, Instant::now());
                Ok(level_started(session_id, game))
            })?;
            tracing::info!("Player {} restarted level {}", player.as_str(), data.level);
            tx.send(started).await?;
            finish_if_complete(state, tx, player, *current).await?;
        }
        ClientMessage::Quit => {
            let session_id = current.take().ok_or(GameError::NoActiveSession)?;
            state.sessions.remove(&session_id);
            tx.send(ServerMessage::LevelQuit).await?;
        }
    }

    Ok(())
}

/// Report a freshly started attempt that has nothing left to find
async fn finish_if_complete(
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    player: &PlayerId,
    current: Option<Uuid>,
) -> anyhow::Result<()> {
    let outcome = with_game(state, current, |game| {
        Ok(Outcome {
            level: game.level().level,
            messages: Vec::new(),
            completion: game.complete_if_done(Instant::now()),
        })
    })?;
    deliver(state, tx, player, outcome).await
}

/// Run `f` against the connection's current attempt.
/// The session entry stays locked for the duration of `f`, so it must not await.
fn with_game<T>(
    state: &AppState,
    current: Option<Uuid>,
    f: impl FnOnce(&mut GameSession) -> Result<T, GameError>,
) -> Result<T, GameError> {
    let session_id = current.ok_or(GameError::NoActiveSession)?;
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or(GameError::NoActiveSession)?;
    f(&mut session.game)
}

/// Build a grid for `level` on the blocking pool
async fn generate(generator: GridGenerator, level: &LevelData) -> anyhow::Result<GenerationResult> {
    let words = level.words.clone();
    let grid_size = level.grid_size;
    let result = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::from_os_rng();
        generator.generate(&words, grid_size, &mut rng)
    })
    .await?;

    if result.placements().len() < level.words.len() {
        tracing::warn!(
            "Level {}: placed {} of {} words",
            level.level,
            result.placements().len(),
            level.words.len()
        );
    }
    Ok(result)
}

fn level_started(session_id: Uuid, game: &GameSession) -> ServerMessage {
    let level = game.level();
    ServerMessage::LevelStarted {
        session_id,
        level: level.level,
        difficulty: level.difficulty,
        grid: game.grid().clone(),
        words: game.placed_words(),
        time_limit: level.time_limit,
        hints_remaining: game.hints_remaining(),
        score: game.score(),
    }
}

/// Score shown with the last word, before any time bonus was added
fn score_before_bonus(game: &GameSession, completion: Option<&Completion>) -> u32 {
    completion.map_or(game.score(), |c| c.score.saturating_sub(c.time_bonus))
}

fn selection_outcome(game: &GameSession, report: SelectionReport) -> Outcome {
    let total_words = game.placed_words().len();
    let mut messages = Vec::new();

    match report.outcome {
        SelectionOutcome::Found(record) => messages.push(ServerMessage::WordFound {
            word: record.word,
            cells: record.cells,
            order: game.found_words().len(),
            points: report.points,
            score: score_before_bonus(game, report.completion.as_ref()),
            found_count: game.found_words().len(),
            total_words,
        }),
        SelectionOutcome::AlreadyFound(word) => {
            messages.push(ServerMessage::AlreadyFound { word })
        }
        // A selection that arrived after time ran out only reports the loss
        SelectionOutcome::NoMatch if report.completion.is_some() => {}
        SelectionOutcome::NoMatch => messages.push(ServerMessage::NoMatch),
    }

    Outcome {
        level: game.level().level,
        messages,
        completion: report.completion,
    }
}

fn hint_outcome(game: &GameSession, report: HintReport) -> Outcome {
    Outcome {
        level: game.level().level,
        messages: vec![ServerMessage::HintRevealed {
            word: report.record.word,
            cells: report.record.cells,
            hints_remaining: report.hints_remaining,
        }],
        completion: report.completion,
    }
}

/// Send the messages of an action; a won attempt is saved before it is reported
async fn deliver(
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    player: &PlayerId,
    outcome: Outcome,
) -> anyhow::Result<()> {
    for message in outcome.messages {
        tx.send(message).await?;
    }

    let Some(completion) = outcome.completion else {
        return Ok(());
    };

    let progress = if completion.won {
        match state
            .progress
            .record_completion(player.as_str(), outcome.level, completion.score)
            .await
        {
            Ok(progress) => {
                tracing::info!(
                    "Player {} completed level {} with {} points",
                    player.as_str(),
                    outcome.level,
                    completion.score
                );
                Some(progress)
            }
            Err(e) => {
                tracing::error!("Failed to save progress for {}: {}", player.as_str(), e);
                None
            }
        }
    } else {
        None
    };

    tx.send(ServerMessage::level_complete(&completion, progress.as_ref()))
        .await?;
    Ok(())
}
