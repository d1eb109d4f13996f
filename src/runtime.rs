//! Gravity scheduler and serialized command loop
//!
//! One tokio task owns the [`Game`]. User commands, gravity deadlines and
//! finished store operations all arrive through the same `select!`, so
//! transitions run strictly one at a time in arrival order. Store calls run
//! on a separate worker, in order, and their outcomes come back as messages.
//!
//! Observers get owned snapshots through a `watch` channel and discrete
//! [`RuntimeEvent`]s through a `broadcast` channel.

use crate::bag::Bag;
use crate::game::{Action, Game, GameConfig, GameEvent, GameState, Phase};
use crate::persistence::{self, GameStore, StoreError};
use crate::settings::{Difficulty, Settings};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

/// Errors returned to handle callers
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game loop has stopped")]
    Closed,

    #[error("game loop dropped the reply")]
    ReplyDropped,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Session parameters read from settings at start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub difficulty: Difficulty,
    pub wall_kicks: bool,
    /// Piece sequence seed; random when absent
    pub seed: Option<u64>,
}

impl RuntimeConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            difficulty: settings.gameplay.difficulty,
            wall_kicks: settings.gameplay.wall_kicks,
            seed: settings.gameplay.seed,
        }
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Requests accepted by the game loop
#[derive(Debug)]
pub enum Command {
    Action(Action),
    /// Change gravity speed from the next scheduled tick on
    SetDifficulty(Difficulty),
    /// Replace the session with the saved one, if it loads
    ResumeSaved,
    /// Read the current state
    Query { reply: oneshot::Sender<GameState> },
    Shutdown,
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    Game(GameEvent),
    /// The session was replaced by a saved one
    Restored,
    /// The session was written to the store
    Saved,
    /// Non-fatal problem to show the player
    Notice(String),
}

enum StoreRequest {
    Save(GameState),
    Clear,
    Load,
}

#[derive(Debug, Clone, Copy)]
enum StoreOp {
    Save,
    Clear,
    Load,
}

impl StoreRequest {
    fn kind(&self) -> StoreOp {
        match self {
            StoreRequest::Save(_) => StoreOp::Save,
            StoreRequest::Clear => StoreOp::Clear,
            StoreRequest::Load => StoreOp::Load,
        }
    }
}

enum StoreOutcome {
    Saved(persistence::Result<()>),
    Cleared(persistence::Result<()>),
    Loaded(persistence::Result<Option<GameState>>),
}

impl StoreOutcome {
    fn failed(op: StoreOp, error: StoreError) -> Self {
        match op {
            StoreOp::Save => StoreOutcome::Saved(Err(error)),
            StoreOp::Clear => StoreOutcome::Cleared(Err(error)),
            StoreOp::Load => StoreOutcome::Loaded(Err(error)),
        }
    }
}

/// Cheap cloneable access to a running game loop
#[derive(Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<RuntimeEvent>,
    snapshots: watch::Receiver<GameState>,
}

impl RuntimeHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    /// Queue a player action
    pub async fn action(&self, action: Action) -> Result<()> {
        self.send(Command::Action(action)).await
    }

    pub async fn set_difficulty(&self, difficulty: Difficulty) -> Result<()> {
        self.send(Command::SetDifficulty(difficulty)).await
    }

    pub async fn resume_saved(&self) -> Result<()> {
        self.send(Command::ResumeSaved).await
    }

    /// State after every command queued before this call
    pub async fn state(&self) -> Result<GameState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Query { reply }).await?;
        rx.await.map_err(|_| RuntimeError::ReplyDropped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.events.subscribe()
    }

    /// Latest published snapshot, updated after every transition
    pub fn snapshots(&self) -> watch::Receiver<GameState> {
        self.snapshots.clone()
    }

    /// Stop the loop; pending store writes still complete
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }
}

/// The game loop task
pub struct Runtime {
    game: Game<Bag>,
    config: RuntimeConfig,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<RuntimeEvent>,
    snapshots: watch::Sender<GameState>,
    store_tx: Option<mpsc::UnboundedSender<StoreRequest>>,
    store_rx: mpsc::UnboundedReceiver<StoreOutcome>,
    store_worker: Option<JoinHandle<()>>,
    next_tick: Option<Instant>,
}

impl Runtime {
    /// Start a fresh session on the current tokio runtime
    pub fn spawn(
        config: RuntimeConfig,
        store: Option<Arc<dyn GameStore>>,
    ) -> (RuntimeHandle, JoinHandle<()>) {
        let game = Game::with_sequencer(
            Bag::with_seed(config.seed()),
            GameConfig {
                wall_kicks: config.wall_kicks,
                ..GameConfig::default()
            },
        );

        let (command_tx, command_rx) = mpsc::channel(64);
        let (events, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(game.snapshot());
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let (store_tx, store_worker) = match store {
            Some(store) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let worker = tokio::spawn(run_store_worker(store, rx, outcome_tx));
                (Some(tx), Some(worker))
            }
            None => (None, None),
        };

        info!(
            "Game loop starting: difficulty={} wall_kicks={}",
            config.difficulty.name(),
            config.wall_kicks
        );

        let runtime = Runtime {
            game,
            config,
            commands: command_rx,
            events: events.clone(),
            snapshots: snapshot_tx,
            store_tx,
            store_rx: outcome_rx,
            store_worker,
            next_tick: None,
        };
        let task = tokio::spawn(runtime.run());

        let handle = RuntimeHandle {
            commands: command_tx,
            events,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    /// Main loop
    async fn run(mut self) {
        self.sync_schedule();
        loop {
            tokio::select! {
                biased;
                // A due tick goes before any queued command
                _ = wait_for(self.next_tick) => self.handle_tick(),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(outcome) = self.store_rx.recv() => self.handle_store_outcome(outcome),
            }
        }

        // Let queued writes finish before returning
        self.store_tx = None;
        if let Some(worker) = self.store_worker.take() {
            if let Err(e) = worker.await {
                error!("Store worker panicked: {}", e);
            }
        }
        info!("Game loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Action(action) => {
                let events = self.game.process_action(action);
                self.after_transition(events);
            }
            Command::SetDifficulty(difficulty) => {
                info!("Difficulty set to {}", difficulty.name());
                self.config.difficulty = difficulty;
            }
            Command::ResumeSaved => {
                if !self.request(StoreRequest::Load) {
                    self.notice("No save store configured".to_string());
                }
            }
            Command::Query { reply } => {
                if reply.send(self.game.snapshot()).is_err() {
                    debug!("Query reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn handle_tick(&mut self) {
        self.next_tick = None;
        let events = self.game.tick();
        self.after_transition(events);
    }

    fn after_transition(&mut self, events: Vec<GameEvent>) {
        self.snapshots.send_replace(self.game.snapshot());
        self.sync_schedule();

        for event in events {
            match &event {
                GameEvent::Paused => {
                    self.request(StoreRequest::Save(self.game.snapshot()));
                }
                GameEvent::Quit if self.game.phase() != Phase::GameOver => {
                    self.request(StoreRequest::Save(self.game.snapshot()));
                }
                GameEvent::GameOver { .. } | GameEvent::Reset => {
                    self.request(StoreRequest::Clear);
                }
                _ => {}
            }
            self.publish(RuntimeEvent::Game(event));
        }
    }

    /// Arm gravity while active, drop the deadline otherwise
    ///
    /// A fresh deadline always gets the full interval of the current
    /// difficulty; a pending one is left alone.
    fn sync_schedule(&mut self) {
        let falling = !self.game.has_quit() && self.game.phase() == Phase::Active;
        match (falling, self.next_tick) {
            (true, None) => {
                self.next_tick = Some(Instant::now() + self.config.difficulty.fall_delay());
            }
            (false, Some(_)) => self.next_tick = None,
            _ => {}
        }
    }

    fn handle_store_outcome(&mut self, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Saved(Ok(())) => self.publish(RuntimeEvent::Saved),
            StoreOutcome::Saved(Err(e)) => {
                warn!("Save failed: {}", e);
                self.notice(format!("Could not save game: {}", e));
            }
            StoreOutcome::Cleared(Ok(())) => debug!("Saved game cleared"),
            StoreOutcome::Cleared(Err(e)) => {
                warn!("Clearing save failed: {}", e);
                self.notice(format!("Could not remove saved game: {}", e));
            }
            StoreOutcome::Loaded(Ok(Some(state))) => self.restore(state),
            StoreOutcome::Loaded(Ok(None)) => self.notice("No saved game to resume".to_string()),
            StoreOutcome::Loaded(Err(e)) => {
                warn!("Load failed, keeping current session: {}", e);
                self.notice(format!("Could not load saved game: {}", e));
            }
        }
    }

    fn restore(&mut self, state: GameState) {
        let bag = Bag::with_seed(self.config.seed());
        match Game::restore(state, bag, self.config.wall_kicks) {
            Ok(game) => {
                self.game = game;
                self.next_tick = None;
                self.snapshots.send_replace(self.game.snapshot());
                self.sync_schedule();
                self.publish(RuntimeEvent::Restored);
            }
            Err(e) => {
                warn!("Saved game rejected: {}", e);
                self.notice(format!("Saved game is unusable: {}", e));
            }
        }
    }

    /// Queue a store operation; false when no store is configured
    fn request(&self, request: StoreRequest) -> bool {
        match &self.store_tx {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    fn notice(&self, message: String) {
        self.publish(RuntimeEvent::Notice(message));
    }

    fn publish(&self, event: RuntimeEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Runs store calls one at a time on the blocking pool
async fn run_store_worker(
    store: Arc<dyn GameStore>,
    mut requests: mpsc::UnboundedReceiver<StoreRequest>,
    outcomes: mpsc::UnboundedSender<StoreOutcome>,
) {
    while let Some(request) = requests.recv().await {
        let store = Arc::clone(&store);
        let kind = request.kind();
        let result = tokio::task::spawn_blocking(move || match request {
            StoreRequest::Save(state) => StoreOutcome::Saved(store.save(&state)),
            StoreRequest::Clear => StoreOutcome::Cleared(store.clear()),
            StoreRequest::Load => StoreOutcome::Loaded(store.load()),
        })
        .await;

        let outcome = result.unwrap_or_else(|e| {
            error!("Store task failed: {}", e);
            StoreOutcome::failed(kind, StoreError::TaskFailed(e.to_string()))
        });
        if outcomes.send(outcome).is_err() {
            debug!("Store outcome dropped, game loop already stopped");
        }
    }
}
