//! Match engine.
//!
//! A match goes `INIT -> ROUND_SETUP -> ROUND_RUNNING -> ROUND_RESOLVED` once
//! per round, then `MATCH_END`. Every tick asks all remaining players for a
//! move at the same time, waits for all of them (or their timeouts), and only
//! then resolves collisions, so answer order never matters.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::game::{choice_timeout, setup_timeout, start_delay, DISCONNECTED_GRACE_TICKS};
use crate::error::GameError;
use crate::game::ai::AiStrategy;
use crate::game::entities::{Player, PlayerFactory, PlayerState};
use crate::game::events::{GameUpdate, RoundReport, RoundResult};
use crate::game::state::{Game, PlayerEntry};
use crate::game::systems::{identify_ties, initial_heading, Displacement, MovementMapping};
use crate::game::types::{BoardSize, GameType, PlayerId, PlayerInfo, PlayerKind, Position};
use crate::game::utils::with_timeout;

/// Timing knobs of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub choice_timeout: Duration,
    pub setup_timeout: Duration,
    pub start_delay: Duration,
    /// Consecutive defaulted ticks after which a disconnected player is
    /// eliminated. `None` lets it drift until it crashes.
    pub disconnected_grace_ticks: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            choice_timeout: choice_timeout(),
            setup_timeout: setup_timeout(),
            start_delay: start_delay(),
            disconnected_grace_ticks: Some(DISCONNECTED_GRACE_TICKS),
        }
    }
}

/// Shape of a match requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub game_type: GameType,
    pub rows: usize,
    pub columns: usize,
    pub rounds_count: u32,
    pub players_count: usize,
}

/// State shared between a running engine and the transport.
#[derive(Debug)]
struct EngineControl {
    disconnected: Mutex<HashSet<PlayerId>>,
    humans: HashSet<PlayerId>,
    shutdown: Notify,
}

impl EngineControl {
    fn is_disconnected(&self, player_id: &str) -> bool {
        self.disconnected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(player_id)
    }
}

/// Cheap handle used by the transport to talk to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    id: Uuid,
    control: Arc<EngineControl>,
}

impl EngineHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark a player as gone. Returns whether the match has no human left,
    /// in which case the engine stops at once.
    pub fn disconnect_player(&self, player_id: &str) -> bool {
        self.control
            .disconnected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player_id.to_string());

        let empty = self.is_game_empty();
        if empty {
            self.control.shutdown.notify_one();
        }
        empty
    }

    /// True once every human seat has disconnected. AI-only matches never empty.
    pub fn is_game_empty(&self) -> bool {
        let disconnected = self.control.disconnected.lock().unwrap_or_else(PoisonError::into_inner);
        !self.control.humans.is_empty() && self.control.humans.iter().all(|id| disconnected.contains(id))
    }

    pub fn is_disconnected(&self, player_id: &str) -> bool {
        self.control.is_disconnected(player_id)
    }
}

pub struct GameEngine {
    id: Uuid,
    game: Game,
    config: EngineConfig,
    control: Arc<EngineControl>,
    updates: mpsc::UnboundedSender<GameUpdate>,
    remaining_players: Vec<PlayerId>,
    players_movements: HashMap<PlayerId, MovementMapping>,
    idle_ticks: HashMap<PlayerId, u32>,
}

impl GameEngine {
    /// Engine over a prepared game. Updates are pushed into the returned receiver.
    pub fn new(game: Game, config: EngineConfig) -> (Self, mpsc::UnboundedReceiver<GameUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let humans = game
            .players()
            .iter()
            .filter(|entry| entry.kind != PlayerKind::Ai)
            .map(|entry| entry.id().clone())
            .collect();

        let engine = Self {
            id: Uuid::new_v4(),
            game,
            config,
            control: Arc::new(EngineControl {
                disconnected: Mutex::new(HashSet::new()),
                humans,
                shutdown: Notify::new(),
            }),
            updates,
            remaining_players: Vec::new(),
            players_movements: HashMap::new(),
            idle_ticks: HashMap::new(),
        };
        (engine, receiver)
    }

    /// Build the game from client settings. AI games fill the empty seats with `ai`.
    pub fn create(
        settings: MatchSettings,
        users: Vec<Box<dyn Player>>,
        ai: AiStrategy,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<GameUpdate>), GameError> {
        if users.len() > settings.players_count {
            return Err(GameError::TooManyUsers {
                max: settings.players_count,
                received: users.len(),
            });
        }

        let mut players: Vec<PlayerEntry> = users.into_iter().map(PlayerEntry::new).collect();
        if settings.game_type == GameType::Ai {
            let size = BoardSize {
                rows: settings.rows,
                columns: settings.columns,
            };
            for seat in players.len()..settings.players_count {
                let info = PlayerInfo::new(Uuid::new_v4().to_string(), format!("{} {}", ai.label(), seat));
                players.push(PlayerEntry::new(PlayerFactory::create_ai(ai, info, size)));
            }
        }

        let game = Game::new(
            settings.game_type,
            settings.rows,
            settings.columns,
            players,
            settings.rounds_count,
        )?;
        Ok(Self::new(game, config))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            id: self.id,
            control: self.control.clone(),
        }
    }

    /// Play the whole match. Rounds cut short by everyone leaving count as a
    /// tie of the full roster.
    pub async fn run(mut self) -> Vec<RoundResult> {
        info!(
            "[GameEngine] Match {} starting: {:?}, {} players, {} rounds",
            self.id,
            self.game.game_type(),
            self.game.players().len(),
            self.game.rounds_count()
        );

        let (id, control) = (self.id, self.control.clone());
        let mut results = Vec::new();
        tokio::select! {
            _ = control.shutdown.notified() => {
                info!("[GameEngine] Match {}: every human left, stopping", id);
            }
            _ = self.play(&mut results) => {}
        }

        let roster = self.game.player_ids();
        while (results.len() as u32) < self.game.rounds_count() {
            results.push(RoundResult::Tie {
                ties: vec![roster.clone()],
            });
        }

        info!("[GameEngine] Match {} over: {:?}", self.id, results);
        self.emit(GameUpdate::End {
            results: results.clone(),
        });
        results
    }

    async fn play(&mut self, results: &mut Vec<RoundResult>) {
        tokio::time::sleep(self.config.start_delay).await;

        while (results.len() as u32) < self.game.rounds_count() && !self.handle().is_game_empty() {
            let result = self.run_round().await;
            let round = self.game.current_round();
            info!("[GameEngine] Match {} round {}: {:?}", self.id, round, result);

            self.emit(GameUpdate::RoundEnd(RoundReport {
                result: result.clone(),
                round,
            }));
            results.push(result);
            self.game.reset_board();
            self.game.advance_round();
        }
    }

    async fn run_round(&mut self) -> RoundResult {
        if let Err(error) = self.setup_round().await {
            error!("[GameEngine] Match {}: round setup failed: {}", self.id, error);
            return RoundResult::Tie {
                ties: vec![self.game.player_ids()],
            };
        }

        let mut tick = 0u32;
        loop {
            tick += 1;
            let answers = self.collect_moves().await;
            let candidates = self.compute_candidates(answers);

            if candidates.is_empty() {
                debug!("[GameEngine] Match {} tick {}: nobody could move", self.id, tick);
                return RoundResult::Tie {
                    ties: vec![std::mem::take(&mut self.remaining_players)],
                };
            }

            let resolution = identify_ties(&candidates);
            let survivors: HashSet<&PlayerId> = resolution.survivors.iter().collect();
            self.remaining_players = candidates
                .iter()
                .filter(|(id, _)| survivors.contains(id))
                .map(|(id, _)| id.clone())
                .collect();

            if self.remaining_players.is_empty() {
                return RoundResult::Tie { ties: resolution.ties };
            }

            for (id, position) in &candidates {
                if survivors.contains(id) {
                    if let Err(error) = self.game.set_player_position(id, *position) {
                        warn!("[GameEngine] Match {}: cannot move {}: {}", self.id, id, error);
                    }
                }
            }
            self.emit_positions();

            if let [winner] = self.remaining_players.as_slice() {
                return RoundResult::Winner { winner: winner.clone() };
            }
        }
    }

    /// Seat everyone, face them towards the board and give them their setup call.
    async fn setup_round(&mut self) -> Result<(), GameError> {
        self.game.set_players_start_positions()?;
        self.emit_positions();

        self.remaining_players = self.game.player_ids();
        self.idle_ticks.clear();
        self.players_movements.clear();
        let mut starts = Vec::with_capacity(self.remaining_players.len());
        for id in &self.remaining_players {
            let start = self
                .game
                .player_position(id)
                .ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
            self.players_movements
                .insert(id.clone(), MovementMapping::facing(initial_heading(start)));
            starts.push((id.clone(), start));
        }

        let mut tasks = JoinSet::new();
        for (id, _) in &starts {
            let Some(entry) = self.game.player(id) else { continue };
            let handle = entry.handle.clone();
            let state = self.player_state(id);
            let timeout = self.config.setup_timeout;
            let id = id.clone();
            tasks.spawn(async move {
                let done = with_timeout(
                    async move {
                        let mut player = handle.lock().await;
                        player.setup(state).await;
                    },
                    timeout,
                )
                .await;
                (id, done.is_some())
            });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, false)) => debug!("[GameEngine] Match {}: {} setup timed out", self.id, id),
                Ok(_) => {}
                Err(error) => warn!("[GameEngine] Match {}: setup task failed: {}", self.id, error),
            }
        }

        for (id, start) in starts {
            self.game.set_player_position(&id, start)?;
        }
        Ok(())
    }

    /// Ask every remaining player at once. Missing entries mean no answer in time.
    async fn collect_moves(&self) -> HashMap<PlayerId, Displacement> {
        let mut tasks = JoinSet::new();
        for id in &self.remaining_players {
            let Some(entry) = self.game.player(id) else { continue };
            let handle = entry.handle.clone();
            let state = self.player_state(id);
            let timeout = self.config.choice_timeout;
            let id = id.clone();
            tasks.spawn(async move {
                let answer = with_timeout(
                    async move {
                        let mut player = handle.lock().await;
                        player.next_move(state).await
                    },
                    timeout,
                )
                .await;
                (id, answer)
            });
        }

        let mut answers = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Some(displacement))) => {
                    answers.insert(id, displacement);
                }
                Ok((id, None)) => debug!("[GameEngine] Match {}: {} did not answer", self.id, id),
                Err(error) => warn!("[GameEngine] Match {}: player task failed: {}", self.id, error),
            }
        }
        answers
    }

    /// Turn answers into target tiles. Players whose target is not free, and
    /// disconnected players past their grace period, get no candidate.
    fn compute_candidates(&mut self, mut answers: HashMap<PlayerId, Displacement>) -> Vec<(PlayerId, Position)> {
        let mut candidates = Vec::with_capacity(self.remaining_players.len());

        for id in &self.remaining_players {
            let answer = answers.remove(id);
            let idle = self.idle_ticks.entry(id.clone()).or_insert(0);
            if answer.is_none() && self.control.is_disconnected(id) {
                *idle += 1;
            } else {
                *idle = 0;
            }
            if self
                .config
                .disconnected_grace_ticks
                .is_some_and(|grace| *idle > grace)
            {
                info!("[GameEngine] Match {}: {} dropped after {} idle ticks", self.id, id, idle);
                continue;
            }

            let Some(position) = self.game.player_position(id) else {
                continue;
            };
            let mapping = self.players_movements.entry(id.clone()).or_default();
            let direction = match answer.unwrap_or_default() {
                Displacement::Absolute(direction) => direction,
                Displacement::Relative(turn) => mapping.resolve(turn),
            };

            let candidate = direction.apply(position);
            if self.game.board().check_position_validity(candidate) {
                mapping.turn_towards(direction);
                candidates.push((id.clone(), candidate));
            } else {
                debug!("[GameEngine] Match {}: {} crashed into {:?}", self.id, id, candidate);
            }
        }
        candidates
    }

    fn player_state(&self, player_id: &str) -> PlayerState {
        let own = self.game.player_position(player_id).unwrap_or(Position::new(0, 0));
        let others = self
            .remaining_players
            .iter()
            .filter(|id| id.as_str() != player_id)
            .filter_map(|id| self.game.player_position(id))
            .collect();
        PlayerState::new(own, others)
    }

    fn emit_positions(&self) {
        self.emit(GameUpdate::NewPositions {
            new_positions: self.game.players_positions().clone(),
        });
    }

    fn emit(&self, update: GameUpdate) {
        if self.updates.send(update).is_err() {
            debug!("[GameEngine] Match {}: nobody is listening for updates", self.id);
        }
    }
}
