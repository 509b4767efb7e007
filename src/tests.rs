//! Whole-match scenarios: engine timing, round outcomes, disconnects and the
//! match registry.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::error::{GameError, SessionError};
use crate::game::ai::{AiStrategy, MiniMaxAi};
use crate::game::entities::{MoveMailbox, Player, PlayerFuture, PlayerState, RemotePlayer};
use crate::game::events::{GameUpdate, RoundReport, RoundResult};
use crate::game::game_loop::{EngineConfig, GameEngine, MatchSettings};
use crate::game::state::{Game, PlayerEntry};
use crate::game::systems::{AbsoluteDisplacement, Displacement};
use crate::game::types::{BoardSize, GameType, PlayerInfo, PlayerKind, Position};
use crate::server::game_session::messages::{
    Disconnect, JoinMatch, ListMatches, ServerWsMessage, StartMatch, StartRequest, SubmitMove, UserRequest,
};
use crate::server::game_session::server::GameSessionManager;

/// Answers from a fixed script, then keeps going. A hanging player never answers.
struct ScriptedPlayer {
    info: PlayerInfo,
    moves: VecDeque<Displacement>,
    hang: bool,
}

impl ScriptedPlayer {
    fn boxed(id: &str, moves: Vec<Displacement>) -> Box<dyn Player> {
        Box::new(Self {
            info: PlayerInfo::new(id, id.to_uppercase()),
            moves: moves.into(),
            hang: false,
        })
    }

    fn hanging(id: &str) -> Box<dyn Player> {
        Box::new(Self {
            info: PlayerInfo::new(id, id.to_uppercase()),
            moves: VecDeque::new(),
            hang: true,
        })
    }
}

impl Player for ScriptedPlayer {
    fn info(&self) -> &PlayerInfo {
        &self.info
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Remote
    }

    fn setup(&mut self, _state: PlayerState) -> PlayerFuture<'_, ()> {
        Box::pin(async {})
    }

    fn next_move(&mut self, _state: PlayerState) -> PlayerFuture<'_, Displacement> {
        if self.hang {
            return Box::pin(std::future::pending());
        }
        let movement = self.moves.pop_front().unwrap_or_default();
        Box::pin(async move { movement })
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        choice_timeout: Duration::from_millis(100),
        setup_timeout: Duration::from_millis(200),
        start_delay: Duration::from_millis(300),
        disconnected_grace_ticks: None,
    }
}

fn engine(
    rows: usize,
    columns: usize,
    players: Vec<Box<dyn Player>>,
    rounds_count: u32,
    config: EngineConfig,
) -> (GameEngine, UnboundedReceiver<GameUpdate>) {
    let entries = players.into_iter().map(PlayerEntry::new).collect();
    let game = Game::new(GameType::Ranked, rows, columns, entries, rounds_count).unwrap();
    GameEngine::new(game, config)
}

fn drain(receiver: &mut UnboundedReceiver<GameUpdate>) -> Vec<GameUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = receiver.try_recv() {
        updates.push(update);
    }
    updates
}

fn positions_of(update: &GameUpdate, id: &str) -> Option<Position> {
    match update {
        GameUpdate::NewPositions { new_positions } => new_positions.get(id).copied(),
        _ => None,
    }
}

fn winner(id: &str) -> RoundResult {
    RoundResult::Winner { winner: id.to_string() }
}

fn tie(groups: &[&[&str]]) -> RoundResult {
    RoundResult::Tie {
        ties: groups
            .iter()
            .map(|group| group.iter().map(|id| id.to_string()).collect())
            .collect(),
    }
}

#[tokio::test(start_paused = true)]
async fn first_player_wins_when_the_other_runs_into_the_wall() {
    // 2x4 board: p1 starts at (1, 1) facing right, p2 at (2, 3) facing left.
    let (engine, mut updates) = engine(
        2,
        4,
        vec![ScriptedPlayer::boxed("p1", vec![]), ScriptedPlayer::boxed("p2", vec![])],
        1,
        config(),
    );

    let started = Instant::now();
    let results = engine.run().await;
    let elapsed = started.elapsed();

    assert_eq!(results, vec![winner("p1")]);
    // start delay + setup + three ticks
    assert!(elapsed >= Duration::from_millis(800), "took {elapsed:?}");
    assert!(elapsed < Duration::from_millis(850), "took {elapsed:?}");

    let updates = drain(&mut updates);
    let trail: Vec<Option<Position>> = updates.iter().map(|update| positions_of(update, "p1")).collect();
    assert_eq!(
        &trail[..4],
        &[
            Some(Position::new(1, 1)),
            Some(Position::new(1, 2)),
            Some(Position::new(1, 3)),
            Some(Position::new(1, 4)),
        ]
    );
    assert_eq!(
        updates[4],
        GameUpdate::RoundEnd(RoundReport {
            result: winner("p1"),
            round: 0,
        })
    );
    assert_eq!(updates[5], GameUpdate::End { results: vec![winner("p1")] });
    assert_eq!(updates.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn head_on_collision_is_a_tie() {
    // 1x3 board: both players aim for (1, 2) on the first tick.
    let (engine, mut updates) = engine(
        1,
        3,
        vec![ScriptedPlayer::boxed("p1", vec![]), ScriptedPlayer::boxed("p2", vec![])],
        1,
        config(),
    );

    let results = engine.run().await;
    assert_eq!(results, vec![tie(&[&["p1", "p2"]])]);

    let updates = drain(&mut updates);
    assert_eq!(updates.len(), 3);
    assert_eq!(positions_of(&updates[0], "p1"), Some(Position::new(1, 1)));
    assert_eq!(positions_of(&updates[0], "p2"), Some(Position::new(1, 3)));
    assert_eq!(
        updates[1],
        GameUpdate::RoundEnd(RoundReport {
            result: tie(&[&["p1", "p2"]]),
            round: 0,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn absolute_move_into_the_wall_eliminates_at_once() {
    let (engine, mut updates) = engine(
        2,
        4,
        vec![
            ScriptedPlayer::boxed("p1", vec![Displacement::Absolute(AbsoluteDisplacement::Left)]),
            ScriptedPlayer::boxed("p2", vec![]),
        ],
        1,
        config(),
    );

    assert_eq!(engine.run().await, vec![winner("p2")]);

    let updates = drain(&mut updates);
    // start positions, then p2 alone on (2, 2)
    assert_eq!(positions_of(&updates[1], "p2"), Some(Position::new(2, 2)));
    assert_eq!(positions_of(&updates[1], "p1"), Some(Position::new(1, 1)));
}

#[tokio::test(start_paused = true)]
async fn every_round_is_reported_with_its_index() {
    let (engine, mut updates) = engine(
        2,
        4,
        vec![ScriptedPlayer::boxed("p1", vec![]), ScriptedPlayer::boxed("p2", vec![])],
        2,
        config(),
    );

    assert_eq!(engine.run().await, vec![winner("p1"), winner("p1")]);

    let rounds: Vec<u32> = drain(&mut updates)
        .into_iter()
        .filter_map(|update| match update {
            GameUpdate::RoundEnd(report) => Some(report.round),
            _ => None,
        })
        .collect();
    assert_eq!(rounds, vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn silent_players_drift_on_their_heading() {
    // Nobody answers: both keep going towards each other until they meet.
    let (engine, _updates) = engine(
        1,
        5,
        vec![ScriptedPlayer::hanging("p1"), ScriptedPlayer::hanging("p2")],
        1,
        config(),
    );

    let started = Instant::now();
    assert_eq!(engine.run().await, vec![tie(&[&["p1", "p2"]])]);
    // p1 and p2 reach (1, 2) and (1, 4), then both claim (1, 3).
    assert!(started.elapsed() >= Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn disconnected_player_is_dropped_after_its_grace_ticks() {
    let config = EngineConfig {
        disconnected_grace_ticks: Some(2),
        ..config()
    };
    let (engine, _updates) = engine(
        1,
        10,
        vec![ScriptedPlayer::hanging("p1"), ScriptedPlayer::boxed("p2", vec![])],
        1,
        config,
    );

    let handle = engine.handle();
    assert!(!handle.disconnect_player("p1"));
    assert!(handle.is_disconnected("p1"));
    assert!(!handle.is_game_empty());

    assert_eq!(engine.run().await, vec![winner("p2")]);
}

#[tokio::test(start_paused = true)]
async fn without_grace_a_disconnected_player_keeps_drifting() {
    let (engine, _updates) = engine(
        1,
        10,
        vec![ScriptedPlayer::hanging("p1"), ScriptedPlayer::boxed("p2", vec![])],
        1,
        config(),
    );

    assert!(!engine.handle().disconnect_player("p1"));
    // p1 drifts right until both are boxed in between their trails.
    assert_eq!(engine.run().await, vec![tie(&[&["p1", "p2"]])]);
}

#[tokio::test(start_paused = true)]
async fn last_human_leaving_ends_the_match_with_padded_ties() {
    let (engine, mut updates) = engine(
        9,
        16,
        vec![ScriptedPlayer::hanging("p1"), ScriptedPlayer::hanging("p2")],
        3,
        config(),
    );
    let handle = engine.handle();
    let running = tokio::spawn(engine.run());

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(!handle.disconnect_player("p1"));
    assert!(handle.disconnect_player("p2"));

    let results = running.await.unwrap();
    let roster_tie = tie(&[&["p1", "p2"]]);
    assert_eq!(results, vec![roster_tie.clone(), roster_tie.clone(), roster_tie]);

    let last = drain(&mut updates).pop();
    assert_eq!(last, Some(GameUpdate::End { results }));
}

#[tokio::test(start_paused = true)]
async fn ai_only_match_plays_to_the_end() {
    let settings = MatchSettings {
        game_type: GameType::Ai,
        rows: 5,
        columns: 6,
        rounds_count: 2,
        players_count: 2,
    };
    let (engine, mut updates) =
        GameEngine::create(settings, Vec::new(), AiStrategy::WallHugger, config()).unwrap();
    assert!(!engine.handle().is_game_empty());

    let results = engine.run().await;
    assert_eq!(results.len(), 2);
    assert!(matches!(drain(&mut updates).pop(), Some(GameUpdate::End { .. })));
}

#[tokio::test]
async fn slow_ai_search_defaults_without_stalling_the_runtime() {
    let config = EngineConfig {
        choice_timeout: Duration::from_millis(100),
        setup_timeout: Duration::from_millis(20),
        start_delay: Duration::ZERO,
        disconnected_grace_ticks: None,
    };
    // Far too deep to finish within a tick on a 60x60 board.
    let bot = Box::new(MiniMaxAi::with_depth(
        PlayerInfo::new("bot", "MiniMaxAI 0"),
        BoardSize { rows: 60, columns: 60 },
        12,
    ));
    let (engine, mut updates) = engine(60, 60, vec![bot, ScriptedPlayer::boxed("p2", vec![])], 1, config);
    let running = tokio::spawn(engine.run());

    let start = updates.recv().await.and_then(|update| positions_of(&update, "bot")).unwrap();
    let waiting = Instant::now();
    let heartbeat = tokio::spawn(async {
        let slept = Instant::now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        slept.elapsed()
    });

    let first = updates.recv().await.and_then(|update| positions_of(&update, "bot")).unwrap();
    let tick = waiting.elapsed();

    // Setup plus one tick, and the late answer became KeepGoing (facing right).
    assert!(tick < Duration::from_millis(400), "tick took {tick:?}");
    assert_eq!(first, Position::new(start.row, start.column + 1));
    assert!(heartbeat.await.unwrap() < Duration::from_millis(80));

    running.abort();
}

#[test]
fn create_fills_ai_seats_only_for_ai_games() {
    let settings = MatchSettings {
        game_type: GameType::Ai,
        rows: 9,
        columns: 16,
        rounds_count: 3,
        players_count: 3,
    };
    let (engine, _updates) = GameEngine::create(
        settings,
        vec![ScriptedPlayer::boxed("p1", vec![])],
        AiStrategy::MiniMax,
        config(),
    )
    .unwrap();
    let players = engine.game().players();
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].id(), "p1");
    assert_eq!(players[1].kind, PlayerKind::Ai);
    assert_eq!(players[1].info.name, "MiniMaxAI 1");
    assert_eq!(players[2].info.name, "MiniMaxAI 2");
    assert_ne!(players[1].id(), players[2].id());

    let local = MatchSettings {
        game_type: GameType::Local,
        ..settings
    };
    let (engine, _updates) = GameEngine::create(
        local,
        vec![ScriptedPlayer::boxed("p1", vec![])],
        AiStrategy::MiniMax,
        config(),
    )
    .unwrap();
    assert_eq!(engine.game().players().len(), 1);
}

#[test]
fn create_rejects_more_users_than_seats() {
    let settings = MatchSettings {
        game_type: GameType::Ranked,
        rows: 9,
        columns: 16,
        rounds_count: 3,
        players_count: 1,
    };
    let users = vec![ScriptedPlayer::boxed("p1", vec![]), ScriptedPlayer::boxed("p2", vec![])];
    assert_eq!(
        GameEngine::create(settings, users, AiStrategy::MiniMax, config()).err(),
        Some(GameError::TooManyUsers { max: 1, received: 2 })
    );
}

#[test]
fn remote_seats_count_as_humans() {
    let info = PlayerInfo::new("p1", "Alice");
    let entries = vec![PlayerEntry::new(Box::new(RemotePlayer::new(info, MoveMailbox::new())))];
    let game = Game::new(GameType::Ranked, 3, 3, entries, 1).unwrap();
    let (engine, _updates) = GameEngine::new(game, config());
    let handle = engine.handle();
    assert!(!handle.is_game_empty());
    assert!(handle.disconnect_player("p1"));
    assert!(handle.is_game_empty());
}

/// Collects what the registry sends to a socket.
struct Sink(Arc<Mutex<Vec<ServerWsMessage>>>);

impl Actor for Sink {
    type Context = Context<Self>;
}

impl Handler<ServerWsMessage> for Sink {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, _: &mut Context<Self>) {
        self.0.lock().unwrap().push(msg);
    }
}

fn start_request(players_count: i64) -> StartRequest {
    StartRequest {
        game_type: Some(1),
        row_number: Some(9),
        column_number: Some(16),
        rounds_count: Some(2),
        players_count: Some(players_count),
        users: vec![UserRequest {
            id: "p1".to_string(),
            name: "Alice".to_string(),
            color: None,
            keys: None,
        }],
        ai_strategy: Some(AiStrategy::WallHugger),
    }
}

fn fast_manager() -> Addr<GameSessionManager> {
    GameSessionManager::with_config(EngineConfig {
        choice_timeout: Duration::from_millis(5),
        setup_timeout: Duration::from_millis(5),
        start_delay: Duration::from_millis(5),
        disconnected_grace_ticks: Some(2),
    })
    .start()
}

#[actix::test]
async fn invalid_start_registers_nothing() {
    let manager = fast_manager();
    let sink = Sink(Arc::new(Mutex::new(Vec::new()))).start();

    let result = manager
        .send(StartMatch {
            request: start_request(0),
            addr: sink.recipient(),
        })
        .await
        .unwrap();
    assert_eq!(result.unwrap_err().code(), "INVALID_INPUT");
    assert!(manager.send(ListMatches).await.unwrap().is_empty());
}

#[actix::test]
async fn commands_for_unknown_matches_are_rejected() {
    let manager = fast_manager();
    let sink = Sink(Arc::new(Mutex::new(Vec::new()))).start();
    let match_id = uuid::Uuid::new_v4();

    let result = manager
        .send(SubmitMove {
            match_id,
            player_id: "p1".to_string(),
            movement: Displacement::default(),
            addr: sink.recipient(),
        })
        .await
        .unwrap();
    assert_eq!(result, Err(SessionError::UnknownMatch(match_id)));
}

#[actix::test]
async fn match_is_registered_until_its_last_human_leaves() {
    let manager = fast_manager();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Sink(received.clone()).start();

    let created = manager
        .send(StartMatch {
            request: start_request(2),
            addr: sink.recipient(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.players.len(), 2);
    assert_eq!(created.players[0].id, "p1");
    assert_eq!(manager.send(ListMatches).await.unwrap(), vec![created.match_id]);

    let empty = manager
        .send(Disconnect {
            match_id: created.match_id,
            player_id: "p1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(empty, Ok(true));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(manager.send(ListMatches).await.unwrap().is_empty());

    let received = received.lock().unwrap();
    let end = received.iter().find_map(|message| match message {
        ServerWsMessage::RefreshStatus(GameUpdate::End { results }) => Some(results.clone()),
        _ => None,
    });
    assert_eq!(end.map(|results| results.len()), Some(2));
}

#[actix::test]
async fn joined_socket_receives_updates_without_moving() {
    let manager = fast_manager();
    let starter = Sink(Arc::new(Mutex::new(Vec::new()))).start();
    let joined = Arc::new(Mutex::new(Vec::new()));
    let second = Sink(joined.clone()).start();

    let mut request = start_request(2);
    request.game_type = Some(2);
    request.users.push(UserRequest {
        id: "p2".to_string(),
        name: "Bob".to_string(),
        color: None,
        keys: None,
    });
    let created = manager
        .send(StartMatch {
            request,
            addr: starter.recipient(),
        })
        .await
        .unwrap()
        .unwrap();

    let ghost = manager
        .send(JoinMatch {
            match_id: created.match_id,
            player_id: "ghost".to_string(),
            addr: second.clone().recipient(),
        })
        .await
        .unwrap();
    assert_eq!(ghost, Err(SessionError::UnknownPlayer("ghost".to_string())));

    let join = manager
        .send(JoinMatch {
            match_id: created.match_id,
            player_id: "p2".to_string(),
            addr: second.recipient(),
        })
        .await
        .unwrap();
    assert_eq!(join, Ok(()));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let start_positions = joined.lock().unwrap().iter().any(|message| {
        matches!(
            message,
            ServerWsMessage::RefreshStatus(GameUpdate::NewPositions { new_positions })
                if new_positions.contains_key("p1") && new_positions.contains_key("p2")
        )
    });
    assert!(start_positions);

    for player_id in ["p1", "p2"] {
        let _ = manager
            .send(Disconnect {
                match_id: created.match_id,
                player_id: player_id.to_string(),
            })
            .await;
    }
}
