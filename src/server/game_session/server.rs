//! Match registry.
//!
//! The only state shared between matches: which matches are running, how to
//! reach each engine, and where to deliver its updates. Engines themselves
//! run as independent tasks.

use actix::prelude::*;
use std::collections::HashMap;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SessionError, StartError};
use crate::game::entities::{PlayerFactory, PlayerInput};
use crate::game::game_loop::{EngineConfig, EngineHandle, GameEngine};
use crate::game::types::{PlayerId, PlayerInfo};
use crate::server::game_session::messages::{
    Disconnect, JoinMatch, LeaveGame, ListMatches, MatchCreated, MatchFinished, PressKey, RelayUpdate, ServerWsMessage,
    StartMatch, SubmitMove,
};
use crate::server::game_session::validation::validate_start;

/// A running match as seen by the transport.
pub struct ActiveMatch {
    pub handle: EngineHandle,
    /// Human seats, by player id.
    pub inputs: HashMap<PlayerId, PlayerInput>,
    /// Sockets receiving this match's updates.
    pub participants: Vec<Recipient<ServerWsMessage>>,
}

impl ActiveMatch {
    fn add_participant(&mut self, addr: Recipient<ServerWsMessage>) {
        if !self.participants.contains(&addr) {
            self.participants.push(addr);
        }
    }

    fn broadcast(&self, message: ServerWsMessage) {
        for participant in &self.participants {
            participant.do_send(message.clone());
        }
    }
}

pub struct GameSessionManager {
    matches: HashMap<Uuid, ActiveMatch>,
    player_matches: HashMap<PlayerId, Uuid>,
    engine_config: EngineConfig,
}

impl GameSessionManager {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(engine_config: EngineConfig) -> Self {
        Self {
            matches: HashMap::new(),
            player_matches: HashMap::new(),
            engine_config,
        }
    }

    fn active_match(&mut self, match_id: Uuid) -> Result<&mut ActiveMatch, SessionError> {
        self.matches
            .get_mut(&match_id)
            .ok_or(SessionError::UnknownMatch(match_id))
    }

    /// Validate, build and launch a match. Nothing is registered or spawned on error.
    fn start_match(&mut self, msg: StartMatch, ctx: &mut Context<Self>) -> Result<MatchCreated, StartError> {
        let valid = validate_start(msg.request)?;
        let game_type = valid.settings.game_type;

        let mut users = Vec::with_capacity(valid.users.len());
        let mut inputs = HashMap::new();
        for user in valid.users {
            let info = PlayerInfo {
                id: user.id,
                name: user.name,
                color: user.color,
            };
            let id = info.id.clone();
            let (player, input) = PlayerFactory::create(game_type, info, user.keys.as_deref());
            users.push(player);
            inputs.insert(id, input);
        }

        let (engine, mut updates) = GameEngine::create(valid.settings, users, valid.ai_strategy, self.engine_config)?;
        let handle = engine.handle();
        let match_id = handle.id();
        let players: Vec<PlayerInfo> = engine.game().players().iter().map(|entry| entry.info.clone()).collect();

        for id in inputs.keys() {
            if let Some(previous) = self.player_matches.insert(id.clone(), match_id) {
                debug!("[GameSessionManager] Player {} moves from match {} to {}", id, previous, match_id);
            }
        }
        self.matches.insert(
            match_id,
            ActiveMatch {
                handle,
                inputs,
                participants: vec![msg.addr],
            },
        );

        actix::spawn(async move {
            engine.run().await;
        });
        let manager = ctx.address();
        actix::spawn(async move {
            while let Some(update) = updates.recv().await {
                manager.do_send(RelayUpdate { match_id, update });
            }
            manager.do_send(MatchFinished { match_id });
        });

        info!(
            "[GameSessionManager] Match {} started ({:?}, {} seats)",
            match_id,
            game_type,
            players.len()
        );
        Ok(MatchCreated { match_id, players })
    }

    fn disconnect(&mut self, match_id: Uuid, player_id: &str) -> Result<bool, SessionError> {
        let active = self.active_match(match_id)?;
        let empty = active.handle.disconnect_player(player_id);
        info!(
            "[GameSessionManager] Player {} left match {} (empty: {})",
            player_id, match_id, empty
        );
        if self.player_matches.get(player_id) == Some(&match_id) {
            self.player_matches.remove(player_id);
        }
        Ok(empty)
    }
}

impl Default for GameSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl Handler<StartMatch> for GameSessionManager {
    type Result = Result<MatchCreated, StartError>;

    fn handle(&mut self, msg: StartMatch, ctx: &mut Context<Self>) -> Self::Result {
        let result = self.start_match(msg, ctx);
        if let Err(error) = &result {
            warn!("[GameSessionManager] Start rejected: {}", error);
        }
        result
    }
}

impl Handler<JoinMatch> for GameSessionManager {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, msg: JoinMatch, _: &mut Context<Self>) -> Self::Result {
        let active = self.active_match(msg.match_id)?;
        if !active.inputs.contains_key(&msg.player_id) {
            return Err(SessionError::UnknownPlayer(msg.player_id));
        }
        active.add_participant(msg.addr);
        debug!("[GameSessionManager] {} joined match {}", msg.player_id, msg.match_id);
        Ok(())
    }
}

impl Handler<SubmitMove> for GameSessionManager {
    type Result = Result<bool, SessionError>;

    fn handle(&mut self, msg: SubmitMove, _: &mut Context<Self>) -> Self::Result {
        let active = self.active_match(msg.match_id)?;
        active.add_participant(msg.addr);
        let Some(input) = active.inputs.get(&msg.player_id) else {
            debug!(
                "[GameSessionManager] Move for unknown seat {} in match {}",
                msg.player_id, msg.match_id
            );
            return Ok(false);
        };
        Ok(input.submit(msg.movement))
    }
}

impl Handler<PressKey> for GameSessionManager {
    type Result = Result<bool, SessionError>;

    fn handle(&mut self, msg: PressKey, _: &mut Context<Self>) -> Self::Result {
        let active = self.active_match(msg.match_id)?;
        active.add_participant(msg.addr);
        Ok(active
            .inputs
            .values()
            .find(|input| input.is_bound_to(&msg.key))
            .is_some_and(|input| input.press_key(&msg.key)))
    }
}

impl Handler<Disconnect> for GameSessionManager {
    type Result = Result<bool, SessionError>;

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) -> Self::Result {
        self.disconnect(msg.match_id, &msg.player_id)
    }
}

impl Handler<LeaveGame> for GameSessionManager {
    type Result = Result<bool, SessionError>;

    fn handle(&mut self, msg: LeaveGame, _: &mut Context<Self>) -> Self::Result {
        let match_id = *self
            .player_matches
            .get(&msg.player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(msg.player_id.clone()))?;
        self.disconnect(match_id, &msg.player_id)
    }
}

impl Handler<RelayUpdate> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: RelayUpdate, _: &mut Context<Self>) -> Self::Result {
        match self.matches.get(&msg.match_id) {
            Some(active) => active.broadcast(ServerWsMessage::RefreshStatus(msg.update)),
            None => debug!("[GameSessionManager] Update for finished match {}", msg.match_id),
        }
    }
}

impl Handler<MatchFinished> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: MatchFinished, _: &mut Context<Self>) -> Self::Result {
        if self.matches.remove(&msg.match_id).is_some() {
            self.player_matches.retain(|_, match_id| *match_id != msg.match_id);
            info!("[GameSessionManager] Match {} removed", msg.match_id);
        }
    }
}

impl Handler<ListMatches> for GameSessionManager {
    type Result = MessageResult<ListMatches>;

    fn handle(&mut self, _: ListMatches, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.matches.keys().copied().collect())
    }
}
