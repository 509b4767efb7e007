/// WebSocket session for game clients.
///
/// One actor per socket. It parses client commands, forwards them to the
/// match registry and writes registry replies and match updates back to the
/// client. When the socket goes away, every seat it started or joined is disconnected.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::game::types::PlayerId;
use crate::server::game_session::messages::{
    ClientWsMessage, Disconnect, JoinMatch, LeaveGame, PressKey, ServerWsMessage, StartMatch, SubmitMove,
};
use crate::server::game_session::server::GameSessionManager;
use crate::server::ws_error::{ws_error_message, INTERNAL_ERROR, INVALID_INPUT};

pub struct GameSessionActor {
    pub manager: Addr<GameSessionManager>,
    /// Human seats started or joined through this socket.
    pub seats: Vec<(Uuid, PlayerId)>,
}

impl GameSessionActor {
    pub fn new(manager: Addr<GameSessionManager>) -> Self {
        Self {
            manager,
            seats: Vec::new(),
        }
    }

    fn handle_command(&mut self, command: ClientWsMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let addr = ctx.address().recipient();
        match command {
            ClientWsMessage::Start(request) => {
                let humans: Vec<PlayerId> = request.users.iter().map(|user| user.id.clone()).collect();
                self.manager
                    .send(StartMatch { request, addr })
                    .into_actor(self)
                    .map(move |result, act, ctx| match result {
                        Ok(Ok(created)) => {
                            act.seats
                                .extend(humans.into_iter().map(|id| (created.match_id, id)));
                            act.write(ctx, ServerWsMessage::game_created(created));
                        }
                        Ok(Err(error)) => {
                            act.write(ctx, ServerWsMessage::error(error.code(), error.to_string()));
                        }
                        Err(error) => {
                            warn!("[GameSession] Registry unreachable: {}", error);
                            ctx.text(ws_error_message(INTERNAL_ERROR, "Match registry unavailable"));
                        }
                    })
                    .wait(ctx);
            }
            ClientWsMessage::Join { match_id, player_id } => {
                self.manager
                    .send(JoinMatch {
                        match_id,
                        player_id: player_id.clone(),
                        addr,
                    })
                    .into_actor(self)
                    .map(move |result, act, ctx| match result {
                        Ok(Ok(())) => {
                            let seat = (match_id, player_id);
                            if !act.seats.contains(&seat) {
                                act.seats.push(seat);
                            }
                        }
                        Ok(Err(error)) => {
                            act.write(ctx, ServerWsMessage::error(error.code(), error.to_string()));
                        }
                        Err(error) => {
                            warn!("[GameSession] Registry unreachable: {}", error);
                            ctx.text(ws_error_message(INTERNAL_ERROR, "Match registry unavailable"));
                        }
                    })
                    .wait(ctx);
            }
            ClientWsMessage::NextMove {
                match_id,
                player_id,
                movement,
            } => {
                let request = self.manager.send(SubmitMove {
                    match_id,
                    player_id,
                    movement: movement.into(),
                    addr,
                });
                self.reply_on_error(request, ctx);
            }
            ClientWsMessage::KeyPress { match_id, key } => {
                let request = self.manager.send(PressKey { match_id, key, addr });
                self.reply_on_error(request, ctx);
            }
            ClientWsMessage::LeaveGame { player_id } => {
                let request = self.manager.send(LeaveGame { player_id });
                self.reply_on_error(request, ctx);
            }
            ClientWsMessage::Disconnect { match_id, player_id } => {
                let request = self.manager.send(Disconnect { match_id, player_id });
                self.reply_on_error(request, ctx);
            }
            ClientWsMessage::Ping => {}
        }
    }

    /// Only failures are reported back; successful commands have no reply.
    fn reply_on_error<M, T>(
        &mut self,
        request: Request<GameSessionManager, M>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) where
        M: Message<Result = Result<T, SessionError>> + Send + 'static,
        T: Send + 'static,
        GameSessionManager: Handler<M>,
    {
        request
            .into_actor(self)
            .map(|result, act, ctx| match result {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => act.write(ctx, ServerWsMessage::error(error.code(), error.to_string())),
                Err(error) => {
                    warn!("[GameSession] Registry unreachable: {}", error);
                    ctx.text(ws_error_message(INTERNAL_ERROR, "Match registry unavailable"));
                }
            })
            .spawn(ctx);
    }

    fn write(&self, ctx: &mut ws::WebsocketContext<Self>, message: ServerWsMessage) {
        match serde_json::to_string(&message) {
            Ok(text) => ctx.text(text),
            Err(error) => {
                warn!("[GameSession] Failed to serialize ServerWsMessage: {}", error);
                ctx.text(ws_error_message(INTERNAL_ERROR, "Internal server error"));
            }
        }
    }
}

impl Actor for GameSessionActor {
    type Context = ws::WebsocketContext<Self>;

    /// Disconnects every seat this socket started or joined.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        for (match_id, player_id) in self.seats.drain(..) {
            debug!("[GameSession] Socket closed, disconnecting {} from {}", player_id, match_id);
            self.manager.do_send(Disconnect { match_id, player_id });
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GameSessionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientWsMessage>(&text) {
                Ok(command) => self.handle_command(command, ctx),
                Err(error) => {
                    debug!("[GameSession] Invalid client message: {}", error);
                    ctx.text(ws_error_message(INVALID_INPUT, "Invalid client message"));
                }
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(error) => {
                warn!("[GameSession] Protocol error: {}", error);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for GameSessionActor {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        self.write(ctx, msg);
    }
}

/// WebSocket endpoint for game clients.
pub async fn ws_game(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        GameSessionActor::new(data.game_session_manager.clone()),
        &req,
        stream,
    )
}
