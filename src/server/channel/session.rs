/// WebSocket session handler for a realtime channel.
///
/// One actor per connected client. Validates every frame (rate limits, id
/// ownership, chat rules) before handing it to the channel server, and writes
/// whatever the server pushes back to the socket.
use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, http::StatusCode, web};
use actix_web_actors::ws;
use log::{debug, warn};
use std::borrow::Cow;
use uuid::Uuid;

use super::messages::{ClientWsMessage, ServerWsMessage, SessionKicked};
use super::server::{ChannelServer, Join, Leave, Relay, Track};
use crate::config::server::MAX_CELL_COORDINATE;
use crate::game::chat::{ChatVerdict, screen_message};
use crate::game::entity::EntityId;
use crate::game::sync::{BroadcastEvent, ChatPayload, PlayerMove};
use crate::server::anti_spam::AntiSpamState;
use crate::server::ws_actor_utils::WsActorUtils;
use crate::server::ws_error::{http_error_response, ws_session_kicked_message};

pub struct ChannelSession {
    pub session_id: EntityId,
    pub display_name: String,
    pub channel: String,
    pub server_addr: Addr<ChannelServer>,
    anti_spam: AntiSpamState,
}

impl ChannelSession {
    pub fn new(
        session_id: EntityId,
        display_name: String,
        channel: String,
        server_addr: Addr<ChannelServer>,
    ) -> Self {
        Self {
            session_id,
            display_name,
            channel,
            server_addr,
            anti_spam: AntiSpamState::new(),
        }
    }

    /// Check a broadcast before it leaves this session. `Err` holds the error code and message.
    fn screen_broadcast(&mut self, event: BroadcastEvent) -> Result<BroadcastEvent, (&'static str, String)> {
        match event {
            BroadcastEvent::PlayerMove(mut state) => {
                if state.id != self.session_id {
                    return Err(("ID_MISMATCH", "Moves can only be published for your own id.".into()));
                }
                check_cell_range(&state)?;
                if state.name.is_none() {
                    state.name = Some(self.display_name.clone());
                }
                Ok(BroadcastEvent::PlayerMove(state))
            }
            BroadcastEvent::Chat(chat) => {
                if chat.id != self.session_id {
                    return Err(("ID_MISMATCH", "Chat can only be sent under your own id.".into()));
                }
                if self.anti_spam.is_chat_muted() {
                    return Err((
                        "CHAT_MUTED",
                        format!(
                            "Chat is muted for another {} seconds.",
                            self.anti_spam.chat_mute_remaining_secs()
                        ),
                    ));
                }
                match screen_message(&chat.message) {
                    ChatVerdict::Accepted(message) => {
                        Ok(BroadcastEvent::Chat(ChatPayload::new(chat.id, message)))
                    }
                    ChatVerdict::Empty => Err(("EMPTY_CHAT", "Chat messages cannot be empty.".into())),
                    ChatVerdict::Blocked { word } => {
                        let session_id = self.session_id.clone();
                        self.anti_spam.mute_chat(&session_id, word);
                        Err(("CHAT_BLOCKED", "Message contains a blocked word; chat muted.".into()))
                    }
                }
            }
        }
    }
}

impl WsActorUtils for ChannelSession {
    fn anti_spam(&mut self) -> &mut AntiSpamState {
        &mut self.anti_spam
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Actor for ChannelSession {
    type Context = ws::WebsocketContext<Self>;

    /// Subscribes the session to its channel.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.server_addr.do_send(Join {
            channel: self.channel.clone(),
            session_id: self.session_id.clone(),
            display_name: self.display_name.clone(),
            addr: ctx.address(),
        });
    }

    /// Removes the session from its channel's roster.
    fn stopped(&mut self, ctx: &mut Self::Context) {
        self.server_addr.do_send(Leave {
            channel: self.channel.clone(),
            session_id: self.session_id.clone(),
            addr: ctx.address(),
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChannelSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let text = match msg {
            Ok(ws::Message::Text(text)) => text,
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
                return;
            }
            Ok(ws::Message::Close(_)) => {
                ctx.stop();
                return;
            }
            _ => return,
        };

        let session_id = self.session_id.clone();
        if self.anti_spam.record_request(&session_id) {
            self.send_ban_and_close(ctx);
            return;
        }

        let msg = match serde_json::from_str::<ClientWsMessage>(&text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("[Session] Dropped malformed frame from {}: {}", self.session_id, e);
                self.send_error_and_maybe_ban(ctx, "INVALID_MESSAGE", "Invalid client message", None);
                return;
            }
        };

        match msg {
            ClientWsMessage::Ping => {}
            ClientWsMessage::Track(state) => {
                if state.id != self.session_id {
                    self.send_error_and_maybe_ban(
                        ctx,
                        "ID_MISMATCH",
                        "Presence can only be tracked for your own id.",
                        None,
                    );
                    return;
                }
                if let Err((code, message)) = check_cell_range(&state) {
                    self.send_error_and_maybe_ban(ctx, code, &message, None);
                    return;
                }
                self.anti_spam.reset_on_valid_action();
                self.server_addr.do_send(Track {
                    channel: self.channel.clone(),
                    state,
                    addr: ctx.address(),
                });
            }
            ClientWsMessage::Broadcast(event) => match self.screen_broadcast(event) {
                Ok(event) => {
                    self.anti_spam.reset_on_valid_action();
                    self.server_addr.do_send(Relay {
                        channel: self.channel.clone(),
                        session_id: self.session_id.clone(),
                        event,
                        addr: ctx.address(),
                    });
                }
                Err((code, message)) => {
                    debug!("[Session] Rejected broadcast from {}: {}", self.session_id, code);
                    self.send_error_and_maybe_ban(ctx, code, &message, None);
                }
            },
        }
    }
}

impl Handler<ServerWsMessage> for ChannelSession {
    type Result = ();

    /// Writes a server frame to the socket.
    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                warn!("[Session] Failed to serialize ServerWsMessage: {}", e);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

impl Handler<SessionKicked> for ChannelSession {
    type Result = ();

    fn handle(&mut self, msg: SessionKicked, ctx: &mut Self::Context) {
        let context = serde_json::json!({ "id": self.session_id });
        ctx.text(ws_session_kicked_message(&msg.reason, Some(context)));
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Policy,
            description: Some("Session replaced".into()),
        }));
        ctx.stop();
    }
}

/// Reject positions no board could hold.
fn check_cell_range(state: &PlayerMove) -> Result<(), (&'static str, String)> {
    let limit = MAX_CELL_COORDINATE.unsigned_abs();
    if state.x.unsigned_abs() > limit || state.y.unsigned_abs() > limit {
        return Err((
            "OUT_OF_RANGE",
            format!("Cell coordinates must stay within ±{MAX_CELL_COORDINATE}."),
        ));
    }
    Ok(())
}

/// Identity a client connects with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub id: EntityId,
    pub name: String,
}

/// Read `id` and `name` from the query string. A missing id becomes `player-<uuid>`.
pub fn parse_session_query(query: &str) -> SessionQuery {
    let mut id = String::new();
    let mut name = String::new();

    for kv in query.split('&') {
        let mut split = kv.splitn(2, '=');
        match (split.next(), split.next()) {
            (Some("id"), Some(value)) => {
                id = urlencoding::decode(value)
                    .unwrap_or_else(|_| Cow::Borrowed(""))
                    .trim()
                    .to_string();
            }
            (Some("name"), Some(value)) => {
                name = urlencoding::decode(value)
                    .unwrap_or_else(|_| Cow::Borrowed(""))
                    .trim()
                    .to_string();
            }
            _ => {}
        }
    }

    if id.is_empty() {
        id = format!("player-{}", Uuid::new_v4());
    }
    if name.is_empty() {
        let short: String = id.trim_start_matches("player-").chars().take(6).collect();
        name = format!("Player_{short}");
    }
    SessionQuery { id, name }
}

/// WebSocket endpoint for a realtime channel.
///
/// Path: `/ws/channel/{channel}`. Query parameters: `id` (optional), `name` (optional, URL-encoded).
pub async fn ws_channel(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let channel = req.match_info().query("channel").trim().to_string();
    if channel.is_empty() {
        return Ok(http_error_response(
            "MISSING_CHANNEL",
            "Channel name is required",
            None,
            StatusCode::BAD_REQUEST,
        ));
    }

    let SessionQuery { id, name } = parse_session_query(req.query_string());
    debug!("[Session] {} ({}) connecting to {}", id, name, channel);

    ws::start(
        ChannelSession::new(id, name, channel, data.channel_server.clone()),
        &req,
        stream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_decodes_id_and_name() {
        let query = parse_session_query("id=abc-123&name=Ana%20Mar%C3%ADa");
        assert_eq!(query.id, "abc-123");
        assert_eq!(query.name, "Ana María");
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let query = parse_session_query("name=Bo");
        assert!(query.id.starts_with("player-"));
        assert!(Uuid::parse_str(&query.id["player-".len()..]).is_ok());
        assert_eq!(query.name, "Bo");
    }

    fn at(x: i32, y: i32) -> PlayerMove {
        PlayerMove {
            id: "a".to_string(),
            x,
            y,
            name: None,
            colors: Default::default(),
        }
    }

    #[test]
    fn test_cell_range_rejects_extreme_coordinates() {
        assert!(check_cell_range(&at(-40, 12)).is_ok());
        assert!(check_cell_range(&at(MAX_CELL_COORDINATE, -MAX_CELL_COORDINATE)).is_ok());
        assert_eq!(check_cell_range(&at(i32::MAX, 0)).unwrap_err().0, "OUT_OF_RANGE");
        assert_eq!(check_cell_range(&at(0, i32::MIN)).unwrap_err().0, "OUT_OF_RANGE");
    }

    #[test]
    fn test_missing_name_derives_from_id() {
        let query = parse_session_query("id=player-7f3a9c2d");
        assert_eq!(query.name, "Player_7f3a9c");
        assert_eq!(parse_session_query("").name.len(), "Player_".len() + 6);
    }
}
