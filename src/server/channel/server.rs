/// Channel server actor.
///
/// Owns every channel's membership and presence roster, fans broadcasts out to
/// the other members, and pushes a presence sync after every roster change.
use actix::prelude::*;
use log::{debug, info};

use super::messages::{ServerWsMessage, SessionKicked};
use super::registry::ChannelRegistry;
use super::session::ChannelSession;
use crate::game::entity::EntityId;
use crate::game::sync::{BroadcastEvent, PlayerMove};

type SessionAddr = Addr<ChannelSession>;

/// Message: a session subscribes to a channel.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub channel: String,
    pub session_id: EntityId,
    pub display_name: String,
    pub addr: SessionAddr,
}

/// Message: a session disconnected.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub channel: String,
    pub session_id: EntityId,
    pub addr: SessionAddr,
}

/// Message: a session publishes its presence state.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Track {
    pub channel: String,
    pub state: PlayerMove,
    pub addr: SessionAddr,
}

/// Message: a validated broadcast to forward to the rest of the channel.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Relay {
    pub channel: String,
    pub session_id: EntityId,
    pub event: BroadcastEvent,
    pub addr: SessionAddr,
}

#[derive(Default)]
pub struct ChannelServer {
    registry: ChannelRegistry<SessionAddr>,
}

impl ChannelServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn send_to_all(&self, channel: &str, msg: ServerWsMessage) {
        for addr in self.registry.members(channel) {
            addr.do_send(msg.clone());
        }
    }

    fn send_presence(&self, channel: &str) {
        let ids = self.registry.presence(channel);
        debug!("[Channel] {} presence: {:?}", channel, ids);
        self.send_to_all(channel, ServerWsMessage::presence_sync(ids));
    }
}

impl Actor for ChannelServer {
    type Context = Context<Self>;
}

impl Handler<Join> for ChannelServer {
    type Result = ();

    /// Subscribe the session and bring it up to date with who is already there.
    fn handle(&mut self, msg: Join, _ctx: &mut Self::Context) -> Self::Result {
        let joined = self
            .registry
            .join(&msg.channel, &msg.session_id, &msg.display_name, msg.addr.clone());
        if let Some(old) = joined.replaced.filter(|old| *old != msg.addr) {
            old.do_send(SessionKicked {
                reason: "Another session has connected with your id.".to_string(),
            });
            debug!("[Channel] {} reconnected to {} (old session kicked)", msg.session_id, msg.channel);
        }

        msg.addr.do_send(ServerWsMessage::subscribed(&msg.session_id));
        for state in self.registry.snapshot(&msg.channel, &msg.session_id) {
            msg.addr
                .do_send(ServerWsMessage::Broadcast(BroadcastEvent::PlayerMove(state)));
        }
        if joined.presence_changed {
            // Everyone, newcomer included, drops the replaced session until it tracks again.
            self.send_presence(&msg.channel);
        } else {
            msg.addr
                .do_send(ServerWsMessage::presence_sync(self.registry.presence(&msg.channel)));
        }

        info!(
            "[Channel] {} joined {} ({} members)",
            msg.session_id,
            msg.channel,
            self.registry.member_count(&msg.channel)
        );
    }
}

impl Handler<Leave> for ChannelServer {
    type Result = ();

    fn handle(&mut self, msg: Leave, _ctx: &mut Self::Context) -> Self::Result {
        if self.registry.leave(&msg.channel, &msg.session_id, &msg.addr) {
            info!("[Channel] {} left {}", msg.session_id, msg.channel);
            self.send_presence(&msg.channel);
        }
    }
}

impl Handler<Track> for ChannelServer {
    type Result = ();

    fn handle(&mut self, msg: Track, _ctx: &mut Self::Context) -> Self::Result {
        let id = msg.state.id.clone();
        if self.registry.track(&msg.channel, msg.state, &msg.addr) {
            debug!("[Channel] {} tracked in {}", id, msg.channel);
            self.send_presence(&msg.channel);
        }
    }
}

impl Handler<Relay> for ChannelServer {
    type Result = ();

    fn handle(&mut self, msg: Relay, _ctx: &mut Self::Context) -> Self::Result {
        if let BroadcastEvent::PlayerMove(state) = &msg.event {
            self.registry.remember_move(&msg.channel, state, &msg.addr);
        }

        let recipients = self.registry.recipients(&msg.channel, Some(&msg.session_id));
        debug!(
            "[Channel] {} from {} to {} members",
            msg.event.name(),
            msg.session_id,
            recipients.len()
        );
        let frame = ServerWsMessage::Broadcast(msg.event);
        for addr in recipients {
            addr.do_send(frame.clone());
        }
    }
}
