use actix::ActorContext;
use actix_web_actors::ws;
use serde_json::Value;

use crate::server::anti_spam::AntiSpamState;
use crate::server::ws_error::ws_error_message;

/// Shared anti-spam plumbing for WebSocket actors.
pub trait WsActorUtils {
    fn anti_spam(&mut self) -> &mut AntiSpamState;
    fn session_id(&self) -> &str;

    /// Send the ban notice, then close and stop the actor.
    fn send_ban_and_close<A>(&mut self, ctx: &mut ws::WebsocketContext<A>)
    where
        A: actix::Actor<Context = ws::WebsocketContext<A>>,
    {
        let context = serde_json::json!({
            "id": self.session_id(),
            "ban_remaining_secs": self.anti_spam().ban_remaining_secs(),
        });
        ctx.text(ws_error_message(
            "BANNED",
            "You have been banned for spamming. Please try again later.",
            Some(context),
        ));
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Policy,
            description: Some("Banned for spam".into()),
        }));
        ctx.stop();
    }

    /// Send an error unless it repeats the previous one; ban if errors flood.
    fn send_error_and_maybe_ban<A>(
        &mut self,
        ctx: &mut ws::WebsocketContext<A>,
        code: &str,
        message: &str,
        context: Option<Value>,
    ) where
        A: actix::Actor<Context = ws::WebsocketContext<A>>,
    {
        let session_id = self.session_id().to_string();
        if !self.anti_spam().should_send_error(code, &session_id) {
            return;
        }
        if self.anti_spam().record_response(&session_id) {
            self.send_ban_and_close(ctx);
            return;
        }
        ctx.text(ws_error_message(code, message, context));
    }
}
