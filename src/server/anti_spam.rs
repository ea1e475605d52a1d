use std::time::{Duration, Instant};
use log::warn;

use crate::config::anti_spam::{
    BAN_DURATION_SECONDS, CHAT_BAN_DURATION_SECONDS, MAX_REQUESTS_PER_SECOND, MAX_RESPONSES_PER_SECOND,
};

/// Tracks anti-spam state for a single relay session.
pub struct AntiSpamState {
    // Last error code sent (for suppression)
    last_error_code: Option<String>,
    // Timestamp of last reset (for per-second counters)
    last_tick: Instant,
    // Number of error responses sent in the current second
    responses_this_tick: u32,
    // Number of requests received in the current second
    requests_this_tick: u32,
    banned_until: Option<Instant>,
    // Chat-only mute, set by blocked words
    chat_muted_until: Option<Instant>,
}

impl Default for AntiSpamState {
    fn default() -> Self {
        Self::new()
    }
}

impl AntiSpamState {
    pub fn new() -> Self {
        Self {
            last_error_code: None,
            last_tick: Instant::now(),
            responses_this_tick: 0,
            requests_this_tick: 0,
            banned_until: None,
            chat_muted_until: None,
        }
    }

    /// Call at the start of every incoming frame.
    /// Returns true if the session is currently banned.
    pub fn record_request(&mut self, session_id: &str) -> bool {
        self.tick(Instant::now());
        self.requests_this_tick += 1;
        if self.requests_this_tick > MAX_REQUESTS_PER_SECOND {
            self.ban(session_id, "Too many requests per second");
            return true;
        }
        self.is_banned()
    }

    /// Call before every error response.
    /// Returns true if the session is currently banned.
    pub fn record_response(&mut self, session_id: &str) -> bool {
        self.tick(Instant::now());
        self.responses_this_tick += 1;
        if self.responses_this_tick > MAX_RESPONSES_PER_SECOND {
            self.ban(session_id, "Too many responses per second");
            return true;
        }
        self.is_banned()
    }

    /// Call when sending an error. Returns true if the error should be sent (not suppressed).
    pub fn should_send_error(&mut self, error_code: &str, session_id: &str) -> bool {
        if self.last_error_code.as_deref() == Some(error_code) {
            warn!("[AntiSpam] Suppressed duplicate error '{}' for session={}", error_code, session_id);
            return false;
        }
        self.last_error_code = Some(error_code.to_string());
        true
    }

    /// Call when a valid frame was accepted.
    pub fn reset_on_valid_action(&mut self) {
        self.last_error_code = None;
    }

    pub fn is_banned(&self) -> bool {
        self.banned_until.is_some_and(|until| Instant::now() < until)
    }

    /// Returns the remaining ban duration in seconds, or 0 if not banned.
    pub fn ban_remaining_secs(&self) -> u64 {
        remaining_secs(self.banned_until)
    }

    /// Silence the session's chat for CHAT_BAN_DURATION_SECONDS.
    pub fn mute_chat(&mut self, session_id: &str, word: &str) {
        let until = Instant::now() + Duration::from_secs(CHAT_BAN_DURATION_SECONDS);
        self.chat_muted_until = Some(until);
        warn!("[AntiSpam] Muted chat for session={} until {:?}: blocked word {:?}", session_id, until, word);
    }

    pub fn is_chat_muted(&self) -> bool {
        self.chat_muted_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn chat_mute_remaining_secs(&self) -> u64 {
        remaining_secs(self.chat_muted_until)
    }

    /// Ban the session for BAN_DURATION_SECONDS.
    fn ban(&mut self, session_id: &str, reason: &str) {
        let until = Instant::now() + Duration::from_secs(BAN_DURATION_SECONDS);
        self.banned_until = Some(until);
        warn!("[AntiSpam] Banned session={} until {:?} for reason: {}", session_id, until, reason);
    }

    /// Reset per-second counters if a new second has started.
    fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_tick) >= Duration::from_secs(1) {
            self.last_tick = now;
            self.responses_this_tick = 0;
            self.requests_this_tick = 0;
        }
    }
}

fn remaining_secs(until: Option<Instant>) -> u64 {
    until
        .and_then(|until| until.checked_duration_since(Instant::now()))
        .map_or(0, |left| left.as_secs())
}
