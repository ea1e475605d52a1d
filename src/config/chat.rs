/// Chat configuration constants.
///
/// Bubble lifetime on the canvas and the message rules applied on both sides of
/// the realtime channel.

/// How long a chat bubble stays above its speaker.
pub const CHAT_BUBBLE_LIFETIME_MS: u64 = 3000;

/// Final part of the lifetime during which the bubble fades out.
pub const CHAT_BUBBLE_FADE_MS: u64 = 500;

/// Longest chat message, in characters.
pub const CHAT_MAX_CHARS: usize = 40;

/// Words that get a message dropped (and the sender muted on the relay).
pub const BLOCKED_WORDS: &[&str] = &[
    "idiot", "stupid", "imbecil", "idiota", "estupido", "tonto", "mierda", "puta", "nazi",
    "hitler", "bastardo", "gonorrea", "boludo", "pelotudo", "cojudo", "huevon",
];
