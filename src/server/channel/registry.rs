//! Channel membership and presence bookkeeping.
//!
//! Kept free of actix so the rules can be tested directly: `A` is whatever
//! handle the server uses to reach a session.

use std::collections::{BTreeMap, HashMap};

use crate::game::entity::EntityId;
use crate::game::sync::PlayerMove;

#[derive(Debug, Clone)]
struct Member<A> {
    addr: A,
    name: String,
    /// Last tracked or broadcast position; `None` until the session tracks.
    state: Option<PlayerMove>,
}

#[derive(Debug)]
pub struct ChannelRegistry<A> {
    channels: HashMap<String, BTreeMap<EntityId, Member<A>>>,
}

impl<A> Default for ChannelRegistry<A> {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }
}

/// Result of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined<A> {
    /// Handle of the session this join displaced.
    pub replaced: Option<A>,
    /// The displaced session was in the presence roster and no longer is.
    pub presence_changed: bool,
}

impl<A: Clone + PartialEq> ChannelRegistry<A> {
    /// Add a member, replacing any session already registered under `id`.
    pub fn join(&mut self, channel: &str, id: &str, name: &str, addr: A) -> Joined<A> {
        let members = self.channels.entry(channel.to_string()).or_default();
        let previous = members.insert(
            id.to_string(),
            Member {
                addr,
                name: name.to_string(),
                state: None,
            },
        );
        Joined {
            presence_changed: previous.as_ref().is_some_and(|m| m.state.is_some()),
            replaced: previous.map(|m| m.addr),
        }
    }

    /// Remove a member, but only if `addr` is still the session registered for it.
    pub fn leave(&mut self, channel: &str, id: &str, addr: &A) -> bool {
        let Some(members) = self.channels.get_mut(channel) else {
            return false;
        };
        if members.get(id).is_none_or(|m| m.addr != *addr) {
            return false;
        }
        members.remove(id);
        if members.is_empty() {
            self.channels.remove(channel);
        }
        true
    }

    /// Record a member's presence state. A missing name is filled from the session.
    pub fn track(&mut self, channel: &str, mut state: PlayerMove, addr: &A) -> bool {
        let Some(member) = self.member_mut(channel, &state.id, addr) else {
            return false;
        };
        if state.name.is_none() {
            state.name = Some(member.name.clone());
        }
        member.state = Some(state);
        true
    }

    /// Keep the last position of a tracked member current.
    pub fn remember_move(&mut self, channel: &str, state: &PlayerMove, addr: &A) {
        if let Some(member) = self.member_mut(channel, &state.id, addr) {
            if let Some(last) = member.state.as_mut() {
                last.x = state.x;
                last.y = state.y;
                if state.name.is_some() {
                    last.name = state.name.clone();
                }
                last.colors.extend(state.colors.iter().map(|(k, v)| (k.clone(), *v)));
            }
        }
    }

    /// Ids of every tracked member, sorted.
    pub fn presence(&self, channel: &str) -> Vec<EntityId> {
        self.channels
            .get(channel)
            .map(|members| {
                members
                    .iter()
                    .filter(|(_, m)| m.state.is_some())
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Last known state of every tracked member except `except`.
    pub fn snapshot(&self, channel: &str, except: &str) -> Vec<PlayerMove> {
        self.channels
            .get(channel)
            .map(|members| {
                members
                    .iter()
                    .filter(|(id, _)| id.as_str() != except)
                    .filter_map(|(_, m)| m.state.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn members(&self, channel: &str) -> Vec<A> {
        self.recipients(channel, None)
    }

    /// Every member handle except the sender's.
    pub fn recipients(&self, channel: &str, except: Option<&str>) -> Vec<A> {
        self.channels
            .get(channel)
            .map(|members| {
                members
                    .iter()
                    .filter(|(id, _)| Some(id.as_str()) != except)
                    .map(|(_, m)| m.addr.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn member_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, BTreeMap::len)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn member_mut(&mut self, channel: &str, id: &str, addr: &A) -> Option<&mut Member<A>> {
        self.channels
            .get_mut(channel)?
            .get_mut(id)
            .filter(|m| m.addr == *addr)
    }
}
