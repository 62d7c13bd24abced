use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

/// One tracked user and their daily standing.
///
/// `status == true` means the user has not chatted during today's judgement
/// window yet — they are still a "loker". The morning reset raises the flag
/// for everyone; chatting inside the window clears it.
#[derive(Debug, Clone, Serialize)]
pub struct Loker {
    pub user_id: u64,
    /// Display tag, shown verbatim in verdict announcements.
    pub tag: String,
    pub status: bool,
    /// Guilds this user is a member of.
    pub guilds: HashSet<u64>,
}

/// In-memory membership cache, kept in sync with live add/remove events from
/// the chat gateway.
///
/// Holds one entry per unique user across all guilds, plus a per-guild
/// member index. Bots are the caller's concern: the gateway adapter filters
/// them before calling in.
#[derive(Default)]
pub struct Roster {
    users: DashMap<u64, Loker>,
    guilds: DashMap<u64, HashSet<u64>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guild and its current members in one sweep.
    pub fn add_guild(&self, guild_id: u64, members: impl IntoIterator<Item = (u64, String)>) {
        self.guilds.entry(guild_id).or_default();
        for (user_id, tag) in members {
            self.add_member(guild_id, user_id, tag);
        }
        debug!(guild_id, "guild added");
    }

    /// Drop a guild and strip it from every member's guild list. Users whose
    /// last guild this was are evicted entirely.
    pub fn remove_guild(&self, guild_id: u64) {
        let members = self.guilds.remove(&guild_id).map(|(_, m)| m).unwrap_or_default();
        for user_id in members {
            self.detach_user_from_guild(user_id, guild_id);
        }
        debug!(guild_id, "guild removed");
    }

    /// Add a member to a guild. New users start flagged (`status == true`);
    /// known users just gain a guild.
    pub fn add_member(&self, guild_id: u64, user_id: u64, tag: String) {
        self.guilds.entry(guild_id).or_default().insert(user_id);
        self.users
            .entry(user_id)
            .and_modify(|loker| {
                loker.guilds.insert(guild_id);
            })
            .or_insert_with(|| Loker {
                user_id,
                tag,
                status: true,
                guilds: HashSet::from([guild_id]),
            });
    }

    /// Remove a member from a guild. The user is evicted from the roster
    /// when this was their last guild.
    pub fn remove_member(&self, guild_id: u64, user_id: u64) {
        if let Some(mut members) = self.guilds.get_mut(&guild_id) {
            members.remove(&user_id);
        }
        self.detach_user_from_guild(user_id, guild_id);
    }

    fn detach_user_from_guild(&self, user_id: u64, guild_id: u64) {
        let evict = match self.users.get_mut(&user_id) {
            Some(mut loker) => {
                loker.guilds.remove(&guild_id);
                loker.guilds.is_empty()
            }
            None => false,
        };
        if evict {
            self.users.remove(&user_id);
            debug!(user_id, "user evicted with last guild");
        }
    }

    /// Set every user's status at once (the morning reset).
    pub fn set_status_all(&self, flag: bool) {
        for mut entry in self.users.iter_mut() {
            entry.status = flag;
        }
    }

    /// Set one user's status. Returns false if the user is unknown.
    pub fn set_status(&self, user_id: u64, flag: bool) -> bool {
        match self.users.get_mut(&user_id) {
            Some(mut loker) => {
                loker.status = flag;
                true
            }
            None => false,
        }
    }

    /// Snapshot of one user's entry.
    pub fn get(&self, user_id: u64) -> Option<Loker> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Visit every tracked user.
    pub fn for_each_loker(&self, mut callback: impl FnMut(&Loker)) {
        for entry in self.users.iter() {
            callback(entry.value());
        }
    }

    /// Per-guild verdict listing: every guild mapped to its members still
    /// flagged as lokere. Guilds with a clean slate map to an empty list —
    /// the empty verdict gets announced too.
    pub fn guilty_by_guild(&self) -> HashMap<u64, Vec<Loker>> {
        let mut verdict: HashMap<u64, Vec<Loker>> = HashMap::new();
        for entry in self.guilds.iter() {
            verdict.insert(*entry.key(), Vec::new());
        }
        for entry in self.users.iter() {
            let loker = entry.value();
            if !loker.status {
                continue;
            }
            for guild_id in &loker.guilds {
                verdict.entry(*guild_id).or_default().push(loker.clone());
            }
        }
        for members in verdict.values_mut() {
            members.sort_by_key(|loker| loker.user_id);
        }
        verdict
    }

    /// Ids of every tracked guild.
    pub fn guild_ids(&self) -> Vec<u64> {
        self.guilds.iter().map(|entry| *entry.key()).collect()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }
}
