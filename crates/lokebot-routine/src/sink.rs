use async_trait::async_trait;

use lokebot_roster::Loker;

/// Seam to the chat adapter: the routine decides *what* to announce, the
/// sink decides how it reaches each guild's channel.
#[async_trait]
pub trait AnnouncementSink: Send + Sync {
    /// Deliver the daily verdict for one guild. `guilty` may be empty — the
    /// clean slate is announced too.
    async fn announce_verdict(&self, guild_id: u64, guilty: &[Loker]);

    /// Deliver the weekend kickoff announcement to one guild.
    async fn announce_weekend(&self, guild_id: u64);
}
