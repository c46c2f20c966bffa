mod counts;
mod descriptor;
mod history;
mod leaderboard;

pub use counts::{Count32, Count64};
pub use descriptor::{BlobSize, CommitSize, Descriptor, ObjectKind, TagSize, TreeSize};
pub use history::{reference_group, HistorySize};
pub use leaderboard::{Category, Leaderboard, LeaderboardEntry, Leaderboards, LEADERBOARD_CAPACITY};

use gix::ObjectId;

/// Serialize an object id as its hex string
pub(crate) fn serialize_oid<S: serde::Serializer>(id: &ObjectId, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(id)
}
