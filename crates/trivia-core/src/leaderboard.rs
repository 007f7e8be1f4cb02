//! Leaderboard projection.
//!
//! Players are ordered by score, highest first. Equal scores are ordered by
//! ascending [`PlayerId`](trivia_types::PlayerId); player ids are UUID v7,
//! so ties fall back to join order. The result is a total order, and ranks
//! are the contiguous 1-based positions in it (no shared ranks, no gaps).

use trivia_types::{LeaderboardEntry, Player};

/// Project a set of players into a ranked leaderboard.
pub fn project<'a, I>(players: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut sorted: Vec<&Player> = players.into_iter().collect();
    sorted.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    (1_u32..)
        .zip(sorted)
        .map(|(rank, player)| LeaderboardEntry {
            rank,
            player_id: player.id,
            player_name: player.display_name.clone(),
            score: player.score,
        })
        .collect()
}
