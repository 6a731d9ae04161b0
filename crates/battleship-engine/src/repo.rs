//! In-memory storage for players, boards and matches.
//!
//! The repository holds no rules. It hands out ids and shared handles;
//! each entity sits behind its own lock so operations on different
//! matches or boards never wait on each other.
//!
//! # Lock order
//!
//! Callers that hold more than one entity lock take them in the order
//! match → player → board, and never hold a map lock while waiting on an
//! entity lock. The map locks are only held for a lookup or an insert.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use battleship_protocol::{MatchId, PlayerId};
use parking_lot::{Mutex, RwLock};

use crate::{Board, BoardId, Match, Player};

/// Shared handle to one entity.
pub type Shared<T> = Arc<Mutex<T>>;

/// Thread-safe, id-keyed registries. Ids start at 1 and only grow.
#[derive(Debug)]
pub struct Repository {
    players: RwLock<HashMap<PlayerId, Shared<Player>>>,
    boards: RwLock<HashMap<BoardId, Shared<Board>>>,
    matches: RwLock<HashMap<MatchId, Shared<Match>>>,
    next_player_id: AtomicU64,
    next_board_id: AtomicU64,
    next_match_id: AtomicU64,
}

impl Default for Repository {
    fn default() -> Self {
        Self {
            players: RwLock::default(),
            boards: RwLock::default(),
            matches: RwLock::default(),
            next_player_id: AtomicU64::new(1),
            next_board_id: AtomicU64::new(1),
            next_match_id: AtomicU64::new(1),
        }
    }
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_player(&self) -> Player {
        let id = PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed));
        let player = Player::new(id);
        self.players.write().insert(id, Arc::new(Mutex::new(player)));
        player
    }

    pub fn player(&self, id: PlayerId) -> Option<Shared<Player>> {
        self.players.read().get(&id).cloned()
    }

    pub fn create_board(&self, rows: u32, cols: u32) -> BoardId {
        let id = BoardId(self.next_board_id.fetch_add(1, Ordering::Relaxed));
        let board = Board::new(id, rows, cols);
        self.boards.write().insert(id, Arc::new(Mutex::new(board)));
        id
    }

    pub fn board(&self, id: BoardId) -> Option<Shared<Board>> {
        self.boards.read().get(&id).cloned()
    }

    pub fn create_match(&self, creator: PlayerId) -> Shared<Match> {
        let id = MatchId(self.next_match_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(Mutex::new(Match::new(id, creator)));
        self.matches.write().insert(id, Arc::clone(&entry));
        entry
    }

    pub fn find_match(&self, id: MatchId) -> Option<Shared<Match>> {
        self.matches.read().get(&id).cloned()
    }

    /// Every match, sorted by id.
    pub fn matches(&self) -> Vec<Shared<Match>> {
        let mut entries: Vec<_> = self
            .matches
            .read()
            .iter()
            .map(|(id, entry)| (*id, Arc::clone(entry)))
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let repo = Repository::new();

        assert_eq!(repo.create_player().id, PlayerId(1));
        assert_eq!(repo.create_player().id, PlayerId(2));
        assert_eq!(repo.create_board(10, 10), BoardId(1));
        assert_eq!(repo.create_match(PlayerId(1)).lock().id(), MatchId(1));
    }

    #[test]
    fn test_lookup_unknown_ids_is_none() {
        let repo = Repository::new();

        assert!(repo.player(PlayerId(1)).is_none());
        assert!(repo.board(BoardId(1)).is_none());
        assert!(repo.find_match(MatchId(1)).is_none());
    }

    #[test]
    fn test_handles_share_the_same_entity() {
        let repo = Repository::new();
        let id = repo.create_player().id;

        repo.player(id).unwrap().lock().board = Some(BoardId(9));

        assert_eq!(repo.player(id).unwrap().lock().board, Some(BoardId(9)));
    }

    #[test]
    fn test_matches_sorted_by_id() {
        let repo = Repository::new();
        for _ in 0..5 {
            repo.create_match(PlayerId(1));
        }

        let ids: Vec<_> = repo.matches().iter().map(|m| m.lock().id()).collect();

        assert_eq!(ids, (1..=5).map(MatchId).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrent_create_player_yields_distinct_ids() {
        let repo = Arc::new(Repository::new());

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    (0..50).map(|_| repo.create_player().id).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<PlayerId> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();

        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert!(repo.player(PlayerId(400)).is_some());
        assert!(repo.player(PlayerId(401)).is_none());
    }
}
