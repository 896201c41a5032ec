//! In-memory fakes backing the unit tests.
//!
//! Both fakes honor the contracts of their traits closely enough for the
//! handler and handshake tests to run without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::GameStateStore;
use crate::game::{GameResult, GameState};
use crate::players::{Player, PlayerDirectory, PlayerId, PlayerResult};

/// `GameStateStore` over a mutex-guarded `Option<GameState>`.
pub struct MemoryStore {
    state: Mutex<Option<GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<GameState>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl GameStateStore for MemoryStore {
    async fn load(&self) -> GameResult<Option<GameState>> {
        Ok(self.lock().clone())
    }

    async fn create(&self, state: &GameState) -> GameResult<()> {
        *self.lock() = Some(state.clone());
        Ok(())
    }

    async fn update(&self, state: &GameState) -> GameResult<()> {
        *self.lock() = Some(state.clone());
        Ok(())
    }

    async fn delete(&self) -> GameResult<()> {
        *self.lock() = None;
        Ok(())
    }
}

struct DirectoryInner {
    players: HashMap<PlayerId, Player>,
    next_id: PlayerId,
}

/// `PlayerDirectory` over a mutex-guarded map, with test-side mutation
/// helpers.
pub struct MemoryDirectory {
    inner: Mutex<DirectoryInner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DirectoryInner {
                players: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DirectoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_player(&self, name: &str, secret: &str) -> PlayerId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.players.insert(
            id,
            Player {
                id,
                name: name.to_string(),
                secret: secret.to_string(),
                notes: String::new(),
                hidden_notes: String::new(),
                stats: Vec::new(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn remove_player(&self, id: PlayerId) {
        self.lock().players.remove(&id);
    }

    pub fn ids(&self) -> HashSet<PlayerId> {
        self.lock().players.keys().copied().collect()
    }
}

#[async_trait]
impl PlayerDirectory for MemoryDirectory {
    async fn get_by_id(&self, id: PlayerId) -> PlayerResult<Option<Player>> {
        Ok(self.lock().players.get(&id).cloned())
    }

    async fn id_by_name(&self, name: &str) -> PlayerResult<Option<PlayerId>> {
        Ok(self
            .lock()
            .players
            .values()
            .find(|p| p.name == name)
            .map(|p| p.id))
    }

    async fn name_by_id(&self, id: PlayerId) -> PlayerResult<Option<String>> {
        Ok(self.lock().players.get(&id).map(|p| p.name.clone()))
    }

    async fn all_ids(&self) -> PlayerResult<HashSet<PlayerId>> {
        Ok(self.ids())
    }
}
