use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{error, info};

use common::err::CResult;

use crate::position::position::Position;
use crate::state::position_store::{MemoryPositionStore, PositionStore};

/// Snapshot of the replication state shared with the embedding application.
///
/// Times are unix seconds, 0 when never set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub connect_time: i64,
    pub last_filtered_update: i64,
    pub last_event_time: i64,
    pub last_update: i64,
    /// last committed position
    pub position: Position,
    /// log_pos of the last event read, may be inside a transaction
    pub intransaction_pos: u64,
    pub connect_count: u32,
    pub state_processing: bool,
    /// `db.table` -> rows delivered
    pub table_counts: HashMap<String, u64>,
}

/// State the stream controller reports to and reads its start position from.
///
/// Called from the streaming thread and read from any other, so every method takes `&self`.
pub trait ExtState: Send + Sync {
    fn get_state(&self) -> State;

    fn set_connecting(&self);

    fn get_connect_time(&self) -> i64;

    fn set_last_filtered_update_time(&self);

    fn get_last_filtered_update_time(&self) -> i64;

    fn set_last_event_time_pos(&self, when: i64, pos: u64);

    fn get_last_update_time(&self) -> i64;

    fn get_last_event_time(&self) -> i64;

    fn get_intransaction_pos(&self) -> u64;

    /// Records a commit boundary.
    fn set_master_position(&self, pos: &Position);

    /// Persists the position set last.
    fn save_master_position(&self) -> CResult<()>;

    /// Position from persistent storage, `None` on first start.
    fn load_master_position(&self) -> CResult<Option<Position>>;

    /// The committed position, falling back to persistent storage.
    fn get_master_position(&self) -> CResult<Option<Position>>;

    fn get_connect_count(&self) -> u32;

    fn set_state_processing(&self, processing: bool);

    fn get_state_processing(&self) -> bool;

    fn init_table_count(&self, full_name: &str);

    fn inc_table_count(&self, full_name: &str);
}

/// `State` under one mutex, persisted through a `PositionStore`.
pub struct DefaultExtState {
    state: Mutex<State>,
    store: Box<dyn PositionStore>,
}

impl DefaultExtState {
    pub fn new(store: Box<dyn PositionStore>) -> Self {
        DefaultExtState {
            state: Mutex::new(State::default()),
            store,
        }
    }

    pub fn in_memory() -> Self {
        DefaultExtState::new(Box::new(MemoryPositionStore::new()))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }
}

impl ExtState for DefaultExtState {
    fn get_state(&self) -> State {
        self.lock().clone()
    }

    fn set_connecting(&self) {
        let mut s = self.lock();
        s.connect_time = DefaultExtState::now();
        s.connect_count += 1;
    }

    fn get_connect_time(&self) -> i64 {
        self.lock().connect_time
    }

    fn set_last_filtered_update_time(&self) {
        self.lock().last_filtered_update = DefaultExtState::now();
    }

    fn get_last_filtered_update_time(&self) -> i64 {
        self.lock().last_filtered_update
    }

    fn set_last_event_time_pos(&self, when: i64, pos: u64) {
        let mut s = self.lock();
        s.last_event_time = when;
        s.intransaction_pos = pos;
        s.last_update = DefaultExtState::now();
    }

    fn get_last_update_time(&self) -> i64 {
        self.lock().last_update
    }

    fn get_last_event_time(&self) -> i64 {
        self.lock().last_event_time
    }

    fn get_intransaction_pos(&self) -> u64 {
        self.lock().intransaction_pos
    }

    fn set_master_position(&self, pos: &Position) {
        let mut s = self.lock();
        s.position = pos.clone();
        s.intransaction_pos = pos.log_pos;
    }

    fn save_master_position(&self) -> CResult<()> {
        let pos = self.lock().position.clone();
        if pos.empty() {
            return Ok(());
        }
        self.store.save(&pos).map_err(|e| {
            error!("failed to save position {}: {}", pos, e);
            e
        })
    }

    fn load_master_position(&self) -> CResult<Option<Position>> {
        let pos = self.store.load()?;
        if let Some(p) = &pos {
            info!("loaded master position {}", p);
        }
        Ok(pos.filter(|p| !p.empty()))
    }

    fn get_master_position(&self) -> CResult<Option<Position>> {
        {
            let s = self.lock();
            if !s.position.empty() {
                return Ok(Some(s.position.clone()));
            }
        }
        self.load_master_position()
    }

    fn get_connect_count(&self) -> u32 {
        self.lock().connect_count
    }

    fn set_state_processing(&self, processing: bool) {
        self.lock().state_processing = processing;
    }

    fn get_state_processing(&self) -> bool {
        self.lock().state_processing
    }

    fn init_table_count(&self, full_name: &str) {
        self.lock().table_counts.entry(full_name.to_string()).or_insert(0);
    }

    fn inc_table_count(&self, full_name: &str) {
        *self.lock().table_counts.entry(full_name.to_string()).or_insert(0) += 1;
    }
}
