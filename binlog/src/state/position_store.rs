use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::position::position::Position;

/// Durable home of the last committed position.
pub trait PositionStore: Send + Sync {
    /// `None` when nothing was saved yet.
    fn load(&self) -> CResult<Option<Position>>;

    fn save(&self, pos: &Position) -> CResult<()>;
}

/// Keeps the position for the life of the process only.
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    saved: Mutex<Option<Position>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        MemoryPositionStore::default()
    }

    pub fn with_position(pos: Position) -> Self {
        MemoryPositionStore {
            saved: Mutex::new(Some(pos)),
        }
    }
}

impl PositionStore for MemoryPositionStore {
    fn load(&self) -> CResult<Option<Position>> {
        let saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        Ok(saved.clone())
    }

    fn save(&self, pos: &Position) -> CResult<()> {
        let mut saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        *saved = Some(pos.clone());
        Ok(())
    }
}

/// JSON file, replaced atomically through a sibling `.tmp` file.
#[derive(Debug, Clone)]
pub struct FilePositionStore {
    path: PathBuf,
}

impl FilePositionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FilePositionStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl PositionStore for FilePositionStore {
    fn load(&self) -> CResult<Option<Position>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let pos: Position = serde_json::from_str(&text).map_err(|e| {
            ReError::ConfigFileParseErr(format!("{}: {}", self.path.display(), e))
        })?;
        debug!("loaded position {} from {}", pos, self.path.display());
        Ok(Some(pos))
    }

    fn save(&self, pos: &Position) -> CResult<()> {
        let text = serde_json::to_string(pos).map_err(|e| ReError::String(e.to_string()))?;
        let tmp = self.tmp_path();
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
