// SPDX-License-Identifier: Apache-2.0

use crate::tag::Tag;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateError(pub String);

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StateError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTag {
    pub tag: Tag,
    pub issued_at_unix: u64,
}

/// Persisted tag history. `current` is the last tag this tooling issued;
/// `last_known_good` is the last tag whose deployment passed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagState {
    pub schema_version: u32,
    pub current: Tag,
    #[serde(default)]
    pub last_known_good: Option<Tag>,
    #[serde(default)]
    pub history: Vec<IssuedTag>,
}

impl TagState {
    #[must_use]
    pub fn seeded(seed: Tag) -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            current: seed,
            last_known_good: None,
            history: Vec::new(),
        }
    }
}

pub trait TagStateStore {
    /// `Ok(None)` means no state has been recorded yet.
    fn load(&self) -> Result<Option<TagState>, StateError>;
    fn save(&self, state: &TagState) -> Result<(), StateError>;

    /// Bumps `current` and persists before returning, so two independent
    /// invocations can never issue the same tag. Missing state starts from
    /// `seed` (the historical pipeline re-bumped a hardcoded literal every
    /// run; the seed only ever matters on the very first one).
    fn issue_next(&self, seed: Tag) -> Result<Tag, StateError> {
        let mut state = self.load()?.unwrap_or_else(|| TagState::seeded(seed));
        let issued = state
            .current
            .next()
            .map_err(|e| StateError(e.to_string()))?;
        state.current = issued;
        state.history.push(IssuedTag {
            tag: issued,
            issued_at_unix: unix_now(),
        });
        self.save(&state)?;
        Ok(issued)
    }

    /// Records `tag` as the last deployment that passed verification.
    fn mark_known_good(&self, tag: Tag) -> Result<(), StateError> {
        let mut state = self
            .load()?
            .ok_or_else(|| StateError("no tag state to mark as known good".to_string()))?;
        state.last_known_good = Some(tag);
        self.save(&state)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// JSON state file on local disk. Saves go through a sibling tmp file and a
/// rename so a crashed run never leaves a torn file behind.
pub struct FileTagState {
    pub path: PathBuf,
}

impl FileTagState {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TagStateStore for FileTagState {
    fn load(&self) -> Result<Option<TagState>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StateError(format!("failed to read {}: {e}", self.path.display())))?;
        let state: TagState = serde_json::from_str(&raw)
            .map_err(|e| StateError(format!("invalid state file {}: {e}", self.path.display())))?;
        if state.schema_version != STATE_SCHEMA_VERSION {
            return Err(StateError(format!(
                "unsupported state schema version {}",
                state.schema_version
            )));
        }
        Ok(Some(state))
    }

    fn save(&self, state: &TagState) -> Result<(), StateError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| StateError(format!("failed to encode state: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StateError(format!("failed to create {}: {e}", parent.display())))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)
            .map_err(|e| StateError(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StateError(format!("failed to replace {}: {e}", self.path.display())))?;
        Ok(())
    }
}
