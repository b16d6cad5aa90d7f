//! Session store: persistence for chat sessions.
//!
//! The generation core never touches disk; the CLI host saves sessions here
//! between invocations. All I/O goes through the `FileSystem` port. Layout:
//!
//! ```text
//! <root>/
//!   └── sessions/
//!       └── <id>.yaml
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{StudioError, StudioResult};
use crate::ports::FileSystem;
use crate::session::model::ChatSession;

/// One line of the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session ID.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Number of messages.
    pub messages: usize,
    /// Number of files in the tree.
    pub files: usize,
    /// Time of the last change.
    pub last_updated: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            messages: session.messages.len(),
            files: session.file_tree.len(),
            last_updated: session.last_updated,
        }
    }
}

/// YAML-file persistence for chat sessions.
pub struct SessionStore<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> SessionStore<'a> {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: &Path) -> Self {
        Self { fs, root: root.to_path_buf() }
    }

    /// Saves a session as `<root>/sessions/<id>.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, session: &ChatSession) -> StudioResult<()> {
        let yaml = serde_yaml::to_string(session).map_err(|e| {
            StudioError::Store(format!("failed to serialize session {}: {e}", session.id))
        })?;
        self.fs
            .write(&self.session_path(&session.id), &yaml)
            .map_err(|e| StudioError::Store(format!("failed to write session {}: {e}", session.id)))
    }

    /// Loads a session by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionNotFound`] if no file exists for `id`,
    /// or a store error if it cannot be read or parsed.
    pub fn load(&self, id: &str) -> StudioResult<ChatSession> {
        let path = self.session_path(id);
        if id.contains(['/', '\\']) || !self.fs.exists(&path) {
            return Err(StudioError::SessionNotFound(id.to_string()));
        }
        let contents = self
            .fs
            .read_to_string(&path)
            .map_err(|e| StudioError::Store(format!("failed to read session {id}: {e}")))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| StudioError::Store(format!("failed to parse session {id}: {e}")))
    }

    /// Lists saved sessions, most recently updated first.
    ///
    /// Files that fail to parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions directory cannot be listed.
    pub fn list(&self) -> StudioResult<Vec<SessionSummary>> {
        let dir = self.sessions_dir();
        if !self.fs.exists(&dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .list_dir(&dir)
            .map_err(|e| StudioError::Store(format!("failed to list sessions: {e}")))?;

        let mut summaries: Vec<SessionSummary> = entries
            .iter()
            .filter_map(|name| name.strip_suffix(".yaml"))
            .filter_map(|id| match self.load(id) {
                Ok(session) => Some(SessionSummary::from(&session)),
                Err(e) => {
                    tracing::warn!(id, error = %e, "skipping unreadable session");
                    None
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{id}.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::session::model::{FileNode, Message};
    use crate::testing::MemFs;

    fn session(id: &str, minute: u32) -> ChatSession {
        let mut session =
            ChatSession::new(id, Utc.with_ymd_and_hms(2024, 6, 15, 10, minute, 0).unwrap());
        session.messages.push(Message::user("m1", "make a todo app"));
        session.file_tree.push(FileNode::new("index.html", "<ul></ul>"));
        session
    }

    #[test]
    fn save_and_load_round_trips() {
        let fs = MemFs::default();
        let store = SessionStore::new(&fs, Path::new("/studio"));
        let original = session("s1", 0);

        store.save(&original).unwrap();

        assert!(fs.get(Path::new("/studio/sessions/s1.yaml")).is_some());
        assert_eq!(store.load("s1").unwrap(), original);
    }

    #[test]
    fn missing_session_is_not_found() {
        let fs = MemFs::default();
        let store = SessionStore::new(&fs, Path::new("/studio"));
        assert!(matches!(store.load("nope"), Err(StudioError::SessionNotFound(_))));
        assert!(matches!(store.load("../etc"), Err(StudioError::SessionNotFound(_))));
    }

    #[test]
    fn list_is_newest_first_and_skips_garbage() {
        let fs = MemFs::default();
        let store = SessionStore::new(&fs, Path::new("/studio"));
        store.save(&session("old", 1)).unwrap();
        store.save(&session("new", 30)).unwrap();
        fs.write(Path::new("/studio/sessions/broken.yaml"), "{ not: [valid").unwrap();
        fs.write(Path::new("/studio/sessions/notes.txt"), "ignored").unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn empty_store_lists_nothing() {
        let fs = MemFs::default();
        let store = SessionStore::new(&fs, Path::new("/studio"));
        assert!(store.list().unwrap().is_empty());
    }
}
