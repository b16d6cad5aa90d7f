//! Paced, strictly sequential application of file operations.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::observer::GenerationObserver;
use super::parser::GeneratedFileOp;
use crate::session::model::{
    ChatSession, FileAction, FileStatus, GenerationFile, GenerationInfo, GenerationStatus,
};
use crate::session::tree;

/// Delay between file operations used when nothing else is configured.
pub const DEFAULT_PACING: Duration = Duration::from_millis(150);

/// How a materialization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// Number of operations applied.
    pub applied: usize,
    /// `true` when the run stopped early because of cancellation.
    pub cancelled: bool,
}

/// Builds the initial per-file badges for a batch of operations.
#[must_use]
pub fn planned_files(ops: &[GeneratedFileOp]) -> Vec<GenerationFile> {
    ops.iter()
        .map(|op| GenerationFile {
            path: op.path.clone(),
            action: op.action,
            status: FileStatus::Generating,
        })
        .collect()
}

/// Applies generated file operations to a session one at a time.
#[derive(Debug, Clone)]
pub struct Sequencer {
    pacing: Duration,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING)
    }
}

impl Sequencer {
    /// Creates a sequencer that waits `pacing` before each operation.
    #[must_use]
    pub fn new(pacing: Duration) -> Self {
        Self { pacing }
    }

    /// Applies `ops` to `session`, updating the generation info of the
    /// assistant message `message_id` as each operation lands.
    ///
    /// Each file's status flips to `complete` only after its operation has
    /// been applied. On cancellation the applied operations stay applied
    /// and the remaining files are marked `error`.
    pub async fn materialize(
        &self,
        session: &mut ChatSession,
        message_id: &str,
        ops: &[GeneratedFileOp],
        observer: &dyn GenerationObserver,
        cancel: &CancellationToken,
    ) -> MaterializeOutcome {
        for (index, op) in ops.iter().enumerate() {
            if self.wait(cancel).await {
                tracing::info!(applied = index, remaining = ops.len() - index, "materialization cancelled");
                mark_remaining_failed(session, message_id, index);
                return MaterializeOutcome { applied: index, cancelled: true };
            }

            apply(session, op);
            tracing::debug!(path = %op.path, action = op.action.as_str(), "applied file operation");

            if let Some(file) = set_status(session, message_id, index, FileStatus::Complete) {
                observer.on_file_applied(&file, session);
            }
        }

        tree::select_default_active(session);
        if let Some(info) = generation_info_mut(session, message_id) {
            info.status = GenerationStatus::Complete;
        }
        MaterializeOutcome { applied: ops.len(), cancelled: false }
    }

    /// Sleeps for the pacing delay. Returns `true` if cancelled instead.
    async fn wait(&self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return true;
        }
        if self.pacing.is_zero() {
            return false;
        }
        tokio::select! {
            () = cancel.cancelled() => true,
            () = tokio::time::sleep(self.pacing) => false,
        }
    }
}

/// Applies a single operation; upserts make the file active.
fn apply(session: &mut ChatSession, op: &GeneratedFileOp) {
    match op.action {
        FileAction::Created | FileAction::Modified => {
            tree::upsert(session, &op.path, &op.content);
            session.active_file = Some(op.path.clone());
        }
        FileAction::Deleted => {
            if !tree::remove(session, &op.path) {
                tracing::debug!(path = %op.path, "delete of missing file ignored");
            }
        }
    }
}

fn generation_info_mut<'a>(
    session: &'a mut ChatSession,
    message_id: &str,
) -> Option<&'a mut GenerationInfo> {
    session
        .messages
        .iter_mut()
        .rev()
        .find(|m| m.id == message_id)
        .and_then(|m| m.generation_info.as_mut())
}

fn set_status(
    session: &mut ChatSession,
    message_id: &str,
    index: usize,
    status: FileStatus,
) -> Option<GenerationFile> {
    let file = generation_info_mut(session, message_id)?.files.get_mut(index)?;
    file.status = status;
    Some(file.clone())
}

fn mark_remaining_failed(session: &mut ChatSession, message_id: &str, from: usize) {
    if let Some(info) = generation_info_mut(session, message_id) {
        for file in info.files.iter_mut().skip(from) {
            if file.status == FileStatus::Generating {
                file.status = FileStatus::Error;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::generation::observer::NoopObserver;
    use crate::session::model::{FileNode, Message};

    #[derive(Default)]
    struct StatusLog {
        seen: Mutex<Vec<(String, Vec<FileStatus>)>>,
    }

    impl GenerationObserver for StatusLog {
        fn on_file_applied(&self, file: &GenerationFile, session: &ChatSession) {
            let statuses = session
                .latest_generation()
                .map(|info| info.files.iter().map(|f| f.status).collect())
                .unwrap_or_default();
            self.seen.lock().unwrap().push((file.path.clone(), statuses));
        }
    }

    fn op(path: &str, action: FileAction, content: &str) -> GeneratedFileOp {
        GeneratedFileOp { path: path.into(), action, content: content.into() }
    }

    fn session_for(ops: &[GeneratedFileOp]) -> ChatSession {
        let mut session = ChatSession::new("s1", Utc::now());
        let mut reply = Message::assistant("m1", "working");
        reply.generation_info =
            Some(GenerationInfo { status: GenerationStatus::Generating, files: planned_files(ops) });
        session.messages.push(reply);
        session
    }

    #[tokio::test]
    async fn create_then_modify_keeps_one_node() {
        let ops = vec![op("a.ts", FileAction::Created, "v1"), op("a.ts", FileAction::Modified, "v2")];
        let mut session = session_for(&ops);

        let outcome = Sequencer::new(Duration::ZERO)
            .materialize(&mut session, "m1", &ops, &NoopObserver, &CancellationToken::new())
            .await;

        assert_eq!(outcome, MaterializeOutcome { applied: 2, cancelled: false });
        assert_eq!(session.file_tree, vec![FileNode::new("a.ts", "v2")]);
        assert_eq!(session.active_file.as_deref(), Some("a.ts"));
        assert_eq!(session.latest_generation().unwrap().status, GenerationStatus::Complete);
    }

    #[tokio::test]
    async fn deleting_active_file_clears_it_then_default_is_chosen() {
        let ops = vec![
            op("index.tsx", FileAction::Created, "root"),
            op("b.ts", FileAction::Created, "b"),
            op("b.ts", FileAction::Deleted, ""),
        ];
        let mut session = session_for(&ops);

        Sequencer::new(Duration::ZERO)
            .materialize(&mut session, "m1", &ops, &NoopObserver, &CancellationToken::new())
            .await;

        assert_eq!(session.file_tree.len(), 1);
        assert_eq!(session.active_file.as_deref(), Some("index.tsx"));
    }

    #[tokio::test]
    async fn deleting_other_file_keeps_active() {
        let ops = vec![op("b.ts", FileAction::Deleted, "")];
        let mut session = session_for(&ops);
        session.file_tree.push(FileNode::new("a.ts", "a"));
        session.file_tree.push(FileNode::new("b.ts", "b"));
        session.active_file = Some("a.ts".into());

        Sequencer::new(Duration::ZERO)
            .materialize(&mut session, "m1", &ops, &NoopObserver, &CancellationToken::new())
            .await;

        assert_eq!(session.active_file.as_deref(), Some("a.ts"));
    }

    #[tokio::test]
    async fn statuses_flip_strictly_in_order() {
        let ops = vec![
            op("a.ts", FileAction::Created, "a"),
            op("b.ts", FileAction::Created, "b"),
            op("c.ts", FileAction::Created, "c"),
        ];
        let mut session = session_for(&ops);
        let log = StatusLog::default();

        Sequencer::new(Duration::ZERO)
            .materialize(&mut session, "m1", &ops, &log, &CancellationToken::new())
            .await;

        use FileStatus::{Complete, Generating};
        let seen = log.seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![
                ("a.ts".to_string(), vec![Complete, Generating, Generating]),
                ("b.ts".to_string(), vec![Complete, Complete, Generating]),
                ("c.ts".to_string(), vec![Complete, Complete, Complete]),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_keeps_applied_files() {
        let ops = vec![op("a.ts", FileAction::Created, "a"), op("b.ts", FileAction::Created, "b")];
        let mut session = session_for(&ops);
        let cancel = CancellationToken::new();

        struct CancelAfterFirst<'a>(&'a CancellationToken);
        impl GenerationObserver for CancelAfterFirst<'_> {
            fn on_file_applied(&self, _file: &GenerationFile, _session: &ChatSession) {
                self.0.cancel();
            }
        }

        let outcome = Sequencer::new(Duration::from_millis(200))
            .materialize(&mut session, "m1", &ops, &CancelAfterFirst(&cancel), &cancel)
            .await;

        assert_eq!(outcome, MaterializeOutcome { applied: 1, cancelled: true });
        assert_eq!(session.file_tree, vec![FileNode::new("a.ts", "a")]);
        let info = session.latest_generation().unwrap();
        assert_eq!(info.status, GenerationStatus::Generating);
        assert_eq!(info.files[0].status, FileStatus::Complete);
        assert_eq!(info.files[1].status, FileStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_delays_each_operation() {
        let ops = vec![op("a.ts", FileAction::Created, "a"), op("b.ts", FileAction::Created, "b")];
        let mut session = session_for(&ops);
        let start = tokio::time::Instant::now();

        Sequencer::new(Duration::from_millis(150))
            .materialize(&mut session, "m1", &ops, &NoopObserver, &CancellationToken::new())
            .await;

        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
