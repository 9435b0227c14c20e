//! Client-side state synchronization between the DemoBoard view and the
//! remote key-value store.
//!
//! Three responsibilities share one store: the demo registry (list/create),
//! the reaction tracker (event-sourced tally per demo), and the feedback
//! log (timestamped free-text entries per demo). Cached state only mutates
//! after the corresponding store write succeeds, so a failed write leaves
//! the view consistent with the store.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use anyhow::Context;
use chrono::Utc;
use kv_client::KvStore;
use serde_json::Value;
use shared::{
    domain::{Demo, DemoId, ReactionKind, ReactionTally},
    keyspace,
    protocol::{DemoRecord, ReactionRecord},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no demo selected")]
    NoDemoSelected,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type BoardResult<T> = std::result::Result<T, BoardError>;

/// Millisecond timestamps that never repeat within the process.
///
/// Record keys embed a creation timestamp; two records created inside the
/// same wall-clock millisecond would otherwise collide on one key. The
/// source hands out `max(now, last issued + 1)` instead, which keeps the
/// `demo:<millis>` key format while making ids unique.
#[derive(Debug, Default)]
pub struct MonotonicMillis {
    last: AtomicI64,
}

impl MonotonicMillis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = Utc::now().timestamp_millis().max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Cached projection of the store, scoped to the full demo list plus the
/// currently selected demo. Possibly stale by design; re-selecting a demo
/// re-fetches its projection wholesale.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub demos: Vec<Demo>,
    pub selected: Option<Demo>,
    pub reactions: ReactionTally,
    pub feedback: Vec<String>,
}

/// Everything the view needs after selecting a demo.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoView {
    pub demo: Demo,
    pub reactions: ReactionTally,
    pub feedback: Vec<String>,
}

pub struct DemoBoard {
    store: Arc<dyn KvStore>,
    clock: MonotonicMillis,
    state: Mutex<BoardState>,
}

impl DemoBoard {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            clock: MonotonicMillis::new(),
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Scans the `demo:` prefix and replaces the cached demo list.
    ///
    /// Reaction and feedback keys share the prefix and are filtered out;
    /// records whose value is not a demo shape are skipped with a warning
    /// rather than failing the whole list.
    pub async fn list_demos(&self) -> BoardResult<Vec<Demo>> {
        let records = self
            .store
            .get_with_prefix(keyspace::DEMO_PREFIX)
            .await
            .context("failed to list demos")?;

        let mut demos = Vec::new();
        for record in records {
            if !keyspace::is_demo_record(&record.key) {
                continue;
            }
            match serde_json::from_value::<DemoRecord>(record.value) {
                Ok(value) => demos.push(Demo {
                    id: DemoId(record.key),
                    headline: value.headline,
                }),
                Err(err) => {
                    warn!(key = %record.key, "skipping malformed demo record: {err}");
                }
            }
        }

        let mut state = self.state.lock().await;
        state.demos = demos.clone();
        Ok(demos)
    }

    /// Stores a new demo record, then appends it to the cached list.
    ///
    /// The headline is taken as-is: no validation, no trimming, empty
    /// allowed, duplicates allowed.
    pub async fn create_demo(&self, headline: &str) -> BoardResult<Demo> {
        let id = DemoId::from_creation_millis(self.clock.next());
        let record = serde_json::to_value(DemoRecord {
            headline: headline.to_string(),
        })
        .context("failed to encode demo record")?;
        self.store
            .set(id.as_str(), record)
            .await
            .with_context(|| format!("failed to store demo {id}"))?;

        let demo = Demo {
            id,
            headline: headline.to_string(),
        };
        let mut state = self.state.lock().await;
        state.demos.push(demo.clone());
        Ok(demo)
    }

    /// Selects a demo and replaces the reaction/feedback projection with
    /// freshly fetched data. Nothing from the previously selected demo
    /// survives the switch.
    pub async fn select_demo(&self, demo: &Demo) -> BoardResult<DemoView> {
        let reactions = self.fetch_reaction_tally(&demo.id).await?;
        let feedback = self.fetch_feedback(&demo.id).await?;
        let view = DemoView {
            demo: demo.clone(),
            reactions,
            feedback,
        };

        let mut state = self.state.lock().await;
        state.selected = Some(demo.clone());
        state.reactions = view.reactions;
        state.feedback = view.feedback.clone();
        Ok(view)
    }

    /// Records one reaction against the selected demo as a timestamped
    /// event, then bumps the cached counter. Errors with
    /// [`BoardError::NoDemoSelected`] (no write, no state change) when
    /// nothing is selected.
    pub async fn add_reaction(&self, kind: ReactionKind) -> BoardResult<ReactionTally> {
        let selected = self
            .selected_demo()
            .await
            .ok_or(BoardError::NoDemoSelected)?;

        let key = keyspace::reaction_key(&selected.id, self.clock.next());
        let record =
            serde_json::to_value(ReactionRecord { kind }).context("failed to encode reaction")?;
        self.store
            .set(&key, record)
            .await
            .with_context(|| format!("failed to store {} reaction for {}", kind.as_str(), selected.id))?;

        let mut state = self.state.lock().await;
        state.reactions.record(kind);
        Ok(state.reactions)
    }

    /// Appends a feedback entry to the selected demo's log, then to the
    /// cached list. The text is stored raw: no trimming, no length limit.
    pub async fn submit_feedback(&self, text: &str) -> BoardResult<Vec<String>> {
        let selected = self
            .selected_demo()
            .await
            .ok_or(BoardError::NoDemoSelected)?;

        let key = keyspace::feedback_key(&selected.id, self.clock.next());
        self.store
            .set(&key, Value::String(text.to_string()))
            .await
            .with_context(|| format!("failed to store feedback for {}", selected.id))?;

        let mut state = self.state.lock().await;
        state.feedback.push(text.to_string());
        Ok(state.feedback.clone())
    }

    pub async fn selected_demo(&self) -> Option<Demo> {
        self.state.lock().await.selected.clone()
    }

    pub async fn snapshot(&self) -> BoardState {
        self.state.lock().await.clone()
    }

    async fn fetch_reaction_tally(&self, id: &DemoId) -> BoardResult<ReactionTally> {
        let records = self
            .store
            .get_with_prefix(&keyspace::reaction_prefix(id))
            .await
            .with_context(|| format!("failed to load reactions for {id}"))?;

        let mut tally = ReactionTally::default();
        for record in records {
            match serde_json::from_value::<ReactionRecord>(record.value) {
                Ok(reaction) => tally.record(reaction.kind),
                Err(err) => {
                    warn!(key = %record.key, "skipping malformed reaction record: {err}");
                }
            }
        }
        Ok(tally)
    }

    async fn fetch_feedback(&self, id: &DemoId) -> BoardResult<Vec<String>> {
        let records = self
            .store
            .get_with_prefix(&keyspace::feedback_prefix(id))
            .await
            .with_context(|| format!("failed to load feedback for {id}"))?;

        let mut feedback = Vec::new();
        for record in records {
            match record.value {
                Value::String(text) => feedback.push(text),
                _ => {
                    warn!(key = %record.key, "skipping non-text feedback record");
                }
            }
        }
        Ok(feedback)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
