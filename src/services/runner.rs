// src/services/runner.rs

//! Live sessions and their countdown timers.
//!
//! Every session sits behind its own async mutex. The one-second timer task
//! and all student events (answers, navigation, manual submission) lock that
//! mutex, so a tick's decrement-and-check never interleaves with an edit.
//!
//! Whichever path produces the result first parks it in the session's
//! pending slot and hands it to the sink. The session (and its
//! student/schedule pair) stays registered until the sink accepts the
//! result, so the pair cannot be started again while the result is being
//! written, and a failed write can be retried instead of being lost.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    engine::ExamSession,
    error::StoreError,
    models::exam_result::ExamResult,
    repository::ResultSink,
};

type PairKey = (String, String);

struct LiveSession {
    pair: PairKey,
    session: Mutex<ExamSession>,
    /// Result waiting to be accepted by the sink.
    pending: Mutex<Option<ExamResult>>,
    timer: std::sync::Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, Arc<LiveSession>>,
    by_pair: HashMap<PairKey, Uuid>,
}

struct RunnerInner {
    registry: RwLock<Registry>,
    sink: Arc<dyn ResultSink>,
    tick: Duration,
}

/// Registry of in-progress sessions.
#[derive(Clone)]
pub struct SessionRunner {
    inner: Arc<RunnerInner>,
}

/// Why a session could not be registered.
#[derive(Debug, PartialEq, Eq)]
pub enum StartRejected {
    /// The student already has this schedule open (or still being stored)
    /// under the given id.
    AlreadyRunning(Uuid),
}

impl SessionRunner {
    pub fn new(sink: Arc<dyn ResultSink>, tick: Duration) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                registry: RwLock::new(Registry::default()),
                sink,
                tick,
            }),
        }
    }

    /// Registers a freshly materialized session and starts its countdown.
    pub async fn start(&self, session: ExamSession) -> Result<Uuid, StartRejected> {
        let pair = (
            session.student_id().to_string(),
            session.schedule_id().to_string(),
        );

        let mut registry = self.inner.registry.write().await;
        if let Some(existing) = registry.by_pair.get(&pair) {
            return Err(StartRejected::AlreadyRunning(*existing));
        }

        let id = Uuid::new_v4();
        let live = Arc::new(LiveSession {
            pair: pair.clone(),
            session: Mutex::new(session),
            pending: Mutex::new(None),
            timer: std::sync::Mutex::new(None),
        });
        registry.sessions.insert(id, live.clone());
        registry.by_pair.insert(pair, id);
        drop(registry);

        let handle = tokio::spawn(self.clone().run_timer(id, live.clone()));
        if let Ok(mut timer) = live.timer.lock() {
            *timer = Some(handle);
        }

        Ok(id)
    }

    async fn run_timer(self, id: Uuid, live: Arc<LiveSession>) {
        let tick = self.inner.tick;
        let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut expired = false;

        loop {
            interval.tick().await;

            if !expired {
                let mut session = live.session.lock().await;
                if session.is_submitted() {
                    // Submitted manually between two ticks.
                    return;
                }
                let Some(result) = session.tick(Utc::now()) else {
                    continue;
                };
                tracing::info!(
                    "Time is up: session {} auto-submitted for student {} (score {:.2})",
                    id,
                    result.student_id,
                    result.score
                );
                *live.pending.lock().await = Some(result);
                expired = true;
            }

            match self.deliver(id, &live).await {
                Ok(_) => return,
                Err(e) => {
                    tracing::error!(
                        "Failed to store auto-submitted result for {}, retrying: {:?}",
                        id,
                        e
                    );
                }
            }
        }
    }

    /// Hands the pending result to the sink and, once it is accepted,
    /// forgets the session. On failure everything stays in place for a retry.
    async fn deliver(
        &self,
        id: Uuid,
        live: &LiveSession,
    ) -> Result<Option<ExamResult>, StoreError> {
        let mut pending = live.pending.lock().await;
        let Some(result) = pending.as_ref() else {
            return Ok(None);
        };

        self.inner.sink.append(result.clone()).await?;
        let result = pending.take();
        drop(pending);

        let mut registry = self.inner.registry.write().await;
        registry.sessions.remove(&id);
        if registry.by_pair.get(&live.pair) == Some(&id) {
            registry.by_pair.remove(&live.pair);
        }

        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Option<Arc<LiveSession>> {
        self.inner.registry.read().await.sessions.get(&id).cloned()
    }

    /// Runs `f` against the live session while holding its lock.
    /// Returns `None` for an unknown or already finished session.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ExamSession) -> T,
    ) -> Option<T> {
        let live = self.get(id).await?;
        let mut session = live.session.lock().await;
        if session.is_submitted() {
            return None;
        }
        Some(f(&mut session))
    }

    /// Manual submission.
    ///
    /// Also retries the delivery of a result whose earlier write failed.
    /// Returns `Ok(None)` if the session is unknown or another path already
    /// delivered its result.
    pub async fn submit(&self, id: Uuid) -> Result<Option<ExamResult>, StoreError> {
        let Some(live) = self.get(id).await else {
            return Ok(None);
        };

        let submitted = {
            let mut session = live.session.lock().await;
            match session.submit(Utc::now()) {
                Some(result) => {
                    *live.pending.lock().await = Some(result);
                    true
                }
                None => false,
            }
        };

        if submitted {
            if let Ok(mut timer) = live.timer.lock() {
                if let Some(handle) = timer.take() {
                    handle.abort();
                }
            }
            tracing::info!("Session {} submitted by student {}", id, live.pair.0);
        }

        let delivered = self.deliver(id, &live).await?;
        if let Some(result) = &delivered {
            tracing::info!(
                "Result {} stored for session {} (score {:.2})",
                result.id,
                id,
                result.score
            );
        }
        Ok(delivered)
    }
}
