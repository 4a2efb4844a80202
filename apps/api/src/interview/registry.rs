//! Session registry: process-local interview histories keyed by application id.
//!
//! One registry is created at startup and shared through `AppState`. Each session sits
//! behind its own async mutex, so operations on the same application id run one at a
//! time while different ids never contend. Histories are capped at `MAX_HISTORY` turns.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::llm_client::Turn;

/// Most recent turns kept per session; older turns are discarded first.
pub const MAX_HISTORY: usize = 20;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Session {
    turns: Vec<Turn>,
    last_active: Instant,
    closed: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
            closed: false,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Appends the instruction we sent and the reply we got, then enforces the cap.
    pub fn record_exchange(&mut self, instruction: &str, reply: &str) {
        self.turns.push(Turn::human(instruction));
        self.turns.push(Turn::agent(reply));
        if self.turns.len() > MAX_HISTORY {
            let excess = self.turns.len() - MAX_HISTORY;
            self.turns.drain(..excess);
        }
        self.last_active = Instant::now();
    }
}

type SessionHandle = Arc<AsyncMutex<Session>>;

/// Exclusive access to one session. Dropping the lease releases the session.
pub struct SessionLease {
    id: String,
    handle: SessionHandle,
    guard: OwnedMutexGuard<Session>,
}

impl SessionLease {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Deref for SessionLease {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.guard
    }
}

impl DerefMut for SessionLease {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.guard
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the session for `id`, creating an empty one if none exists.
    /// Waits while another operation on the same id is in flight.
    pub async fn acquire(&self, id: &str) -> SessionLease {
        loop {
            let handle = self
                .map()
                .entry(id.to_string())
                .or_insert_with(|| {
                    debug!("Creating interview session for application {id}");
                    Arc::new(AsyncMutex::new(Session::new()))
                })
                .clone();

            let mut guard = handle.clone().lock_owned().await;
            // Retired while we waited: resolve the id again.
            if guard.closed {
                continue;
            }
            guard.last_active = Instant::now();
            return SessionLease {
                id: id.to_string(),
                handle,
                guard,
            };
        }
    }

    /// Ends a session: marks it closed and removes it from the registry.
    pub fn retire(&self, mut lease: SessionLease) {
        lease.guard.closed = true;
        let mut map = self.map();
        if map
            .get(&lease.id)
            .is_some_and(|current| Arc::ptr_eq(current, &lease.handle))
        {
            map.remove(&lease.id);
        }
        debug!("Interview session for application {} retired", lease.id);
    }

    /// Removes the session for `id` if present, waiting for any in-flight operation on it.
    /// Returns whether a session was removed; unknown ids are a no-op.
    pub async fn clear(&self, id: &str) -> bool {
        let Some(handle) = self.map().get(id).cloned() else {
            return false;
        };

        let mut guard = handle.clone().lock_owned().await;
        if guard.closed {
            return false;
        }

        let lease = SessionLease {
            id: id.to_string(),
            handle,
            guard: {
                guard.last_active = Instant::now();
                guard
            },
        };
        self.retire(lease);
        true
    }

    /// Snapshot of a session's history without creating it.
    #[cfg(test)]
    pub async fn history(&self, id: &str) -> Option<Vec<Turn>> {
        let handle = self.map().get(id).cloned()?;
        let guard = handle.lock().await;
        (!guard.closed).then(|| guard.turns.clone())
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.map().contains_key(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Drops sessions idle for longer than `ttl`. Sessions with an operation in flight are skipped.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let mut map = self.map();
        let before = map.len();
        map.retain(|_, handle| match handle.try_lock() {
            Ok(mut session) if session.last_active.elapsed() > ttl => {
                session.closed = true;
                false
            }
            _ => true,
        });
        before - map.len()
    }

    /// Periodically sweeps idle sessions until the returned task is aborted.
    pub fn spawn_idle_sweeper(self: Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let period = (ttl / 2).max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = self.sweep_idle(ttl);
                if removed > 0 {
                    info!("Swept {removed} idle interview sessions");
                }
            }
        })
    }
}
