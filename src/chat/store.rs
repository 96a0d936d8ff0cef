use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::session::ChatSession;
use super::turn::SessionLog;
use crate::pipeline::ResponderPipeline;

/// Identity of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// A session looked up (or just opened) in the store.
pub struct SessionEntry {
    pub id: SessionId,
    pub handle: SessionHandle,
    pub created: bool,
}

/// Bounds on how many sessions are kept and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// A session not seen for this long is dropped with its log.
    pub idle_timeout: Duration,
    /// Opening a session beyond this drops the least recently seen one.
    pub max_sessions: usize,
}

impl SessionLimits {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
    pub const DEFAULT_MAX_SESSIONS: usize = 1000;
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            max_sessions: Self::DEFAULT_MAX_SESSIONS,
        }
    }
}

struct Slot {
    handle: SessionHandle,
    last_seen: Instant,
}

impl Slot {
    /// Someone besides the store holds the handle: a request or a running turn.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.handle) > 1
    }
}

/// Live sessions of this process, each with its own log.
///
/// Sessions share nothing but the pipeline. A session's mutex guards its log
/// and state; different sessions never contend with each other. Idle sessions
/// are dropped, and the number of sessions is capped.
pub struct SessionStore {
    pipeline: Arc<ResponderPipeline>,
    limits: SessionLimits,
    sessions: RwLock<HashMap<SessionId, Slot>>,
}

impl SessionStore {
    pub fn new(pipeline: Arc<ResponderPipeline>) -> Self {
        Self::with_limits(pipeline, SessionLimits::default())
    }

    pub fn with_limits(pipeline: Arc<ResponderPipeline>, limits: SessionLimits) -> Self {
        Self {
            pipeline,
            limits,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub const fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Returns the session for `id`, opening a fresh one when `id` is absent
    /// or unknown. Unknown ids are never adopted; a new id is issued instead.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> SessionEntry {
        if let Some(id) = id
            && let Some(handle) = self.get(id).await
        {
            return SessionEntry {
                id,
                handle,
                created: false,
            };
        }

        let id = SessionId::new();
        let session = ChatSession::new(SessionLog::new(), Arc::clone(&self.pipeline));
        let handle = Arc::new(Mutex::new(session));

        let (count, evicted) = {
            let mut sessions = self.sessions.write().await;
            let mut evicted = evict_idle(&mut sessions, self.limits.idle_timeout);
            while sessions.len() >= self.limits.max_sessions.max(1) {
                if !evict_least_recent(&mut sessions) {
                    break;
                }
                evicted += 1;
            }
            sessions.insert(
                id,
                Slot {
                    handle: Arc::clone(&handle),
                    last_seen: Instant::now(),
                },
            );
            (sessions.len(), evicted)
        };
        info!(session = %id, sessions = count, evicted, "session opened");

        SessionEntry {
            id,
            handle,
            created: true,
        }
    }

    /// Looks up a session and marks it as seen.
    pub async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(&id)?;
        slot.last_seen = Instant::now();
        Some(Arc::clone(&slot.handle))
    }

    /// Drops every session idle for longer than the configured timeout.
    /// Sessions with a request or turn in flight are kept.
    pub async fn evict_idle(&self) -> usize {
        let evicted = evict_idle(&mut *self.sessions.write().await, self.limits.idle_timeout);
        if evicted > 0 {
            debug!(evicted, "idle sessions dropped");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn evict_idle(sessions: &mut HashMap<SessionId, Slot>, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, slot| slot.in_use() || slot.last_seen.elapsed() < idle_timeout);
    before - sessions.len()
}

fn evict_least_recent(sessions: &mut HashMap<SessionId, Slot>) -> bool {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, slot)| slot.last_seen)
        .map(|(id, _)| *id);

    oldest.is_some_and(|id| sessions.remove(&id).is_some())
}
