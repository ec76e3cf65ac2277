use std::{fmt::Debug, sync::Arc};

use dashmap::DashMap;
use uuid::Uuid;

use crate::{config::AxumSessionConfig, session_data::AxumSessionData};

type PayloadInit<D> = Arc<dyn Fn() -> D + Send + Sync>;

/// In-memory session store. Every live session's payload is kept here between
/// requests; `init` builds the payload of a brand new session.
#[derive(Clone)]
pub struct AxumSessionStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub(crate) memory_store: Arc<DashMap<Uuid, AxumSessionData<D>>>,
    pub(crate) config: AxumSessionConfig,
    init: PayloadInit<D>,
}

impl<D> AxumSessionStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub fn new<F>(config: AxumSessionConfig, init: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        Self {
            memory_store: Default::default(),
            config,
            init: Arc::new(init),
        }
    }

    /// Number of sessions currently held, expired ones included until the next sweep.
    pub fn count(&self) -> usize {
        self.memory_store.len()
    }

    /// Returns the live session for `session_id`, or a fresh one under a new id
    /// when the id is missing, unknown or expired.
    pub(crate) fn load_or_init(&self, session_id: Option<Uuid>) -> AxumSessionData<D> {
        if let Some(session_id) = session_id {
            match self.memory_store.get(&session_id) {
                Some(sess) if !sess.is_expired() => return sess.clone(),
                Some(_) => {
                    tracing::debug!("session {} expired", session_id);
                }
                None => {
                    tracing::debug!("session {} unknown, starting a new one", session_id);
                }
            }
        }

        AxumSessionData::init(Uuid::new_v4(), (self.init)(), self.config.idle_timeout)
    }

    pub(crate) fn store(&self, mut session_data: AxumSessionData<D>) {
        session_data.touch(self.config.idle_timeout);
        self.memory_store.insert(session_data.session_id, session_data);
    }

    pub(crate) fn remove(&self, session_id: &Uuid) {
        self.memory_store.remove(session_id);
    }

    pub(crate) fn clear_expired(&self) {
        self.memory_store.retain(|_k, v| !v.is_expired());
    }
}

impl<D> Debug for AxumSessionStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumSessionStore")
            .field("sessions", &self.memory_store.len())
            .field("config", &self.config)
            .finish()
    }
}
