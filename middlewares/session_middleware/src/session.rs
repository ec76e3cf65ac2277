use std::{
    fmt::{self, Debug},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use axum_core::extract::FromRequestParts;
use http::{request::Parts, StatusCode};

use crate::session_data::AxumSessionData;

pub(crate) struct SessionEntry<D> {
    pub(crate) data: AxumSessionData<D>,
    pub(crate) is_modified: bool,
}

/// Handle to the current request's session. Cloned handles share the same
/// payload; the session service writes it back to the store once the
/// response has been produced.
#[derive(Clone)]
pub struct AxumSession<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub(crate) entry: Arc<Mutex<SessionEntry<D>>>,
}

impl<D> AxumSession<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(data: AxumSessionData<D>) -> Self {
        AxumSession {
            entry: Arc::new(Mutex::new(SessionEntry {
                data,
                is_modified: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionEntry<D>> {
        // a handler that panicked mid-update leaves a payload that is still well formed
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the payload.
    pub fn get(&self) -> D {
        self.lock().data.payload.clone()
    }

    /// Reads the payload without marking the session for commit.
    pub fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.lock().data.payload)
    }

    /// Runs `f` against the payload and marks the session for commit.
    pub fn update<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut entry = self.lock();
        entry.is_modified = true;
        f(&mut entry.data.payload)
    }

    pub(crate) fn take_for_commit(&self) -> (AxumSessionData<D>, bool) {
        let entry = self.lock();
        (entry.data.clone(), entry.is_modified)
    }
}

impl<D> Debug for AxumSession<D>
where
    D: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.lock();
        f.debug_struct("AxumSession")
            .field("session_id", &entry.data.session_id)
            .field("init_time", &entry.data.init_time)
            .field("expiry_time", &entry.data.expiry_time)
            .field("payload", &entry.data.payload)
            .finish()
    }
}

#[async_trait]
impl<S, D> FromRequestParts<S> for AxumSession<D>
where
    S: Send + Sync,
    D: Clone + Send + Sync + 'static,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AxumSession<D>>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Can't extract AxumSession. Is `AxumSessionLayer` enabled?",
        ))
    }
}
