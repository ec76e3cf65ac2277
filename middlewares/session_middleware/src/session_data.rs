use chrono::{DateTime, Duration, Local};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub(crate) struct AxumSessionData<D> {
    pub(crate) session_id: Uuid,
    pub(crate) init_time: DateTime<Local>,
    pub(crate) expiry_time: DateTime<Local>,

    // application payload, e.g. the page the browser is on
    pub(crate) payload: D,
}

impl<D> AxumSessionData<D> {
    pub(crate) fn init(session_id: Uuid, payload: D, idle_timeout: Duration) -> AxumSessionData<D> {
        AxumSessionData {
            session_id,
            init_time: Local::now(),
            expiry_time: Local::now() + idle_timeout,
            payload,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expiry_time <= Local::now()
    }

    pub(crate) fn touch(&mut self, idle_timeout: Duration) {
        self.expiry_time = Local::now() + idle_timeout;
    }
}
