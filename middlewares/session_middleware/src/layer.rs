use tower_layer::Layer;

use crate::{service::AxumSessionService, session_store::AxumSessionStore};

#[derive(Clone, Debug)]
pub struct AxumSessionLayer<D>
where
    D: Clone + Send + Sync + 'static,
{
    session_store: AxumSessionStore<D>,
}

impl<D> AxumSessionLayer<D>
where
    D: Clone + Send + Sync + 'static,
{
    #[inline]
    pub fn new(session_store: AxumSessionStore<D>) -> Self {
        AxumSessionLayer { session_store }
    }
}

impl<S, D> Layer<S> for AxumSessionLayer<D>
where
    D: Clone + Send + Sync + 'static,
{
    type Service = AxumSessionService<S, D>;

    fn layer(&self, inner: S) -> Self::Service {
        AxumSessionService {
            session_store: self.session_store.clone(),
            inner,
        }
    }
}
