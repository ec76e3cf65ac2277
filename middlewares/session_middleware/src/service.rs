use axum_core::{
    body::{self, BoxBody},
    response::Response,
    BoxError,
};
use bytes::Bytes;
use cookie::Cookie;
use futures::future::BoxFuture;
use http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue, Request,
};
use http_body::Body as HttpBody;
use std::{
    convert::Infallible,
    fmt::{self, Debug, Formatter},
    task::{Context, Poll},
};
use tower_service::Service;
use uuid::Uuid;

use crate::{config::AxumSessionConfig, session::AxumSession, session_store::AxumSessionStore};

#[derive(Clone)]
pub struct AxumSessionService<S, D>
where
    D: Clone + Send + Sync + 'static,
{
    pub(crate) session_store: AxumSessionStore<D>,
    pub(crate) inner: S,
}

impl<S, D, ReqBody, ResBody> Service<Request<ReqBody>> for AxumSessionService<S, D>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
    D: Clone + Send + Sync + 'static,
{
    type Response = Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let store = self.session_store.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            store.clear_expired();

            let requested_id = read_session_id(req.headers(), store.config.cookie_name());
            let session = AxumSession::new(store.load_or_init(requested_id));

            req.extensions_mut().insert(session.clone());

            let mut res = ready_inner.call(req).await?.map(body::boxed);

            let (session_data, is_modified) = session.take_for_commit();
            let session_id = session_data.session_id;
            let is_new = requested_id != Some(session_id);

            // untouched new sessions are not worth keeping
            if is_new && !is_modified {
                store.remove(&session_id);
                return Ok(res);
            }

            store.store(session_data);

            if is_new {
                tracing::debug!("session {} started", session_id);
                let cookie = session_cookie(&store.config, session_id);
                match HeaderValue::from_str(&cookie.to_string()) {
                    Ok(value) => {
                        res.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(e) => {
                        tracing::error!("session cookie header error: {}", e);
                    }
                }
            }

            Ok(res)
        })
    }
}

fn read_session_id(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn session_cookie(config: &AxumSessionConfig, session_id: Uuid) -> Cookie<'static> {
    let mut builder = Cookie::build(config.cookie_name.clone(), session_id.to_string())
        .path(config.cookie_path.clone())
        .http_only(config.cookie_http_only)
        .secure(config.cookie_secure)
        .same_site(config.cookie_same_site);

    if let Some(domain) = config.cookie_domain.clone() {
        builder = builder.domain(domain);
    }

    builder.finish()
}

impl<S, D> Debug for AxumSessionService<S, D>
where
    S: Debug,
    D: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxumSessionService")
            .field("session_store", &self.session_store)
            .field("inner", &self.inner)
            .finish()
    }
}
