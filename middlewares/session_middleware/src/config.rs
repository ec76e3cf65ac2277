use std::borrow::Cow;

use chrono::Duration;
use cookie::SameSite;

#[derive(Clone, Debug)]
pub struct AxumSessionConfig {
    /// How long a session survives without any request.
    pub(crate) idle_timeout: Duration,

    /// Session cookie name
    pub(crate) cookie_name: Cow<'static, str>,
    /// Session cookie domain
    pub(crate) cookie_domain: Option<Cow<'static, str>>,
    /// Session cookie http only flag
    pub(crate) cookie_http_only: bool,
    /// Session cookie path
    pub(crate) cookie_path: Cow<'static, str>,
    /// Resticts how Cookies are sent cross-site. Default is `SameSite::Lax`
    pub(crate) cookie_same_site: SameSite,
    /// Session cookie secure flag
    pub(crate) cookie_secure: bool,
}

impl AxumSessionConfig {
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<Cow<'static, str>>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

impl Default for AxumSessionConfig {
    fn default() -> Self {
        AxumSessionConfig {
            idle_timeout: Duration::minutes(30),

            cookie_name: "sid".into(),
            cookie_path: "/".into(),
            cookie_http_only: true,
            cookie_secure: false,
            cookie_domain: None,
            cookie_same_site: SameSite::Lax,
        }
    }
}
