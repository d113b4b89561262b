// Session cookie store
//
// Bravia firmware emits `Set-Cookie` headers whose `expires` attribute uses
// a non-RFC date format. Strict cookie-date parsing rejects the whole cookie,
// which loses the auth cookie planted by `actRegister`. Every header is
// normalized before it reaches the underlying jar.

use std::sync::{PoisonError, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use tracing::trace;
use url::Url;

/// Strip every `expires=...` attribute from a raw `Set-Cookie` value.
///
/// The attribute name is matched case-insensitively and runs to the next
/// `;` or the end of the string. Name, value and all other attributes are
/// kept in their original order.
pub fn normalize_cookie(raw: &str) -> String {
    raw.split(';')
        .filter(|attr| {
            let attr = attr.trim_start();
            !attr
                .get(..8)
                .is_some_and(|name| name.eq_ignore_ascii_case("expires="))
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Cookie store owned by one device session.
///
/// Implements [`CookieStore`] so it can be handed to the `reqwest::Client`
/// builder; responses flow through [`normalize_cookie`] on the way in.
/// Unparseable cookies are dropped by the inner jar without an error.
#[derive(Debug, Default)]
pub struct DeviceCookieJar {
    inner: RwLock<Jar>,
}

impl DeviceCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge raw `Set-Cookie` values received from `url`.
    pub fn merge<'a>(&self, raw_cookies: impl IntoIterator<Item = &'a str>, url: &Url) {
        let jar = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        for raw in raw_cookies {
            trace!(%url, "storing device cookie");
            jar.add_cookie_str(&normalize_cookie(raw), url);
        }
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Jar::default();
    }

    /// The `Cookie` header value that would be sent to `url`, if any.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let value = self.cookies(url)?;
        value.to_str().ok().map(String::from)
    }
}

impl CookieStore for DeviceCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.merge(cookie_headers.filter_map(|v| v.to_str().ok()), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cookies(url)
    }
}
