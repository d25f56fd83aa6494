//! Cookies carrying the client-held OAuth1 credentials.
//!
//! The server never stores these values; it writes them once and reads them
//! back unchanged.

use tower_cookies::{Cookie, Cookies};

/// Request secret held between the login redirect and the callback.
pub const REQUEST_SECRET_COOKIE: &str = "oauthRequestSecret";
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const ACCESS_SECRET_COOKIE: &str = "accessSecret";

/// `Path=/`, `HttpOnly` cookie.
pub fn credential_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value)).path("/").http_only(true).build()
}

/// Expired, empty cookie telling the browser to drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = credential_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

/// Cookie value, or an empty string when the client did not send it.
pub fn cookie_value(cookies: &Cookies, name: &str) -> String {
    cookies
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default()
}
