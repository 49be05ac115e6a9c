//! Remember-me cookies
//!
//! A remembered browser holds two permanent HttpOnly cookies: the user id and
//! the plaintext remember token. The server keeps only the token's digest.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use microblog_core::UserId;

pub const USER_ID_COOKIE: &str = "user_id";
pub const REMEMBER_TOKEN_COOKIE: &str = "remember_token";

/// Add both remember-me cookies to `jar`
pub fn remember(jar: CookieJar, user_id: UserId, token: String, secure: bool) -> CookieJar {
    jar.add(permanent(USER_ID_COOKIE, user_id.to_string(), secure))
        .add(permanent(REMEMBER_TOKEN_COOKIE, token, secure))
}

/// Drop both remember-me cookies
pub fn forget(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(USER_ID_COOKIE).path("/"))
        .remove(Cookie::build(REMEMBER_TOKEN_COOKIE).path("/"))
}

/// The remembered user id and token, if both cookies are present and sane
pub fn remembered(jar: &CookieJar) -> Option<(UserId, String)> {
    let user_id = UserId::parse(jar.get(USER_ID_COOKIE)?.value()).ok()?;
    let token = jar.get(REMEMBER_TOKEN_COOKIE)?.value().to_string();
    if token.is_empty() {
        return None;
    }
    Some((user_id, token))
}

fn permanent(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .permanent()
        .build()
}
