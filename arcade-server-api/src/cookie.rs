use chrono::Duration;

pub const SESSION_COOKIE_NAME: &str = "access_token";

/// Attributes of the session cookie. The cookie is always `HttpOnly` with
/// `SameSite=Lax` on path `/`; its `Max-Age` follows the token lifetime.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    pub name: String,
    pub secure: bool,
    pub max_age: Duration,
}

impl SessionCookieConfig {
    pub fn new(max_age: Duration, secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            secure,
            max_age,
        }
    }

    pub fn build_set_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.name,
            token,
            self.max_age.num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn build_clear_cookie(&self) -> String {
        let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", self.name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
