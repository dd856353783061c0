use crate::auth::AuthConfig;

const COOKIE_NAME: &str = "refresh_token";

fn attributes(config: &AuthConfig) -> String {
    let mut attrs = if config.cookie_secure {
        "; HttpOnly; Secure; SameSite=Strict; Path=/auth".to_string()
    } else {
        "; HttpOnly; SameSite=Lax; Path=/auth".to_string()
    };

    if let Some(domain) = &config.cookie_domain {
        attrs.push_str(&format!("; Domain={}", domain));
    }

    attrs
}

/// `Set-Cookie` value carrying a freshly issued refresh token.
pub fn refresh_cookie(config: &AuthConfig, raw_token: &str) -> String {
    format!(
        "{}={}{}; Max-Age={}",
        COOKIE_NAME,
        raw_token,
        attributes(config),
        config.refresh_cookie_max_age_secs()
    )
}

/// `Set-Cookie` value that makes the browser drop the refresh token.
pub fn clear_cookie(config: &AuthConfig) -> String {
    format!("{}={}; Max-Age=0", COOKIE_NAME, attributes(config))
}

pub fn extract_refresh_token(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("refresh_token="))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
