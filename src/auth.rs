use crate::error::{AppError, AppResult};
use crate::schemas::UserNick;
use actix_web::{http::header::HeaderValue, HttpRequest};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq)]
pub enum AuthorizationLevel {
    Bot,
    Frontend(UserNick),
    /// No bot token configured, every caller is let through.
    Anonymous,
}

#[derive(Deserialize, Debug, Clone)]
struct TelegramAuthData {
    auth_date: String,
    first_name: Option<String>,
    last_name: Option<String>,
    id: String,
    photo_url: Option<String>,
    username: String,
    hash: String,
}

pub fn check_authorization_level(request: &HttpRequest, bot_token: &str) -> Option<AuthorizationLevel> {
    let authorization = request
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .map(HeaderValue::to_str)?
        .ok()?;
    if authorization == bot_token {
        return Some(AuthorizationLevel::Bot);
    }
    let auth_data: TelegramAuthData = serde_json::from_str(authorization).ok()?;
    let hash = hex::decode(&auth_data.hash).ok()?;
    let mac = login_mac(&auth_data, bot_token)?;
    mac.verify_slice(&hash).ok()?;
    Some(AuthorizationLevel::Frontend(auth_data.username))
}

pub fn require_authorization(request: &HttpRequest, bot_token: Option<&str>) -> AppResult<AuthorizationLevel> {
    match bot_token {
        None => Ok(AuthorizationLevel::Anonymous),
        Some(token) => check_authorization_level(request, token).ok_or(AppError::Unauthorized),
    }
}

// Telegram login widget check: HMAC-SHA256 over the sorted key=value lines,
// keyed with SHA256 of the bot token
fn login_mac(auth_data: &TelegramAuthData, bot_token: &str) -> Option<HmacSha256> {
    let data_check_string = [
        ("auth_date", Some(&auth_data.auth_date)),
        ("first_name", auth_data.first_name.as_ref()),
        ("id", Some(&auth_data.id)),
        ("last_name", auth_data.last_name.as_ref()),
        ("photo_url", auth_data.photo_url.as_ref()),
        ("username", Some(&auth_data.username)),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|val| format!("{key}={val}")))
    .collect::<Vec<_>>()
    .join("\n");

    let secret_key = Sha256::digest(bot_token.as_bytes());
    let mut mac = HmacSha256::new_from_slice(&secret_key).ok()?;
    mac.update(data_check_string.as_bytes());
    Some(mac)
}
