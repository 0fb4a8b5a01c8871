// src/config.rs
//
// Environment-sourced configuration. Read once at startup; anything
// missing that the process cannot run without fails here, not later.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::UserId;
use crate::error::{AppError, AppResult};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    /// Overrides the default location under the platform data dir
    pub database_path: Option<PathBuf>,

    /// TMDB requires an API key on every call; a deployment without one
    /// cannot serve the movie/TV providers, so its absence aborts startup.
    pub tmdb_api_key: String,

    /// token -> user table for the static session provider
    pub session_tokens: HashMap<String, UserId>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let bind_addr = env::var("MEDIALOG_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid MEDIALOG_BIND_ADDR: {}", e)))?;

        let database_path = env::var_os("MEDIALOG_DATABASE_PATH").map(PathBuf::from);

        let tmdb_api_key = env::var("TMDB_API_KEY").map_err(|_| {
            AppError::Config("TMDB_API_KEY environment variable is not set".to_string())
        })?;

        let session_tokens =
            parse_session_tokens(&env::var("MEDIALOG_SESSION_TOKENS").unwrap_or_default())?;

        Ok(Self {
            bind_addr,
            database_path,
            tmdb_api_key,
            session_tokens,
        })
    }
}

/// "token1:user1,token2:user2" -> token table. Empty input is an empty
/// table (every request will be rejected as unauthorized).
fn parse_session_tokens(raw: &str) -> AppResult<HashMap<String, UserId>> {
    let mut tokens = HashMap::new();

    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (token, user) = pair.trim().split_once(':').ok_or_else(|| {
            AppError::Config(format!(
                "Invalid MEDIALOG_SESSION_TOKENS entry (expected token:user): {}",
                pair
            ))
        })?;

        if token.is_empty() || user.is_empty() {
            return Err(AppError::Config(
                "MEDIALOG_SESSION_TOKENS entries must be token:user".to_string(),
            ));
        }

        tokens.insert(token.to_string(), UserId::from(user));
    }

    Ok(tokens)
}
