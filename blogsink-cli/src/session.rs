//! Session cache: the issued `AuthToken` serialized to a dot-file next to
//! the working directory, the way a browser session would sit in local
//! storage.

use std::fs;
use std::io;
use std::path::Path;

use blogsink_core::AuthToken;
use chrono::Utc;

const SESSION_FILE: &str = ".blogsink_session";

fn parse_session(raw: &str) -> Option<AuthToken> {
    serde_json::from_str::<AuthToken>(raw).ok()
}

pub fn load_session() -> io::Result<Option<AuthToken>> {
    if !Path::new(SESSION_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(SESSION_FILE)?;
    Ok(parse_session(&raw).filter(|token| token.is_valid(Utc::now())))
}

pub fn save_session(token: &AuthToken) -> io::Result<()> {
    let raw = serde_json::to_string(token)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(SESSION_FILE, raw)
}

pub fn clear_session() -> io::Result<()> {
    if Path::new(SESSION_FILE).exists() {
        fs::remove_file(SESSION_FILE)?;
    }
    Ok(())
}
