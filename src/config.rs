//! Configuration constants and profile loading for spiderline
//!
//! Profiles are INI sections holding transport settings:
//!
//! ```ini
//! [default]
//! timeout = 10
//! follow_redirects = true
//! proxy = http://127.0.0.1:8080
//! insecure = false
//! user_agent = spiderline/0.1
//! ```

use crate::error::{Result, SpiderError};
use crate::request::DEFAULT_USER_AGENT;
use crate::transport::TransportOptions;
use ini::Ini;
use std::path::PathBuf;
use std::time::Duration;

/// Default profile file path for spiderline
pub const DEFAULT_PROFILE_PATH: &str = "~/.spiderline/profile";

/// Environment variable name for overriding the profile path
pub const PROFILE_PATH_ENV_VAR: &str = "SPIDERLINE_PROFILE_PATH";

/// Get the profile file path, checking environment variable first, then falling back to default
pub fn get_profile_path() -> String {
    std::env::var_os(PROFILE_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub options: TransportOptions,
    pub user_agent: String,
    pub overwrite_cookies: bool,
}

impl Profile {
    /// Profile used when none is configured
    pub fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: TransportOptions::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            overwrite_cookies: true,
        }
    }
}

/// Profiles stored in one INI file
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).into_owned()),
        }
    }

    /// The named profile, or `None` if the file or section does not exist
    pub fn get_profile(&self, name: &str) -> Result<Option<Profile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let ini = Ini::load_from_file(&self.path)
            .map_err(|e| SpiderError::Config(format!("{}: {e}", self.path.display())))?;
        let Some(section) = ini.section(Some(name)) else {
            return Ok(None);
        };

        let mut profile = Profile::blank(name);
        for (key, value) in section.iter() {
            let value = value.trim();
            match key {
                "timeout" => {
                    let secs: u64 = parse_value(key, value)?;
                    profile.options.timeout = (secs > 0).then(|| Duration::from_secs(secs));
                }
                "follow_redirects" => profile.options.follow_redirects = parse_bool(key, value)?,
                "max_redirects" => profile.options.max_redirects = parse_value(key, value)?,
                "proxy" => {
                    profile.options.proxy = (!value.is_empty()).then(|| value.to_string())
                }
                "insecure" => profile.options.verify = !parse_bool(key, value)?,
                "client_cert" => {
                    profile.options.client_cert =
                        Some(PathBuf::from(shellexpand::tilde(value).into_owned()))
                }
                "stream" => profile.options.stream = parse_bool(key, value)?,
                "user_agent" => profile.user_agent = value.to_string(),
                "overwrite_cookies" => profile.overwrite_cookies = parse_bool(key, value)?,
                other => tracing::warn!("Unknown profile key '{other}' in [{name}]"),
            }
        }
        Ok(Some(profile))
    }
}

/// Load a profile, falling back to the blank profile when it is not configured
pub fn load_profile(name: &str, path: &str) -> Result<Profile> {
    tracing::debug!("Loading profile '{}' from '{}'", name, path);
    match ProfileStore::new(path).get_profile(name)? {
        Some(profile) => {
            tracing::debug!("Profile loaded successfully: {:?}", profile.options);
            Ok(profile)
        }
        None => {
            tracing::debug!("Profile '{}' not found, using blank profile", name);
            Ok(Profile::blank(name))
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SpiderError::Config(format!(
            "'{key}' expects a boolean, got '{value}'"
        ))),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| SpiderError::Config(format!("'{key}' has an invalid value '{value}'")))
}
