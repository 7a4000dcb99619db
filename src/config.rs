//! Application-level configuration loading: roster, fixture list and commissioner secret.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::models::MatchEntity,
    state::roster::{Participant, Roster},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PITCH_CLUB_CONFIG_PATH";
/// Environment variable that overrides the configured commissioner secret.
const COMMISSIONER_SECRET_ENV: &str = "PITCH_CLUB_COMMISSIONER_SECRET";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    roster: Roster,
    fixtures: Vec<MatchEntity>,
    commissioner_secret: Option<String>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to the built-in roster.
    ///
    /// The commissioner secret from the environment wins over the file.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        participants = app_config.roster.len(),
                        fixtures = app_config.fixtures.len(),
                        "loaded roster and fixtures from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(COMMISSIONER_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => config.with_commissioner_secret(Some(secret)),
            _ => {
                if config.commissioner_secret.is_none() {
                    warn!("no commissioner secret configured; admin endpoints will reject every call");
                }
                config
            }
        }
    }

    /// Replace the commissioner secret.
    pub fn with_commissioner_secret(mut self, secret: Option<String>) -> Self {
        self.commissioner_secret = secret.filter(|value| !value.is_empty());
        self
    }

    /// Replace the fixture list.
    pub fn with_fixtures(mut self, fixtures: Vec<MatchEntity>) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Participants in configured order.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Fixtures seeded into a freshly installed store.
    pub fn fixtures(&self) -> &[MatchEntity] {
        &self.fixtures
    }

    /// Secret expected in the `X-Admin-Token` header.
    pub fn commissioner_secret(&self) -> Option<&str> {
        self.commissioner_secret.as_deref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            fixtures: Vec::new(),
            commissioner_secret: None,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    roster: Vec<RawParticipant>,
    #[serde(default)]
    fixtures: Vec<RawFixture>,
    #[serde(default)]
    commissioner_secret: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            roster: Roster::new(value.roster.into_iter().map(Into::into)),
            fixtures: value.fixtures.into_iter().map(Into::into).collect(),
            commissioner_secret: value.commissioner_secret.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawParticipant {
    id: String,
    name: String,
    avatar: String,
    code: String,
}

impl From<RawParticipant> for Participant {
    fn from(value: RawParticipant) -> Self {
        Participant::new(value.id, value.name, value.avatar, &value.code)
    }
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    id: u32,
    home: String,
    away: String,
    date: String,
    time: String,
    stadium: String,
}

impl From<RawFixture> for MatchEntity {
    fn from(value: RawFixture) -> Self {
        MatchEntity::upcoming(
            value.id,
            value.home,
            value.away,
            value.date,
            value.time,
            value.stadium,
        )
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in roster shipped with the binary.
fn default_roster() -> Roster {
    Roster::new([
        Participant::new("p1", "Özmerç", "😼", "1hj8"),
        Participant::new("p2", "Eren", "🤡", "qw89"),
        Participant::new("p3", "Melih", "🥴", "rt74"),
        Participant::new("p4", "Kaan", "😏", "y674"),
        Participant::new("p5", "Memih", "🤠", "as56"),
        Participant::new("p6", "Aziz Cem", "🫠", "jh67"),
    ])
}
