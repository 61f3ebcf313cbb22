use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr};

use crate::{
    game::{
        grid::{DEFAULT_MAX_GRID_ATTEMPTS, DEFAULT_MAX_WORD_ATTEMPTS},
        scorer::{DEFAULT_POINTS_PER_WORD, DEFAULT_TIME_BONUS_PER_SECOND},
        session::DEFAULT_HINTS_PER_LEVEL,
        GridGenerator, Scorer, SessionSettings,
    },
    utils::letters::{parse_alphabet, ALPHABET},
};

/// Number of levels in the game
pub const DEFAULT_MAX_LEVEL: u32 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Progress is kept in memory when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub levels_dir: String,
    pub max_level: u32,
    pub hints_per_level: u32,
    pub points_per_word: u32,
    pub time_bonus_per_second: u32,
    pub max_grid_attempts: usize,
    pub max_word_attempts: usize,
    pub filler_alphabet: Vec<char>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            frontend_dir: "../frontend".to_string(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels_dir: "./levels".to_string(),
            max_level: DEFAULT_MAX_LEVEL,
            hints_per_level: DEFAULT_HINTS_PER_LEVEL,
            points_per_word: DEFAULT_POINTS_PER_WORD,
            time_bonus_per_second: DEFAULT_TIME_BONUS_PER_SECOND,
            max_grid_attempts: DEFAULT_MAX_GRID_ATTEMPTS,
            max_word_attempts: DEFAULT_MAX_WORD_ATTEMPTS,
            filler_alphabet: ALPHABET.clone(),
        }
    }
}

impl GameConfig {
    pub fn generator(&self) -> GridGenerator {
        GridGenerator::new(self.max_grid_attempts, self.max_word_attempts)
            .with_alphabet(self.filler_alphabet.clone())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            hints_per_level: self.hints_per_level,
            scorer: Scorer::new(self.points_per_word, self.time_bonus_per_second),
        }
    }
}

/// Read `key`, falling back to `default` when unset
fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, value)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or(defaults.server.host),
            port: var_or("PORT", defaults.server.port).context("PORT must be a number")?,
            frontend_dir: env::var("FRONTEND_DIR").unwrap_or(defaults.server.frontend_dir),
        };

        let defaults = defaults.game;
        let game = GameConfig {
            levels_dir: env::var("LEVELS_DIR").unwrap_or(defaults.levels_dir),
            max_level: var_or("MAX_LEVEL", defaults.max_level)?,
            hints_per_level: var_or("HINTS_PER_LEVEL", defaults.hints_per_level)?,
            points_per_word: var_or("POINTS_PER_WORD", defaults.points_per_word)?,
            time_bonus_per_second: var_or("TIME_BONUS_PER_SECOND", defaults.time_bonus_per_second)?,
            max_grid_attempts: var_or("MAX_GRID_ATTEMPTS", defaults.max_grid_attempts)?,
            max_word_attempts: var_or("MAX_WORD_ATTEMPTS", defaults.max_word_attempts)?,
            filler_alphabet: env::var("FILLER_ALPHABET")
                .map(|raw| parse_alphabet(&raw))
                .ok()
                .filter(|letters| !letters.is_empty())
                .unwrap_or(defaults.filler_alphabet),
        };

        Ok(Config {
            database,
            server,
            game,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
