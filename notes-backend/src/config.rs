use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Path to the SQL file applied once at startup.
    pub const SCHEMA_PATH: &str = "SCHEMA_PATH";
    /// Set to "true" or "1" to allow cross-origin requests from any origin.
    pub const CORS_ENABLED: &str = "CORS_ENABLED";
    /// Directory of the built web client, served at `/` when present.
    pub const FRONTEND_DIST: &str = "FRONTEND_DIST";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 5000;
    pub const BIND_ADDRESS: &str = "0.0.0.0";
    pub const DATABASE_URL: &str = "./.db/notes.db";
    pub const SCHEMA_FILE: &str = "schema.sql";
    pub const FRONTEND_DIST: &str = "client/build";
}

/// Schema compiled into the binary, used when no schema file is found on disk
pub const BUNDLED_SCHEMA: &str = include_str!("../schema.sql");

/// Returns the absolute path to the notes-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it resolves the same
/// regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Interpret common truthy spellings ("1", "true", "yes", "on")
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    pub schema_path: PathBuf,
    pub cors_enabled: bool,
    pub frontend_dist: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(env_vars::PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("PORT must be a valid number, got {:?}: {}", raw, e))?,
            None => defaults::PORT,
        };

        Ok(Self {
            port,
            bind_address: lookup(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|| defaults::BIND_ADDRESS.to_string()),
            database_url: lookup(env_vars::DATABASE_URL)
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            schema_path: lookup(env_vars::SCHEMA_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| backend_dir().join(defaults::SCHEMA_FILE)),
            cors_enabled: lookup(env_vars::CORS_ENABLED)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            frontend_dist: lookup(env_vars::FRONTEND_DIST)
                .map(PathBuf::from)
                .unwrap_or_else(|| backend_dir().join(defaults::FRONTEND_DIST)),
        })
    }

    /// Read the schema file, falling back to the bundled copy if it is missing
    pub fn load_schema(&self) -> String {
        match std::fs::read_to_string(&self.schema_path) {
            Ok(sql) => sql,
            Err(e) => {
                log::warn!(
                    "Schema file {:?} not readable ({}), using bundled schema",
                    self.schema_path,
                    e
                );
                BUNDLED_SCHEMA.to_string()
            }
        }
    }

    /// The static asset directory, if it exists on disk
    pub fn frontend_dist_if_present(&self) -> Option<PathBuf> {
        if self.frontend_dist.join("index.html").exists() {
            Some(self.frontend_dist.clone())
        } else {
            None
        }
    }
}
