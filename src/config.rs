use std::path::Path;

use serde::Deserialize;
use url::Url;

/// Default secret used when nothing else is configured. Fine for local
/// development, warned about everywhere else.
pub const DEV_SECRET_KEY: &str = "dev-secret-key";

/// SQLite database used in development when no DATABASE_URL is configured.
pub const DEV_SQLITE_URL: &str = "sqlite://data/taskboard.dev.db";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Deployment environment name ("development", "production", ...).
    pub env: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub app: AppSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.app.env == "development"
    }

    /// Effective database URL: explicit configuration wins, development falls
    /// back to a local SQLite file, anything else refuses to start.
    pub fn resolve_database_url(&self) -> anyhow::Result<String> {
        match self.database.url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => normalize_database_url(raw),
            _ if self.is_development() => {
                tracing::info!("DATABASE_URL not set - using {}", DEV_SQLITE_URL);
                Ok(DEV_SQLITE_URL.to_string())
            }
            _ => Err(anyhow::anyhow!(
                "database.url is not configured and app.env is {:?}; set DATABASE_URL",
                self.app.env
            )),
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: taskboard.toml (in CWD)
        .add_source(::config::File::with_name("taskboard").required(false));

    if let Ok(custom_path) = std::env::var("TASKBOARD_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Prefixed environment variables override files
    builder = builder.add_source(::config::Environment::with_prefix("TASKBOARD").separator("__"));

    let cfg = builder.build()?;
    let mut app_cfg: AppConfig = cfg.try_deserialize()?;
    apply_conventional_env(&mut app_cfg);
    validate(&app_cfg)?;
    Ok(app_cfg)
}

/// PaaS-style variables applied last so a bare `DATABASE_URL` works without
/// touching any config file.
fn apply_conventional_env(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("DATABASE_URL") {
        if !v.trim().is_empty() {
            cfg.database.url = Some(v);
        }
    }
    if let Ok(v) = std::env::var("SECRET_KEY") {
        if !v.is_empty() {
            cfg.app.secret_key = v;
        }
    }
    if let Ok(v) = std::env::var("APP_ENV") {
        let trimmed = v.trim();
        if !trimmed.is_empty() {
            cfg.app.env = trimmed.to_string();
        }
    }
    if let Ok(v) = std::env::var("PORT") {
        match v.trim().parse::<u16>() {
            Ok(port) => cfg.server.port = port,
            Err(_) => tracing::warn!("Ignoring non-numeric PORT value {:?}", v),
        }
    }
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Database
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    // App
    if cfg.app.env.is_empty() {
        return Err(anyhow::anyhow!("app.env must not be empty"));
    }
    if cfg.app.secret_key == DEV_SECRET_KEY && !cfg.is_development() {
        tracing::warn!("SECRET_KEY is the development default - set a real value for {}", cfg.app.env);
    }

    Ok(())
}

/// Bring a configured database URL into the form the SQL driver accepts.
///
/// `postgresql://` is rewritten to `postgres://`, and Postgres URLs get
/// `sslmode=require` appended unless the caller already picked a mode
/// (managed providers hand out URLs without one but refuse plaintext
/// connections). SQLite URLs pass through untouched.
pub fn normalize_database_url(raw: &str) -> anyhow::Result<String> {
    if raw.starts_with("sqlite:") {
        return Ok(raw.to_string());
    }

    let rewritten = match raw.strip_prefix("postgresql://") {
        Some(rest) => format!("postgres://{}", rest),
        None => raw.to_string(),
    };

    let mut url =
        Url::parse(&rewritten).map_err(|e| anyhow::anyhow!("invalid database url {:?}: {}", raw, e))?;

    if url.scheme() == "postgres" {
        let has_sslmode = url.query_pairs().any(|(key, _)| key.eq_ignore_ascii_case("sslmode"));
        if !has_sslmode {
            url.query_pairs_mut().append_pair("sslmode", "require");
        }
    }

    Ok(url.into())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
