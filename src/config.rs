//! Service configuration.
//!
//! Every option is a command-line flag backed by an environment variable.
//! Precedence, highest first: explicit flag, environment variable, built-in
//! default. `DATABASE_URL` is the only variable that sets the database URL.

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};

#[derive(Clone, Parser)]
#[command(name = "dkv", version)]
#[command(about = "Persistent key/value store over HTTP with translation lookups")]
pub struct Config {
    /// Listen address
    #[arg(long, env = "VCAP_APP_HOST", default_value = "127.0.0.1")]
    pub ip: IpAddr,

    /// Listen port
    #[arg(long, env = "VCAP_APP_PORT", default_value = "6060")]
    pub port: u16,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DKV_DB_MAX_CONNECTIONS", default_value = "10")]
    pub db_max_connections: u32,

    /// Translation API endpoint
    #[arg(
        long,
        env = "WMT_URL",
        default_value = "https://gateway.watsonplatform.net/language-translation/api"
    )]
    pub translation_url: String,

    /// Translation API user name
    #[arg(long, env = "WMT_USER")]
    pub translation_user: String,

    /// Translation API password
    #[arg(long, env = "WMT_PWD", hide_env_values = true)]
    pub translation_password: String,

    /// Keep records in process memory instead of PostgreSQL
    #[arg(long, env = "DKV_IN_MEMORY")]
    pub in_memory: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("translation_url", &self.translation_url)
            .field("translation_user", &self.translation_user)
            .field("translation_password", &"<redacted>")
            .field("in_memory", &self.in_memory)
            .finish()
    }
}

impl Config {
    /// Parse process arguments and environment
    ///
    /// `--help` and `--version` print their output and exit the process with
    /// status 0.
    pub fn load() -> Result<Self> {
        let config = match Self::try_parse() {
            Ok(config) => config,
            Err(e) if is_informational(&e) => e.exit(),
            Err(e) => return Err(e).context("Invalid configuration"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse from an explicit argument list (environment still applies)
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Self::try_parse_from(args).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.in_memory && self.database_url.as_deref().unwrap_or("").is_empty() {
            bail!("DATABASE_URL not set (pass --database-url or --in-memory)");
        }
        if self.translation_user.is_empty() || self.translation_password.is_empty() {
            bail!("WMT_USER and WMT_PWD must not be empty");
        }
        if self.db_max_connections == 0 {
            bail!("DKV_DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Whether a parse "error" is really a request for help or version output
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}
