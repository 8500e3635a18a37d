//! Server configuration.
//!
//! Built once at startup from, in increasing precedence: defaults, an
//! optional YAML file, environment variables and command-line flags.
//!
//! ```bash
//! sentinel-httpd --port 8080 --debug ./public
//! sentinel-httpd --chroot --user www --group www /srv/www
//! SENTINEL_PORT=8080 sentinel-httpd --config sentinel.yaml
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_MAX_BODY_LENGTH: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub document_root: PathBuf,
    /// Log to stderr and stay in the foreground.
    pub debug: bool,
    /// Switch to this user/group and chroot into the document root.
    pub confinement: Option<Confinement>,
    /// Requests declaring a longer body are dropped.
    pub max_body_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Confinement {
    pub user: String,
    pub group: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            document_root: PathBuf::new(),
            debug: false,
            confinement: None,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
        }
    }
}

/// Command line of the `sentinel-httpd` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "sentinel-httpd", version, about = "Minimal HTTP/1.x static file server")]
pub struct Cli {
    /// Port to listen on [default: 80]
    #[arg(short, long, env = "SENTINEL_PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long, env = "SENTINEL_HOST")]
    pub host: Option<String>,

    /// Chroot into the document root and drop privileges (needs --user and --group)
    #[arg(long)]
    pub chroot: bool,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub group: Option<String>,

    /// Stay in the foreground and log to stderr
    #[arg(long)]
    pub debug: bool,

    /// Largest request body accepted, in bytes
    #[arg(long)]
    pub max_body_length: Option<u64>,

    /// YAML file with base settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory served as `/`
    pub docroot: Option<PathBuf>,
}

impl Config {
    /// Parses the process arguments and environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(std::env::args_os())
    }

    /// Like [`Config::load`] with an explicit argument list.
    ///
    /// `--help` and `--version` print and exit with status 0. Any other
    /// command-line error is returned, so the caller decides the exit status.
    pub fn load_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Self::from_cli(cli),
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("in {}", path.display()))
    }

    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(host) = cli.host {
            config.host = host;
        }
        if let Some(limit) = cli.max_body_length {
            config.max_body_length = limit;
        }
        if let Some(root) = cli.docroot {
            config.document_root = root;
        }
        config.debug |= cli.debug;

        match (cli.chroot, cli.user, cli.group) {
            (true, Some(user), Some(group)) => config.confinement = Some(Confinement { user, group }),
            (true, _, _) => bail!("use both of --user and --group"),
            (false, None, None) => {}
            (false, _, _) => bail!("--user and --group only apply with --chroot"),
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.document_root.as_os_str().is_empty() {
            bail!("no document root given");
        }
        if let Some(c) = &self.confinement {
            if c.user.is_empty() || c.group.is_empty() {
                bail!("confinement needs both a user and a group");
            }
        }
        Ok(())
    }

    /// Makes the document root absolute; it must exist and be a directory.
    pub fn resolve_document_root(&mut self) -> anyhow::Result<()> {
        let root = std::fs::canonicalize(&self.document_root)
            .with_context(|| format!("bad document root {}", self.document_root.display()))?;
        if !root.is_dir() {
            bail!("document root {} is not a directory", root.display());
        }
        self.document_root = root;
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Outside debug mode the server detaches from its terminal.
    pub fn detach(&self) -> bool {
        !self.debug
    }
}
