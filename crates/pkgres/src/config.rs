//! Host settings loaded from a TOML file and the environment.

use std::env;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::host::{DEFAULT_ARCHIVE_EXTENSION, Roots, StaticHost};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "PKGRES_";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub unpacked_root: PathBuf,
    pub installed_archive_root: PathBuf,
    /// Defaults to `Packages` beside the running executable.
    #[serde(default)]
    pub system_archive_root: Option<PathBuf>,
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,
    #[serde(default)]
    pub ignored_packages: Vec<String>,
    #[serde(default = "default_host_version")]
    pub host_version: u32,
}

fn default_archive_extension() -> String {
    DEFAULT_ARCHIVE_EXTENSION.to_string()
}

fn default_host_version() -> u32 {
    u32::MAX
}

impl Settings {
    /// `config_path` merged with `PKGRES_*` variables, the latter taking precedence.
    pub fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        Self::from_figment(Self::figment(config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut settings: Self = figment.extract()?;
        settings.unpacked_root = expand_home(settings.unpacked_root);
        settings.installed_archive_root = expand_home(settings.installed_archive_root);
        settings.system_archive_root = settings.system_archive_root.map(expand_home);
        Ok(settings)
    }

    pub fn roots(&self) -> Result<Roots> {
        let system_archives = match &self.system_archive_root {
            Some(root) => root.clone(),
            None => Roots::system_archives_beside(&env::current_exe().map_err(Error::Executable)?),
        };
        Ok(Roots::new(
            &self.unpacked_root,
            &self.installed_archive_root,
            system_archives,
        ))
    }

    pub fn into_host(self) -> Result<StaticHost> {
        Ok(StaticHost::new(self.roots()?)
            .with_version(self.host_version)
            .with_archive_extension(self.archive_extension)
            .with_ignored_packages(self.ignored_packages))
    }
}

/// Replace a leading `~` with the user's home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), home::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}
