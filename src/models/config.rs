//! Configuration types for qfree.
//!
//! Settings are layered: built-in defaults, then `/etc/qfree/config.toml`, then
//! the user's config file, then environment variables. Command-line flags are
//! applied last, in [`ReportOptions`].

use serde::Deserialize;

use super::node::DomainSuffixes;

/// Effective configuration after all layers are applied
#[derive(Debug, Clone, Default)]
pub struct QfreeConfig {
    pub system: SystemConfig,

    pub display: DisplayConfig,
}

/// System configuration for paths and environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Directory containing `pbsnodes`.
    /// If empty or not set, auto-detected via PATH
    pub pbs_bin_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Suffix stripped from node names, e.g. ".cluster.example.org"
    pub node_domain_suffix: String,

    /// Suffix stripped from job identifiers, e.g. ".server.cluster.example.org"
    pub job_domain_suffix: String,

    /// Use colored output unless disabled on the command line
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let suffixes = DomainSuffixes::default();
        Self {
            node_domain_suffix: suffixes.node,
            job_domain_suffix: suffixes.job,
            color: true,
        }
    }
}

/// One config file as written on disk. Unset keys leave earlier layers alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub system: SystemConfig,

    pub display: DisplayFile,
}

/// `[display]` table of a config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayFile {
    pub node_domain_suffix: Option<String>,
    pub job_domain_suffix: Option<String>,
    pub color: Option<bool>,
}

impl DisplayConfig {
    #[must_use]
    pub fn suffixes(&self) -> DomainSuffixes {
        DomainSuffixes {
            node: self.node_domain_suffix.clone(),
            job: self.job_domain_suffix.clone(),
        }
    }
}

/// Which jobs to list under each node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobFilter {
    /// No job lines
    #[default]
    Off,
    /// Every job on every shown node
    All,
    /// Only the given job identifier
    Only(String),
}

impl JobFilter {
    /// Build from the value of `-j/--jobs`; `all` selects every job.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => JobFilter::Off,
            Some("all") => JobFilter::All,
            Some(job_id) => JobFilter::Only(job_id.to_string()),
        }
    }

    #[must_use]
    pub fn matches(&self, job_id: &str) -> bool {
        match self {
            JobFilter::Off => false,
            JobFilter::All => true,
            JobFilter::Only(wanted) => wanted == job_id,
        }
    }
}

/// Per-invocation report settings, fixed once arguments are parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Include down and offline nodes
    pub show_all: bool,
    pub job_filter: JobFilter,
    pub color: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_all: false,
            job_filter: JobFilter::Off,
            color: true,
        }
    }
}

impl QfreeConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/qfree/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/qfree/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/qfree/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<std::path::PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(std::path::PathBuf::from(xdg_config).join("qfree/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(std::path::PathBuf::from(home).join(".config/qfree/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("qfree/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    ///
    /// # Errors
    /// With `QFREE_STRICT_CONFIG` set, the first problem is returned as an error
    /// instead of a warning.
    pub fn load() -> Result<(Self, Vec<String>), String> {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        config.load_config_file("/etc/qfree/config.toml", strict, &mut warnings)?;

        if let Some(user_path) = Self::user_config_path() {
            config.load_config_file(&user_path.to_string_lossy(), strict, &mut warnings)?;
        }

        config.apply_env_overrides(strict, &mut warnings)?;

        Ok((config, warnings))
    }

    /// Check if strict config mode is enabled via QFREE_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("QFREE_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file. A missing file is not an error.
    fn load_config_file(&mut self, path: &str, strict: bool, warnings: &mut Vec<String>) -> Result<(), String> {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(parsed) => {
                    tracing::debug!(path, "loaded config file");
                    self.merge(parsed);
                    Ok(())
                }
                Err(e) => report(strict, warnings, format!("Config parse error in '{}': {}", path, e)),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => report(strict, warnings, format!("Could not read config '{}': {}", path, e)),
        }
    }

    /// Parse a TOML config document
    pub fn parse(content: &str) -> Result<ConfigFile, toml::de::Error> {
        toml::from_str(content)
    }

    /// Layer a config file on top of the current settings, key by key
    fn merge(&mut self, other: ConfigFile) {
        self.system.pbs_bin_path = other.system.pbs_bin_path.or(self.system.pbs_bin_path.take());

        let display = other.display;
        if let Some(suffix) = display.node_domain_suffix {
            self.display.node_domain_suffix = suffix;
        }
        if let Some(suffix) = display.job_domain_suffix {
            self.display.job_domain_suffix = suffix;
        }
        if let Some(color) = display.color {
            self.display.color = color;
        }
    }

    fn apply_env_overrides(&mut self, strict: bool, warnings: &mut Vec<String>) -> Result<(), String> {
        self.apply_overrides(|name| std::env::var(name).ok(), strict, warnings)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    fn apply_overrides<F>(&mut self, lookup: F, strict: bool, warnings: &mut Vec<String>) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QFREE_PBS_PATH")
            && !val.is_empty()
        {
            let path = std::path::PathBuf::from(&val);
            if path.is_dir() {
                self.system.pbs_bin_path = Some(path);
            } else {
                report(
                    strict,
                    warnings,
                    format!("Invalid value '{}' for QFREE_PBS_PATH: not a valid directory", val),
                )?;
            }
        }

        if let Some(val) = lookup("QFREE_NODE_SUFFIX") {
            self.display.node_domain_suffix = val;
        }
        if let Some(val) = lookup("QFREE_JOB_SUFFIX") {
            self.display.job_domain_suffix = val;
        }
        // https://no-color.org: any non-empty value disables color
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.display.color = false;
        }

        Ok(())
    }
}

/// Record a config problem, failing instead when strict mode is on
fn report(strict: bool, warnings: &mut Vec<String>, msg: String) -> Result<(), String> {
    if strict {
        Err(format!("{} (QFREE_STRICT_CONFIG is set - config errors are fatal)", msg))
    } else {
        warnings.push(msg);
        Ok(())
    }
}
