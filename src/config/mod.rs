//! Configuration for the program.
//!
//! Read from a TOML file, with environment variables taking precedence over
//! the file:
//!
//! ```toml
//! [stack]
//! name = "factorio"
//! region = "eu-north-1"
//!
//! [launch_arguments]
//! factorio_image_tag = "stable"
//!
//! [console]
//! host = "factorio.example.com"
//! port = 27015
//! password = "secret"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{PATH_CONFIG_DEFAULT, RCON_PORT_DEFAULT, RCON_TIMEOUT_DEFAULT};
use crate::launch::{LaunchArgument, LaunchArguments};
use crate::rcon::Endpoint;

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_STACK_NAME: &str = "CF_STACK_NAME";
pub const ENV_RCON_HOST: &str = "RCON_HOSTNAME";
pub const ENV_RCON_PORT: &str = "RCON_PORT";
pub const ENV_RCON_PASSWORD: &str = "RCON_PASSWORD";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct File {
    #[serde(default)]
    stack: StackSection,
    #[serde(default)]
    launch_arguments: LaunchArgumentsSection,
    console: Option<ConsoleSection>,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StackSection {
    name: Option<String>,
    region: Option<String>,
}

/// Absent entries keep the value the stack was last updated with.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LaunchArgumentsSection {
    enable_rcon: Option<String>,
    factorio_image_tag: Option<String>,
    hosted_zone_id: Option<String>,
    record_name: Option<String>,
    key_pair_name: Option<String>,
    your_ip: Option<String>,
}

impl From<LaunchArgumentsSection> for LaunchArguments {
    fn from(value: LaunchArgumentsSection) -> Self {
        return LaunchArguments {
            enable_rcon: LaunchArgument::from(value.enable_rcon),
            factorio_image_tag: LaunchArgument::from(value.factorio_image_tag),
            hosted_zone_id: LaunchArgument::from(value.hosted_zone_id),
            record_name: LaunchArgument::from(value.record_name),
            key_pair_name: LaunchArgument::from(value.key_pair_name),
            your_ip: LaunchArgument::from(value.your_ip),
        };
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConsoleSection {
    host: Option<String>,
    port: Option<u16>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
}

/// Connection parameters of the game server's RCON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub endpoint: Endpoint,
    /// May be empty: listing players then fails with a missing password.
    pub password: String,
    pub timeout: Duration,
}

/// Configuration for the program.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name of the CloudFormation stack hosting the server.
    pub stack_name: String,
    /// AWS region of the stack. `None` defers to the AWS default chain.
    pub region: Option<String>,
    pub launch_arguments: LaunchArguments,
    /// `None` when no RCON is configured at all.
    pub console: Option<ConsoleConfig>,
    pub log_level: log::LevelFilter,
}

impl Config {
    /// Where the configuration of this program is read from by default.
    pub fn default_fs_path() -> PathBuf {
        return PATH_CONFIG_DEFAULT.into();
    }

    /// Read the configuration file, then apply the process environment.
    ///
    /// A missing file at the default location is fine as long as the
    /// environment names the stack. A missing file at an explicitly given
    /// location is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let (path, explicit): (PathBuf, bool) = match path {
            Some(n) => (n.to_path_buf(), true),
            None => (Self::default_fs_path(), false),
        };

        let content: String = match std::fs::read_to_string(&path) {
            Ok(n) => {
                log::debug!("Read {} chars from {}", n.len(), path.to_string_lossy());
                n
            }
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No config file at {}: Using environment only",
                    path.to_string_lossy()
                );
                String::new()
            }
            Err(source) => return Err(Error::Read { path, source }),
        };

        let file: File = match toml::from_str(&content) {
            Ok(n) => n,
            Err(source) => return Err(Error::Parse { path, source }),
        };
        return Self::resolve(file, |key| std::env::var(key).ok());
    }

    /// Parse a configuration from TOML text, with environment lookups done by
    /// `env`.
    pub fn from_toml<F>(content: &str, env: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: File = match toml::from_str(content) {
            Ok(n) => n,
            Err(source) => {
                return Err(Error::Parse {
                    path: PathBuf::from("<inline>"),
                    source,
                });
            }
        };
        return Self::resolve(file, env);
    }

    fn resolve<F>(file: File, env: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stack_name: String = match env(ENV_STACK_NAME).or(file.stack.name) {
            Some(n) if !n.trim().is_empty() => n,
            _ => {
                return Err(Error::Invalid(format!(
                    "stack name missing: set [stack] name or {ENV_STACK_NAME}"
                )));
            }
        };
        let region: Option<String> = env(ENV_REGION).or(file.stack.region);

        let console: Option<ConsoleConfig> = Self::resolve_console(file.console, &env)?;

        let log_level: log::LevelFilter = match file.logging.level {
            Some(n) => match log::LevelFilter::from_str(&n) {
                Ok(level) => level,
                Err(_) => return Err(Error::Invalid(format!("unknown log level '{n}'"))),
            },
            None => log::LevelFilter::Info,
        };

        return Ok(Self {
            stack_name,
            region,
            launch_arguments: file.launch_arguments.into(),
            console,
            log_level,
        });
    }

    fn resolve_console<F>(section: Option<ConsoleSection>, env: &F) -> Result<Option<ConsoleConfig>, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_host: Option<String> = env(ENV_RCON_HOST);
        if section.is_none() && env_host.is_none() {
            return Ok(None);
        }
        let section: ConsoleSection = section.unwrap_or_default();

        let host: String = match env_host.or(section.host) {
            Some(n) if !n.trim().is_empty() => n,
            _ => {
                return Err(Error::Invalid(format!(
                    "RCON host missing: set [console] host or {ENV_RCON_HOST}"
                )));
            }
        };
        let port: u16 = match env(ENV_RCON_PORT) {
            Some(n) => match n.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    return Err(Error::Invalid(format!(
                        "{ENV_RCON_PORT} is not a valid port: '{n}'"
                    )));
                }
            },
            None => section.port.unwrap_or(RCON_PORT_DEFAULT),
        };
        let password: String = env(ENV_RCON_PASSWORD)
            .or(section.password)
            .unwrap_or_default();
        let timeout: Duration = match section.timeout_secs {
            Some(0) => return Err(Error::Invalid("[console] timeout_secs must be positive".into())),
            Some(n) => Duration::from_secs(n),
            None => RCON_TIMEOUT_DEFAULT,
        };

        return Ok(Some(ConsoleConfig {
            endpoint: Endpoint { host, port },
            password,
            timeout,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        return move |key: &str| vars.get(key).cloned();
    }

    #[test]
    fn test_full_file() {
        let config: Config = Config::from_toml(
            r#"
            [stack]
            name = "factorio"
            region = "eu-north-1"

            [launch_arguments]
            factorio_image_tag = "stable"
            your_ip = "192.0.2.10"

            [console]
            host = "factorio.example.com"
            port = 27016
            password = "secret"
            timeout_secs = 2

            [logging]
            level = "debug"
            "#,
            env(&[]),
        )
        .unwrap();

        assert_eq!(config.stack_name, "factorio");
        assert_eq!(config.region.as_deref(), Some("eu-north-1"));
        assert_eq!(
            config.launch_arguments.factorio_image_tag,
            LaunchArgument::Value("stable".into())
        );
        assert_eq!(config.launch_arguments.your_ip, LaunchArgument::Value("192.0.2.10".into()));
        assert_eq!(config.launch_arguments.enable_rcon, LaunchArgument::UsePreviousValue);
        assert_eq!(
            config.console,
            Some(ConsoleConfig {
                endpoint: Endpoint {
                    host: "factorio.example.com".into(),
                    port: 27016,
                },
                password: "secret".into(),
                timeout: Duration::from_secs(2),
            })
        );
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_environment_only() {
        let config: Config = Config::from_toml(
            "",
            env(&[
                ("CF_STACK_NAME", "factorio"),
                ("AWS_REGION", "us-east-1"),
                ("RCON_HOSTNAME", "10.0.0.5"),
                ("RCON_PASSWORD", "pw"),
            ]),
        )
        .unwrap();

        assert_eq!(config.stack_name, "factorio");
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.launch_arguments, LaunchArguments::default());
        let console: ConsoleConfig = config.console.unwrap();
        assert_eq!(console.endpoint.port, 27015);
        assert_eq!(console.password, "pw");
        assert_eq!(console.timeout, RCON_TIMEOUT_DEFAULT);
        assert_eq!(config.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn test_environment_overrides_file() {
        let config: Config = Config::from_toml(
            "[stack]\nname = \"from-file\"\n[console]\nhost = \"a\"\nport = 1\n",
            env(&[("CF_STACK_NAME", "from-env"), ("RCON_PORT", "2")]),
        )
        .unwrap();
        assert_eq!(config.stack_name, "from-env");
        let console: ConsoleConfig = config.console.unwrap();
        assert_eq!(console.endpoint.host, "a");
        assert_eq!(console.endpoint.port, 2);
        assert_eq!(console.password, "");
    }

    #[test]
    fn test_no_console_configured() {
        let config: Config = Config::from_toml("[stack]\nname = \"s\"\n", env(&[])).unwrap();
        assert!(config.console.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_toml("", env(&[])),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml(
                "[stack]\nname = \"s\"\n",
                env(&[("RCON_HOSTNAME", "h"), ("RCON_PORT", "http")])
            ),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[stack]\nname = \"s\"\n[logging]\nlevel = \"loud\"\n", env(&[])),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[stack]\nname = \"s\"\n[console]\nport = 1\n", env(&[])),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Config::from_toml("[stack]\nname = \"s\"\nsize = 3\n", env(&[])),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let path: &Path = Path::new("/nonexistent/factorioctl/config.toml");
        assert!(matches!(Config::load(Some(path)), Err(Error::Read { .. })));
    }
}
