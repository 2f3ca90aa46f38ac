//! Command-line definition.

use crate::config::{parse_host_bool, ListType, RawArgs};
use crate::operations::Operation;

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "swquery")]
#[command(version, about = "Inventory and package queries against Spacewalk / Satellite", long_about = None)]
pub struct Cli {
    /// Debug-level logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List systems registered with a Satellite server
    SatSystemList {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// `all` systems or only out-of-date (`ood`) ones
        #[arg(long, value_enum)]
        listtype: Option<ListType>,
    },

    /// List systems registered with a Spacewalk server
    SwSystemList {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Only systems with pending updates
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
        out_of_date: Option<bool>,

        /// Only physical systems
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
        physical: Option<bool>,
    },

    /// List packages of one system
    SwSystemPackages {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// System name (profile name as registered)
        #[arg(long)]
        name: Option<String>,

        /// Only packages with a newer version available
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
        upgradable: Option<bool>,

        /// Only packages not provided by any subscribed channel
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
        extra: Option<bool>,
    },
}

/// Connection options shared by every operation.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// JSON file with options (a flat object or an ANSIBLE_MODULE_ARGS wrapper)
    #[arg(value_name = "ARGS_FILE")]
    pub args_file: Option<PathBuf>,

    /// Full API URL, e.g. https://spacewalk.example.com/rpc/api
    #[arg(long, env = "SWQUERY_URL")]
    pub url: Option<String>,

    /// Login name
    #[arg(long, env = "SWQUERY_USER")]
    pub user: Option<String>,

    /// Login password
    #[arg(long, env = "SWQUERY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
    pub insecure: Option<bool>,

    /// Ignore HTTP(S)_PROXY settings
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = parse_host_bool)]
    pub no_proxy: Option<bool>,
}

impl ConnectionArgs {
    fn overrides(&self) -> RawArgs {
        RawArgs {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone().map(SecretString::new),
            timeout_secs: self.timeout_secs,
            insecure: self.insecure,
            no_proxy: self.no_proxy,
            ..RawArgs::default()
        }
    }
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Self::SatSystemList { .. } => Operation::SatSystemList,
            Self::SwSystemList { .. } => Operation::SwSystemList,
            Self::SwSystemPackages { .. } => Operation::SwSystemPackages,
        }
    }

    pub fn connection(&self) -> &ConnectionArgs {
        match self {
            Self::SatSystemList { conn, .. }
            | Self::SwSystemList { conn, .. }
            | Self::SwSystemPackages { conn, .. } => conn,
        }
    }

    /// Options given as flags or environment variables.
    pub fn overrides(&self) -> RawArgs {
        let base = self.connection().overrides();
        match self {
            Self::SatSystemList { listtype, .. } => RawArgs { listtype: *listtype, ..base },
            Self::SwSystemList { out_of_date, physical, .. } => RawArgs {
                out_of_date: *out_of_date,
                physical: *physical,
                ..base
            },
            Self::SwSystemPackages { name, upgradable, extra, .. } => RawArgs {
                name: name.clone(),
                upgradable: *upgradable,
                extra: *extra,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn clear_env() {
        for key in ["SWQUERY_URL", "SWQUERY_USER", "SWQUERY_PASSWORD"] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn parses_package_flags() {
        clear_env();
        let cli = Cli::try_parse_from([
            "swquery",
            "sw-system-packages",
            "--url",
            "https://sw/rpc/api",
            "--name",
            "web01",
            "--upgradable",
            "--extra=no",
        ])
        .unwrap();

        assert_eq!(cli.command.operation(), Operation::SwSystemPackages);
        let raw = cli.command.overrides();
        assert_eq!(raw.url.as_deref(), Some("https://sw/rpc/api"));
        assert_eq!(raw.name.as_deref(), Some("web01"));
        assert_eq!(raw.upgradable, Some(true));
        assert_eq!(raw.extra, Some(false));
        assert!(raw.password.is_none());
    }

    #[test]
    #[serial]
    fn args_file_is_positional_after_bare_flag() {
        clear_env();
        let cli = Cli::try_parse_from(["swquery", "sw-system-list", "--physical", "args.json"]).unwrap();
        assert_eq!(cli.command.connection().args_file, Some(PathBuf::from("args.json")));
        assert_eq!(cli.command.overrides().physical, Some(true));
        assert_eq!(cli.command.overrides().out_of_date, None);
    }

    #[test]
    #[serial]
    fn listtype_values_are_checked() {
        clear_env();
        let cli = Cli::try_parse_from(["swquery", "sat-system-list", "--listtype", "ood"]).unwrap();
        assert_eq!(cli.command.overrides().listtype, Some(ListType::Ood));
        assert!(Cli::try_parse_from(["swquery", "sat-system-list", "--listtype", "stale"]).is_err());
    }

    #[test]
    #[serial]
    fn environment_supplies_connection_options() {
        clear_env();
        std::env::set_var("SWQUERY_URL", "https://env/rpc/api");
        std::env::set_var("SWQUERY_PASSWORD", "from-env");

        let cli = Cli::try_parse_from(["swquery", "sw-system-list", "--url", "https://flag/rpc/api"]).unwrap();
        let raw = cli.command.overrides();
        clear_env();

        assert_eq!(raw.url.as_deref(), Some("https://flag/rpc/api"));
        assert_eq!(raw.password.as_ref().map(|p| p.expose_secret().as_str()), Some("from-env"));
    }

    #[test]
    #[serial]
    fn global_flags() {
        clear_env();
        let cli = Cli::try_parse_from(["swquery", "sat-system-list", "--verbose", "--log-format", "json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
