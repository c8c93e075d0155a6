// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::env_vars;

/// Adjust driver for EC2 instances
///
/// Without a mode flag, reads a settings document as JSON from standard
/// input, publishes it for the target and waits until every instance of the
/// target reports the new settings through its describe endpoint.
#[derive(clap::Parser, Debug)]
#[command(long_about, verbatim_doc_comment)]
#[command(disable_version_flag = true)]
#[command(styles=crate::style::STYLING)]
pub struct Args {
    /// Id of the target application
    #[arg(required_unless_present_any = ["version", "info"])]
    pub target: Option<String>,

    /// Print the driver version
    #[arg(long, group = "mode")]
    pub version: bool,

    /// Print driver information as JSON
    #[arg(long, group = "mode")]
    pub info: bool,

    /// Print the current settings of the target as JSON
    #[arg(long, group = "mode")]
    pub query: bool,

    #[command(flatten)]
    pub global_opts: GlobalOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Version,
    Info,
    Query,
    Adjust,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.version {
            Mode::Version
        } else if self.info {
            Mode::Info
        } else if self.query {
            Mode::Query
        } else {
            Mode::Adjust
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Use verbose output
    #[arg(long, short, group = "log-level", help_heading = "Global options")]
    pub verbose: bool,
    /// Do not output log messages
    #[arg(long, short, group = "log-level", help_heading = "Global options")]
    pub quiet: bool,
    /// Disable discovery of configuration files
    #[arg(long, help_heading = "Global options", env = env_vars::ADJUST_NO_CONFIG)]
    pub no_config: bool,
    /// Give path to `adjust.toml` to use for configuration
    #[arg(long, help_heading = "Global options", env = env_vars::ADJUST_CONFIG_FILE)]
    pub config_file: Option<String>,
}

impl GlobalOptions {
    pub fn sets_log_level(&self) -> bool {
        self.verbose || self.quiet
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Mode};

    #[test]
    fn modes() -> Result<(), clap::Error> {
        assert_eq!(Args::try_parse_from(["adjust", "--version", "1234"])?.mode(), Mode::Version);
        assert_eq!(Args::try_parse_from(["adjust", "--version"])?.mode(), Mode::Version);
        assert_eq!(Args::try_parse_from(["adjust", "--info"])?.mode(), Mode::Info);
        assert_eq!(Args::try_parse_from(["adjust", "--query", "1234"])?.mode(), Mode::Query);

        let args = Args::try_parse_from(["adjust", "-v", "1234"])?;
        assert_eq!(args.mode(), Mode::Adjust);
        assert_eq!(args.target.as_deref(), Some("1234"));
        assert!(args.global_opts.verbose);

        Ok(())
    }

    #[test]
    fn invalid_arguments() {
        assert!(Args::try_parse_from(["adjust"]).is_err());
        assert!(Args::try_parse_from(["adjust", "--query"]).is_err());
        assert!(Args::try_parse_from(["adjust", "--info", "--query", "1234"]).is_err());
        assert!(Args::try_parse_from(["adjust", "-v", "-q", "1234"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
