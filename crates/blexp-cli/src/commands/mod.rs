mod commands;

use core::{fmt, time::Duration};
use std::{ops::Deref, path::PathBuf, str::FromStr};

use blexp::{expensify_api_client::ReqwestTransport, Blexp, BlexpBuilder, Config};

pub trait CommandExecutor {
    fn execute(self, blexp: Blexp) -> blexp::Result<Box<dyn crate::display::Displayable>>;
}

#[derive(Clone, Debug, clap::Args)]
pub struct CliGlobalArgs {
    /// Load the configuration from FILE (JSON, or TOML if FILE ends with ".toml").
    #[arg(
        short, long,
        env = "BLEXP_CONFIG",
        value_name = "FILE",
        default_value_t,
        value_hint = clap::ValueHint::FilePath,
        global = true
    )]
    pub config: ConfigPath,
    /// Abort requests to Expensify taking longer than SECONDS (at least 1).
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: Option<u64>,
}

#[derive(Clone, Debug, clap::Parser)]
/// Submit expenses from the cli
///
/// blexp submits pre-defined expense templates to Expensify, stamping each one
/// with the current date and a unique "blexp: xxxxxxxx" comment.
#[command(name = "blexp", author= option_env ! ("CARGO_PKG_AUTHORS").unwrap_or(""), version = option_env ! ("CARGO_PKG_VERSION").unwrap_or("unknown"), about, long_about = None)]
pub struct CliParser {
    #[clap(next_help_heading = Some("Global options"))]
    #[command(flatten)]
    pub gargs: CliGlobalArgs,
    #[command(subcommand)]
    /// Top level cli sub-commands.
    pub cmd: commands::Command,
}

impl CliParser {
    pub fn execute(self) -> blexp::Result<Box<dyn crate::display::Displayable>> {
        let config = Config::load(&*self.gargs.config)?;
        let mut builder = BlexpBuilder::from_config(config);
        if let Some(timeout) = self.gargs.timeout {
            builder = builder.with_transport(ReqwestTransport::with_timeout(Duration::from_secs(
                timeout,
            )));
        }
        self.cmd.execute(builder.build()?)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPath(PathBuf);
impl Default for ConfigPath {
    fn default() -> Self {
        let mut home_path: PathBuf = dirs_next::home_dir().unwrap_or_default();
        home_path.push(".blexp.json");
        Self(home_path)
    }
}
impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
impl FromStr for ConfigPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from_str(s).map_err(|e| e.to_string())?))
    }
}
impl Deref for ConfigPath {
    type Target = PathBuf;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{commands::Command, *};

    #[test]
    fn default_config_path() {
        let path = ConfigPath::default();
        assert!(path.ends_with(".blexp.json"));
    }

    #[test]
    fn parse_list() {
        for args in [["blexp", "list"], ["blexp", "l"]] {
            let cli = CliParser::try_parse_from(args).unwrap();
            assert!(matches!(cli.cmd, Command::List));
        }
        let cli = CliParser::try_parse_from(["blexp", "list", "-c", "/tmp/blexp.toml"]).unwrap();
        assert_eq!(*cli.gargs.config, PathBuf::from("/tmp/blexp.toml"));
    }

    #[test]
    fn parse_submit() {
        let cli = CliParser::try_parse_from(["blexp", "submit", "-f", "Broadband", "Whatever"])
            .unwrap();
        match cli.cmd {
            Command::Submit { names, force } => {
                assert!(force);
                assert_eq!(names, vec!["Broadband".to_owned(), "Whatever".to_owned()]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = CliParser::try_parse_from(["blexp", "s", "--timeout", "10"]).unwrap();
        assert_eq!(cli.gargs.timeout, Some(10));
        match cli.cmd {
            Command::Submit { names, force } => {
                assert!(!force);
                assert!(names.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(CliParser::try_parse_from(["blexp", "delete"]).is_err());
        // A zero timeout would fail every request
        assert!(CliParser::try_parse_from(["blexp", "submit", "--timeout", "0"]).is_err());
    }

    #[test]
    fn execute_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blexp.toml");
        std::fs::write(
            &path,
            r#"
user_id = "foo"
user_secret = "bar"
user_email = "me@example.com"
default = "Broadband"

[templates.Broadband]
merchant = "Xfinity"
amount = 2500
currency = "USD"
"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let cli = CliParser::try_parse_from(["blexp", "-c", path, "list"]).unwrap();
        assert!(cli.execute().is_ok());

        // A dry run never reaches the network, timeout or not
        let cli =
            CliParser::try_parse_from(["blexp", "-c", path, "--timeout", "5", "submit"]).unwrap();
        assert!(cli.execute().is_ok());

        let cli = CliParser::try_parse_from(["blexp", "-c", path, "submit", "Nope"]).unwrap();
        assert!(matches!(
            cli.execute(),
            Err(blexp::Error::TemplateNotFound(_))
        ));

        let missing = dir.path().join("missing.json");
        let cli =
            CliParser::try_parse_from(["blexp", "-c", missing.to_str().unwrap(), "list"]).unwrap();
        assert!(matches!(
            cli.execute(),
            Err(blexp::Error::ConfigRead { .. })
        ));
    }
}
