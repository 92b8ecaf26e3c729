//! These structs provide the CLI interface for the budget CLI.

use crate::config::DEFAULT_ORIGIN;
use crate::model::{Theme, TransactionType};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

/// budget: An offline-capable personal budget tracker.
///
/// Transactions are sent to a remote service when one is configured and reachable. When it is
/// not, they are kept in a local store under the budget home directory. Nothing kept locally is
/// sent to the service later.
///
/// The application shell (pages, styles, scripts) can be precached in a local asset cache so
/// that it stays available offline.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the budget home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the home directory is $HOME/budget,
    /// pass --budget-home if you want it somewhere else. Pass --api-url to sync transactions with
    /// a remote service, otherwise all transactions stay on this device.
    Init(InitArgs),
    /// Create the account for this device, replacing any existing one.
    Register(RegisterArgs),
    /// Log in with the account created by `register`.
    Login(LoginArgs),
    /// Log out. This wipes all locally stored data.
    Logout,
    /// Add an income or expense transaction.
    Add(AddArgs),
    /// Show the totals and the most recent transactions.
    Dashboard,
    /// Show totals and per-category totals, optionally for one month.
    Report(ReportArgs),
    /// Show or change the theme and notification settings.
    Settings(SettingsArgs),
    /// List the categories available for each transaction type.
    Categories,
    /// Wipe all locally stored data, including the account and settings.
    Clear,
    /// Wipe the locally stored transactions only.
    Reset,
    /// Manage the offline asset cache.
    Cache(CacheArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where budget data and configuration is held. Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// (Not shown): Args for the `budget init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the remote transaction service, e.g. https://budget.example.com
    #[arg(long)]
    api_url: Option<Url>,

    /// The origin the application assets are served from. Only assets from this origin are added
    /// to the cache when first requested.
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    origin: Url,
}

impl InitArgs {
    pub fn new(api_url: Option<Url>, origin: Url) -> Self {
        Self { api_url, origin }
    }

    pub fn api_url(&self) -> Option<&Url> {
        self.api_url.as_ref()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

/// (Not shown): Args for the `budget register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

impl RegisterArgs {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `budget login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `budget add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Whether this is income or an expense
    #[arg(long = "type", value_enum)]
    transaction_type: TransactionType,

    /// The amount, e.g. 1200 or 99.50
    #[arg(long)]
    amount: String,

    /// See `budget categories` for the usual categories
    #[arg(long)]
    category: String,

    /// The date, formatted YYYY-MM-DD
    #[arg(long)]
    date: String,
}

impl AddArgs {
    pub fn new(
        transaction_type: TransactionType,
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            transaction_type,
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

/// (Not shown): Args for the `budget report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    /// Only include transactions in this month, formatted YYYY-MM
    #[arg(long)]
    month: Option<String>,
}

impl ReportArgs {
    pub fn new(month: Option<String>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// (Not shown): Args for the `budget settings` command. Without any flags, the current settings
/// are shown.
#[derive(Debug, Default, Parser, Clone)]
pub struct SettingsArgs {
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Turn notifications on or off
    #[arg(long, action = clap::ArgAction::Set)]
    notifications: Option<bool>,
}

impl SettingsArgs {
    pub fn new(theme: Option<Theme>, notifications: Option<bool>) -> Self {
        Self {
            theme,
            notifications,
        }
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn notifications(&self) -> Option<bool> {
        self.notifications
    }

    /// Whether any setting is being changed.
    pub fn is_change(&self) -> bool {
        self.theme.is_some() || self.notifications.is_some()
    }
}

/// (Not shown): Args for the `budget cache` command.
#[derive(Debug, Parser, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    command: CacheCommand,
}

impl CacheArgs {
    pub fn new(command: CacheCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &CacheCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommand {
    /// Precache every asset in the manifest and delete older cache generations.
    Update,
    /// Show the cache generations present on disk.
    Status,
    /// Request an asset through the cache, e.g. /index.html
    Fetch(FetchArgs),
}

/// (Not shown): Args for the `budget cache fetch` command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// A path on the origin, like /index.html, or an absolute URL
    locator: String,

    /// Write the response body to this file instead of the log
    #[arg(long)]
    output: Option<PathBuf>,
}

impl FetchArgs {
    pub fn new(locator: impl Into<String>, output: Option<PathBuf>) -> Self {
        Self {
            locator: locator.into(),
            output,
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("budget")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "budget",
            "--budget-home",
            "/tmp/b",
            "add",
            "--type",
            "expense",
            "--amount",
            "1200",
            "--category",
            "Food",
            "--date",
            "2024-01-06",
        ])
        .unwrap();
        assert_eq!(args.common().budget_home().path(), Path::new("/tmp/b"));
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.transaction_type(), TransactionType::Expense);
                assert_eq!(add.amount(), "1200");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_init_defaults() {
        let args = Args::try_parse_from(["budget", "init"]).unwrap();
        match args.command() {
            Command::Init(init) => {
                assert_eq!(init.api_url(), None);
                assert_eq!(init.origin().as_str(), "http://localhost:3000/");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_settings_and_cache() {
        let args = Args::try_parse_from([
            "budget",
            "settings",
            "--theme",
            "dark",
            "--notifications",
            "true",
        ])
        .unwrap();
        match args.command() {
            Command::Settings(s) => {
                assert_eq!(s.theme(), Some(Theme::Dark));
                assert_eq!(s.notifications(), Some(true));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from(["budget", "cache", "fetch", "/index.html"]).unwrap();
        match args.command() {
            Command::Cache(c) => match c.command() {
                CacheCommand::Fetch(f) => assert_eq!(f.locator(), "/index.html"),
                other => panic!("unexpected cache command {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }
}
