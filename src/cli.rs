use std::{fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{error::Error, types::AllowedEnvironments};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Variables consulted, in order, when no token is passed explicitly.
const TOKEN_FALLBACK_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

#[derive(Parser, Debug)]
#[command(
    name = "auto-approve",
    about = "Approve feature-flag pull requests that only touch allowed environments, and withdraw the approval when they stop doing so"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// Path to the flag comparison JSON document
    #[arg(long, env = "INPUT_COMPARISON-PATH", value_name = "PATH")]
    comparison_path: PathBuf,

    /// Environments that may change without review, separated by ';'
    #[arg(long, env = "INPUT_ENVIRONMENTS", value_name = "ENV[;ENV...]")]
    environments: String,

    /// Token used to review the pull request (falls back to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true, value_name = "TOKEN")]
    github_token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, value_name = "URL")]
    api_url: String,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        if self.comparison_path.as_os_str().is_empty() {
            anyhow::bail!(Error::Config("--comparison-path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Run configuration collected once at process start.
#[derive(Clone)]
pub struct Config {
    pub comparison_path: PathBuf,
    pub environments: AllowedEnvironments,
    pub api_url: url::Url,
    token: String,
}

impl Config {
    pub fn new(
        comparison_path: impl Into<PathBuf>,
        environments: AllowedEnvironments,
        api_url: url::Url,
        token: impl Into<String>,
    ) -> Self {
        Self {
            comparison_path: comparison_path.into(),
            environments,
            api_url,
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("comparison_path", &self.comparison_path)
            .field("environments", &self.environments)
            .field("api_url", &self.api_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Picks the explicit token, else the first non-empty fallback variable.
fn resolve_token<L>(explicit: Option<String>, lookup: L) -> Result<String>
where
    L: Fn(&str) -> Option<String>,
{
    explicit
        .into_iter()
        .chain(TOKEN_FALLBACK_VARS.iter().filter_map(|name| lookup(name)))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or_else(|| {
            Error::Config(
                "no GitHub token: pass --github-token or set INPUT_GITHUB-TOKEN, GITHUB_TOKEN or GH_TOKEN"
                    .to_string(),
            )
            .into()
        })
}

fn parse_api_url(api_url: &str) -> Result<url::Url> {
    let url = url::Url::parse(api_url)
        .with_context(|| format!("Invalid GitHub API URL: '{}'", api_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!(Error::Config(format!(
            "GitHub API URL must use http or https, got: '{}'",
            api_url
        )));
    }
    Ok(url)
}

fn build_config<L>(cli: CliArgs, lookup: L) -> Result<Config>
where
    L: Fn(&str) -> Option<String>,
{
    cli.validate()?;

    let api_url = parse_api_url(&cli.api_url)?;
    let token = resolve_token(cli.github_token, lookup)?;

    Ok(Config::new(
        cli.comparison_path,
        AllowedEnvironments::parse(&cli.environments),
        api_url,
        token,
    ))
}

/// Parses command-line arguments, with `INPUT_*` environment variables as
/// fallbacks, into a run configuration.
pub fn parse_args<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_config(cli, |name| std::env::var(name).ok())
}
