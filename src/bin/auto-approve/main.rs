use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use auto_approve::{EventContext, GitHub, Outcome, parse_args, run};
use tracing_subscriber::filter::LevelFilter;

/// How a run ended, as the workflow runner sees it.
enum Exit {
    Done(Outcome),
    /// Help or version was requested, or the arguments did not parse.
    Usage(clap::Error),
    Failed(anyhow::Error),
}

impl Exit {
    /// Writes what the runner should see and returns the process status.
    ///
    /// Failures become an `::error::` workflow command on stdout so they show
    /// up as an annotation on the run.
    fn report(self, stdout: &mut impl Write, stderr: &mut impl Write) -> io::Result<u8> {
        use clap::error::ErrorKind;

        match self {
            Exit::Done(outcome) => {
                tracing::debug!(
                    approvable = outcome.approvable,
                    writes = outcome.effects.len(),
                    "Done"
                );
                Ok(0)
            }
            Exit::Usage(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    write!(stdout, "{err}")?;
                    Ok(0)
                }
                _ => {
                    write!(stderr, "{err}")?;
                    Ok(2)
                }
            },
            Exit::Failed(err) => {
                writeln!(stdout, "::error::{}", escape_workflow_data(&format!("{err:#}")))?;
                Ok(1)
            }
        }
    }
}

/// Logs go to stderr without timestamps; the runner stamps each line itself.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

/// Escapes a message for use as workflow command data.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

async fn try_main() -> Exit {
    let config = match parse_args(std::env::args()) {
        Ok(config) => config,
        Err(err) => {
            return match err.downcast::<clap::Error>() {
                Ok(clap_err) => Exit::Usage(clap_err),
                Err(err) => Exit::Failed(err),
            };
        }
    };

    let result = async {
        let context = EventContext::from_env()?;
        let github = GitHub::connect(config.token(), &config.api_url)?;
        run(&config, &context, &github)
            .await
            .with_context(|| format!("Failed to reconcile reviews on {}", context.pull))
    }
    .await;

    match result {
        Ok(outcome) => Exit::Done(outcome),
        Err(err) => Exit::Failed(err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let exit = try_main().await;
    match exit.report(&mut io::stdout(), &mut io::stderr()) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
