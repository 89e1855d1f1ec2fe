//! sync-uv-pre-commit entry point
//!
//! Parses the command line, sets up logging, runs the check, and exits with
//! the code of the outcome:
//!
//! | Code | Meaning                                  |
//! |------|------------------------------------------|
//! | 0    | every hook matches                       |
//! | 1    | invalid input, config or lock content    |
//! | 2    | at least one hook revision drifted       |
//! | 3    | `uv` is too old                          |
//! | 127  | `uv` is missing                          |
//! | 999  | unexpected failure, including panics     |

use std::backtrace::Backtrace;

use clap::Parser;
use sync_uv_pre_commit::cli::Cli;
use sync_uv_pre_commit::core::error::EXIT_PARSING;
use sync_uv_pre_commit::core::user_friendly_error;
use sync_uv_pre_commit::logging::{CRITICAL_TARGET, LogContext};
use sync_uv_pre_commit::sync::{Syncer, run_isolated};
use tracing::instrument::WithSubscriber;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here too
            let code = if e.use_stderr() { EXIT_PARSING } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let code = run(cli);
    // Everything owned by the run, the scratch directory included, is dropped by now
    std::process::exit(code);
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli) -> i32 {
    let logging = LogContext::new(cli.log_level);
    let _guard = logging.enter();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(target: CRITICAL_TARGET, "{info}\n{}", Backtrace::force_capture());
    }));

    tracing::debug!("sync-uv-pre-commit {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("log level: {}", logging.level());

    let config = match cli.build_config() {
        Ok(config) => config,
        Err(e) => {
            let ctx = user_friendly_error(e.into());
            ctx.log();
            return ctx.exit_code();
        }
    };

    let outcome = run_isolated(
        async move { Syncer::new(config).run().await.map(|_| ()) }
            .with_subscriber(logging.dispatch().clone()),
    )
    .await;

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            let ctx = user_friendly_error(e);
            ctx.log();
            ctx.exit_code()
        }
    }
}
