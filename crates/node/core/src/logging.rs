//! Logging configuration for flock.

use eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use crate::{args::LogArgs, version};

/// Build the log filter.
///
/// The filter is built with the following precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` env var if set, or the level implied by
///    the verbosity flags (-v, -vv, etc.)
/// 3. Apply any custom filter from `--log.filter`
pub fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.level()));

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("ignoring invalid log directive {directive:?}: {e}"),
            }
        }
    }

    filter
}

/// Initialize logging based on command line arguments.
pub fn init_logging(args: &LogArgs) -> Result<()> {
    let filter = build_filter(args);

    let res = if args.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };
    res.map_err(|e| eyre!(e))?;

    if !args.quiet && !args.json {
        log_startup_banner();
    }

    Ok(())
}

fn log_startup_banner() {
    println!(
        r#"
  __ _            _
 / _| | ___   ___| | __
| |_| |/ _ \ / __| |/ /
|  _| | (_) | (__|   <
|_| |_|\___/ \___|_|\_\

 {}
"#,
        version::NAME_VERSION
    );
}
