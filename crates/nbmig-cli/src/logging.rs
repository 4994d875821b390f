//! Tracing subscriber setup

use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

/// Pick the filter: `--log-level` wins, then `RUST_LOG`, then `info`
fn filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => Ok(EnvFilter::try_new(level)?),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Install the global subscriber, writing to stderr
pub(crate) fn init(matches: &ArgMatches) -> anyhow::Result<()> {
    let filter = filter(matches.get_one::<String>("log-level").map(String::as_str))?;
    let json = matches
        .get_one::<String>("log-format")
        .is_some_and(|format| format == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LOG_LEVELS;

    #[test]
    fn explicit_level_parses() {
        for level in LOG_LEVELS {
            assert!(filter(Some(level)).is_ok());
        }
    }
}
