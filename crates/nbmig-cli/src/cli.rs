//! Command tree and settings assembly

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use nbmig_client::ClientConfig;
use nbmig_core::{IdFallback, MigrateError, MigrationConfig};
use std::path::PathBuf;

pub(crate) const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn endpoint_args(url: &'static str, token: &'static str, what: &str) -> [Arg; 2] {
    [
        Arg::new(url)
            .long(url)
            .value_name("URL")
            .help(format!("Base URL of the {what} NetBox, e.g. https://netbox.example.com")),
        Arg::new(token)
            .long(token)
            .value_name("TOKEN")
            .help(format!("API token for the {what} NetBox")),
    ]
}

fn include_devices_arg() -> Arg {
    Arg::new("include-devices")
        .long("include-devices")
        .action(ArgAction::SetTrue)
        .help("Also collect local context data from devices")
}

fn no_id_fallback_arg() -> Arg {
    Arg::new("no-id-fallback")
        .long("no-id-fallback")
        .action(ArgAction::SetTrue)
        .help("Do not reuse the source id when no destination object matches by name")
}

/// Full `nbmig` command tree
pub(crate) fn command() -> Command {
    Command::new("nbmig")
        .version(nbmig_core::VERSION)
        .about("Migrate config contexts and local context data between NetBox instances")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with connection and run settings"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_parser(LOG_LEVELS)
                .help("Log verbosity (default: RUST_LOG, else info)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_name("SECS")
                .value_parser(value_parser!(u64).range(1..))
                .help("Per-request timeout in seconds"),
        )
        .arg(
            Arg::new("insecure")
                .long("insecure")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Skip TLS certificate verification"),
        )
        .subcommand(
            Command::new("config-context")
                .about("Create or update config contexts on the destination")
                .args(endpoint_args("source-url", "source-token", "source"))
                .args(endpoint_args("dest-url", "dest-token", "destination"))
                .arg(
                    Arg::new("export-file")
                        .long("export-file")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("import-file")
                        .help("Write the source config contexts to a JSON file and stop"),
                )
                .arg(
                    Arg::new("import-file")
                        .long("import-file")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Read config contexts from a JSON file instead of the source"),
                ),
        )
        .subcommand(
            Command::new("local-context")
                .about("Copy local context data onto destination devices and virtual machines")
                .subcommand_required(true)
                .subcommand(
                    Command::new("export")
                        .about("Write source local context data to a JSON file")
                        .args(endpoint_args("source-url", "source-token", "source"))
                        .arg(
                            Arg::new("output")
                                .long("output")
                                .short('o')
                                .required(true)
                                .value_name("FILE")
                                .value_parser(value_parser!(PathBuf)),
                        )
                        .arg(include_devices_arg()),
                )
                .subcommand(
                    Command::new("import")
                        .about("Apply local context data from a JSON file")
                        .args(endpoint_args("dest-url", "dest-token", "destination"))
                        .arg(
                            Arg::new("input")
                                .long("input")
                                .short('i')
                                .required(true)
                                .value_name("FILE")
                                .value_parser(value_parser!(PathBuf)),
                        )
                        .arg(no_id_fallback_arg()),
                )
                .subcommand(
                    Command::new("transfer")
                        .about("Copy local context data from source to destination directly")
                        .args(endpoint_args("source-url", "source-token", "source"))
                        .args(endpoint_args("dest-url", "dest-token", "destination"))
                        .arg(include_devices_arg())
                        .arg(no_id_fallback_arg()),
                ),
        )
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

fn string(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

/// Overlay `--<role>-url`/`--<role>-token` on the endpoint from the file
fn merge_endpoint(
    from_file: Option<ClientConfig>,
    url: Option<String>,
    token: Option<String>,
    role: &str,
) -> Result<Option<ClientConfig>, MigrateError> {
    match (from_file, url, token) {
        (None, None, None) => Ok(None),
        (None, Some(url), Some(token)) => Ok(Some(ClientConfig::new(url, token))),
        (None, Some(_), None) => Err(MigrateError::config(format!("--{role}-token is required"))),
        (None, None, Some(_)) => Err(MigrateError::config(format!("--{role}-url is required"))),
        (Some(mut config), url, token) => {
            if let Some(url) = url {
                config.url = url;
            }
            if let Some(token) = token {
                config.token = token;
            }
            Ok(Some(config))
        }
    }
}

/// Apply command line flags of one (sub)command on top of `config`
///
/// `global` holds the top-level matches, `args` the innermost subcommand's.
pub(crate) fn apply_flags(
    mut config: MigrationConfig,
    global: &ArgMatches,
    args: &ArgMatches,
) -> Result<MigrationConfig, MigrateError> {
    config.source = merge_endpoint(
        config.source.take(),
        string(args, "source-url"),
        string(args, "source-token"),
        "source",
    )?;
    config.destination = merge_endpoint(
        config.destination.take(),
        string(args, "dest-url"),
        string(args, "dest-token"),
        "dest",
    )?;

    let timeout = global.get_one::<u64>("timeout").copied();
    let insecure = flag(global, "insecure");
    let transport = |mut endpoint: ClientConfig| {
        if let Some(secs) = timeout {
            endpoint = endpoint.with_timeout(secs);
        }
        if insecure {
            endpoint = endpoint.with_insecure_tls();
        }
        endpoint
    };
    config.source = config.source.map(transport);
    config.destination = config.destination.map(transport);

    if flag(args, "include-devices") {
        config.include_devices = true;
    }
    if flag(args, "no-id-fallback") {
        config.id_fallback = IdFallback::Refuse;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> ArgMatches {
        command().try_get_matches_from(argv).unwrap()
    }

    fn innermost(matches: &ArgMatches) -> &ArgMatches {
        let mut current = matches;
        while let Some((_, sub)) = current.subcommand() {
            current = sub;
        }
        current
    }

    #[test]
    fn command_tree_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn config_context_flags_build_endpoints() {
        let matches = parse(&[
            "nbmig",
            "config-context",
            "--source-url",
            "http://old",
            "--source-token",
            "a",
            "--dest-url",
            "http://new",
            "--dest-token",
            "b",
            "--timeout",
            "5",
        ]);
        let config = apply_flags(MigrationConfig::new(), &matches, innermost(&matches)).unwrap();

        let source = config.require_source().unwrap();
        assert_eq!(source.url, "http://old");
        assert_eq!(source.timeout_secs, 5);
        assert_eq!(config.require_destination().unwrap().token, "b");
    }

    #[test]
    fn export_and_import_conflict() {
        let result = command().try_get_matches_from([
            "nbmig",
            "config-context",
            "--export-file",
            "a.json",
            "--import-file",
            "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn url_without_token_is_config_error() {
        let matches = parse(&["nbmig", "config-context", "--dest-url", "http://new"]);
        let err = apply_flags(MigrationConfig::new(), &matches, innermost(&matches)).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: --dest-token is required");
    }

    #[test]
    fn flags_override_file_endpoint() {
        let file = MigrationConfig::new()
            .with_destination(ClientConfig::new("http://from-file", "file-token"));
        let matches = parse(&[
            "nbmig",
            "local-context",
            "import",
            "--input",
            "local.json",
            "--dest-token",
            "cli-token",
            "--no-id-fallback",
            "--insecure",
        ]);
        let config = apply_flags(file, &matches, innermost(&matches)).unwrap();

        let dest = config.require_destination().unwrap();
        assert_eq!(dest.url, "http://from-file");
        assert_eq!(dest.token, "cli-token");
        assert!(!dest.verify_tls);
        assert_eq!(config.id_fallback, IdFallback::Refuse);
    }

    #[test]
    fn transfer_reads_include_devices() {
        let matches = parse(&[
            "nbmig",
            "--log-format",
            "json",
            "local-context",
            "transfer",
            "--include-devices",
        ]);
        let config = apply_flags(MigrationConfig::new(), &matches, innermost(&matches)).unwrap();
        assert!(config.include_devices);
        assert_eq!(config.id_fallback, IdFallback::SameId);
        assert_eq!(
            matches.get_one::<String>("log-format").map(String::as_str),
            Some("json")
        );
    }

    #[test]
    fn export_requires_output() {
        let result = command().try_get_matches_from(["nbmig", "local-context", "export"]);
        assert!(result.is_err());
    }
}
