// src/config.rs
use crate::constants::{
    API_BASE_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_IDS_OUTPUT, DEFAULT_MAX_FETCH_WORKERS,
    DEFAULT_MIN_FETCH_WORKERS, DEFAULT_RECORDS_OUTPUT, DEFAULT_REQUEST_HEADERS,
    DEFAULT_REQUEST_TIMEOUT_SECS, MAX_FETCH_WORKERS, MAX_REQUEST_TIMEOUT_SECS,
};
use crate::error::AppError;
use crate::model::SourceFormat;
use crate::output::Destination;
use crate::types::ValidationError;
use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the unique player IDs referenced by a projections document
    Ids {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Extract player IDs and look each one up in the player API
    Enrich {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Path to the source JSON document
    pub source: PathBuf,

    /// Output file for the artifact ("-" writes to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Only use projections offered on this stat (e.g. "Points")
    #[arg(long)]
    pub stat: Option<String>,

    /// Treat the source as a JSON array of player IDs (the output of `ids`)
    #[arg(long, default_value_t = false)]
    pub from_id_list: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Base URL of the player API (overrides PROP_ENRICHER_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Extra or replacement request header, as "Name: value" (repeatable)
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Number of concurrent lookups (default: auto, max 32; 1 = sequential)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Also write the per-player failure diagnostics to this file
    #[arg(long)]
    pub failures_out: Option<PathBuf>,
}

/// Settings for the remote player lookups.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl FetchSettings {
    /// Default headers, timeout and worker count against the given API base.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            headers: default_headers(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            concurrency: default_concurrency(),
        }
    }

    /// Default headers with the given overrides applied on top.
    pub fn request_headers(overrides: &[String]) -> Result<HeaderMap, ValidationError> {
        let mut headers = default_headers();
        for raw in overrides {
            let (name, value) = parse_header(raw)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// Which stages the run goes through.
#[derive(Debug, Clone)]
pub enum RunMode {
    /// Extract identifiers and write them out.
    Identifiers,
    /// Extract identifiers, look each one up, write the records.
    Enrich(FetchSettings),
}

/// Resolved pipeline configuration, validated and ready to drive every stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: RunMode,
    pub source: PathBuf,
    pub source_format: SourceFormat,
    pub stat_filter: Option<String>,
    pub output: Destination,
    pub failures_output: Option<PathBuf>,
}

impl PipelineConfig {
    /// Resolves a complete pipeline configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let env_base_url = std::env::var(API_BASE_URL_ENV).ok();
        Self::resolve_with_env(cli, env_base_url)
    }

    /// Same as [`resolve`](Self::resolve) with the environment lookup supplied by the caller.
    pub fn resolve_with_env(
        cli: CommandLineInput,
        env_base_url: Option<String>,
    ) -> Result<Self, AppError> {
        let (source, mode, failures_output, default_output) = match cli.command {
            Command::Ids { source } => (source, RunMode::Identifiers, None, DEFAULT_IDS_OUTPUT),
            Command::Enrich { source, fetch } => {
                let failures_output = fetch.failures_out.clone();
                let settings = resolve_fetch_settings(fetch, env_base_url)?;
                (
                    source,
                    RunMode::Enrich(settings),
                    failures_output,
                    DEFAULT_RECORDS_OUTPUT,
                )
            }
        };

        let output = match source.output.as_deref() {
            Some("-") => Destination::Stdout,
            Some(path) => Destination::File(PathBuf::from(path)),
            None => Destination::File(PathBuf::from(default_output)),
        };

        let stat_filter = source
            .stat
            .map(|stat| stat.trim().to_string())
            .filter(|stat| !stat.is_empty());

        Ok(PipelineConfig {
            mode,
            source_format: if source.from_id_list {
                SourceFormat::IdentifierList
            } else {
                SourceFormat::Projections
            },
            source: source.source,
            stat_filter,
            output,
            failures_output,
        })
    }

    /// Fetch settings when the run looks players up.
    pub fn fetch_settings(&self) -> Option<&FetchSettings> {
        match &self.mode {
            RunMode::Enrich(settings) => Some(settings),
            RunMode::Identifiers => None,
        }
    }
}

fn resolve_fetch_settings(
    fetch: FetchArgs,
    env_base_url: Option<String>,
) -> Result<FetchSettings, AppError> {
    let raw_base_url = fetch
        .base_url
        .or(env_base_url)
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let base_url = parse_base_url(&raw_base_url)?;

    if fetch.timeout_secs == 0 || fetch.timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ValidationError::OutOfBounds {
            value: fetch.timeout_secs,
            min: 1,
            max: MAX_REQUEST_TIMEOUT_SECS,
        }
        .into());
    }

    let concurrency = match fetch.concurrency {
        Some(0) => {
            return Err(ValidationError::OutOfBounds {
                value: 0,
                min: 1,
                max: MAX_FETCH_WORKERS as u64,
            }
            .into())
        }
        Some(requested) if requested > MAX_FETCH_WORKERS => {
            log::warn!(
                "Requested concurrency {} exceeds maximum {}. Clamping.",
                requested,
                MAX_FETCH_WORKERS
            );
            MAX_FETCH_WORKERS
        }
        Some(requested) => requested,
        None => default_concurrency(),
    };

    Ok(FetchSettings {
        base_url,
        headers: FetchSettings::request_headers(&fetch.headers)?,
        timeout: Duration::from_secs(fetch.timeout_secs),
        concurrency,
    })
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(name, value) in DEFAULT_REQUEST_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}

/// Lookups wait on the network, not the CPU, so a few more workers than cores is fine.
fn default_concurrency() -> usize {
    num_cpus::get().clamp(DEFAULT_MIN_FETCH_WORKERS, DEFAULT_MAX_FETCH_WORKERS)
}

/// Parses the API base URL. Only https is accepted.
pub fn parse_base_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "the player API must be reached over https".to_string(),
        });
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "base URL must not carry a query or fragment".to_string(),
        });
    }

    Ok(url)
}

/// Parses a "Name: value" header argument.
fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidHeader {
        header: raw.to_string(),
        reason: reason.to_string(),
    };

    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| invalid("expected \"Name: value\""))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| invalid("not a valid header name"))?;
    let value =
        HeaderValue::from_str(value.trim()).map_err(|_| invalid("not a valid header value"))?;

    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str]) -> Result<PipelineConfig, AppError> {
        let mut argv = vec!["prop-enricher"];
        argv.extend_from_slice(args);
        let cli = CommandLineInput::try_parse_from(argv).expect("arguments should parse");
        PipelineConfig::resolve_with_env(cli, None)
    }

    #[test]
    fn ids_mode_uses_default_output() {
        let config = resolve(&["ids", "bets.json"]).unwrap();
        assert!(matches!(config.mode, RunMode::Identifiers));
        assert_eq!(
            config.output,
            Destination::File(PathBuf::from(DEFAULT_IDS_OUTPUT))
        );
        assert_eq!(config.source, PathBuf::from("bets.json"));
        assert_eq!(config.source_format, SourceFormat::Projections);
        assert!(config.fetch_settings().is_none());
    }

    #[test]
    fn enrich_mode_resolves_fetch_settings() {
        let config = resolve(&[
            "enrich",
            "ids.json",
            "--from-id-list",
            "-o",
            "-",
            "--concurrency",
            "3",
            "--timeout-secs",
            "5",
            "--stat",
            " Points ",
        ])
        .unwrap();

        assert_eq!(config.output, Destination::Stdout);
        assert_eq!(config.source_format, SourceFormat::IdentifierList);
        assert_eq!(config.stat_filter.as_deref(), Some("Points"));
        let settings = config.fetch_settings().unwrap();
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.base_url.as_str(), "https://api.prizepicks.com/");
    }

    #[test]
    fn base_url_precedence_is_flag_then_env_then_default() {
        let cli = CommandLineInput::try_parse_from([
            "prop-enricher",
            "enrich",
            "bets.json",
            "--base-url",
            "https://flag.example",
        ])
        .unwrap();
        let config =
            PipelineConfig::resolve_with_env(cli, Some("https://env.example".to_string()))
                .unwrap();
        assert_eq!(
            config.fetch_settings().unwrap().base_url.host_str(),
            Some("flag.example")
        );

        let cli =
            CommandLineInput::try_parse_from(["prop-enricher", "enrich", "bets.json"]).unwrap();
        let config =
            PipelineConfig::resolve_with_env(cli, Some("https://env.example".to_string()))
                .unwrap();
        assert_eq!(
            config.fetch_settings().unwrap().base_url.host_str(),
            Some("env.example")
        );
    }

    #[test]
    fn rejects_plain_http_base_url() {
        let err = resolve(&["enrich", "bets.json", "--base-url", "http://api.example"])
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_zero_concurrency_and_clamps_large_values() {
        assert!(resolve(&["enrich", "bets.json", "--concurrency", "0"]).is_err());

        let config = resolve(&["enrich", "bets.json", "--concurrency", "500"]).unwrap();
        assert_eq!(
            config.fetch_settings().unwrap().concurrency,
            MAX_FETCH_WORKERS
        );
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        assert!(resolve(&["enrich", "bets.json", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn header_overrides_replace_defaults() {
        let config = resolve(&[
            "enrich",
            "bets.json",
            "--header",
            "Origin: https://example.test",
            "--header",
            "X-Client: prop-enricher",
        ])
        .unwrap();
        let headers = &config.fetch_settings().unwrap().headers;

        assert_eq!(headers["origin"], "https://example.test");
        assert_eq!(headers["x-client"], "prop-enricher");
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers.get_all("origin").iter().count(), 1);
    }

    #[test]
    fn malformed_header_is_rejected() {
        let err = resolve(&["enrich", "bets.json", "--header", "no-colon"]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn base_url_may_carry_a_path_prefix() {
        let url = parse_base_url("https://proxy.example/api/v2").unwrap();
        assert_eq!(url.path(), "/api/v2");
        assert!(parse_base_url("https://proxy.example/?q=1").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn fetch_settings_constructor_matches_resolved_defaults() {
        let base_url = parse_base_url(DEFAULT_API_BASE_URL).unwrap();
        let built = FetchSettings::new(base_url);

        let config = resolve(&["enrich", "bets.json"]).unwrap();
        let resolved = config.fetch_settings().unwrap();

        assert_eq!(built.base_url, resolved.base_url);
        assert_eq!(built.headers, resolved.headers);
        assert_eq!(built.timeout, resolved.timeout);
        assert_eq!(built.concurrency, resolved.concurrency);
    }
}
