// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use prop_enricher::{
    summarize_enrichment, summarize_extraction, AppError, Artifact, CommandLineInput,
    Destination, EnrichmentPipeline, FetchSettings, IdentifierExtractor, OutputReport,
    PipelineConfig, PlayerFetcher, PlayerHttpClient, PlayerRepository, ResultSink, RunMode,
    RunSummary, SourceDocument,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// The console appender writes to stderr so that `-o -` leaves stdout to the artifact.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("prop_enricher.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs the configured mode: extraction only, or extraction plus lookups.
async fn execute_pipeline(config: &PipelineConfig) -> Result<(), AppError> {
    log::info!("Reading source document {}", config.source.display());
    let document = SourceDocument::load(&config.source, config.source_format)?;
    let extractor = IdentifierExtractor::new().with_stat_filter(config.stat_filter.clone());

    let (summary, report) = match &config.mode {
        RunMode::Identifiers => {
            let extraction = extractor.extract(&document);
            let report = ResultSink::new()
                .stage(Artifact::Identifiers(&extraction.identifiers), &config.output)?
                .write()?;
            (summarize_extraction(&extraction), report)
        }
        RunMode::Enrich(settings) => enrich(config, settings, extractor, &document).await?,
    };

    report_completion(config, &summary, &report);
    Ok(())
}

async fn enrich(
    config: &PipelineConfig,
    settings: &FetchSettings,
    extractor: IdentifierExtractor,
    document: &SourceDocument,
) -> Result<(RunSummary, OutputReport), AppError> {
    let client: Arc<dyn PlayerRepository> = Arc::new(PlayerHttpClient::new(settings)?);
    let pipeline = EnrichmentPipeline::new(extractor, PlayerFetcher::new(client, settings));

    let outcome = pipeline.run(document).await?;

    let mut sink = ResultSink::new().stage(Artifact::Records(&outcome.records), &config.output)?;
    if let Some(path) = &config.failures_output {
        sink = sink.stage(
            Artifact::Failures(&outcome.failures),
            &Destination::File(path.clone()),
        )?;
    }
    let report = sink.write()?;

    Ok((summarize_enrichment(&outcome), report))
}

/// Reports completion to the user with stats and the files written.
fn report_completion(config: &PipelineConfig, summary: &RunSummary, report: &OutputReport) {
    if config.output == Destination::Stdout {
        for line in summary.lines() {
            log::info!("{}", line);
        }
        return;
    }

    for line in summary.lines() {
        println!("{}", line);
    }
    for completed in &report.completed {
        println!(
            "✓ Saved {} ({} bytes)",
            completed.operation.describe(),
            completed.bytes_written
        );
    }
    log::debug!(
        "Wrote {} bytes in {}ms",
        report.stats.bytes_written,
        report.stats.total_duration_ms
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = PipelineConfig::resolve(cli)?;

    if let Err(e) = execute_pipeline(&config).await {
        log::error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}
