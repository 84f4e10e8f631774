//! `reconbase import` command handler
//!
//! Imports one or more Zeek passiverecon log files into the in-memory store
//! and prints a summary of the merged records. File-scoped problems (missing
//! file, unsupported format) are logged and the remaining files are still
//! imported; commit failures abort the run.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use reconbase_core::config::ReconbaseConfig;
use reconbase_core::metrics::{INGEST_FILES_SKIPPED_TOTAL, LABEL_FORMAT};
use reconbase_core::pipeline::{CommitMode, PassiveSink};
use reconbase_ingest::{
    CommitStats, Committer, IgnoreRules, IngestError, MemorySink, NormalizerRegistry,
    ObservationStream, PipelineConfig, ZeekLogFile, observation_infos,
};

use crate::cli::ImportArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::signal;

/// Execute the `import` command.
pub async fn execute(
    args: ImportArgs,
    config: &ReconbaseConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = pipeline_config(&args, config)?;
    let rules = IgnoreRules::load(pipeline.ignore_rules.as_deref()).await?;

    // A torn batch is worse than a slow shutdown: block termination signals
    // for the whole run.
    signal::ignore_termination();

    let registry = NormalizerRegistry::with_defaults();
    let mut sink = MemorySink::new();
    let mut report = ImportReport::default();

    for logfile in &args.logfiles {
        match import_file(logfile, &registry, &rules, &pipeline, &mut sink) {
            Ok(stats) => {
                info!(
                    path = %logfile.display(),
                    records = stats.records,
                    "imported log file"
                );
                report.files_imported += 1;
                report.records_committed += stats.records;
                report.batches += stats.batches;
                report.enrich_failures += stats.enrich_failures;
            }
            Err(IngestError::MissingFile { ref path }) => {
                counter!(INGEST_FILES_SKIPPED_TOTAL, LABEL_FORMAT => "unknown").increment(1);
                error!(path = %path, "log file not found, skipping");
                report.files_skipped += 1;
            }
            Err(IngestError::UnsupportedFormat { ref format }) => {
                counter!(INGEST_FILES_SKIPPED_TOTAL, LABEL_FORMAT => format.clone()).increment(1);
                debug!(path = %logfile.display(), format = %format, "no normalizer for format, skipping");
                report.files_skipped += 1;
            }
            Err(IngestError::Header { ref path, ref reason }) => {
                counter!(INGEST_FILES_SKIPPED_TOTAL, LABEL_FORMAT => "unknown").increment(1);
                warn!(path = %path, reason = %reason, "unreadable log header, skipping");
                report.files_skipped += 1;
            }
            Err(e) => return Err(CliError::Core(e.into())),
        }
    }

    report.stored_records = sink.len();
    report.total_observations = sink.total_count();
    report.entries = sink
        .snapshot()
        .into_iter()
        .map(|entry| ReportEntry {
            sensor: entry.key.sensor,
            host: entry.key.host,
            srvport: entry.key.srvport,
            recon_type: entry.key.recon_type,
            source: entry.key.source,
            value: entry.key.value,
            targetval: entry.key.targetval,
            count: entry.record.count,
            firstseen: entry.record.firstseen.into(),
            lastseen: entry.record.lastseen.into(),
        })
        .collect();

    writer.render(&report)?;
    Ok(())
}

/// Merge CLI flags over the configured pipeline settings (CLI wins).
fn pipeline_config(args: &ImportArgs, config: &ReconbaseConfig) -> Result<PipelineConfig, CliError> {
    let mut pipeline = PipelineConfig::from_core(&config.ingest);
    if let Some(ref sensor) = args.sensor {
        pipeline.sensor = Some(sensor.clone());
    }
    if let Some(ref path) = args.ignore_rules {
        pipeline.ignore_rules = Some(path.clone());
    }
    if let Some(batch_size) = args.batch_size {
        pipeline.batch_size = batch_size;
    }
    if args.bulk {
        pipeline.mode = CommitMode::Bulk;
    } else if args.no_bulk {
        pipeline.mode = CommitMode::PerRecord;
    }
    pipeline.validate().map_err(|e| CliError::Core(e.into()))?;
    Ok(pipeline)
}

/// Import a single log file into the sink.
fn import_file(
    path: &Path,
    registry: &NormalizerRegistry,
    rules: &IgnoreRules,
    pipeline: &PipelineConfig,
    sink: &mut dyn PassiveSink,
) -> Result<CommitStats, IngestError> {
    let log = ZeekLogFile::open(path)?;
    let stream = ObservationStream::from_log(log, registry, rules, pipeline.sensor.clone())?;
    Committer::new(sink, pipeline.mode, pipeline.batch_size)
        .with_enrich(&observation_infos)
        .commit(stream)
}

/// Import run summary rendered at the end of the command.
#[derive(Debug, Default, Serialize)]
struct ImportReport {
    files_imported: usize,
    files_skipped: usize,
    records_committed: usize,
    batches: usize,
    enrich_failures: usize,
    stored_records: usize,
    total_observations: u64,
    entries: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    sensor: Option<String>,
    host: String,
    srvport: Option<u16>,
    recon_type: String,
    source: String,
    value: String,
    targetval: Option<String>,
    count: u64,
    firstseen: DateTime<Utc>,
    lastseen: DateTime<Utc>,
}

impl Render for ImportReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Import summary".bold())?;
        writeln!(
            w,
            "  files: {} imported, {} skipped",
            self.files_imported, self.files_skipped
        )?;
        writeln!(
            w,
            "  records: {} committed in {} batches ({} enrichment failures)",
            self.records_committed, self.batches, self.enrich_failures
        )?;
        writeln!(
            w,
            "  store: {} records ({} observations)",
            self.stored_records, self.total_observations
        )?;

        if self.entries.is_empty() {
            return Ok(());
        }
        writeln!(w)?;
        for entry in &self.entries {
            let endpoint = match entry.srvport {
                Some(port) => format!("{}:{}", entry.host, port),
                None => entry.host.clone(),
            };
            write!(
                w,
                "  {:<22} {:<28} {}={}",
                entry.recon_type.as_str().cyan(),
                endpoint,
                entry.source,
                entry.value
            )?;
            if let Some(ref target) = entry.targetval {
                write!(w, " -> {target}")?;
            }
            writeln!(
                w,
                "  ({}x, {} .. {})",
                entry.count,
                entry.firstseen.format("%Y-%m-%d %H:%M:%S"),
                entry.lastseen.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        Ok(())
    }
}
