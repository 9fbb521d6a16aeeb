use std::path::Path;

use chrono::Datelike;
use marquee_core::RecordSink;
use marquee_lib::IngestSettings;
use marquee_lib::settings::{load_settings, settings_path};
use marquee_tmdb::{Credentials, IngestLog, create_fetcher};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::FetchArgs;
use crate::error::CliError;
use crate::progress::IngestProgress;
use crate::sink::JsonFileSink;

/// Command-line flags win over the settings file.
fn apply_overrides(args: &FetchArgs, ingest: &mut IngestSettings) {
    if let Some(year) = args.from_year {
        ingest.first_year = Some(year);
    }
    if let Some(year) = args.to_year {
        ingest.last_year = Some(year);
    }
    if let Some(n) = args.workers {
        ingest.workers = n;
    }
    if let Some(n) = args.max_pages {
        ingest.max_pages = n;
    }
}

/// Run the fetch command.
pub(crate) fn run_fetch(args: FetchArgs, quiet: bool) -> Result<(), CliError> {
    let mut settings = load_settings().map_err(|e| {
        CliError::config(format!(
            "Failed to read {}: {e}",
            settings_path().display()
        ))
    })?;
    apply_overrides(&args, &mut settings.ingest);

    let credentials = Credentials::load_with_key(args.api_key.clone())?;
    let fetcher = create_fetcher(&settings, &credentials, chrono::Local::now().year())?;
    let opts = fetcher.options();

    log::info!(
        "Fetching movies released {}-{} from {}",
        opts.first_year,
        opts.last_year,
        credentials.base_url.if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "{}",
        format!(
            "Workers: {}, max pages per year: {}",
            opts.workers, opts.max_pages
        )
        .if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!(
        "Output: {}",
        args.output.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("");

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;

    let mut progress = IngestProgress::new(quiet);
    let mut ingest_log = IngestLog::new();
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();

    let result = rt.block_on(marquee_lib::run_with_events(
        fetcher.fetch_movies_with_events(event_tx),
        event_rx,
        |event| {
            ingest_log.record_event(&event);
            progress.handle(&event);
        },
    ));
    progress.finish();

    if !args.no_log {
        write_log(&ingest_log, &args.output);
    }

    let records = result?;

    let mut sink = JsonFileSink::new(&args.output);
    let written = sink.accept(&records)?;

    let summary = ingest_log.summary();
    log::info!(
        "{} {} movies written to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        written,
        sink.path().display(),
    );
    log::info!(
        "  {} years, {} pages fetched, {} enriched",
        summary.years,
        summary.pages_fetched,
        summary.records_enriched,
    );
    if summary.pages_skipped > 0 || summary.records_skipped > 0 {
        log::warn!(
            "  {} {} pages skipped, {} records without details",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            summary.pages_skipped,
            summary.records_skipped,
        );
    }

    Ok(())
}

/// Write the ingest log next to the output. Failure here is only a warning.
fn write_log(ingest_log: &IngestLog, output: &Path) {
    let path = output.with_extension("log");
    match ingest_log.write_to_file(&path) {
        Ok(()) => log::info!(
            "Ingest log: {}",
            path.display().if_supports_color(Stdout, |t| t.dimmed()),
        ),
        Err(e) => log::warn!("Failed to write ingest log {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            from_year: None,
            to_year: None,
            workers: None,
            max_pages: None,
            output: PathBuf::from("movies.json"),
            api_key: None,
            no_log: false,
        }
    }

    #[test]
    fn unset_flags_keep_settings() {
        let mut ingest = IngestSettings {
            workers: 4,
            ..IngestSettings::default()
        };
        apply_overrides(&args(), &mut ingest);
        assert_eq!(ingest.workers, 4);
        assert_eq!(ingest.first_year, None);
    }

    #[test]
    fn flags_override_settings() {
        let mut ingest = IngestSettings::default();
        let args = FetchArgs {
            from_year: Some(1990),
            to_year: Some(1999),
            workers: Some(2),
            max_pages: Some(10),
            ..args()
        };
        apply_overrides(&args, &mut ingest);
        assert_eq!(ingest.year_range(2026), (1990, 1999));
        assert_eq!(ingest.workers, 2);
        assert_eq!(ingest.max_pages, 10);
    }

    #[test]
    fn log_file_sits_next_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movies.json");
        write_log(&IngestLog::new(), &output);
        assert!(dir.path().join("movies.log").exists());
    }
}
