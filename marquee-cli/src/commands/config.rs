use marquee_lib::settings::{load_settings, settings_path};
use marquee_tmdb::{CredentialSource, Credentials, config_path, credential_sources};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;

/// Show resolved credentials, their sources, and the effective settings.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    log::info!(
        "{}",
        "TMDB Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    match config_path() {
        Some(p) if p.exists() => log::info!(
            "  Credentials file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        ),
        Some(p) => log::info!(
            "  Credentials file: {} {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => log::info!(
            "  Credentials file: {}",
            "could not determine path".if_supports_color(Stdout, |t| t.red()),
        ),
    }
    log::info!("");

    let sources = credential_sources();
    let creds = Credentials::load().ok();

    let api_key = match (&sources.api_key, &creds) {
        (CredentialSource::Missing, _) | (_, None) => None,
        (_, Some(c)) => Some(c.masked_key()),
    };
    let base_url = creds.as_ref().map(|c| c.base_url.clone());

    for (name, source, value) in [
        ("api_key", &sources.api_key, api_key),
        ("base_url", &sources.base_url, base_url),
    ] {
        let source_str = format!("({})", source);
        match value {
            Some(v) => log::info!(
                "  {:<10} {} {}",
                name,
                v,
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => log::info!(
                "  {:<10} {}",
                name,
                "not set".if_supports_color(Stdout, |t| t.red()),
            ),
        }
    }
    log::info!("");

    let path = settings_path();
    let settings = load_settings()
        .map_err(|e| CliError::config(format!("Failed to read {}: {e}", path.display())))?;
    let ingest = &settings.ingest;
    log::info!(
        "  Settings file: {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "  workers {}, max_pages {}, years_back {}, requests_per_second {}",
        ingest.workers,
        ingest.max_pages,
        ingest.years_back,
        ingest.requests_per_second,
    );
    log::info!(
        "  task_delay {}ms, pause {}s every {} records, cooldown {}s",
        ingest.task_delay_ms,
        ingest.pause_secs,
        ingest.pause_every,
        ingest.cooldown_secs,
    );
    log::info!(
        "  query: {} sorted by {}, votes >= {} (avg >= {}), runtime >= {}min",
        settings.query.language,
        settings.query.sort_by,
        settings.query.min_vote_count,
        settings.query.min_vote_average,
        settings.query.min_runtime,
    );

    Ok(())
}

/// Print the config file paths.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match config_path() {
        Some(p) => println!("{}", p.display()),
        None => return Err(CliError::config("Could not determine config directory")),
    }
    println!("{}", settings_path().display());
    Ok(())
}
