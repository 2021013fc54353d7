use std::io::{self, BufRead, Write};

use anyhow::Result;

use pushgate::config::Settings;
use pushgate::metrics::encode_metrics;
use pushgate::report::ProviderResponse;
use pushgate::telemetry;

/// Reads newline-delimited provider responses on stdin and writes one
/// classified outcome per failed message on stdout.
fn main() -> Result<()> {
    let settings = Settings::new()?;
    telemetry::init_tracing(&settings.log)?;
    tracing::info!("Configuration loaded");

    settings.validate()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let (responses, outcomes) = classify(stdin.lock(), stdout.lock())?;

    tracing::info!(responses, outcomes, "Classification complete");

    if settings.log.print_metrics {
        eprint!("{}", encode_metrics()?);
    }
    Ok(())
}

/// Classify every response line from `input`, writing summaries to `out`.
///
/// Blank and undecodable lines are skipped. Returns the number of responses
/// decoded and summaries written.
fn classify<R: BufRead, W: Write>(input: R, mut out: W) -> Result<(usize, usize)> {
    let mut responses = 0usize;
    let mut outcomes = 0usize;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response: ProviderResponse = match serde_json::from_str(&line) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping undecodable response");
                continue;
            }
        };
        responses += 1;

        response.record_metrics();
        for summary in response.summaries() {
            serde_json::to_writer(&mut out, &summary)?;
            writeln!(out)?;
            outcomes += 1;
        }
    }
    out.flush()?;
    Ok((responses, outcomes))
}
