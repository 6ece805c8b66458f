//! Throughput history handler.

use tabled::Tabled;

use netpulse_core::format::fmt_rate;
use netpulse_core::{BandwidthSnapshot, Controller, HistoryBuffer};

use crate::cli::{GlobalOpts, HistoryArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time (UTC)")]
    time: String,
    #[tabled(rename = "↓ Rate")]
    download: String,
    #[tabled(rename = "↑ Rate")]
    upload: String,
}

fn sample_row(s: &BandwidthSnapshot) -> SampleRow {
    SampleRow {
        time: util::clock(s.timestamp()),
        download: fmt_rate(s.download_rate),
        upload: fmt_rate(s.upload_rate),
    }
}

pub async fn handle(
    controller: &Controller,
    args: &HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let series = controller.get_history().await?;

    // Same window the dashboard keeps: ordered, bounded, newest last.
    let capacity = args
        .last
        .unwrap_or(controller.config().history_capacity)
        .min(controller.config().history_capacity);
    let mut window = HistoryBuffer::new(capacity);
    window.backfill(series);
    let samples = window.to_vec();

    let out = output::render_list(&global.output, &samples, sample_row, |s| {
        format!("{}\t{}\t{}", s.timestamp_ms, s.download_rate, s.upload_rate)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
