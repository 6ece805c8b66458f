//! PNG export of the throughput chart.

use std::fs::File;
use std::io::BufWriter;

use netpulse_core::{ChartRenderer, Controller, HistoryBuffer, Raster, Rgba};

use crate::cli::{ChartArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Largest edge accepted for an export.
const MAX_EDGE: u32 = 8192;

pub async fn handle(
    controller: &Controller,
    args: &ChartArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.width == 0 || args.height == 0 || args.width > MAX_EDGE || args.height > MAX_EDGE {
        return Err(CliError::Validation {
            field: "size".into(),
            reason: format!("width and height must be between 1 and {MAX_EDGE}"),
        });
    }

    let series = controller.get_history().await?;
    let mut window = HistoryBuffer::new(controller.config().history_capacity);
    window.backfill(series);
    let samples = window.to_vec();

    let mut raster = Raster::new(args.width, args.height);
    raster.clear(Rgba::BACKGROUND);
    if ChartRenderer::default().render(&samples, &mut raster).is_none() {
        tracing::warn!("no history samples; writing an empty chart");
    }

    let file = File::create(&args.file)?;
    raster
        .write_png(BufWriter::new(file))
        .map_err(|e| CliError::Render {
            reason: e.to_string(),
        })?;

    output::print_output(
        &format!(
            "Wrote {}x{} chart of {} samples to {}",
            args.width,
            args.height,
            samples.len(),
            args.file.display()
        ),
        global.quiet,
    );
    Ok(())
}
