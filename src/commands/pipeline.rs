use anyhow::Result;

use crate::cli::PipelineArgs;
use crate::config::Tuning;
use crate::pdftools::ToolConfig;
use crate::pipeline::{self, BatchOptions};

pub fn run(args: PipelineArgs) -> Result<()> {
    let tools = ToolConfig::discover();
    let mut tuning = Tuning::default();
    tuning.ocr_dpi = args.dpi;

    let options = BatchOptions {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        workers: args.workers,
        dated_run_folder: !args.no_dated,
    };

    let summary = pipeline::process_batch(&options, &tools, &tuning)?;
    println!("{}", serde_json::to_string_pretty(&summary.batch_info)?);
    Ok(())
}
