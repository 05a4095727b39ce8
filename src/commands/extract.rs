use anyhow::Result;
use tracing::info;

use crate::cli::ExtractArgs;
use crate::config::Tuning;
use crate::pdftools::ToolConfig;
use crate::pipeline;
use crate::util;

pub fn run(args: ExtractArgs) -> Result<()> {
    let tools = ToolConfig::discover();
    let mut tuning = Tuning::default();
    tuning.ocr_dpi = args.dpi;

    let record = pipeline::process_single_document(&args.pdf_path, &tools, &tuning);

    let output = args.output.unwrap_or_else(|| {
        let stem = args
            .pdf_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        args.pdf_path.with_file_name(format!("{stem}.json"))
    });

    util::write_json_pretty(&output, &record)?;
    info!(
        output = %output.display(),
        status = %record.extraction_status,
        method = %record.extraction_metadata.extraction_method,
        activities = record.section_b.activities.len(),
        "extraction written"
    );

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
