use anyhow::Result;
use serde::Serialize;

use crate::classify;
use crate::cli::ClassifyArgs;
use crate::config::Tuning;
use crate::model::Classification;
use crate::pdftools::ToolConfig;

#[derive(Serialize)]
struct ClassifyReport {
    file: String,
    #[serde(flatten)]
    classification: Classification,
}

pub fn run(args: ClassifyArgs) -> Result<()> {
    let tools = ToolConfig::discover();
    let tuning = Tuning::default();

    let reports: Vec<ClassifyReport> = args
        .pdf_paths
        .iter()
        .map(|path| ClassifyReport {
            file: path.display().to_string(),
            classification: classify::classify_path(path, &tools, &tuning),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
