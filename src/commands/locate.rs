use anyhow::Result;
use serde::Serialize;

use crate::cli::{DocumentTypeArg, LocateArgs};
use crate::config::Tuning;
use crate::locate;
use crate::model::Location;
use crate::pdftools::ToolConfig;

#[derive(Serialize)]
struct LocateReport {
    file: String,
    #[serde(flatten)]
    location: Location,
}

pub fn run(args: LocateArgs) -> Result<()> {
    let tools = ToolConfig::discover();
    let tuning = Tuning::default();

    let scanned = args.document_type == DocumentTypeArg::Scanned;
    let location = locate::locate_path(&args.pdf_path, &tools, &tuning, scanned)?;

    let report = LocateReport {
        file: args.pdf_path.display().to_string(),
        location,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
