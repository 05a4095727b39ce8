use anyhow::Result;

use crate::cli::ToolsArgs;
use crate::pdftools::{self, ToolConfig};

pub fn run(args: ToolsArgs) -> Result<()> {
    let config = ToolConfig::discover();
    let report = pdftools::tool_report(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for tool in &report.tools {
        let status = if tool.available {
            tool.version.as_deref().unwrap_or("available")
        } else {
            "not found"
        };
        println!("{:12} {}", tool.name, status);
    }
    println!(
        "\nOCR pipeline {}",
        if report.ocr_available {
            "available"
        } else {
            "unavailable (needs pdftoppm and tesseract)"
        }
    );

    Ok(())
}
