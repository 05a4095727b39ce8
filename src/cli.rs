use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "cic36",
    version,
    about = "CIC incorporation document extraction tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify documents as electronic, scanned, or hybrid
    Classify(ClassifyArgs),
    /// Locate the CIC 36 form and Section B page within a document
    Locate(LocateArgs),
    /// Run the full extraction pipeline on a single document
    Extract(ExtractArgs),
    /// Run the extraction pipeline over a directory of documents
    Pipeline(PipelineArgs),
    /// Report availability and versions of the external PDF/OCR tools
    Tools(ToolsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// PDF files to classify
    #[arg(required = true)]
    pub pdf_paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LocateArgs {
    pub pdf_path: PathBuf,

    #[arg(long, value_enum, default_value_t = DocumentTypeArg::Electronic)]
    pub document_type: DocumentTypeArg,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DocumentTypeArg {
    Electronic,
    Scanned,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    pub pdf_path: PathBuf,

    /// Output JSON path (defaults to `<stem>.json` beside the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 200)]
    pub dpi: u32,
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Directory containing PDF files
    pub input_dir: PathBuf,

    #[arg(short, long, default_value = "data/output")]
    pub output_dir: PathBuf,

    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,

    /// Write directly into the output directory instead of a dated subfolder
    #[arg(long, default_value_t = false)]
    pub no_dated: bool,

    #[arg(long, default_value_t = 200)]
    pub dpi: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ToolsArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
