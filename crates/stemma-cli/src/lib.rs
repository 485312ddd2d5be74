//! CLI logic for the Stemma family tree tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use stemma::{FamilyTreeBuilder, StemmaError};

/// Run the Stemma CLI application
///
/// Reads the record file, lays the tree out and writes the SVG to the
/// output file.
///
/// # Errors
///
/// Returns `StemmaError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Tree and layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), StemmaError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing family file"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = FamilyTreeBuilder::new(app_config);
    let records = builder.parse(&source)?;
    let layout = builder.layout(&records)?;
    for orphan in layout.orphans() {
        warn!(id = orphan.as_str(); "Record left out of the drawing");
    }
    let svg = builder.render_svg(&layout)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
