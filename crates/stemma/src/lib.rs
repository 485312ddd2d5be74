//! Stemma - layout of genealogical descendant trees.
//!
//! Reads flat person records, rebuilds the family graph beneath a synthetic
//! root, places every generation as a row of family boxes and compacts the
//! rows horizontally. The result is a [`layout::TreeLayout`] that can be
//! rendered to SVG.

pub mod config;
pub mod layout;
pub mod tree;

mod error;
mod export;
mod order;

pub use stemma_core::{geometry, person};

pub use error::StemmaError;

use std::fs;

use log::{debug, info, trace};

use stemma_parser::ParseOptions;

use config::AppConfig;
use export::Exporter;
use layout::TreeLayout;
use person::PersonRecord;
use tree::FamilyTree;

/// Builder for parsing, laying out and rendering family trees.
///
/// # Examples
///
/// ```rust,no_run
/// use stemma::{FamilyTreeBuilder, config::AppConfig};
///
/// let source = "\
/// include,id,lineage,first,last,sex,birth,death,wedding,parent
/// 1,01-01,yes,Jean,Barbaneau,male,1701,,,
/// ";
///
/// let builder = FamilyTreeBuilder::new(AppConfig::default());
///
/// let records = builder.parse(source)
///     .expect("Failed to parse");
///
/// let layout = builder.layout(&records)
///     .expect("Failed to lay out");
///
/// let svg = builder.render_svg(&layout)
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = FamilyTreeBuilder::default();
/// ```
#[derive(Default)]
pub struct FamilyTreeBuilder {
    config: AppConfig,
}

impl FamilyTreeBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse a record file into person records.
    ///
    /// # Errors
    ///
    /// Returns [`StemmaError::Parse`] with every diagnostic of the file when
    /// fields are malformed or ids are duplicated.
    pub fn parse(&self, source: &str) -> Result<Vec<PersonRecord>, StemmaError> {
        info!("Parsing records");

        let records = stemma_parser::parse(source, &ParseOptions::default())
            .map_err(|err| StemmaError::new_parse_error(err, source))?;

        debug!(records = records.len(); "Records parsed successfully");
        trace!(records:?; "Parsed records");

        Ok(records)
    }

    /// Build the family tree and compute its layout.
    ///
    /// # Errors
    ///
    /// Returns [`StemmaError::Layout`] for invalid layout settings and
    /// [`StemmaError::Tree`] for duplicate ids or cyclic parent references.
    pub fn layout(&self, records: &[PersonRecord]) -> Result<TreeLayout, StemmaError> {
        let layout_config = self.config.layout();
        layout_config.validate().map_err(StemmaError::Layout)?;

        info!(records = records.len(); "Building family tree");
        let mut tree = FamilyTree::build(records)?;
        debug!("Family tree built successfully");

        let layout = layout::arrange(&mut tree, layout_config);
        if !layout.orphans().is_empty() {
            info!(orphans = layout.orphans().len(); "Some records were left out");
        }
        Ok(layout)
    }

    /// Render a layout to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`StemmaError::Export`] or [`StemmaError::Io`] when the
    /// document cannot be written or read back.
    pub fn render_svg(&self, layout: &TreeLayout) -> Result<String, StemmaError> {
        info!(boxes = layout.boxes().len(); "Rendering SVG");

        let temp_file =
            tempfile::NamedTempFile::new().map_err(|err| StemmaError::Export(Box::new(err)))?;
        let temp_path = temp_file.path().to_string_lossy().to_string();

        let mut svg_exporter = export::svg::SvgBuilder::new(&temp_path)
            .with_style(self.config.style())
            .build()?;

        svg_exporter.export_tree_layout(layout)?;

        let svg_string = fs::read_to_string(&temp_path).map_err(StemmaError::Io)?;

        info!("SVG rendered successfully");
        Ok(svg_string)
    }
}
