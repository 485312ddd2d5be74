//! SVG rendering of a [`TreeLayout`].
//!
//! Coordinates are layout millimetres; the document's `width` and `height`
//! carry the `mm` unit so the drawing prints at its laid out size.

use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use stemma_core::{
    geometry::{Bounds, Insets},
    person::Sex,
};

use crate::{
    config::StyleConfig,
    export,
    layout::{Connector, PlacedBox, TreeLayout},
};

const PAGE_MARGIN: f32 = 10.0;
const DEFAULT_BOX_FILL: &str = "white";
const DEFAULT_SPOUSE_FILL: &str = "#f2f2f2";
const DEFAULT_BOX_STROKE: &str = "#333333";
const DEFAULT_CONNECTOR_STROKE: &str = "#555555";
const DEFAULT_FONT_FAMILY: &str = "sans-serif";
const DEFAULT_FONT_SIZE: f32 = 2.8;
const STROKE_WIDTH: f32 = 0.3;

/// Builder for [`Svg`] exporters.
#[derive(Debug)]
pub struct SvgBuilder {
    file_name: String,
    style: StyleConfig,
}

impl SvgBuilder {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            style: StyleConfig::default(),
        }
    }

    pub fn with_style(mut self, style: &StyleConfig) -> Self {
        self.style = style.clone();
        self
    }

    /// # Errors
    ///
    /// Returns [`export::Error::Render`] when the file name is empty.
    pub fn build(self) -> Result<Svg, export::Error> {
        if self.file_name.is_empty() {
            return Err(export::Error::Render("no output file given".to_string()));
        }
        Ok(Svg {
            file_name: self.file_name,
            style: self.style,
        })
    }
}

/// SVG exporter writing one document to `file_name`.
#[derive(Debug)]
pub struct Svg {
    file_name: String,
    style: StyleConfig,
}

impl Svg {
    /// Renders the layout to an SVG document.
    pub fn render_tree_layout(&self, layout: &TreeLayout) -> Document {
        let page = layout.bounds().add_padding(Insets::uniform(PAGE_MARGIN));
        debug!(page:?; "Page bounds");

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    page.min_x(),
                    page.min_y(),
                    page.width(),
                    page.height()
                ),
            )
            .set("width", format!("{}mm", page.width()))
            .set("height", format!("{}mm", page.height()));

        if let Some(color) = self.style.background_color() {
            doc = doc.add(self.render_background(page, color));
        }

        let connectors = layout
            .connectors()
            .iter()
            .fold(svg_element::Group::new().set("class", "connectors"), |group, connector| {
                group.add(self.render_connector(connector))
            });

        let boxes = layout
            .boxes()
            .iter()
            .fold(svg_element::Group::new().set("class", "people"), |group, placed| {
                group.add(self.render_box(placed))
            });

        doc.add(connectors).add(boxes)
    }

    fn render_background(&self, page: Bounds, color: &str) -> svg_element::Rectangle {
        svg_element::Rectangle::new()
            .set("x", page.min_x())
            .set("y", page.min_y())
            .set("width", page.width())
            .set("height", page.height())
            .set("fill", color)
    }

    /// Parent bottom, down to the elbow, across, down to the child.
    fn render_connector(&self, connector: &Connector) -> svg_element::Path {
        let (start, end) = (connector.start(), connector.end());
        let data = format!(
            "M {} {} V {} H {} V {}",
            start.x(),
            start.y(),
            connector.elbow_y(),
            end.x(),
            end.y()
        );

        svg_element::Path::new()
            .set("d", data)
            .set("fill", "none")
            .set(
                "stroke",
                self.style
                    .connector_stroke()
                    .unwrap_or(DEFAULT_CONNECTOR_STROKE),
            )
            .set("stroke-width", STROKE_WIDTH)
            .set("data-parent", connector.parent_id())
            .set("data-child", connector.child_id())
    }

    fn render_box(&self, placed: &PlacedBox) -> svg_element::Group {
        let fill = if placed.lineage() {
            self.style.box_fill().unwrap_or(DEFAULT_BOX_FILL)
        } else {
            self.style.spouse_fill().unwrap_or(DEFAULT_SPOUSE_FILL)
        };

        let rect = svg_element::Rectangle::new()
            .set("x", placed.left())
            .set("y", placed.top())
            .set("width", placed.width())
            .set("height", placed.height())
            .set("fill", fill)
            .set("stroke", self.style.box_stroke().unwrap_or(DEFAULT_BOX_STROKE))
            .set("stroke-width", STROKE_WIDTH);

        let font_size = self.style.font_size().unwrap_or(DEFAULT_FONT_SIZE);
        let centre_x = placed.bounds().center_x();
        let text = box_lines(placed)
            .into_iter()
            .enumerate()
            .fold(
                svg_element::Text::new("")
                    .set("font-family", self.style.font_family().unwrap_or(DEFAULT_FONT_FAMILY))
                    .set("font-size", font_size)
                    .set("text-anchor", "middle"),
                |text, (line, content)| {
                    let y = placed.top() + font_size * 1.2 * (line as f32 + 1.0);
                    text.add(
                        svg_element::TSpan::new("")
                            .set("x", centre_x)
                            .set("y", y)
                            .add(svg::node::Text::new(content)),
                    )
                },
            );

        svg_element::Group::new()
            .set("class", sex_class(placed.sex()))
            .set("data-id", placed.id())
            .add(rect)
            .add(text)
    }

    /// Writes an SVG document to the exporter's file.
    pub fn write_document(&self, doc: Document) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let f = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl export::Exporter for Svg {
    fn export_tree_layout(&mut self, layout: &TreeLayout) -> Result<(), export::Error> {
        let doc = self.render_tree_layout(layout);
        debug!("SVG document rendered");

        self.write_document(doc)
    }
}

fn sex_class(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "person male",
        Sex::Female => "person female",
        Sex::Unknown => "person",
    }
}

/// Text lines of a box: first name, last name and the known dates.
fn box_lines(placed: &PlacedBox) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    match (placed.first_name(), placed.last_name()) {
        (None, None) => lines.push(placed.id().to_string()),
        (first, last) => {
            lines.extend(first.map(str::to_string));
            lines.extend(last.map(str::to_uppercase));
        }
    }

    let dates: Vec<String> = [
        ("b.", placed.birth()),
        ("m.", placed.wedding()),
        ("d.", placed.death()),
    ]
    .into_iter()
    .filter_map(|(mark, date)| date.map(|date| format!("{mark} {date}")))
    .collect();
    if !dates.is_empty() {
        lines.push(dates.join(" "));
    }
    lines
}
