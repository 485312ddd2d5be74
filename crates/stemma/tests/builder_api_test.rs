//! Integration tests for the FamilyTreeBuilder API

use stemma::{
    FamilyTreeBuilder, StemmaError,
    config::{AppConfig, LayoutConfig, StyleConfig},
};

const BARBANEAU: &str = include_str!("../../../demos/barbaneau.csv");

#[test]
fn test_builder_api_exists() {
    let _builder = FamilyTreeBuilder::default();
}

#[test]
fn test_parse_sample_family() {
    let builder = FamilyTreeBuilder::default();
    let records = builder.parse(BARBANEAU).expect("Failed to parse records");

    // the draft row is skipped, the orphan is still a valid record
    assert_eq!(records.len(), 25);
    assert!(records.iter().all(|record| record.id() != "I25"));
}

#[test]
fn test_layout_sample_family() {
    let builder = FamilyTreeBuilder::default();
    let records = builder.parse(BARBANEAU).expect("Failed to parse records");
    let layout = builder.layout(&records).expect("Failed to lay out");

    assert_eq!(layout.boxes().len(), 24);
    assert_eq!(layout.orphans(), &["I26".to_string()]);
    assert!(layout.compaction().converged());

    // every lineage record below the first generation has a connector
    assert_eq!(layout.connectors().len(), 15);

    let jean = layout.find_box("I01").expect("founder is placed");
    let louise = layout.find_box("I02").expect("spouse is placed");
    assert_eq!(jean.level(), 1);
    assert_eq!(louise.family(), "I01");
    assert!(jean.left() < louise.left());

    // Marie closes her row after her husband
    let marie = layout.find_box("I04").expect("daughter is placed");
    let henri = layout.find_box("I07").expect("son-in-law is placed");
    assert_eq!(henri.position(), 0);
    assert_eq!(marie.position(), 1);
}

#[test]
fn test_render_sample_family() {
    let style = StyleConfig::default().with_background_color("white");
    let builder = FamilyTreeBuilder::new(AppConfig::new(LayoutConfig::default(), style));
    let records = builder.parse(BARBANEAU).expect("Failed to parse records");
    let layout = builder.layout(&records).expect("Failed to lay out");

    let svg = builder.render_svg(&layout).expect("Failed to render");
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert!(svg.contains("data-id=\"I24\""));
    assert!(!svg.contains("data-id=\"I26\""));
}

#[test]
fn test_parse_error_keeps_source() {
    let builder = FamilyTreeBuilder::default();
    let source = include_str!("../../../demos/errors/unterminated_quote.csv");

    match builder.parse(source) {
        Err(StemmaError::Parse { err, src }) => {
            assert_eq!(src, source);
            assert_eq!(err.diagnostics().len(), 1);
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_cycle_is_a_tree_error() {
    let builder = FamilyTreeBuilder::default();
    let records = builder
        .parse(include_str!("../../../demos/errors/cycle.csv"))
        .expect("Failed to parse records");

    let err = builder.layout(&records).unwrap_err();
    assert!(matches!(err, StemmaError::Tree(_)), "got {err:?}");
}

#[test]
fn test_invalid_layout_config_is_rejected() {
    let layout = LayoutConfig::default().with_scale(0.0);
    let builder = FamilyTreeBuilder::new(AppConfig::new(layout, StyleConfig::default()));
    let records = builder.parse(BARBANEAU).expect("Failed to parse records");

    let err = builder.layout(&records).unwrap_err();
    assert!(matches!(err, StemmaError::Layout(ref msg) if msg.contains("scale")));
}

#[test]
fn test_empty_file_renders_empty_document() {
    let builder = FamilyTreeBuilder::default();
    let records = builder.parse("").expect("Failed to parse records");
    let layout = builder.layout(&records).expect("Failed to lay out");

    assert!(layout.boxes().is_empty());
    let svg = builder.render_svg(&layout).expect("Failed to render");
    assert!(svg.contains("<svg"));
}
