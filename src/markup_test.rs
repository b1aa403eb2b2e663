#![allow(clippy::float_cmp)]

use super::*;

const SIMPLE: &str = r##"<svg viewBox="0 0 200 100">
  <rect x="10" y="20" width="30" height="40"/>
  <circle cx="100" cy="50" r="25"/>
</svg>"##;

// --- Structure ---

#[test]
fn parses_view_box() {
    let doc = parse(SIMPLE).unwrap();
    assert_eq!(doc.view_box, ViewBox { x: 0.0, y: 0.0, width: 200.0, height: 100.0 });
}

#[test]
fn aspect_ratio_from_view_box() {
    assert_eq!(parse(SIMPLE).unwrap().aspect_ratio(), 2.0);
}

#[test]
fn nodes_in_document_order() {
    let doc = parse(SIMPLE).unwrap();
    assert_eq!(doc.nodes.len(), 2);
    assert!(matches!(doc.nodes[0], Node::Rect { .. }));
    assert!(matches!(doc.nodes[1], Node::Circle { .. }));
}

#[test]
fn view_box_falls_back_to_width_height() {
    let doc = parse(r#"<svg width="50px" height="25px"></svg>"#).unwrap();
    assert_eq!(doc.view_box, ViewBox { x: 0.0, y: 0.0, width: 50.0, height: 25.0 });
}

#[test]
fn view_box_accepts_comma_separators() {
    let doc = parse(r#"<svg viewBox="-10,-5, 20, 10"/>"#).unwrap();
    assert_eq!(doc.view_box, ViewBox { x: -10.0, y: -5.0, width: 20.0, height: 10.0 });
}

#[test]
fn unknown_elements_are_skipped() {
    let doc = parse(r#"<svg viewBox="0 0 10 10"><defs><marker id="m"/></defs><g><rect width="5" height="5"/></g></svg>"#)
        .unwrap();
    assert_eq!(doc.nodes.len(), 1);
}

#[test]
fn comments_and_declarations_are_skipped() {
    let src = r#"<?xml version="1.0"?><!-- a <rect/> in a comment --><svg viewBox="0 0 10 10"><!DOCTYPE ignored></svg>"#;
    let doc = parse(src).unwrap();
    assert!(doc.nodes.is_empty());
}

#[test]
fn single_quoted_attributes() {
    let doc = parse(r"<svg viewBox='0 0 4 4'><circle cx='1' cy='2' r='3'/></svg>").unwrap();
    assert_eq!(doc.nodes[0], Node::Circle { cx: 1.0, cy: 2.0, r: 3.0 });
}

// --- Errors ---

#[test]
fn missing_root_is_an_error() {
    assert_eq!(parse("<rect width='5' height='5'/>"), Err(MarkupError::NoRoot));
    assert_eq!(parse("plain text"), Err(MarkupError::NoRoot));
}

#[test]
fn missing_view_box_is_an_error() {
    assert_eq!(parse("<svg></svg>"), Err(MarkupError::MissingViewBox));
}

#[test]
fn non_positive_view_box_is_an_error() {
    assert_eq!(parse(r#"<svg viewBox="0 0 100 0"/>"#), Err(MarkupError::BadViewBox));
    assert_eq!(parse(r#"<svg viewBox="0 0 -10 10"/>"#), Err(MarkupError::BadViewBox));
}

#[test]
fn unterminated_tag_is_an_error() {
    assert_eq!(parse("<svg viewBox=\"0 0 1 1\"><rect "), Err(MarkupError::UnterminatedTag));
}

#[test]
fn unterminated_comment_is_an_error() {
    assert_eq!(parse("<svg/><!-- never closed"), Err(MarkupError::UnterminatedComment));
}

// --- Primitives ---

#[test]
fn parses_ellipse_and_line() {
    let doc = parse(
        r#"<svg viewBox="0 0 10 10"><ellipse cx="5" cy="5" rx="4" ry="2"/><line x1="0" y1="0" x2="10" y2="10"/></svg>"#,
    )
    .unwrap();
    assert_eq!(doc.nodes[0], Node::Ellipse { cx: 5.0, cy: 5.0, rx: 4.0, ry: 2.0 });
    assert_eq!(doc.nodes[1], Node::Line { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 });
}

#[test]
fn polygon_is_closed_polyline_is_open() {
    let doc = parse(
        r#"<svg viewBox="0 0 10 10"><polygon points="0,0 10,0 5,8"/><polyline points="0 0, 1 1, 2 0"/></svg>"#,
    )
    .unwrap();
    assert_eq!(
        doc.nodes[0],
        Node::Poly { points: vec![(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)], closed: true }
    );
    assert_eq!(
        doc.nodes[1],
        Node::Poly { points: vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], closed: false }
    );
}

#[test]
fn degenerate_point_lists_are_dropped() {
    let doc = parse(r#"<svg viewBox="0 0 10 10"><polygon points="1,1"/></svg>"#).unwrap();
    assert!(doc.nodes.is_empty());
}

// --- Paths ---

fn path_nodes(d: &str) -> Vec<Subpath> {
    let src = format!(r#"<svg viewBox="0 0 100 100"><path d="{d}"/></svg>"#);
    let doc = parse(&src).unwrap();
    match &doc.nodes[0] {
        Node::Path { subpaths } => subpaths.clone(),
        other => panic!("expected path, got {other:?}"),
    }
}

#[test]
fn absolute_move_line_close() {
    let sp = path_nodes("M10 10 L20 20 H30 V40 Z");
    assert_eq!(sp.len(), 1);
    assert!(sp[0].closed);
    assert_eq!(sp[0].points, vec![(10.0, 10.0), (20.0, 20.0), (30.0, 20.0), (30.0, 40.0)]);
}

#[test]
fn relative_commands() {
    let sp = path_nodes("m5 5 l10 0 v2");
    assert_eq!(sp[0].points, vec![(5.0, 5.0), (15.0, 5.0), (15.0, 7.0)]);
    assert!(!sp[0].closed);
}

#[test]
fn implicit_linetos_after_moveto() {
    let sp = path_nodes("M0 0 10 5 20 0");
    assert_eq!(sp[0].points, vec![(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)]);
}

#[test]
fn curves_flatten_to_endpoints() {
    let sp = path_nodes("M0 0 C10 0 10 10 20 10 Q30 20 40 10");
    assert_eq!(sp[0].points, vec![(0.0, 0.0), (20.0, 10.0), (40.0, 10.0)]);
}

#[test]
fn multiple_subpaths() {
    let sp = path_nodes("M0 0 L10 0 Z M20 20 L30 30");
    assert_eq!(sp.len(), 2);
    assert!(sp[0].closed);
    assert!(!sp[1].closed);
    assert_eq!(sp[1].points, vec![(20.0, 20.0), (30.0, 30.0)]);
}

#[test]
fn empty_path_attribute_drops_the_node() {
    let doc = parse(r#"<svg viewBox="0 0 10 10"><path d=""/></svg>"#).unwrap();
    assert!(doc.nodes.is_empty());
}
