//! Renderer — role-colored vertices, weight-scaled edges, SVG/PNG output.

use petgraph::visit::EdgeRef;
use resvg::{tiny_skia, usvg};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{ImageFormat, RenderStyle};
use crate::core::graph::CooccurrenceGraph;
use crate::core::layout::{fit_to_canvas, fruchterman_reingold, Point};
use crate::schema::character::Role;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("character {name:?} has unknown role {role:?}")]
    UnknownRole { name: String, role: String },
    #[error("SVG parse error: {0}")]
    Svg(#[from] usvg::Error),
    #[error("SVG formatting error: {0}")]
    Format(#[from] fmt::Error),
    #[error("rasterization failed: {0}")]
    Raster(String),
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fill color for each narrative role.
pub fn role_color(role: Role) -> &'static str {
    match role {
        Role::Victim => "blue",
        Role::Perpetrator => "red",
        Role::Rescuer => "green",
        Role::Neutral => "grey",
    }
}

const EDGE_COLOR: &str = "#444444";
/// Perpendicular offset of a bent edge's control point, relative to its length.
const CURVE_BEND: f64 = 0.2;

/// Render the graph as a standalone SVG document.
///
/// Fails on the first character whose role is not one of the four known
/// roles. A graph without edges is drawn as vertices only.
pub fn render_svg(
    graph: &CooccurrenceGraph,
    style: &RenderStyle,
) -> Result<String, RenderError> {
    let colors = graph
        .characters()
        .map(|c| {
            c.parsed_role()
                .map(role_color)
                .map_err(|_| RenderError::UnknownRole {
                    name: c.name.clone(),
                    role: c.role.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let positions = vertex_positions(graph, style);
    let mut svg = String::new();
    write_svg(&mut svg, graph, style, &positions, &colors)?;
    Ok(svg)
}

fn write_svg(
    svg: &mut String,
    graph: &CooccurrenceGraph,
    style: &RenderStyle,
    positions: &[Point],
    colors: &[&str],
) -> fmt::Result {
    let (width, height) = style.canvas;
    let radius = style.vertex_size / 2.0;

    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
        width, height
    )?;
    writeln!(svg, r#" viewBox="0 0 {} {}">"#, width, height)?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    match graph.max_weight() {
        None => debug!("graph has no edges yet; skipping edge widths"),
        Some(_) => {
            writeln!(
                svg,
                r#"<g fill="none" stroke="{}" stroke-linecap="round">"#,
                EDGE_COLOR
            )?;
            for edge in graph.inner().edge_references() {
                let (source, target) = (edge.source().index(), edge.target().index());
                let (a, b) = (positions[source], positions[target]);
                let stroke = f64::from(*edge.weight()) * style.edge_width_scale;
                let blocked = style.autocurve
                    && positions.iter().enumerate().any(|(i, p)| {
                        i != source && i != target && segment_distance(*p, a, b) < radius
                    });
                if blocked {
                    let c = bend_control(a, b);
                    write!(
                        svg,
                        r#"<path d="M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}""#,
                        a.x, a.y, c.x, c.y, b.x, b.y
                    )?;
                } else {
                    write!(
                        svg,
                        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}""#,
                        a.x, a.y, b.x, b.y
                    )?;
                }
                writeln!(svg, r#" stroke-width="{:.2}"/>"#, stroke)?;
            }
            writeln!(svg, "</g>")?;
        }
    }

    writeln!(svg, r#"<g stroke="black" stroke-width="1">"#)?;
    for (p, color) in positions.iter().zip(colors) {
        writeln!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
            p.x, p.y, radius, color
        )?;
    }
    writeln!(svg, "</g>")?;

    writeln!(
        svg,
        r#"<g font-family="sans-serif" font-size="{}" text-anchor="middle" fill="black">"#,
        style.font_size
    )?;
    for (p, character) in positions.iter().zip(graph.characters()) {
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
            p.x,
            p.y + style.font_size / 3.0,
            escape_xml(&character.name)
        )?;
    }
    writeln!(svg, "</g>")?;
    writeln!(svg, "</svg>")
}

/// Render the graph and write it to `path` in the requested format,
/// creating parent directories as needed.
pub fn render_to_file(
    graph: &CooccurrenceGraph,
    style: &RenderStyle,
    path: &Path,
    format: ImageFormat,
) -> Result<(), RenderError> {
    let svg = render_svg(graph, style)?;
    let io_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    match format {
        ImageFormat::Svg => std::fs::write(path, svg).map_err(io_err)?,
        ImageFormat::Png => rasterize_png(&svg, path)?,
    }
    debug!(path = %path.display(), "wrote image");
    Ok(())
}

/// Rasterize an SVG document to a PNG file at its natural size.
pub fn rasterize_png(svg: &str, path: &Path) -> Result<(), RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt)?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| {
            RenderError::Raster(format!("invalid canvas {}x{}", size.width(), size.height()))
        })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .save_png(path)
        .map_err(|e| RenderError::Raster(format!("{}: {}", path.display(), e)))
}

fn vertex_positions(graph: &CooccurrenceGraph, style: &RenderStyle) -> Vec<Point> {
    let inner = graph.inner();
    let edges: Vec<(usize, usize, f64)> = inner
        .edge_references()
        .map(|e| (e.source().index(), e.target().index(), f64::from(*e.weight())))
        .collect();
    let raw = fruchterman_reingold(
        inner.node_count(),
        &edges,
        style.layout_iterations,
        style.layout_seed,
    );
    let (width, height) = style.canvas;
    fit_to_canvas(&raw, f64::from(width), f64::from(height), style.margin)
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

fn bend_control(a: Point, b: Point) -> Point {
    let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    // Perpendicular of (dx, dy) is (-dy, dx); length already matches the edge.
    Point::new(mid.x - (b.y - a.y) * CURVE_BEND, mid.y + (b.x - a.x) * CURVE_BEND)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::CharacterMeta;

    fn graph(rows: &[(&str, &str)], scenes: &[&[&str]]) -> CooccurrenceGraph {
        let mut g = CooccurrenceGraph::new(
            rows.iter()
                .map(|(name, role)| CharacterMeta::new(name, "", "", role))
                .collect(),
        );
        for scene in scenes {
            let present: Vec<String> = scene.iter().map(|s| s.to_string()).collect();
            g.add_scene(&present);
        }
        g
    }

    fn small_style() -> RenderStyle {
        RenderStyle {
            canvas: (400, 300),
            layout_iterations: 50,
            ..RenderStyle::default()
        }
    }

    #[test]
    fn colors_follow_roles() {
        let g = graph(
            &[("v", "Victim"), ("p", "Perpetrator"), ("r", "Rescuer"), ("n", "Neutral")],
            &[],
        );
        let svg = render_svg(&g, &small_style()).unwrap();
        for color in ["blue", "red", "green", "grey"] {
            assert!(svg.contains(&format!(r#"fill="{}""#, color)), "missing {}", color);
        }
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches(">v</text>").count(), 1);
    }

    #[test]
    fn unknown_role_fails() {
        let g = graph(&[("jay", "Victim"), ("paul", "Bystander")], &[]);
        let err = render_svg(&g, &small_style()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownRole { ref name, ref role } if name == "paul" && role == "Bystander"
        ));
    }

    #[test]
    fn no_edges_renders_vertices_only() {
        let g = graph(&[("a", "Neutral"), ("b", "Neutral")], &[&["a"]]);
        let svg = render_svg(&g, &small_style()).unwrap();
        assert!(!svg.contains("<line"));
        assert!(!svg.contains("<path"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn edge_width_scales_with_weight() {
        let g = graph(
            &[("a", "Neutral"), ("b", "Neutral")],
            &[&["a", "b"], &["a", "b"], &["a", "b"]],
        );
        let style = RenderStyle {
            edge_width_scale: 2.0,
            ..small_style()
        };
        let svg = render_svg(&g, &style).unwrap();
        assert!(svg.contains(r#"stroke-width="6.00""#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let g = graph(
            &[("a", "Victim"), ("b", "Rescuer"), ("c", "Perpetrator")],
            &[&["a", "b"], &["b", "c"]],
        );
        assert_eq!(
            render_svg(&g, &small_style()).unwrap(),
            render_svg(&g, &small_style()).unwrap()
        );
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }

    #[test]
    fn segment_distance_measures_to_closest_point() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((segment_distance(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((segment_distance(Point::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn writes_svg_file() {
        let g = graph(&[("a", "Neutral"), ("b", "Victim")], &[&["a", "b"]]);
        let path = PathBuf::from("target/test_render_unit/graph.svg");
        render_to_file(&g, &small_style(), &path, ImageFormat::Svg).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writes_png_file() {
        let g = graph(&[("a", "Neutral"), ("b", "Victim")], &[&["a", "b"]]);
        let path = PathBuf::from("target/test_render_unit/graph.png");
        render_to_file(&g, &small_style(), &path, ImageFormat::Png).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let _ = std::fs::remove_file(&path);
    }
}
