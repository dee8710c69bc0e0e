//! Построение XML фрагментов `<mxCell>`.

use crate::escape::{escape_attr, value_with_breaks};
use crate::{MxError, Result};

/// Геометрия вершины
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `relative="1"` для подписей на рёбрах
    pub relative: bool,
}

impl Geometry {
    /// Создаёт геометрию
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            relative: false,
        }
    }
}

/// Точка (для концов рёбер и waypoints)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MxPoint {
    pub x: f64,
    pub y: f64,
}

impl MxPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Параметры ячейки. `id` обязателен; вершины несут `geometry`,
/// рёбра — либо `source`/`target`, либо абсолютные точки концов.
#[derive(Debug, Clone, Default)]
pub struct CellOptions {
    pub id: String,
    pub value: Option<String>,
    pub style: Option<String>,
    pub vertex: bool,
    pub edge: bool,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub geometry: Option<Geometry>,
    pub source_point: Option<MxPoint>,
    pub target_point: Option<MxPoint>,
    pub waypoints: Vec<MxPoint>,
}

impl CellOptions {
    /// Заготовка вершины
    pub fn vertex(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vertex: true,
            ..Self::default()
        }
    }

    /// Заготовка ребра
    pub fn edge(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            edge: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_endpoints(mut self, source: MxPoint, target: MxPoint) -> Self {
        self.source_point = Some(source);
        self.target_point = Some(target);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<MxPoint>) -> Self {
        self.waypoints = waypoints;
        self
    }
}

/// Форматирует координату без хвостовых нулей
fn fmt_coord(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.2}", v)
    }
}

/// Строит XML фрагмент `<mxCell>`.
///
/// Отсутствие `id` — структурная ошибка на месте вызова.
pub fn build_cell(opts: &CellOptions) -> Result<String> {
    if opts.id.is_empty() {
        return Err(MxError::MissingId);
    }

    let mut out = String::with_capacity(160);
    out.push_str("<mxCell id=\"");
    out.push_str(&escape_attr(&opts.id));
    out.push('"');

    if let Some(value) = &opts.value {
        out.push_str(" value=\"");
        out.push_str(&value_with_breaks(value));
        out.push('"');
    }
    if let Some(style) = &opts.style {
        out.push_str(" style=\"");
        out.push_str(&escape_attr(style));
        out.push('"');
    }
    if opts.vertex {
        out.push_str(" vertex=\"1\"");
    }
    if opts.edge {
        out.push_str(" edge=\"1\"");
    }
    if let Some(parent) = &opts.parent {
        out.push_str(" parent=\"");
        out.push_str(&escape_attr(parent));
        out.push('"');
    }
    if let Some(source) = &opts.source {
        out.push_str(" source=\"");
        out.push_str(&escape_attr(source));
        out.push('"');
    }
    if let Some(target) = &opts.target {
        out.push_str(" target=\"");
        out.push_str(&escape_attr(target));
        out.push('"');
    }

    let needs_geometry = opts.geometry.is_some()
        || opts.source_point.is_some()
        || opts.target_point.is_some()
        || !opts.waypoints.is_empty()
        || opts.edge;

    if !needs_geometry {
        out.push_str("/>");
        return Ok(out);
    }
    out.push('>');

    if let Some(g) = &opts.geometry {
        out.push_str("<mxGeometry ");
        if g.x != 0.0 || !opts.edge {
            out.push_str(&format!("x=\"{}\" ", fmt_coord(g.x)));
        }
        if g.y != 0.0 || !opts.edge {
            out.push_str(&format!("y=\"{}\" ", fmt_coord(g.y)));
        }
        out.push_str(&format!(
            "width=\"{}\" height=\"{}\" ",
            fmt_coord(g.width),
            fmt_coord(g.height)
        ));
        if g.relative {
            out.push_str("relative=\"1\" ");
        }
        out.push_str("as=\"geometry\"/>");
    } else {
        // Геометрия ребра: точки концов и waypoints
        out.push_str("<mxGeometry relative=\"1\" as=\"geometry\">");
        if let Some(p) = &opts.source_point {
            out.push_str(&format!(
                "<mxPoint x=\"{}\" y=\"{}\" as=\"sourcePoint\"/>",
                fmt_coord(p.x),
                fmt_coord(p.y)
            ));
        }
        if let Some(p) = &opts.target_point {
            out.push_str(&format!(
                "<mxPoint x=\"{}\" y=\"{}\" as=\"targetPoint\"/>",
                fmt_coord(p.x),
                fmt_coord(p.y)
            ));
        }
        if !opts.waypoints.is_empty() {
            out.push_str("<Array as=\"points\">");
            for p in &opts.waypoints {
                out.push_str(&format!(
                    "<mxPoint x=\"{}\" y=\"{}\"/>",
                    fmt_coord(p.x),
                    fmt_coord(p.y)
                ));
            }
            out.push_str("</Array>");
        }
        out.push_str("</mxGeometry>");
    }

    out.push_str("</mxCell>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_cell() {
        let opts = CellOptions::vertex("puml-1")
            .with_value("Alice")
            .with_style("rounded=0;")
            .with_parent("1")
            .with_geometry(Geometry::new(40.0, 40.0, 80.0, 30.0));
        let xml = build_cell(&opts).unwrap();
        assert!(xml.contains("id=\"puml-1\""));
        assert!(xml.contains("value=\"Alice\""));
        assert!(xml.contains("vertex=\"1\""));
        assert!(xml.contains("x=\"40\" y=\"40\" width=\"80\" height=\"30\""));
    }

    #[test]
    fn test_edge_with_endpoints() {
        let opts = CellOptions::edge("puml-2")
            .with_parent("1")
            .with_endpoints(MxPoint::new(0.0, 10.0), MxPoint::new(100.0, 10.0));
        let xml = build_cell(&opts).unwrap();
        assert!(xml.contains("edge=\"1\""));
        assert!(xml.contains("as=\"sourcePoint\""));
        assert!(xml.contains("as=\"targetPoint\""));
    }

    #[test]
    fn test_edge_with_waypoints() {
        let opts = CellOptions::edge("puml-3")
            .with_source("puml-1")
            .with_target("puml-2")
            .with_waypoints(vec![MxPoint::new(50.0, 0.0), MxPoint::new(50.0, 20.0)]);
        let xml = build_cell(&opts).unwrap();
        assert!(xml.contains("<Array as=\"points\">"));
        assert!(xml.contains("source=\"puml-1\""));
    }

    #[test]
    fn test_missing_id_fails() {
        let opts = CellOptions::default();
        assert!(matches!(build_cell(&opts), Err(MxError::MissingId)));
    }

    #[test]
    fn test_value_escaped() {
        let opts = CellOptions::vertex("v").with_value("a<b>&\"c\"");
        let xml = build_cell(&opts).unwrap();
        assert!(xml.contains("value=\"a&lt;b&gt;&amp;&quot;c&quot;\""));
    }
}
