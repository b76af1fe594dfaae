use crate::color::{ColorScale, EduStats, Rgb};
use crate::config::ChartConfig;
use crate::error::Result;
use crate::join::JoinIndex;
use crate::legend;
use crate::types::{EducationRecord, MapShapes};
use geo::{LineString, MultiPolygon};
use std::fmt::Write as _;

/// Primitive draw operations. Anything vector-graphics-capable satisfies this;
/// the production implementation is `SvgSurface`.
pub trait Surface {
    fn open_group(&mut self, attrs: &[(&str, String)]);
    fn close_group(&mut self);
    fn path(&mut self, d: &str, attrs: &[(&str, String)]);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, attrs: &[(&str, String)]);
    fn text(&mut self, content: &str, attrs: &[(&str, String)]);
}

/// Accumulates SVG markup by string formatting.
pub struct SvgSurface {
    out: String,
    open_groups: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="chart" width="{}" height="{}">"#,
            fmt_num(width),
            fmt_num(height)
        );
        Self {
            out,
            open_groups: 0,
        }
    }

    /// Closes any groups left open, then the document.
    pub fn finish(mut self) -> String {
        for _ in 0..self.open_groups {
            self.out.push_str("</g>\n");
        }
        self.out.push_str("</svg>\n");
        self.out
    }

    fn write_attrs(&mut self, attrs: &[(&str, String)]) {
        for (name, value) in attrs {
            let _ = write!(self.out, r#" {}="{}""#, name, escape(value));
        }
    }
}

impl Surface for SvgSurface {
    fn open_group(&mut self, attrs: &[(&str, String)]) {
        self.out.push_str("<g");
        self.write_attrs(attrs);
        self.out.push_str(">\n");
        self.open_groups += 1;
    }

    fn close_group(&mut self) {
        if self.open_groups > 0 {
            self.open_groups -= 1;
            self.out.push_str("</g>\n");
        }
    }

    fn path(&mut self, d: &str, attrs: &[(&str, String)]) {
        let _ = write!(self.out, r#"<path d="{}""#, d);
        self.write_attrs(attrs);
        self.out.push_str("/>\n");
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, attrs: &[(&str, String)]) {
        let _ = write!(
            self.out,
            r#"<rect x="{}" y="{}" width="{}" height="{}""#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(width),
            fmt_num(height)
        );
        self.write_attrs(attrs);
        self.out.push_str("/>\n");
    }

    fn text(&mut self, content: &str, attrs: &[(&str, String)]) {
        self.out.push_str("<text");
        self.write_attrs(attrs);
        let _ = writeln!(self.out, ">{}</text>", escape(content));
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Path data for a pre-projected planar geometry, drawn without projection.
pub fn path_data(geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in geometry {
        write_ring(&mut d, polygon.exterior());
        for interior in polygon.interiors() {
            write_ring(&mut d, interior);
        }
    }
    d
}

fn write_ring(d: &mut String, ring: &LineString<f64>) {
    let coords = ring.coords().collect::<Vec<_>>();
    if coords.is_empty() {
        return;
    }
    // Closed rings repeat the first coordinate; Z closes the subpath instead.
    let take = if coords.len() > 1 && coords.first() == coords.last() {
        coords.len() - 1
    } else {
        coords.len()
    };
    for (i, c) in coords[..take].iter().enumerate() {
        let op = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{},{}", op, fmt_num(c.x), fmt_num(c.y));
    }
    d.push('Z');
}

/// Formats like a plain number: no trailing ".0", one decimal otherwise.
fn fmt_num(v: f64) -> String {
    if v == v.trunc() {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}

fn translate(x: f64, y: f64) -> String {
    format!("translate({}, {})", fmt_num(x), fmt_num(y))
}

/// Draws the whole chart onto `surface` from the two parsed datasets. The join
/// is resolved for every county up front, so either the full map renders or
/// nothing is emitted at all.
pub fn draw_choropleth(
    records: &[EducationRecord],
    shapes: &MapShapes,
    chart: &ChartConfig,
    surface: &mut dyn Surface,
) -> Result<()> {
    let stats = EduStats::from_records(records)?;
    let scale = ColorScale::new(
        stats,
        Rgb::from_hex(&chart.low_color)?,
        Rgb::from_hex(&chart.pivot_color)?,
        Rgb::from_hex(&chart.high_color)?,
    );
    let index = JoinIndex::new(records);

    let joined = shapes
        .counties
        .iter()
        .map(|county| Ok((county, index.lookup(county.fips)?)))
        .collect::<Result<Vec<_>>>()?;

    draw_headings(surface, stats, chart);
    draw_legend(surface, &scale, chart);

    surface.open_group(&[
        ("id", "counties".to_string()),
        ("transform", translate(chart.padding_left, chart.padding_top)),
    ]);
    for (county, record) in &joined {
        surface.path(
            &path_data(&county.geometry),
            &[
                ("class", "county".to_string()),
                ("data-fips", county.fips.to_string()),
                ("data-education", record.bachelors_or_higher.to_string()),
                ("fill", scale.color_of(record.bachelors_or_higher).to_hex()),
            ],
        );
    }
    surface.close_group();

    surface.open_group(&[
        ("id", "states".to_string()),
        ("transform", translate(chart.padding_left, chart.padding_top)),
    ]);
    for border in &shapes.state_borders {
        surface.path(
            &path_data(border),
            &[
                ("class", "state".to_string()),
                ("fill", "none".to_string()),
                ("stroke", chart.state_stroke.clone()),
            ],
        );
    }
    surface.close_group();

    Ok(())
}

fn draw_headings(surface: &mut dyn Surface, stats: EduStats, chart: &ChartConfig) {
    let w = chart.outer_width();
    let centered = |y: f64| {
        vec![
            ("transform", translate(w / 2.0, y)),
            ("text-anchor", "middle".to_string()),
        ]
    };
    let mut title_attrs = vec![("id", "title".to_string())];
    title_attrs.extend(centered(chart.padding_top));
    surface.text("Higher Education Rates by US county", &title_attrs);

    let mut caption_attrs = vec![("id", "description".to_string())];
    caption_attrs.extend(centered(1.7 * chart.padding_top));
    surface.text(
        "Adults age above 24 with a bachelor's degree or higher (2010-2014)",
        &caption_attrs,
    );

    let mut range_attrs = vec![("id", "range".to_string())];
    range_attrs.extend(centered(2.2 * chart.padding_top));
    surface.text(
        &format!(
            "Lowest {}% - Mean: {:.1}% - Highest: {}%",
            stats.min, stats.mean, stats.max
        ),
        &range_attrs,
    );
}

/// Swatches stack upward from the baseline so the lowest value sits at the
/// bottom; one label per threshold, including the final maximum.
fn draw_legend(surface: &mut dyn Surface, scale: &ColorScale, chart: &ChartConfig) {
    let steps = chart.legend_steps.max(1);
    let values = legend::thresholds(scale.stats(), steps);
    let rect_h = chart.height / steps as f64;

    surface.open_group(&[
        ("id", "legend".to_string()),
        (
            "transform",
            translate(
                chart.outer_width() - chart.padding_left - chart.padding_right,
                chart.outer_height() - chart.padding_bottom,
            ),
        ),
    ]);

    for (i, (_, color)) in legend::swatches(&values, scale).iter().enumerate() {
        surface.rect(
            0.0,
            -(i as f64 + 1.0) * rect_h,
            chart.legend_rect_width,
            rect_h,
            &[
                ("class", "legend-rect".to_string()),
                ("fill", color.to_hex()),
                ("stroke", "white".to_string()),
            ],
        );
    }

    for (i, value) in values.iter().enumerate() {
        surface.text(
            &format!("{}%", value),
            &[
                ("class", "legend-label".to_string()),
                ("x", fmt_num(chart.legend_label_spacing)),
                ("y", fmt_num(-(i as f64) * rect_h)),
            ],
        );
    }

    surface.close_group();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountyShape;
    use geo::polygon;

    #[derive(Debug, PartialEq)]
    enum Op {
        OpenGroup(Vec<(String, String)>),
        CloseGroup,
        Path(Vec<(String, String)>),
        Rect(Vec<(String, String)>),
        Text(String, Vec<(String, String)>),
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    fn owned(attrs: &[(&str, String)]) -> Vec<(String, String)> {
        attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    impl Surface for RecordingSurface {
        fn open_group(&mut self, attrs: &[(&str, String)]) {
            self.ops.push(Op::OpenGroup(owned(attrs)));
        }
        fn close_group(&mut self) {
            self.ops.push(Op::CloseGroup);
        }
        fn path(&mut self, _d: &str, attrs: &[(&str, String)]) {
            self.ops.push(Op::Path(owned(attrs)));
        }
        fn rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, attrs: &[(&str, String)]) {
            self.ops.push(Op::Rect(owned(attrs)));
        }
        fn text(&mut self, content: &str, attrs: &[(&str, String)]) {
            self.ops.push(Op::Text(content.to_string(), owned(attrs)));
        }
    }

    impl RecordingSurface {
        fn attr_of<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
            attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        fn county_fills(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Path(attrs) if Self::attr_of(attrs, "class") == Some("county") => {
                        Self::attr_of(attrs, "fill").map(str::to_string)
                    }
                    _ => None,
                })
                .collect()
        }
    }

    fn square(offset: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: offset, y: 0.0),
            (x: offset + 10.0, y: 0.0),
            (x: offset + 10.0, y: 10.0),
            (x: offset, y: 10.0),
            (x: offset, y: 0.0),
        ]])
    }

    fn rec(fips: u32, pct: f64) -> EducationRecord {
        EducationRecord {
            fips,
            area_name: format!("County {}", fips),
            state: "TS".to_string(),
            bachelors_or_higher: pct,
        }
    }

    fn shapes(ids: &[u32]) -> MapShapes {
        MapShapes {
            counties: ids
                .iter()
                .map(|&fips| CountyShape {
                    fips,
                    geometry: square(fips as f64 * 20.0),
                })
                .collect(),
            state_borders: vec![square(0.0)],
        }
    }

    #[test]
    fn three_counties_get_the_three_control_colors() {
        let records = vec![rec(1, 10.0), rec(2, 50.0), rec(3, 90.0)];
        let mut surface = RecordingSurface::default();
        draw_choropleth(&records, &shapes(&[1, 2, 3]), &ChartConfig::default(), &mut surface)
            .unwrap();
        assert_eq!(
            surface.county_fills(),
            vec!["#c21d00", "#ffff33", "#00941b"]
        );
    }

    #[test]
    fn unmatched_county_aborts_before_anything_is_drawn() {
        let records = vec![rec(1, 10.0), rec(2, 50.0), rec(3, 90.0)];
        let mut surface = RecordingSurface::default();
        let err =
            draw_choropleth(&records, &shapes(&[1, 2, 4]), &ChartConfig::default(), &mut surface)
                .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ChartError::JoinMismatch { fips: 4 }
        ));
        assert!(surface.ops.is_empty(), "abort-all must emit nothing");
    }

    #[test]
    fn county_paths_carry_inspectable_metadata() {
        let records = vec![rec(1, 10.0), rec(2, 50.0), rec(3, 90.0)];
        let mut surface = RecordingSurface::default();
        draw_choropleth(&records, &shapes(&[2]), &ChartConfig::default(), &mut surface).unwrap();
        let county = surface
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Path(attrs) if RecordingSurface::attr_of(attrs, "class") == Some("county") => {
                    Some(attrs.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(RecordingSurface::attr_of(&county, "data-fips"), Some("2"));
        assert_eq!(
            RecordingSurface::attr_of(&county, "data-education"),
            Some("50")
        );
    }

    #[test]
    fn state_borders_are_unfilled_outlines() {
        let records = vec![rec(1, 10.0), rec(2, 50.0), rec(3, 90.0)];
        let mut surface = RecordingSurface::default();
        draw_choropleth(&records, &shapes(&[1]), &ChartConfig::default(), &mut surface).unwrap();
        let state = surface
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Path(attrs) if RecordingSurface::attr_of(attrs, "class") == Some("state") => {
                    Some(attrs.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(RecordingSurface::attr_of(&state, "fill"), Some("none"));
        assert_eq!(RecordingSurface::attr_of(&state, "stroke"), Some("#322a2a"));
        assert!(RecordingSurface::attr_of(&state, "data-fips").is_none());
    }

    #[test]
    fn legend_has_steps_swatches_and_steps_plus_one_labels() {
        let records = vec![rec(1, 10.0), rec(2, 50.0), rec(3, 90.0)];
        let mut surface = RecordingSurface::default();
        draw_choropleth(&records, &shapes(&[1]), &ChartConfig::default(), &mut surface).unwrap();
        let swatches = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Rect(attrs) if RecordingSurface::attr_of(attrs, "class") == Some("legend-rect")))
            .count();
        let labels = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Text(_, attrs) if RecordingSurface::attr_of(attrs, "class") == Some("legend-label")))
            .count();
        assert_eq!(swatches, 10);
        assert_eq!(labels, 11);
    }

    #[test]
    fn ring_path_closes_with_z_and_drops_duplicate_endpoint() {
        let d = path_data(&square(0.0));
        assert_eq!(d, "M0,0L10,0L10,10L0,10Z");
    }

    #[test]
    fn svg_surface_emits_balanced_document() {
        let mut surface = SvgSurface::new(100.0, 50.0);
        surface.open_group(&[("id", "g1".to_string())]);
        surface.path("M0,0Z", &[("fill", "#112233".to_string())]);
        surface.text("5 < 6", &[]);
        let svg = surface.finish();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r##"<path d="M0,0Z" fill="#112233"/>"##));
        assert!(svg.contains("5 &lt; 6"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }
}
