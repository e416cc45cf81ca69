//! Polygon serialization sink: KML 2.2 placemarks.
//!
//! - Rings are written closed (first vertex repeated) as `x,y,0.0` triples.
//! - One vertex renders as `Point`, two as `LineString`.
//! - Metadata: `name` and `description` become the matching elements, `color`
//!   (aabbggrr) becomes a shared `Style`, anything else goes to `ExtendedData`.

use groi::Coordinate;
use std::borrow::Cow;

const HEADER: &str =
    r#"<?xml version="1.0" encoding="UTF-8"?><kml xmlns="http://www.opengis.net/kml/2.2"><Document>"#;
const FOOTER: &str = "</Document></kml>";

/// Render one placemark (preceded by its `Style`, if a colour is given).
pub fn placemark(ring: &[Coordinate], metadata: &[(String, String)]) -> String {
    let mut style = String::new();
    let mut head = String::new();
    let mut data = String::new();
    for (key, value) in metadata {
        match key.as_str() {
            "name" => head.push_str(&format!("<name>{}</name>", escape(value))),
            "description" => head.push_str(&format!("<description>{}</description>", escape(value))),
            "color" => {
                let color = escape(value.trim());
                style = format!(
                    "<Style id=\"poly-{color}\"><LineStyle><color>{color}</color><width>2</width></LineStyle>\
                     <PolyStyle><color>{color}</color><fill>1</fill><outline>1</outline></PolyStyle></Style>"
                );
                head.push_str(&format!("<styleUrl>#poly-{color}</styleUrl>"));
            }
            _ => data.push_str(&format!(
                "<Data name=\"{}\"><value>{}</value></Data>",
                escape(key),
                escape(value)
            )),
        }
    }

    let extended = if data.is_empty() {
        String::new()
    } else {
        format!("<ExtendedData>{data}</ExtendedData>")
    };
    format!("{style}<Placemark>{head}{extended}{}</Placemark>", geometry(ring))
}

/// Point, LineString or closed Polygon, by vertex count.
fn geometry(ring: &[Coordinate]) -> String {
    match ring {
        [] => String::new(),
        [p] => format!("<Point><coordinates>{},{},0.0</coordinates></Point>", p.x, p.y),
        [_, _] => format!("<LineString><coordinates>{}</coordinates></LineString>", coords(ring, false)),
        _ => format!(
            "<Polygon><outerBoundaryIs><LinearRing><tessellate>0</tessellate>\
             <coordinates>{}</coordinates></LinearRing></outerBoundaryIs></Polygon>",
            coords(ring, true)
        ),
    }
}

/// Wrap placemarks into a complete KML document.
pub fn document<S: AsRef<str>>(placemarks: &[S]) -> String {
    let body_len: usize = placemarks.iter().map(|p| p.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(HEADER.len() + FOOTER.len() + body_len + 2);
    out.push_str(HEADER);
    out.push('\n');
    for p in placemarks {
        out.push_str(p.as_ref());
        out.push('\n');
    }
    out.push_str(FOOTER);
    out.push('\n');
    out
}

fn coords(ring: &[Coordinate], close: bool) -> String {
    let closing = if close { ring.first() } else { None };
    ring.iter()
        .chain(closing)
        .map(|c| format!("{},{},0.0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
