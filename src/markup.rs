//! Tolerant parser for vector-image markup.
//!
//! Produces a view box plus a document-ordered list of primitive nodes, which
//! is all the renderer and the inner-element hit test need. Unknown elements
//! and attributes are skipped; structural problems (no root element, an
//! unterminated tag, an unusable view box) are reported as typed errors so a
//! shape is never constructed from bad markup.
//!
//! Coordinates are plain `f64` in the markup's own local space. The zoom
//! envelope does not apply here: a vector image is placed in the world by its
//! owning shape, and its internal geometry never spans extreme magnitudes.

#[cfg(test)]
#[path = "markup_test.rs"]
mod markup_test;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("markup has no <svg> root element")]
    NoRoot,
    #[error("unterminated tag")]
    UnterminatedTag,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("root element has no usable viewBox or width/height")]
    MissingViewBox,
    #[error("viewBox has non-positive dimensions")]
    BadViewBox,
}

/// Local coordinate frame of the markup. Primitive coordinates are relative
/// to `(x, y)` and span `width × height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A drawable primitive in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Polygon (`closed`) or polyline (`!closed`).
    Poly { points: Vec<(f64, f64)>, closed: bool },
    /// Path flattened to its segment endpoints. Curves contribute their
    /// endpoint only; that is enough for picking and placeholder rendering.
    Path { subpaths: Vec<Subpath> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupDoc {
    pub view_box: ViewBox,
    pub nodes: Vec<Node>,
}

impl MarkupDoc {
    /// Width over height of the view box. The parser rejects non-positive
    /// dimensions, so this is always finite and positive.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.view_box.width / self.view_box.height
    }
}

/// Parse markup into a [`MarkupDoc`].
pub fn parse(src: &str) -> Result<MarkupDoc, MarkupError> {
    let mut nodes = Vec::new();
    let mut view_box: Option<ViewBox> = None;
    let mut seen_root = false;
    let mut rest = src;

    while let Some(lt) = rest.find('<') {
        rest = &rest[lt + 1..];
        if let Some(after) = rest.strip_prefix("!--") {
            let end = after.find("-->").ok_or(MarkupError::UnterminatedComment)?;
            rest = &after[end + 3..];
            continue;
        }
        if rest.starts_with('/') || rest.starts_with('!') || rest.starts_with('?') {
            let end = rest.find('>').ok_or(MarkupError::UnterminatedTag)?;
            rest = &rest[end + 1..];
            continue;
        }
        let end = rest.find('>').ok_or(MarkupError::UnterminatedTag)?;
        let tag = rest[..end].trim_end_matches('/');
        rest = &rest[end + 1..];

        let name_len = tag
            .find(|c: char| c.is_whitespace())
            .unwrap_or(tag.len());
        let name = &tag[..name_len];
        let attrs = &tag[name_len..];

        match name {
            "svg" => {
                if !seen_root {
                    seen_root = true;
                    view_box = root_view_box(attrs);
                }
            }
            "rect" => nodes.push(Node::Rect {
                x: num_attr(attrs, "x"),
                y: num_attr(attrs, "y"),
                width: num_attr(attrs, "width"),
                height: num_attr(attrs, "height"),
            }),
            "circle" => nodes.push(Node::Circle {
                cx: num_attr(attrs, "cx"),
                cy: num_attr(attrs, "cy"),
                r: num_attr(attrs, "r"),
            }),
            "ellipse" => nodes.push(Node::Ellipse {
                cx: num_attr(attrs, "cx"),
                cy: num_attr(attrs, "cy"),
                rx: num_attr(attrs, "rx"),
                ry: num_attr(attrs, "ry"),
            }),
            "line" => nodes.push(Node::Line {
                x1: num_attr(attrs, "x1"),
                y1: num_attr(attrs, "y1"),
                x2: num_attr(attrs, "x2"),
                y2: num_attr(attrs, "y2"),
            }),
            "polygon" | "polyline" => {
                let points = parse_points(attr(attrs, "points").unwrap_or_default());
                if points.len() >= 2 {
                    nodes.push(Node::Poly { points, closed: name == "polygon" });
                }
            }
            "path" => {
                let subpaths = parse_path(attr(attrs, "d").unwrap_or_default());
                if !subpaths.is_empty() {
                    nodes.push(Node::Path { subpaths });
                }
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(MarkupError::NoRoot);
    }
    let view_box = view_box.ok_or(MarkupError::MissingViewBox)?;
    if view_box.width <= 0.0 || view_box.height <= 0.0 {
        return Err(MarkupError::BadViewBox);
    }
    Ok(MarkupDoc { view_box, nodes })
}

fn root_view_box(attrs: &str) -> Option<ViewBox> {
    if let Some(vb) = attr(attrs, "viewBox") {
        let parts: Vec<f64> = vb
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .flat_map(str::parse::<f64>)
            .collect();
        if let [x, y, width, height] = parts[..] {
            return Some(ViewBox { x, y, width, height });
        }
    }
    let width = num_attr_opt(attrs, "width")?;
    let height = num_attr_opt(attrs, "height")?;
    Some(ViewBox { x: 0.0, y: 0.0, width, height })
}

/// Find `name="value"` (or single-quoted) inside a tag's attribute text.
fn attr<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = attrs;
    while let Some(pos) = rest.find(name) {
        let before_ok = pos == 0
            || rest[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        let after = &rest[pos + name.len()..];
        let after_eq = after.trim_start();
        if before_ok && after_eq.starts_with('=') {
            let value = after_eq[1..].trim_start();
            let quote = value.chars().next()?;
            if quote == '"' || quote == '\'' {
                let body = &value[1..];
                let close = body.find(quote)?;
                return Some(&body[..close]);
            }
        }
        rest = &rest[pos + name.len()..];
    }
    None
}

fn num_attr(attrs: &str, name: &str) -> f64 {
    num_attr_opt(attrs, name).unwrap_or(0.0)
}

fn num_attr_opt(attrs: &str, name: &str) -> Option<f64> {
    // Tolerate a unit suffix such as "10px".
    let raw = attr(attrs, name)?.trim();
    let digits = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e' || c == 'E'))
        .map_or(raw, |end| &raw[..end]);
    match digits.parse() {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

fn parse_points(raw: &str) -> Vec<(f64, f64)> {
    let coords: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .flat_map(str::parse::<f64>)
        .collect();
    coords.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

/// Flatten a path `d` attribute to subpath endpoint sequences. Supported
/// commands: M/L/H/V/Z plus the curve commands C/S/Q/T/A, which contribute
/// their endpoints only.
fn parse_path(d: &str) -> Vec<Subpath> {
    let mut subpaths = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut pos = (0.0_f64, 0.0_f64);
    let mut start = (0.0_f64, 0.0_f64);
    let mut cmd = ' ';
    let mut tokens = PathTokens { rest: d };

    while let Some(token) = tokens.next_token() {
        let first = match token {
            PathToken::Command(c) => {
                cmd = c;
                if matches!(c, 'Z' | 'z') {
                    if !current.is_empty() {
                        subpaths.push(Subpath { points: std::mem::take(&mut current), closed: true });
                    }
                    pos = start;
                }
                continue;
            }
            PathToken::Number(n) => n,
        };
        let relative = cmd.is_ascii_lowercase();
        let end = match cmd.to_ascii_uppercase() {
            'M' | 'L' | 'T' => {
                let y = tokens.next_number().unwrap_or(0.0);
                apply(pos, first, y, relative)
            }
            'H' => {
                let x = if relative { pos.0 + first } else { first };
                (x, pos.1)
            }
            'V' => {
                let y = if relative { pos.1 + first } else { first };
                (pos.0, y)
            }
            'C' => last_pair(&mut tokens, pos, first, 5, relative),
            'S' | 'Q' => last_pair(&mut tokens, pos, first, 3, relative),
            'A' => last_pair(&mut tokens, pos, first, 6, relative),
            _ => continue,
        };
        if cmd == 'M' || cmd == 'm' {
            if !current.is_empty() {
                subpaths.push(Subpath { points: std::mem::take(&mut current), closed: false });
            }
            start = end;
            // Subsequent implicit pairs after a moveto are linetos.
            cmd = if relative { 'l' } else { 'L' };
        }
        pos = end;
        current.push(end);
    }
    if !current.is_empty() {
        subpaths.push(Subpath { points: current, closed: false });
    }
    subpaths
}

fn apply(pos: (f64, f64), x: f64, y: f64, relative: bool) -> (f64, f64) {
    if relative { (pos.0 + x, pos.1 + y) } else { (x, y) }
}

/// Consume the remaining arguments of a multi-argument segment and return
/// its endpoint. `first` is the already-read first argument and `remaining`
/// the count still in the stream; the last two are the endpoint.
fn last_pair(
    tokens: &mut PathTokens<'_>,
    pos: (f64, f64),
    first: f64,
    remaining: usize,
    relative: bool,
) -> (f64, f64) {
    let mut args = Vec::with_capacity(remaining + 1);
    args.push(first);
    for _ in 0..remaining {
        args.push(tokens.next_number().unwrap_or(0.0));
    }
    let y = args[args.len() - 1];
    let x = args[args.len() - 2];
    apply(pos, x, y, relative)
}

enum PathToken {
    Command(char),
    Number(f64),
}

struct PathTokens<'a> {
    rest: &'a str,
}

impl PathTokens<'_> {
    fn next_token(&mut self) -> Option<PathToken> {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        let c = self.rest.chars().next()?;
        if c.is_ascii_alphabetic() {
            self.rest = &self.rest[1..];
            return Some(PathToken::Command(c));
        }
        let mut end = 0;
        let bytes = self.rest.as_bytes();
        if bytes[end] == b'-' || bytes[end] == b'+' {
            end += 1;
        }
        let mut seen_dot = false;
        while end < bytes.len() {
            match bytes[end] {
                b'0'..=b'9' => end += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    end += 1;
                }
                _ => break,
            }
        }
        if end == 0 {
            // Unparsable character; skip it rather than looping forever.
            self.rest = &self.rest[c.len_utf8()..];
            return self.next_token();
        }
        let value = self.rest[..end].parse().unwrap_or(0.0);
        self.rest = &self.rest[end..];
        Some(PathToken::Number(value))
    }

    fn next_number(&mut self) -> Option<f64> {
        match self.next_token()? {
            PathToken::Number(n) => Some(n),
            PathToken::Command(_) => None,
        }
    }
}
