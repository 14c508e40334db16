//! Well-Known Text codec for polygons
//!
//! Grammar accepted by [`decode`]:
//!
//! ```text
//! ["SRID=" digits ";"] "POLYGON" "(" ring {"," ring} ")"
//! ring  := "(" point {"," point} ")"
//! point := float whitespace float
//! ```
//!
//! Whitespace is allowed around parentheses and commas, and the keyword is
//! matched case-insensitively.

use std::fmt;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::format::format_pair;
use super::polygon::{LinearRing, Polygon};
use crate::coordinate::Point;
use crate::errors::{GeoError, GeoResult};

const KEYWORD: &str = "POLYGON";

lazy_static! {
    static ref SRID_PREFIX: Regex = Regex::new(r"^\s*SRID=(\d+);")
        .expect("SRID prefix pattern is valid");
}

/// Decode a polygon, returning it with its SRID
///
/// The SRID comes from the `SRID=<n>;` prefix when present, otherwise
/// `default_srid` is used.
pub fn decode(text: &str, default_srid: u32) -> GeoResult<(Polygon, u32)> {
    let (polygon, srid) = decode_with_srid(text)?;
    Ok((polygon, srid.unwrap_or(default_srid)))
}

/// Decode a polygon, returning the SRID only when the text carries a prefix
pub fn decode_with_srid(text: &str) -> GeoResult<(Polygon, Option<u32>)> {
    let (srid, body) = split_srid(text)?;
    let polygon = WktParser::new(body).parse_polygon()?;

    debug!("Decoded polygon with {} ring(s), {} vertices, SRID {:?}",
           polygon.rings().len(), polygon.vertex_count(), srid);

    Ok((polygon, srid))
}

/// Encode a polygon, optionally prefixed with `SRID=<n>;`
pub fn encode(polygon: &Polygon, srid: u32, include_prefix: bool) -> String {
    let mut out = String::new();
    if include_prefix {
        out.push_str(&format!("SRID={};", srid));
    }
    out.push_str(KEYWORD);
    out.push('(');

    for (i, ring) in polygon.rings().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('(');
        let pairs: Vec<String> = ring.points().iter().map(|p| format_pair(p.x, p.y)).collect();
        out.push_str(&pairs.join(","));
        out.push(')');
    }

    out.push(')');
    out
}

/// Split the optional `SRID=<n>;` prefix off the geometry text
fn split_srid(text: &str) -> GeoResult<(Option<u32>, &str)> {
    if let Some(caps) = SRID_PREFIX.captures(text) {
        let digits = &caps[1];
        let srid = digits.parse::<u32>().map_err(|_| {
            GeoError::MalformedGeometry(format!("SRID '{}' is out of range", digits))
        })?;
        return Ok((Some(srid), &text[caps[0].len()..]));
    }

    if text.trim_start().to_ascii_uppercase().starts_with("SRID") {
        return Err(GeoError::MalformedGeometry("invalid SRID prefix".to_string()));
    }

    Ok((None, text))
}

/// Cursor over the text of a WKT polygon
struct WktParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> WktParser<'a> {
    fn new(input: &'a str) -> Self {
        WktParser { input, pos: 0 }
    }

    fn parse_polygon(&mut self) -> GeoResult<Polygon> {
        self.skip_whitespace();
        self.expect_keyword()?;
        self.skip_whitespace();
        self.expect('(')?;

        let mut rings = Vec::new();
        loop {
            rings.push(self.parse_ring()?);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some(')') => break,
                other => return Err(self.unexpected(other, "',' or ')' after ring")),
            }
        }

        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!("unexpected trailing content '{}'", &self.input[self.pos..])));
        }

        Polygon::new(rings)
    }

    fn parse_ring(&mut self) -> GeoResult<LinearRing> {
        self.skip_whitespace();
        self.expect('(')?;

        let mut points = Vec::new();
        loop {
            points.push(self.parse_point()?);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some(')') => break,
                other => return Err(self.unexpected(other, "',' or ')' after point")),
            }
        }

        LinearRing::new(points)
    }

    fn parse_point(&mut self) -> GeoResult<Point> {
        self.skip_whitespace();
        let x = self.parse_number()?;

        if !self.peek().map_or(false, |c| c.is_whitespace()) {
            return Err(self.unexpected(self.peek(), "whitespace between ordinates"));
        }
        self.skip_whitespace();
        let y = self.parse_number()?;

        Ok(Point::new(x, y))
    }

    fn parse_number(&mut self) -> GeoResult<f64> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == '(' || c == ')' {
                break;
            }
            self.pos += c.len_utf8();
        }

        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Err(self.unexpected(self.peek(), "a number"));
        }

        let value = token.parse::<f64>()
            .map_err(|_| self.error(format!("'{}' is not a number", token)))?;
        if !value.is_finite() {
            return Err(self.error(format!("'{}' is not a finite number", token)));
        }
        // -0 reads as 0
        Ok(if value == 0.0 { 0.0 } else { value })
    }

    fn expect_keyword(&mut self) -> GeoResult<()> {
        let rest = &self.input[self.pos..];
        match rest.get(..KEYWORD.len()) {
            Some(word) if word.eq_ignore_ascii_case(KEYWORD) => {
                self.pos += KEYWORD.len();
                Ok(())
            }
            _ => {
                let found: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
                Err(self.error(format!("expected POLYGON, found '{}'", found)))
            }
        }
    }

    fn expect(&mut self, expected: char) -> GeoResult<()> {
        match self.next_char() {
            Some(c) if c == expected => Ok(()),
            other => Err(self.unexpected(other, &format!("'{}'", expected))),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self, found: Option<char>, expected: &str) -> GeoError {
        match found {
            Some(c) => self.error(format!("expected {}, found '{}'", expected, c)),
            None => self.error(format!("expected {}, found end of input", expected)),
        }
    }

    fn error(&self, msg: String) -> GeoError {
        GeoError::MalformedGeometry(format!("{} (at offset {})", msg, self.pos))
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self, 0, false))
    }
}
