//! Tile URL templates.
//!
//! A template such as `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
//! is parsed once into segments and then resolved for any tile coordinate.
//! Resolution is a pure function of the coordinate: the zoom comes from the
//! coordinate itself, so nothing is mutated while enumerating tiles.

use std::collections::HashMap;

use thiserror::Error;

use super::key::KeyResolver;
use super::request::TileRequest;
use crate::coord::TileCoord;

/// Errors from template parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),

    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("template uses {{s}} but no subdomains are configured")]
    NoSubdomains,
}

/// Options that influence how placeholders are substituted.
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Subdomains rotated through `{s}`. The first is canonical for keys.
    pub subdomains: Vec<String>,
    /// Flip `{y}` to the TMS convention.
    pub tms: bool,
    /// Added to the zoom written into `{z}`.
    pub zoom_offset: i32,
    /// Write `max_zoom - zoom` into `{z}`.
    pub zoom_reverse: bool,
    /// Reference zoom for `zoom_reverse`.
    pub max_zoom: u8,
    /// Substitute `@2x` for `{r}`.
    pub retina: bool,
    /// Values for any additional named placeholders (e.g. `{apikey}`).
    pub extra: HashMap<String, String>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            tms: false,
            zoom_offset: 0,
            zoom_reverse: false,
            max_zoom: 19,
            retina: false,
            extra: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Subdomain,
    Zoom,
    X,
    Y,
    InvertedY,
}

/// A parsed tile URL template.
#[derive(Debug, Clone)]
pub struct TileUrlTemplate {
    source: String,
    segments: Vec<Segment>,
    options: TemplateOptions,
    keys: KeyResolver,
}

impl TileUrlTemplate {
    /// Parses a template with the given options.
    pub fn parse(template: &str, options: TemplateOptions) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template.char_indices();

        while let Some((pos, ch)) = rest.next() {
            match ch {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in rest.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        if c == '{' {
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }

                    let segment = match name.as_str() {
                        "s" => {
                            if options.subdomains.is_empty() {
                                return Err(TemplateError::NoSubdomains);
                            }
                            Segment::Subdomain
                        }
                        "z" => Segment::Zoom,
                        "x" => Segment::X,
                        "y" => Segment::Y,
                        "-y" => Segment::InvertedY,
                        "r" => {
                            if options.retina {
                                literal.push_str("@2x");
                            }
                            continue;
                        }
                        other => match options.extra.get(other) {
                            Some(value) => {
                                literal.push_str(value);
                                continue;
                            }
                            None => {
                                return Err(TemplateError::UnknownPlaceholder(other.to_string()))
                            }
                        },
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' => return Err(TemplateError::UnexpectedClose(pos)),
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let keys = KeyResolver::new(&options.subdomains);
        Ok(Self {
            source: template.to_string(),
            segments,
            options,
            keys,
        })
    }

    /// The template string as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn subdomains(&self) -> &[String] {
        &self.options.subdomains
    }

    /// Builds the fetch URL for a tile.
    pub fn resolve(&self, coord: &TileCoord) -> String {
        let mut url = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Subdomain => url.push_str(self.subdomain_for(coord)),
                Segment::Zoom => url.push_str(&self.url_zoom(coord.z).to_string()),
                Segment::X => url.push_str(&coord.x.to_string()),
                Segment::Y => {
                    let y = if self.options.tms {
                        coord.inverted_y()
                    } else {
                        coord.y
                    };
                    url.push_str(&y.to_string());
                }
                Segment::InvertedY => url.push_str(&coord.inverted_y().to_string()),
            }
        }
        url
    }

    /// Canonical cache key for a URL produced by this template.
    pub fn key_for(&self, url: &str) -> String {
        self.keys.resolve(url)
    }

    /// Resolves both the URL and the cache key for a tile.
    pub fn request_for(&self, coord: TileCoord) -> TileRequest {
        let url = self.resolve(&coord);
        let key = self.key_for(&url);
        TileRequest::new(coord, key, url)
    }

    fn subdomain_for(&self, coord: &TileCoord) -> &str {
        let subdomains = &self.options.subdomains;
        // parse() guarantees a non-empty list whenever {s} is present.
        let index = coord.x.wrapping_add(coord.y).unsigned_abs() % subdomains.len() as u64;
        &subdomains[index as usize]
    }

    fn url_zoom(&self, zoom: u8) -> i64 {
        let zoom = if self.options.zoom_reverse {
            i64::from(self.options.max_zoom) - i64::from(zoom)
        } else {
            i64::from(zoom)
        };
        zoom + i64::from(self.options.zoom_offset)
    }
}
