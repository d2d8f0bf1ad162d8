use http::header::{ACCEPT, CONTENT_TYPE};
use http::request::Parts;
use http::{HeaderMap, HeaderName};

/// Header carrying an explicit status code (set by ingress controllers)
pub const CODE_HEADER: &str = "x-code";
/// Header carrying the original request's media type (set by ingress controllers)
pub const FORMAT_HEADER: &str = "x-format";

/// Code used whenever the request does not yield a parsable one
const DEFAULT_CODE: i64 = 404;

/// Shortest `X-Format` value worth matching
const MIN_FORMAT_LEN: usize = 3;
/// Shortest `Content-Type` value treated as present
const MIN_CONTENT_TYPE_LEN: usize = 5;

/// Media representation of an error document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Representation {
    #[default]
    Unknown,
    Json,
    Html,
    PlainText,
}

/// Case-insensitive substring → representation table, checked in order
const MIME_TABLE: &[(&str, Representation)] = &[
    ("application/json", Representation::Json),
    ("text/json", Representation::Json),
    ("+json", Representation::Json),
    ("text/html", Representation::Html),
    ("application/xhtml+xml", Representation::Html),
    ("text/plain", Representation::PlainText),
];

impl Representation {
    /// Classify a MIME type (or any string containing one)
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();

        MIME_TABLE
            .iter()
            .find(|(needle, _)| mime.contains(needle))
            .map_or(Self::Unknown, |(_, representation)| *representation)
    }

    /// Classify a path extension (without the leading dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "html" | "htm" => Self::Html,
            "txt" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Resolve `Unknown` to the default representation
    #[must_use]
    pub const fn or_default(self) -> Self {
        match self {
            Self::Unknown => Self::Html,
            other => other,
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// `Content-Type` value for responses in this representation
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Html | Self::Unknown => "text/html; charset=utf-8",
        }
    }
}

/// One entry of an `Accept`-style list
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub mime: String,
    pub weight: f32,
}

/// Parse a comma-separated `type;q=weight` list
///
/// A missing or malformed weight counts as `1.0`. Empty tokens are dropped.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut params = token.split(';');
            let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();

            let weight = params
                .filter_map(|param| {
                    let (key, value) = param.split_once('=')?;
                    key.trim().eq_ignore_ascii_case("q").then_some(value.trim())
                })
                .next_back()
                .and_then(|value| value.parse::<f32>().ok())
                .filter(|weight| (0.0..=1.0).contains(weight))
                .unwrap_or(1.0);

            MediaRange { mime, weight }
        })
        .collect()
}

/// Pick the representation of the highest-weight entry
///
/// Equal weights keep their listed order, so the first-listed type wins.
fn negotiate_accept(header: &str) -> Representation {
    let mut ranges = parse_accept(header);

    match ranges.len() {
        0 => Representation::Unknown,
        1 => Representation::from_mime(&ranges[0].mime),
        _ => {
            ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
            Representation::from_mime(&ranges[0].mime)
        }
    }
}

/// Decide which representation the caller wants
///
/// Sources are consulted in order and the first one that yields a known
/// representation wins: `X-Format`, `Content-Type`, `Accept`, then the
/// extension of the last path segment. `Unknown` means "use the default".
pub fn negotiate(parts: &Parts) -> Representation {
    let headers = &parts.headers;

    if let Some(format) =
        header_str(headers, &HeaderName::from_static(FORMAT_HEADER)).filter(|value| value.len() >= MIN_FORMAT_LEN)
    {
        let representation = Representation::from_mime(format);
        if representation.is_known() {
            return representation;
        }
        tracing::debug!(format, "unrecognized format header");
    }

    if let Some(content_type) = header_str(headers, &CONTENT_TYPE).filter(|value| value.len() >= MIN_CONTENT_TYPE_LEN) {
        let representation = Representation::from_mime(content_type);
        if representation.is_known() {
            return representation;
        }
    }

    if let Some(accept) = header_str(headers, &ACCEPT) {
        let representation = negotiate_accept(accept);
        if representation.is_known() {
            return representation;
        }
    }

    let from_path = last_segment(parts.uri.path())
        .and_then(|segment| segment.rsplit_once('.'))
        .map_or(Representation::Unknown, |(_, ext)| Representation::from_extension(ext));

    if !from_path.is_known() {
        tracing::debug!(path = parts.uri.path(), "format not specified, using default");
    }

    from_path
}

/// Extract the requested status code
///
/// `X-Code` wins over the path. A code that does not parse becomes `404`,
/// as does the root path. The result is not validated here; see
/// [`crate::coerce_status`].
pub fn extract_code(parts: &Parts) -> i64 {
    if let Some(value) = header_str(&parts.headers, &HeaderName::from_static(CODE_HEADER)) {
        return value.parse().unwrap_or_else(|e| {
            tracing::info!(error = %e, code = value, "failed to parse code header");
            DEFAULT_CODE
        });
    }

    let Some(segment) = last_segment(parts.uri.path()) else {
        return DEFAULT_CODE;
    };

    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);

    stem.parse().unwrap_or_else(|e| {
        tracing::info!(error = %e, code = stem, "failed to parse path");
        DEFAULT_CODE
    })
}

/// Trimmed, non-empty header value
fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Last non-empty path segment; `None` for the root
fn last_segment(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
