// src/discovery.rs
// =============================================================================
// Discovery records and the categories they belong to.
//
// Everything the spider reports is a Discovery: what kind of thing it is,
// the value that was found and the URL it was found on. Discoveries are
// emitted once and never changed afterwards.
//
// This file also holds the extension table that decides whether a URL is a
// script/data asset (pulled through the asset queue) or a regular page.
// =============================================================================

use std::fmt;
use url::Url;

/// The closed set of things the spider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// A fetched URL together with its status code
    Url,
    Href,
    Form,
    /// A page that contains a file upload input
    UploadForm,
    Javascript,
    Subdomain,
    Bucket,
    Sitemap,
    Robots,
    /// A historical URL returned by one of the archive providers
    OtherSource,
    /// A path pulled out of a script or data body
    Linkfinder,
}

impl Category {
    /// Label used in `[label] - value` lines and in the JSON `type` field
    pub fn label(self) -> &'static str {
        match self {
            Category::Url => "url",
            Category::Href => "href",
            Category::Form => "form",
            Category::UploadForm => "upload-form",
            Category::Javascript => "javascript",
            Category::Subdomain => "subdomains",
            Category::Bucket => "aws-s3",
            Category::Sitemap => "sitemap",
            Category::Robots => "robots",
            Category::OtherSource => "other-sources",
            Category::Linkfinder => "linkfinder",
        }
    }

    /// Whether values in this category are URLs (and deduplicated as such)
    pub fn is_url_valued(self) -> bool {
        !matches!(self, Category::Subdomain | Category::Bucket)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single finding, as handed to the output sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub category: Category,
    pub value: String,
    /// The URL (or site) the value was found on
    pub source: String,
    pub status: Option<u16>,
    pub length: Option<usize>,
}

impl Discovery {
    pub fn new(category: Category, value: impl Into<String>, source: impl Into<String>) -> Self {
        Discovery {
            category,
            value: value.into(),
            source: source.into(),
            status: None,
            length: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }
}

/// How a URL is treated when it points at a script or data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Data,
    SourceMap,
}

// Extension -> asset classification. Anything not listed is a page.
const ASSET_EXTENSIONS: &[(&str, AssetKind)] = &[
    ("js", AssetKind::Script),
    ("json", AssetKind::Data),
    ("xml", AssetKind::Data),
    ("map", AssetKind::SourceMap),
];

impl AssetKind {
    /// Classifies a URL by the extension of its last path segment
    pub fn of(url: &Url) -> Option<AssetKind> {
        let ext = extension(url)?;
        ASSET_EXTENSIONS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    /// Same as `of`, restricted to what a `src` attribute may pull in.
    /// Source maps are only followed when a script references them.
    pub fn from_src(url: &Url) -> Option<AssetKind> {
        Self::of(url).filter(|kind| *kind != AssetKind::SourceMap)
    }
}

/// Extension of the last path segment, without the dot
pub fn extension(url: &Url) -> Option<&str> {
    let segment = url.path().rsplit('/').next()?;
    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// The non-minified twin of a `.min.js` URL.
///
/// One literal substitution only: `app.min.js` becomes `app.js`, and the
/// result is never searched again for further variants.
pub fn unminified(url: &Url) -> Option<Url> {
    let raw = url.as_str();
    if !raw.contains(".min.js") {
        return None;
    }
    Url::parse(&raw.replace(".min.js", ".js")).ok()
}
