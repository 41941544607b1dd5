//! The PackURI value type: a partname inside an OPC package.
//!
//! PackURIs always begin with a forward slash and use forward slashes as
//! separators (`/ppt/slides/slide1.xml`). The ZIP member name is the same
//! string without the leading slash.

/// URI of the content types item.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// Pseudo-partname of the package itself (source of package relationships).
pub const PACKAGE_URI: &str = "/";

/// A partname within an OPC package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a PackURI; fails unless `uri` starts with `/`.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(Self { uri })
    }

    /// PackURI for a ZIP member name (`ppt/slides/slide1.xml`).
    pub fn from_membername(name: &str) -> Self {
        Self {
            uri: format!("/{}", name.trim_start_matches('/')),
        }
    }

    /// Resolve a relationship target (`../media/image1.png`) against the
    /// directory of its source part (`/ppt/slides`).
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                s => segments.push(s),
            }
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// Directory portion: `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Filename portion: `slide1.xml`.
    pub fn filename(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or("")
    }

    /// Extension without the period, lowercased comparisons are the caller's job.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename.rfind('.').map_or("", |pos| &filename[pos + 1..])
    }

    /// ZIP member name (URI without the leading slash).
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Relative reference from directory `base_uri` to this part, as written in
    /// a `.rels` Target attribute.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = vec![".."; from.len() - common];
        parts.extend_from_slice(&to[common..]);
        parts.join("/")
    }

    /// PackURI of the `.rels` item holding this part's relationships.
    pub fn rels_uri(&self) -> PackURI {
        let rels_filename = format!("{}.rels", self.filename());
        let uri = match self.base_uri() {
            "/" => format!("/_rels/{}", rels_filename),
            base => format!("{}/_rels/{}", base, rels_filename),
        };
        Self { uri }
    }

    /// The full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}
