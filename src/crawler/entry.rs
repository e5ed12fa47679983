use crate::crawler::parser::FileDetail;
use serde::Serialize;

/// Kind of page behind a listing link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A directory listing page
    Directory,
    /// A file detail page
    File,
}

impl PageKind {
    /// Classifies a link target: file pages carry the file marker segment
    pub fn classify(href: &str, file_marker: &str) -> Self {
        if href.contains(file_marker) {
            PageKind::File
        } else {
            PageKind::Directory
        }
    }
}

/// One file discovered during a walk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Display name from the listing row
    pub name: String,

    /// Link to the file's detail page, unique within one walk
    pub content_url: String,

    /// Number of lines, 0 when unknown
    pub line_count: u64,

    /// Size normalized to bytes, 0 when unknown
    pub size_bytes: f64,

    /// Grouping key derived from `name`
    pub extension: String,
}

impl FileEntry {
    /// Creates an entry for a file row whose detail page is not yet visited
    pub fn new(name: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_url: content_url.into(),
            line_count: 0,
            size_bytes: 0.0,
            extension: String::new(),
        }
    }

    /// Fills the fields read from the detail page
    pub fn record_detail(&mut self, detail: FileDetail) {
        self.line_count = detail.line_count;
        self.size_bytes = detail.size_bytes.unwrap_or(0.0);
        self.extension = extension_of(&self.name).to_string();
    }
}

/// Derives the extension of a file name
///
/// The extension is the text after the last `.`; a name without a dot is its
/// own extension.
///
/// ```
/// use repo_census::crawler::extension_of;
///
/// assert_eq!(extension_of("README.md"), "md");
/// assert_eq!(extension_of("LICENSE"), "LICENSE");
/// ```
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) => &name[index + 1..],
        None => name,
    }
}
