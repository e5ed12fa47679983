use serde::Deserialize;

/// Main configuration structure for Repo-Census
///
/// Every section is optional; missing sections fall back to defaults that
/// target the public GitHub web interface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Tree walk behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Host that repository-relative paths are resolved against
    pub base_url: String,

    /// Maximum directory nesting followed below the repository root
    pub max_depth: u32,

    /// Maximum number of pages fetched concurrently within one walk
    pub max_concurrent_fetches: u32,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Fail the walk when a file page has no size header
    pub strict_size_header: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com/".to_string(),
            max_depth: 64,
            max_concurrent_fetches: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            strict_size_header: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "repo-census".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/repo-census".to_string(),
            contact_email: "repo-census@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// SQLite file for a persistent cache; in-memory when unset
    pub database_path: Option<String>,

    /// Capacity of the in-memory cache
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_entries: 256,
        }
    }
}

/// CSS selectors used to read listing and file pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Rows of a directory listing
    pub listing_row: String,

    /// Entry link inside a listing row
    pub row_anchor: String,

    /// Rows of the file content table
    pub content_row: String,

    /// Cell carrying the line number inside a content row
    pub line_number_cell: String,

    /// Attribute of the line-number cell holding the number
    pub line_number_attribute: String,

    /// Header node carrying the file size text
    pub size_header: String,

    /// Link segment marking a file detail page
    pub file_marker: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_row: "[aria-labelledby^='files'] div.Box-row".to_string(),
            row_anchor: "div[role='rowheader'] span a".to_string(),
            content_row: "table.highlight tbody tr".to_string(),
            line_number_cell: "td".to_string(),
            line_number_attribute: "data-line-number".to_string(),
            size_header: "div.Box-header div.text-mono".to_string(),
            file_marker: "/blob/".to_string(),
        }
    }
}
