//! Repository tree walker
//!
//! The walker starts at a repository's root listing and follows every
//! directory link, collecting one [`FileEntry`] per file link and visiting
//! each file's detail page to fill in its line count and size.
//!
//! Work is held in an explicit queue of `(path, kind, depth)` items. Up to
//! `max_concurrent` pages are fetched at once; workers only fetch and parse,
//! and hand their outcome back to the walk loop, which is the single owner of
//! the entry list.
//!
//! Every page carries its position in the tree (the child indices leading to
//! it from the root). Entries are returned sorted by position, so the result
//! is in depth-first listing order whatever order the fetches complete in.

use crate::config::ScraperConfig;
use crate::crawler::entry::{FileEntry, PageKind};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{parse_file_detail, parse_listing, FileDetail, ListingRow, PageSelectors};
use crate::{ParseError, ScrapeError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Child indices from the root listing down to a page
type TreePosition = Vec<u32>;

/// A page waiting to be fetched
#[derive(Debug, Clone)]
struct PendingPage {
    path: String,
    kind: PageKind,
    depth: u32,
    position: TreePosition,
}

/// What a worker learned from one page
enum PageOutcome {
    Listing {
        path: String,
        depth: u32,
        position: TreePosition,
        rows: Vec<ListingRow>,
    },
    Detail {
        path: String,
        detail: FileDetail,
    },
}

/// Walk limits and policies
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Deepest directory level followed (root listing is level 0)
    pub max_depth: u32,

    /// Pages fetched concurrently
    pub max_concurrent: usize,

    /// Treat a file page without size header as an error
    pub strict_size_header: bool,
}

impl From<&ScraperConfig> for WalkOptions {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_concurrent: config.max_concurrent_fetches.max(1) as usize,
            strict_size_header: config.strict_size_header,
        }
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from(&ScraperConfig::default())
    }
}

/// Walks repository trees on the hosting service
#[derive(Debug, Clone)]
pub struct TreeWalker {
    fetcher: PageFetcher,
    selectors: Arc<PageSelectors>,
    options: WalkOptions,
}

impl TreeWalker {
    pub fn new(fetcher: PageFetcher, selectors: PageSelectors, options: WalkOptions) -> Self {
        Self {
            fetcher,
            selectors: Arc::new(selectors),
            options,
        }
    }

    /// Walks the tree below `start_path` and returns every file found
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<FileEntry>)` - Files in depth-first listing order, details
    ///   filled in
    /// * `Err(ScrapeError)` - The first fetch or required-extraction failure;
    ///   outstanding fetches are cancelled
    pub async fn walk(&self, start_path: &str) -> Result<Vec<FileEntry>, ScrapeError> {
        let start = std::time::Instant::now();

        let mut pending = VecDeque::from([PendingPage {
            path: start_path.to_string(),
            kind: PageKind::Directory,
            depth: 0,
            position: TreePosition::new(),
        }]);
        let mut visited_dirs = HashSet::from([start_path.to_string()]);
        let mut entries: Vec<FileEntry> = Vec::new();
        let mut positions: Vec<TreePosition> = Vec::new();
        let mut by_url: HashMap<String, usize> = HashMap::new();
        let mut workers = JoinSet::new();
        let mut pages_fetched = 0usize;

        tracing::info!("Walking {}", start_path);

        loop {
            while workers.len() < self.options.max_concurrent {
                let Some(page) = pending.pop_front() else {
                    break;
                };
                workers.spawn(visit(
                    self.fetcher.clone(),
                    Arc::clone(&self.selectors),
                    self.options.strict_size_header,
                    page,
                ));
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };

            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    workers.abort_all();
                    tracing::warn!("Walk of {} aborted: {}", start_path, e);
                    return Err(e);
                }
                Err(e) => {
                    workers.abort_all();
                    return Err(ScrapeError::Worker(e.to_string()));
                }
            };

            pages_fetched += 1;
            if pages_fetched % 50 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} files found, {} queued",
                    pages_fetched,
                    entries.len(),
                    pending.len() + workers.len()
                );
            }

            match outcome {
                PageOutcome::Listing {
                    path,
                    depth,
                    position,
                    rows,
                } => {
                    tracing::debug!("Listing {} has {} entries", path, rows.len());

                    for (index, row) in (0u32..).zip(rows) {
                        let mut child_position = position.clone();
                        child_position.push(index);

                        match PageKind::classify(&row.href, self.selectors.file_marker()) {
                            PageKind::File => {
                                if let Some(&existing) = by_url.get(&row.href) {
                                    tracing::debug!("Duplicate file link {}", row.href);
                                    // Keep the earliest tree position whichever listing came first
                                    if child_position < positions[existing] {
                                        positions[existing] = child_position;
                                    }
                                    continue;
                                }
                                by_url.insert(row.href.clone(), entries.len());
                                entries.push(FileEntry::new(row.name, row.href.clone()));
                                positions.push(child_position.clone());
                                pending.push_back(PendingPage {
                                    path: row.href,
                                    kind: PageKind::File,
                                    depth: depth + 1,
                                    position: child_position,
                                });
                            }
                            PageKind::Directory => {
                                if depth + 1 > self.options.max_depth {
                                    tracing::warn!(
                                        "Skipping {}: deeper than max depth {}",
                                        row.href,
                                        self.options.max_depth
                                    );
                                    continue;
                                }
                                if !visited_dirs.insert(row.href.clone()) {
                                    continue;
                                }
                                pending.push_back(PendingPage {
                                    path: row.href,
                                    kind: PageKind::Directory,
                                    depth: depth + 1,
                                    position: child_position,
                                });
                            }
                        }
                    }
                }
                PageOutcome::Detail { path, detail } => {
                    if let Some(&index) = by_url.get(&path) {
                        let entry = &mut entries[index];
                        entry.record_detail(detail);
                        tracing::debug!(
                            "{}: {} lines, {} bytes",
                            entry.name,
                            entry.line_count,
                            entry.size_bytes
                        );
                    }
                }
            }
        }

        let mut ordered: Vec<(TreePosition, FileEntry)> =
            positions.into_iter().zip(entries).collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        let entries: Vec<FileEntry> = ordered.into_iter().map(|(_, entry)| entry).collect();

        tracing::info!(
            "Walk of {} finished: {} files from {} pages in {:?}",
            start_path,
            entries.len(),
            pages_fetched,
            start.elapsed()
        );

        Ok(entries)
    }
}

/// Fetches and parses one page
async fn visit(
    fetcher: PageFetcher,
    selectors: Arc<PageSelectors>,
    strict_size_header: bool,
    page: PendingPage,
) -> Result<PageOutcome, ScrapeError> {
    let body = fetcher.fetch(&page.path).await?;

    match page.kind {
        PageKind::Directory => Ok(PageOutcome::Listing {
            rows: parse_listing(&body, &selectors),
            path: page.path,
            depth: page.depth,
            position: page.position,
        }),
        PageKind::File => {
            let parse_error = |source: ParseError| ScrapeError::Parse {
                path: page.path.clone(),
                source,
            };

            let detail = parse_file_detail(&body, &selectors).map_err(parse_error)?;

            if detail.size_bytes.is_none() {
                if strict_size_header {
                    return Err(parse_error(ParseError::MissingNode(
                        "file size header".to_string(),
                    )));
                }
                tracing::warn!("No size header on {}, counting 0 bytes", page.path);
            }

            Ok(PageOutcome::Detail {
                path: page.path,
                detail,
            })
        }
    }
}
