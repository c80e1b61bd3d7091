use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crawldash_core::{
    BrokenLinksFilter, CrawlStatus, FilterSpec, SortDirection, SortKey, SortSpec, ViewState,
};
use crawldash_logging::{dash_error, dash_info, dash_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub(crate) const VIEW_FILENAME: &str = ".crawldash_view.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedSort {
    key: String,
    direction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedView {
    search_term: String,
    statuses: Vec<String>,
    broken_links: String,
    sort: PersistedSort,
    page: usize,
}

impl PersistedView {
    fn capture(view: &ViewState) -> Self {
        let filter = view.filter();
        let sort = view.sort();
        Self {
            search_term: filter.search_term.clone(),
            statuses: filter
                .statuses
                .iter()
                .map(|status| status.as_str().to_string())
                .collect(),
            broken_links: filter.broken_links.as_str().to_string(),
            sort: PersistedSort {
                key: sort.key.as_str().to_string(),
                direction: sort.direction.as_str().to_string(),
            },
            page: view.page(),
        }
    }

    /// Unrecognised values fall back to their defaults one field at a time.
    fn into_view(self, page_size: usize) -> ViewState {
        let mut filter = FilterSpec {
            search_term: self.search_term,
            ..FilterSpec::default()
        };
        for raw in &self.statuses {
            match raw.parse::<CrawlStatus>() {
                Ok(status) => {
                    filter.statuses.insert(status);
                }
                Err(err) => dash_warn!("Dropping persisted status filter: {}", err),
            }
        }
        filter.broken_links = self.broken_links.parse().unwrap_or_else(|err| {
            dash_warn!("Resetting persisted broken-links filter: {}", err);
            BrokenLinksFilter::default()
        });

        let defaults = SortSpec::default();
        let sort = match (
            self.sort.key.parse::<SortKey>(),
            self.sort.direction.parse::<SortDirection>(),
        ) {
            (Ok(key), Ok(direction)) => SortSpec::new(key, direction),
            (Err(err), _) | (_, Err(err)) => {
                dash_warn!("Resetting persisted sort: {}", err);
                defaults
            }
        };

        ViewState::restore(filter, sort, self.page, page_size)
    }
}

/// Restore the saved view preferences from `dir`, or defaults when there are none.
pub(crate) fn load_view(dir: &Path, page_size: usize) -> ViewState {
    let path = dir.join(VIEW_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return ViewState::new(page_size);
        }
        Err(err) => {
            dash_warn!("Failed to read persisted view from {:?}: {}", path, err);
            return ViewState::new(page_size);
        }
    };

    let persisted: PersistedView = match ron::from_str(&content) {
        Ok(persisted) => persisted,
        Err(err) => {
            dash_warn!("Failed to parse persisted view from {:?}: {}", path, err);
            return ViewState::new(page_size);
        }
    };

    dash_info!("Loaded persisted view from {:?}", path);
    persisted.into_view(page_size)
}

/// Save the view preferences to `dir`. Failures are logged, never fatal.
pub(crate) fn save_view(dir: &Path, view: &ViewState) {
    let persisted = PersistedView::capture(view);
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            dash_error!("Failed to serialize view state: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(dir, VIEW_FILENAME, &content) {
        dash_error!("Failed to write view state to {:?}: {}", dir, err);
    }
}

/// Write `{dir}/{filename}` through a temp file in the same directory, then rename.
fn write_atomically(dir: &Path, filename: &str, content: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}
