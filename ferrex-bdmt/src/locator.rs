use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::LocatorConfig;

/// The only descriptor BDInfo reads for the disc title.
pub const METADATA_FILE_NAME: &str = "bdmt_eng.xml";

/// Upper-case spelling found on some ISO9660 rips.
pub const METADATA_FILE_NAME_UPPER: &str = "BDMT_ENG.XML";

/// Fixed locations relative to the disc root, checked before any walk.
const STANDARD_LOCATIONS: &[&[&str]] = &[&["BDMV", "META"], &["META"]];

/// Resolves a disc root to its `bdmt_eng.xml` descriptor.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    config: LocatorConfig,
}

impl Locator {
    /// Locator with the default (BDInfo-compatible) walk settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator using the given walk settings.
    pub fn from_config(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Enable following symbolic links
    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.config.follow_links = follow;
        self
    }

    /// Set maximum directory depth for the recursive search
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Active walk settings.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Find the descriptor under `directory`.
    ///
    /// Priority, first hit wins:
    /// 1. `BDMV/META/bdmt_eng.xml`
    /// 2. `META/bdmt_eng.xml`
    /// 3. any `bdmt_eng.xml` in the subtree
    /// 4. any `BDMT_ENG.XML` in the subtree
    ///
    /// Among duplicates in steps 3 and 4 the first entry the filesystem
    /// enumerates wins. Missing or unreadable directories yield `None`.
    pub fn find<P: AsRef<Path>>(&self, directory: P) -> Option<PathBuf> {
        let directory = directory.as_ref();

        for segments in STANDARD_LOCATIONS {
            let candidate = segments
                .iter()
                .fold(directory.to_path_buf(), |path, segment| {
                    path.join(segment)
                })
                .join(METADATA_FILE_NAME);

            if candidate.is_file() {
                debug!("Found disc metadata at {}", candidate.display());
                return Some(candidate);
            }
        }

        // One walk per spelling so a lower-case hit anywhere outranks an
        // upper-case one, however shallow.
        [METADATA_FILE_NAME, METADATA_FILE_NAME_UPPER]
            .iter()
            .find_map(|name| self.search(directory, name))
    }

    fn search(&self, root: &Path, file_name: &str) -> Option<PathBuf> {
        trace!(
            "Searching {} for {} (follow_links: {})",
            root.display(),
            file_name,
            self.config.follow_links
        );

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.config.follow_links);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        continue;
                    }
                    if entry.file_name() == file_name {
                        debug!(
                            "Found disc metadata at {}",
                            entry.path().display()
                        );
                        return Some(entry.into_path());
                    }
                }
                Err(e) => {
                    debug!("Skipping entry under {}: {}", root.display(), e);
                }
            }
        }

        None
    }
}

/// Find `bdmt_eng.xml` under `directory` with default walk settings.
pub fn find_metadata_file<P: AsRef<Path>>(directory: P) -> Option<PathBuf> {
    Locator::default().find(directory)
}
