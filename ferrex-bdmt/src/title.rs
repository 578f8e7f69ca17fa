use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::{locator::Locator, metadata::MetadataFile};

/// Outcome of a title lookup for one disc root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscTitle {
    /// Directory that was inspected.
    pub directory: PathBuf,
    /// Descriptor that was found, if any.
    pub metadata_file: Option<PathBuf>,
    /// Disc title, if the descriptor carries a real one.
    pub title: Option<String>,
}

/// Disc title for the Blu-ray structure under `directory`, or `None` when
/// there is no usable `bdmt_eng.xml`. Never fails.
pub fn get_disc_title<P: AsRef<Path>>(directory: P) -> Option<String> {
    get_disc_title_with(&Locator::default(), directory)
}

/// [`get_disc_title`] with a configured [`Locator`].
pub fn get_disc_title_with<P: AsRef<Path>>(
    locator: &Locator,
    directory: P,
) -> Option<String> {
    lookup(locator, directory.as_ref()).title
}

/// Look up every directory independently, keeping input order.
pub fn get_disc_titles<I, P>(locator: &Locator, directories: I) -> Vec<DiscTitle>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let results: Vec<DiscTitle> = directories
        .into_iter()
        .map(|directory| lookup(locator, directory.as_ref()))
        .collect();

    info!(
        "Disc title lookup complete: {} directories, {} titled",
        results.len(),
        results.iter().filter(|r| r.title.is_some()).count()
    );

    results
}

fn lookup(locator: &Locator, directory: &Path) -> DiscTitle {
    let metadata_file = locator.find(directory);

    let title = match metadata_file.as_deref() {
        None => {
            debug!("No disc metadata under {}", directory.display());
            None
        }
        Some(path) => match MetadataFile::new(path) {
            Ok(metadata) => metadata.into_disc_title(),
            // Can only race with a concurrent delete.
            Err(e) => {
                debug!("Disc metadata vanished: {}", e);
                None
            }
        },
    };

    DiscTitle {
        directory: directory.to_path_buf(),
        metadata_file,
        title,
    }
}
