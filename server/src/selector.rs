//! Random content selection for newly created rooms.

use rand::Rng;
use shared::ContentId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// Catalog size below 1.
    EmptyCatalog,
    /// The only item in the catalog is the one being excluded.
    Exhausted { only: ContentId },
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::EmptyCatalog => write!(f, "catalog is empty"),
            SelectError::Exhausted { only } => {
                write!(f, "catalog holds only content {} which is excluded", only)
            }
        }
    }
}

impl std::error::Error for SelectError {}

/// Picks a content id uniformly from `1..=catalog_size`, skipping `exclude`.
///
/// An `exclude` outside the catalog range excludes nothing.
pub fn pick_content<R: Rng>(
    rng: &mut R,
    catalog_size: u32,
    exclude: Option<ContentId>,
) -> Result<ContentId, SelectError> {
    if catalog_size < 1 {
        return Err(SelectError::EmptyCatalog);
    }

    match exclude.filter(|id| (1..=catalog_size).contains(id)) {
        None => Ok(rng.gen_range(1..=catalog_size)),
        Some(excluded) if catalog_size == 1 => Err(SelectError::Exhausted { only: excluded }),
        Some(excluded) => {
            // Draw from a range one shorter and shift values at or above the hole.
            let pick = rng.gen_range(1..catalog_size);
            Ok(if pick >= excluded { pick + 1 } else { pick })
        }
    }
}
