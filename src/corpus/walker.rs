use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::FileId;
use crate::error::InputStatus;

/// Snippet files of one functionality bucket, keyed by id.
///
/// Iteration is always in id order, so nothing downstream depends on the
/// order the file system happens to enumerate entries in.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    root: PathBuf,
    files: BTreeMap<FileId, PathBuf>,
    status: InputStatus,
}

impl Corpus {
    /// Discover every `*.{extension}` file below `root` (case-insensitive).
    ///
    /// A missing or unreadable root yields an empty corpus whose status is
    /// `Unavailable`; the condition is logged rather than returned as an error.
    pub fn discover(root: &Path, extension: &str) -> Self {
        if !root.is_dir() {
            log::warn!("Corpus directory unavailable: {}", root.display());
            return Corpus {
                root: root.to_path_buf(),
                files: BTreeMap::new(),
                status: InputStatus::unavailable(root, "not a readable directory"),
            };
        }

        let wanted = extension.trim_start_matches('.').to_lowercase();
        let mut files = BTreeMap::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !wanted.is_empty() && ext != wanted {
                continue;
            }
            let Some(id) = FileId::from_path(path) else {
                log::debug!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };
            let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if let Some(previous) = files.insert(id.clone(), absolute) {
                log::warn!(
                    "Duplicate id {} in {} (kept last, replaced {})",
                    id,
                    root.display(),
                    previous.display()
                );
            }
        }

        log::info!("Discovered {} files in {}", files.len(), root.display());
        Corpus {
            root: root.to_path_buf(),
            files,
            status: InputStatus::Available,
        }
    }

    /// Corpus built from bare ids, without backing files.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = FileId>,
    {
        Corpus {
            root: PathBuf::new(),
            files: ids
                .into_iter()
                .map(|id| {
                    let path = PathBuf::from(id.as_str());
                    (id, path)
                })
                .collect(),
            status: InputStatus::Available,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn status(&self) -> &InputStatus {
        &self.status
    }

    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.files.contains_key(id)
    }

    pub fn path_of(&self, id: &FileId) -> Option<&Path> {
        self.files.get(id).map(PathBuf::as_path)
    }

    /// Ids in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &FileId> {
        self.files.keys()
    }
}
