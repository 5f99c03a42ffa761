//! Collection of misclassified-sample images.
//!
//! The service names each stored miss image after its running incorrect
//! counter (`/static/images/incorrect_<id>.png`), so that counter value is
//! the *miss id* here. Appends are idempotent: recording an id that is
//! already present is a no-op, so a count that stays flat across steps
//! never duplicates an image.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::schema::GalleryConfig;
use crate::config::expand_home;
use crate::error::StepError;

/// One recorded miss.
#[derive(Debug, Clone)]
pub struct MissEntry {
    pub id: u64,
    /// Path of the image on the service, by the static-asset convention.
    pub remote_path: String,
    /// Local copy, when downloads are enabled and the fetch succeeded.
    pub file: Option<PathBuf>,
}

/// Outcome of a [`MissGallery::record`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    AlreadyPresent,
}

/// The service-side path of the miss image identified by `id`.
pub fn remote_path(id: u64) -> String {
    format!("/static/images/incorrect_{id}.png")
}

/// The local filename for a downloaded miss image.
pub fn image_filename(id: u64) -> String {
    format!("incorrect_{id}.png")
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// Idempotent, id-keyed miss collection with optional local downloads.
#[derive(Debug)]
pub struct MissGallery {
    dir: PathBuf,
    download: bool,
    entries: BTreeMap<u64, MissEntry>,
}

impl MissGallery {
    /// Build a gallery from the resolved config.
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self {
            dir: expand_home(&config.dir),
            download: config.download,
            entries: BTreeMap::new(),
        }
    }

    /// The directory downloaded images land in.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Whether miss images should be fetched from the service.
    pub fn wants_download(&self) -> bool {
        self.download
    }

    /// Create the gallery directory. Called once at sweep start so a
    /// missing container mid-run means it was removed underneath us.
    pub fn ensure_container(&self) -> Result<()> {
        if self.download {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("failed to create {}", self.dir.display()))?;
        }
        Ok(())
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MissEntry> {
        self.entries.values()
    }

    /// Record a miss by id, writing `image` into the gallery directory when
    /// downloads are enabled and bytes were fetched.
    ///
    /// Idempotent: an already-recorded id returns
    /// [`RecordOutcome::AlreadyPresent`] without touching the filesystem.
    /// A vanished gallery directory is [`StepError::ContainerMissing`] and
    /// nothing is recorded.
    pub fn record(&mut self, id: u64, image: Option<&[u8]>) -> Result<RecordOutcome, StepError> {
        if self.contains(id) {
            return Ok(RecordOutcome::AlreadyPresent);
        }

        let mut file = None;
        if self.download {
            if !self.dir.is_dir() {
                return Err(StepError::ContainerMissing(self.dir.clone()));
            }
            if let Some(bytes) = image {
                let path = self.dir.join(image_filename(id));
                // Fetch succeeded but the write failed: keep the reference,
                // drop the local copy.
                if fs::write(&path, bytes).is_ok() {
                    file = Some(path);
                }
            }
        }

        self.entries.insert(
            id,
            MissEntry {
                id,
                remote_path: remote_path(id),
                file,
            },
        );

        Ok(RecordOutcome::Recorded)
    }

    /// Forget all recorded misses and delete downloaded images.
    pub fn clear(&mut self) -> Result<()> {
        clear_directory(&self.dir)?;
        self.entries.clear();
        Ok(())
    }
}

/// Delete every downloaded miss image (`incorrect_*.png`) in `dir`.
///
/// Used by `predsweep reset`, which runs in a fresh process and therefore
/// has no in-memory entries to walk. Returns the number of files removed;
/// a missing directory counts as already clear.
pub fn clear_directory(dir: &std::path::Path) -> Result<usize> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Ok(0);
    };

    let mut removed = 0;
    for dir_entry in read_dir.flatten() {
        let name = dir_entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("incorrect_") && name.ends_with(".png") {
            fs::remove_file(dir_entry.path())
                .with_context(|| format!("failed to delete {}", dir_entry.path().display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod clear_tests {
    use super::*;

    #[test]
    fn clear_directory_removes_only_miss_images() {
        let dir = std::env::temp_dir().join(format!(
            "predsweep-clear-test-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("incorrect_1.png"), b"x").unwrap();
        fs::write(dir.join("incorrect_2.png"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"keep me").unwrap();

        assert_eq!(clear_directory(&dir).unwrap(), 2);
        assert!(dir.join("notes.txt").exists());
        assert!(!dir.join("incorrect_1.png").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_directory_tolerates_missing_dir() {
        let dir = std::path::PathBuf::from("/nonexistent/predsweep-clear");
        assert_eq!(clear_directory(&dir).unwrap(), 0);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_only_gallery() -> MissGallery {
        MissGallery::from_config(&GalleryConfig {
            dir: "/nonexistent/never-touched".to_string(),
            download: false,
        })
    }

    #[test]
    fn remote_path_follows_static_convention() {
        assert_eq!(remote_path(3), "/static/images/incorrect_3.png");
        assert_eq!(image_filename(3), "incorrect_3.png");
    }

    #[test]
    fn record_is_idempotent() {
        let mut gallery = reference_only_gallery();
        assert_eq!(gallery.record(3, None).unwrap(), RecordOutcome::Recorded);
        assert_eq!(
            gallery.record(3, None).unwrap(),
            RecordOutcome::AlreadyPresent
        );
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn record_without_download_never_touches_dir() {
        let mut gallery = reference_only_gallery();
        gallery.record(1, None).unwrap();
        let entry = gallery.entries().next().unwrap();
        assert_eq!(entry.remote_path, "/static/images/incorrect_1.png");
        assert!(entry.file.is_none());
    }

    #[test]
    fn record_with_download_requires_container() {
        let mut gallery = MissGallery::from_config(&GalleryConfig {
            dir: "/nonexistent/predsweep-misses".to_string(),
            download: true,
        });
        let err = gallery.record(1, Some(b"png")).unwrap_err();
        assert!(matches!(err, StepError::ContainerMissing(_)));
        assert!(gallery.is_empty());
    }

    #[test]
    fn record_downloads_into_container() {
        let dir = std::env::temp_dir().join(format!(
            "predsweep-gallery-test-{}",
            std::process::id()
        ));
        let mut gallery = MissGallery::from_config(&GalleryConfig {
            dir: dir.to_string_lossy().into_owned(),
            download: true,
        });
        gallery.ensure_container().unwrap();

        assert_eq!(
            gallery.record(2, Some(b"png-bytes")).unwrap(),
            RecordOutcome::Recorded
        );
        let entry = gallery.entries().next().unwrap();
        let file = entry.file.clone().unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"png-bytes");

        gallery.clear().unwrap();
        assert!(gallery.is_empty());
        assert!(!file.exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
