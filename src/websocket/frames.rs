use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use uuid::Uuid;

use crate::error::{BotError, Result};
use crate::models::Attachment;

/// Public path under which rendered frames are served.
pub const FRAMES_ROUTE: &str = "/frames";

/// A rendered PNG waiting to be attached to a message.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: &'static str,
    pub png: Vec<u8>,
}

impl Frame {
    pub fn new(name: &'static str, png: Vec<u8>) -> Self {
        Frame { name, png }
    }
}

/// Writes frames to disk so gateway clients can fetch them over HTTP.
/// Frames older than the retention window are deleted on the next write.
#[derive(Debug, Clone)]
pub struct FrameStore {
    dir: PathBuf,
    retention: Duration,
}

impl FrameStore {
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        FrameStore { dir: dir.into(), retention }
    }

    /// Deletes frames last written more than `retention` ago.
    pub fn prune(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age > self.retention);
            if !expired {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => debug!("Evicted frame {:?}", entry.file_name()),
                Err(err) => warn!("Failed to evict frame {:?}: {}", entry.file_name(), err),
            }
        }
    }

    pub fn store(&self, frame: &Frame) -> Result<Attachment> {
        let file_name = format!("{}-{}", Uuid::new_v4(), frame.name);
        let io_err = |source| BotError::FrameIo { name: file_name.clone(), source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        self.prune();
        fs::write(self.dir.join(&file_name), &frame.png).map_err(io_err)?;
        debug!("Stored frame {} ({} bytes)", file_name, frame.png.len());
        Ok(Attachment {
            name: frame.name.to_string(),
            url: format!("{}/{}", FRAMES_ROUTE, file_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_frames_are_readable_back() {
        let dir = std::env::temp_dir().join(format!("frames-{}", Uuid::new_v4()));
        let store = FrameStore::new(&dir, Duration::from_secs(600));
        let attachment = store.store(&Frame::new("chess.png", vec![1, 2, 3])).unwrap();

        assert_eq!(attachment.name, "chess.png");
        let file = attachment.url.trim_start_matches("/frames/");
        assert_eq!(fs::read(dir.join(file)).unwrap(), vec![1, 2, 3]);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn expired_frames_are_evicted_on_write() {
        let dir = std::env::temp_dir().join(format!("frames-{}", Uuid::new_v4()));
        let store = FrameStore::new(&dir, Duration::ZERO);
        let old = store.store(&Frame::new("old.png", vec![1])).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let new = store.store(&Frame::new("new.png", vec![2])).unwrap();

        let remaining: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining, vec![new.url.trim_start_matches("/frames/").to_string()]);
        assert!(!dir.join(old.url.trim_start_matches("/frames/")).exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn fresh_frames_survive_pruning() {
        let dir = std::env::temp_dir().join(format!("frames-{}", Uuid::new_v4()));
        let store = FrameStore::new(&dir, Duration::from_secs(600));
        store.store(&Frame::new("a.png", vec![1])).unwrap();
        store.store(&Frame::new("b.png", vec![2])).unwrap();
        store.prune();
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
        fs::remove_dir_all(dir).ok();
    }
}
