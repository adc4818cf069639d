//! apps/valdo/src/capture.rs
//!
//! The terminal stand-in for the camera: a watched directory acting as the
//! camera roll. Capturing a frame picks the newest JPEG dropped into the
//! directory and base64-encodes it. The device must be started before a
//! capture and is released on every path that leaves the camera screen.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use valdo_core::ports::{CaptureDevice, PortError, PortResult};

pub struct FileCapture {
    dir: PathBuf,
    active: bool,
}

impl FileCapture {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, active: false }
    }

    fn newest_jpeg(&self) -> PortResult<PathBuf> {
        let entries = fs::read_dir(&self.dir).map_err(|err| {
            PortError::Unexpected(format!(
                "failed to read camera directory {}: {err}",
                self.dir.display()
            ))
        })?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_jpeg = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
                .unwrap_or(false);
            if !is_jpeg {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| {
            PortError::NotFound(format!("no JPEG images in {}", self.dir.display()))
        })
    }
}

impl CaptureDevice for FileCapture {
    fn start(&mut self) -> PortResult<()> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            PortError::Unexpected(format!(
                "failed to create camera directory {}: {err}",
                self.dir.display()
            ))
        })?;
        self.active = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> PortResult<String> {
        if !self.active {
            return Err(PortError::Unexpected(
                "capture session is not active".to_string(),
            ));
        }

        let path = self.newest_jpeg()?;
        let bytes = fs::read(&path).map_err(|err| {
            PortError::Unexpected(format!("failed to read {}: {err}", path.display()))
        })?;
        Ok(BASE64.encode(bytes))
    }

    fn stop(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_camera_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("valdo-camera-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn capture_requires_an_active_session() {
        let mut capture = FileCapture::new(temp_camera_dir("inactive"));
        assert!(capture.capture_frame().is_err());
    }

    #[test]
    fn capture_encodes_the_newest_jpeg() {
        let dir = temp_camera_dir("encode");
        let _ = fs::remove_dir_all(&dir);

        let mut capture = FileCapture::new(dir.clone());
        capture.start().unwrap();
        fs::write(dir.join("label.jpg"), b"fake jpeg bytes").unwrap();

        let encoded = capture.capture_frame().unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), b"fake jpeg bytes");

        capture.stop();
        assert!(capture.capture_frame().is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_camera_roll_is_not_found() {
        let dir = temp_camera_dir("empty");
        let _ = fs::remove_dir_all(&dir);

        let mut capture = FileCapture::new(dir.clone());
        capture.start().unwrap();
        match capture.capture_frame() {
            Err(PortError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }

        let _ = fs::remove_dir_all(&dir);
    }
}
