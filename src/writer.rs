use std::fs;
use std::path::PathBuf;

use image::RgbImage;

use crate::config::CaptureConfig;
use crate::error::CaptureError;

/// Persists admitted frames at `{folder}/{prefix}{index}.{extension}`.
///
/// The folder is created lazily before the first write. Existing files are
/// overwritten silently; indices only advance on successful writes, so an
/// overwrite can only target a file this session already produced.
pub struct FrameWriter {
    folder: PathBuf,
    prefix: String,
    extension: String,
    folder_ready: bool,
}

impl FrameWriter {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            folder: config.image_folder.clone(),
            prefix: config.image_name_prefix.clone(),
            extension: config.image_extension.clone(),
            folder_ready: false,
        }
    }

    /// Deterministic destination for `index`: decimal, no leading zeros.
    pub fn target_path(&self, index: u64) -> PathBuf {
        self.folder
            .join(format!("{}{}.{}", self.prefix, index, self.extension))
    }

    /// Encodes `image` (format inferred from the extension) and writes it.
    pub fn write(&mut self, index: u64, image: &RgbImage) -> Result<PathBuf, CaptureError> {
        if !self.folder_ready {
            fs::create_dir_all(&self.folder)?;
            self.folder_ready = true;
        }
        let path = self.target_path(index);
        image.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn config_in(folder: PathBuf) -> CaptureConfig {
        CaptureConfig {
            image_folder: folder,
            ..CaptureConfig::default()
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(32, 24, Rgb([120, 90, 60]))
    }

    #[test]
    fn creates_the_folder_on_first_write() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("nested").join("img");
        let mut writer = FrameWriter::new(&config_in(folder.clone()));

        assert!(!folder.exists());
        let path = writer.write(0, &frame()).unwrap();
        assert_eq!(path, folder.join("image0.jpg"));
        assert!(path.is_file());
    }

    #[test]
    fn index_is_plain_decimal_in_the_filename() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(&config_in(dir.path().to_path_buf()));

        let path = writer.write(42, &frame()).unwrap();
        assert_eq!(path.file_name().unwrap(), "image42.jpg");
    }

    #[test]
    fn overwrites_an_existing_file() {
        let dir = tempdir().unwrap();
        let mut writer = FrameWriter::new(&config_in(dir.path().to_path_buf()));

        writer.write(3, &frame()).unwrap();
        writer
            .write(3, &RgbImage::from_pixel(64, 48, Rgb([200, 200, 200])))
            .unwrap();

        let reread = image::open(writer.target_path(3)).unwrap();
        assert_eq!((reread.width(), reread.height()), (64, 48));
    }
}
