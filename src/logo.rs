//! Loading of the institution logo drawn in the header band.
//!
//! The logo is read and decoded once per generation call and handed to the
//! canvas as an explicit value. Failing to produce it is never fatal: the
//! loader logs a warning and the canvas draws a placeholder instead.

use std::env;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use log::{debug, warn};

/// File name of the logo inside the asset directory.
pub const LOGO_FILE_NAME: &str = "logo.png";

/// Environment variable overriding the asset directory lookup.
pub const ASSETS_DIR_ENV: &str = "EXAM_SEATING_ASSETS_DIR";

const MM_PER_INCH: f64 = 25.4;

/// Resolution the logo raster is embedded at.
pub const LOGO_DPI: f64 = 300.0;

/// Directories searched for `logo.png`, most specific first.
pub fn asset_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env::var_os(ASSETS_DIR_ENV) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            candidates.push(path);
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

/// Picks the first candidate directory that holds a logo file, falling back to
/// the first candidate so the eventual warning names a concrete path.
pub fn resolve_assets_dir() -> Option<PathBuf> {
    let candidates = asset_directory_candidates();
    candidates
        .iter()
        .find(|dir| dir.join(LOGO_FILE_NAME).is_file())
        .or_else(|| candidates.first())
        .cloned()
}

/// Where the logo raster comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes supplied by the caller.
    Bytes(Vec<u8>),
    /// An image file on disk.
    Path(PathBuf),
    /// `logo.png` in the asset directory resolved when the logo is loaded.
    DefaultAssets,
}

/// A decoded logo, normalised to 8-bit RGB.
#[derive(Clone)]
pub struct LogoAsset {
    image: DynamicImage,
}

impl LogoAsset {
    fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image.to_rgb8()),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Width and height in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Size in millimetres when embedded at `dpi`.
    pub fn natural_size(&self, dpi: f64) -> (f64, f64) {
        let (width, height) = self.pixel_size();
        (
            MM_PER_INCH * f64::from(width) / dpi,
            MM_PER_INCH * f64::from(height) / dpi,
        )
    }

    /// Scale factors stretching the raster into a `width` × `height` mm box.
    pub fn scale_to(&self, width: f64, height: f64, dpi: f64) -> (f64, f64) {
        let (natural_width, natural_height) = self.natural_size(dpi);
        let scale = |target: f64, natural: f64| {
            if natural > 0.0 {
                target / natural
            } else {
                1.0
            }
        };
        (scale(width, natural_width), scale(height, natural_height))
    }
}

impl std::fmt::Debug for LogoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.pixel_size();
        f.debug_struct("LogoAsset")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

/// Decodes the logo from its configured source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogoLoader {
    source: Option<ImageSource>,
}

impl LogoLoader {
    /// Reads `logo.png` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::from_source(ImageSource::Path(dir.as_ref().join(LOGO_FILE_NAME)))
    }

    /// Uses `logo.png` from the asset directory found at load time.
    pub fn from_default_assets() -> Self {
        Self::from_source(ImageSource::DefaultAssets)
    }

    pub fn from_source(source: ImageSource) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// A loader that always yields the placeholder.
    pub fn none() -> Self {
        Self { source: None }
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Loads and normalises the logo.
    ///
    /// Returns `None` after logging a warning when the source is missing,
    /// unreadable, or not a decodable image.
    pub fn load(&self) -> Option<LogoAsset> {
        let source = self.source.as_ref()?;
        let decoded = match source {
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)
                .map_err(|err| format!("failed to decode logo bytes: {err}")),
            ImageSource::Path(path) => decode_image_from_path(path),
            ImageSource::DefaultAssets => match resolve_assets_dir() {
                Some(dir) => decode_image_from_path(&dir.join(LOGO_FILE_NAME)),
                None => Err("no asset directory to read the logo from".to_owned()),
            },
        };

        match decoded {
            Ok(image) => {
                let logo = LogoAsset::from_dynamic(image);
                debug!("loaded logo {:?}", logo.pixel_size());
                Some(logo)
            }
            Err(reason) => {
                warn!("{reason}; drawing the logo placeholder");
                None
            }
        }
    }
}

fn decode_image_from_path(path: &Path) -> Result<DynamicImage, String> {
    let reader = image::io::Reader::open(path)
        .map_err(|err| format!("failed to open logo {}: {err}", path.display()))?;
    reader
        .with_guessed_format()
        .map_err(|err| format!("unable to determine format of {}: {err}", path.display()))?
        .decode()
        .map_err(|err| format!("failed to decode logo {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn bytes_are_decoded_to_rgb() {
        let logo = LogoLoader::from_source(ImageSource::Bytes(png_bytes(4, 3)))
            .load()
            .unwrap();
        assert_eq!(logo.pixel_size(), (4, 3));
        assert!(matches!(logo.image(), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn garbage_bytes_fall_back_to_placeholder() {
        let loader = LogoLoader::from_source(ImageSource::Bytes(b"not an image".to_vec()));
        assert!(loader.load().is_none());
    }

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let loader = LogoLoader::from_dir("/definitely/not/a/real/assets/dir");
        assert!(loader.load().is_none());
        assert!(LogoLoader::none().load().is_none());
    }

    #[test]
    fn natural_size_follows_dpi() {
        let logo = LogoLoader::from_source(ImageSource::Bytes(png_bytes(300, 150)))
            .load()
            .unwrap();
        let (width, height) = logo.natural_size(300.0);
        assert!((width - 25.4).abs() < 1e-9);
        assert!((height - 12.7).abs() < 1e-9);
        let (sx, sy) = logo.scale_to(20.0, 16.0, 300.0);
        assert!((sx * width - 20.0).abs() < 1e-9);
        assert!((sy * height - 16.0).abs() < 1e-9);
    }

    #[test]
    fn default_assets_are_looked_up_when_loading() {
        let dir = env::temp_dir().join(format!("exam_seating_assets_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        env::set_var(ASSETS_DIR_ENV, &dir);

        let loader = LogoLoader::from_default_assets();
        assert_eq!(loader.source(), Some(&ImageSource::DefaultAssets));
        assert!(loader.load().is_none());

        std::fs::write(dir.join(LOGO_FILE_NAME), png_bytes(8, 6)).unwrap();
        let logo = loader.load();

        env::remove_var(ASSETS_DIR_ENV);
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(logo.map(|logo| logo.pixel_size()), Some((8, 6)));
    }

    #[test]
    fn manifest_assets_are_always_a_candidate() {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        assert!(asset_directory_candidates().contains(&manifest));
    }
}
