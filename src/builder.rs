//! Configuration of report generators.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::error::ReportError;
use crate::layout::PageGeometry;
use crate::logo::{ImageSource, LogoLoader};
use crate::report::ReportGenerator;

/// Institution name printed in the header band.
pub const DEFAULT_INSTITUTION: &str = "SHASUN";
/// Second header line printed below the institution name.
pub const DEFAULT_SUBTITLE: &str = "JAIN COLLEGE FOR WOMEN";

/// Builder for [`ReportGenerator`] instances pre-configured with the crate defaults.
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    geometry: Option<PageGeometry>,
    institution: Option<(String, String)>,
    logo: Option<ImageSource>,
    assets_dir: Option<PathBuf>,
    without_logo: bool,
    generated_at: Option<NaiveDateTime>,
}

impl ReportBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page geometry used for both report kinds.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Sets the two institution lines of the header band.
    pub fn with_institution(mut self, name: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.institution = Some((name.into(), subtitle.into()));
        self
    }

    /// Reads `logo.png` from `dir` instead of the resolved asset directory.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Uses the given encoded image as logo.
    pub fn with_logo_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.logo = Some(ImageSource::Bytes(bytes.into()));
        self
    }

    /// Always draws the logo placeholder.
    pub fn without_logo(mut self) -> Self {
        self.without_logo = true;
        self
    }

    /// Pins the footer timestamp instead of reading the clock on every call.
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Validates the configuration and builds the generator.
    pub fn build(self) -> Result<ReportGenerator, ReportError> {
        let geometry = self.geometry.unwrap_or_else(PageGeometry::a4);
        geometry.validate()?;

        let logo = if self.without_logo {
            LogoLoader::none()
        } else if let Some(source) = self.logo {
            LogoLoader::from_source(source)
        } else if let Some(dir) = self.assets_dir {
            LogoLoader::from_dir(dir)
        } else {
            LogoLoader::from_default_assets()
        };

        let (institution, subtitle) = self
            .institution
            .unwrap_or_else(|| (DEFAULT_INSTITUTION.to_owned(), DEFAULT_SUBTITLE.to_owned()));

        Ok(ReportGenerator::new(
            geometry,
            institution,
            subtitle,
            logo,
            self.generated_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn defaults_build() {
        let generator = ReportBuilder::new().build().unwrap();
        assert_eq!(generator.geometry(), &PageGeometry::a4());
        assert_eq!(generator.institution(), (DEFAULT_INSTITUTION, DEFAULT_SUBTITLE));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let geometry = PageGeometry {
            margin_left: 110.0,
            margin_right: 110.0,
            ..PageGeometry::a4()
        };
        let err = ReportBuilder::new().with_geometry(geometry).build().unwrap_err();
        assert!(matches!(err, ReportError::Layout(LayoutError::PageTooSmall(_))));
    }

    #[test]
    fn explicit_logo_bytes_win_over_assets_dir() {
        let generator = ReportBuilder::new()
            .with_assets_dir("/tmp/assets")
            .with_logo_bytes(vec![1, 2, 3])
            .build()
            .unwrap();
        assert_eq!(
            generator.logo_loader().source(),
            Some(&ImageSource::Bytes(vec![1, 2, 3]))
        );
    }

    #[test]
    fn default_logo_is_resolved_per_call() {
        let generator = ReportBuilder::new().build().unwrap();
        assert_eq!(
            generator.logo_loader().source(),
            Some(&ImageSource::DefaultAssets)
        );
    }

    #[test]
    fn placeholder_only_has_no_source() {
        let generator = ReportBuilder::new().with_logo_bytes(vec![1]).without_logo().build().unwrap();
        assert!(generator.logo_loader().source().is_none());
    }
}
