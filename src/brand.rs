//! Brand assets resolved once at startup.
//!
//! [`BrandAssets::collect`] runs the inliner over every logo and download the
//! edition names. The result is immutable and handed to the page renderer by
//! reference; nothing re-reads the files afterwards.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Download, DownloadSource, EditionConfig, Organizer};
use crate::inline::{self, EmbeddableAsset};

/// An organizer paired with its inlined logo, if the logo file was usable.
#[derive(Debug, Clone)]
pub struct OrganizerLogo {
    pub organizer: Organizer,
    pub asset: Option<EmbeddableAsset>,
}

/// A download paired with its inlined document. Always `None` for links.
#[derive(Debug, Clone)]
pub struct DownloadAsset {
    pub download: Download,
    pub asset: Option<EmbeddableAsset>,
}

#[derive(Debug, Clone)]
pub struct BrandAssets {
    pub logos: Vec<OrganizerLogo>,
    pub downloads: Vec<DownloadAsset>,
}

/// One row of the `assets` subcommand's JSON report.
#[derive(Debug, Serialize)]
pub struct AssetReport {
    pub role: &'static str,
    pub name: String,
    pub path: String,
    pub present: bool,
    pub media_type: Option<&'static str>,
    pub bytes: Option<u64>,
}

fn resolve(asset_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        asset_dir.join(path)
    }
}

impl BrandAssets {
    /// Inline every configured logo and download, resolving relative paths
    /// against `asset_dir`.
    pub fn collect(config: &EditionConfig, asset_dir: &Path) -> Self {
        let logos: Vec<OrganizerLogo> = config
            .organizers
            .iter()
            .map(|organizer| OrganizerLogo {
                asset: inline::inline(resolve(asset_dir, &organizer.logo)),
                organizer: organizer.clone(),
            })
            .collect();

        let downloads: Vec<DownloadAsset> = config
            .application
            .downloads
            .iter()
            .map(|download| DownloadAsset {
                asset: match &download.source {
                    DownloadSource::Path(path) => inline::inline(resolve(asset_dir, path)),
                    DownloadSource::Url(_) => None,
                },
                download: download.clone(),
            })
            .collect();

        let brand = Self { logos, downloads };
        eprintln!(
            "[assets] dir={} inlined={} absent={} linked={}",
            asset_dir.display(),
            brand.inlined_count(),
            brand.absent_count(),
            brand.linked_count()
        );
        brand
    }

    /// Every asset slot backed by a local file.
    fn all_assets(&self) -> impl Iterator<Item = &Option<EmbeddableAsset>> {
        let local = self
            .downloads
            .iter()
            .filter(|d| matches!(d.download.source, DownloadSource::Path(_)))
            .map(|d| &d.asset);
        self.logos.iter().map(|l| &l.asset).chain(local)
    }

    pub fn inlined_count(&self) -> usize {
        self.all_assets().filter(|a| a.is_some()).count()
    }

    pub fn absent_count(&self) -> usize {
        self.all_assets().filter(|a| a.is_none()).count()
    }

    /// Downloads that point at an external URL.
    pub fn linked_count(&self) -> usize {
        self.downloads
            .iter()
            .filter(|d| matches!(d.download.source, DownloadSource::Url(_)))
            .count()
    }

    /// Per-asset summary, logos first, in configuration order.
    pub fn report(&self, asset_dir: &Path) -> Vec<AssetReport> {
        let logos = self.logos.iter().map(|l| {
            row(
                "logo",
                &l.organizer.name,
                &resolve(asset_dir, &l.organizer.logo),
                l.asset.as_ref(),
            )
        });
        let downloads = self.downloads.iter().map(|d| match &d.download.source {
            DownloadSource::Path(path) => row(
                "download",
                &d.download.label,
                &resolve(asset_dir, path),
                d.asset.as_ref(),
            ),
            DownloadSource::Url(url) => AssetReport {
                role: "download",
                name: d.download.label.clone(),
                path: url.clone(),
                present: true,
                media_type: None,
                bytes: None,
            },
        });
        logos.chain(downloads).collect()
    }
}

fn row(role: &'static str, name: &str, path: &Path, asset: Option<&EmbeddableAsset>) -> AssetReport {
    AssetReport {
        role,
        name: name.to_owned(),
        path: asset
            .map(|a| a.source_path().display().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        present: asset.is_some(),
        media_type: asset.map(|a| a.media_type().as_str()),
        bytes: asset.map(|a| a.byte_len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_with_no_files_marks_everything_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditionConfig::embedded().unwrap();
        let brand = BrandAssets::collect(&config, dir.path());

        assert_eq!(brand.logos.len(), 3);
        assert_eq!(brand.downloads.len(), 1);
        assert_eq!(brand.inlined_count(), 0);
        assert_eq!(brand.absent_count(), 4);
    }

    #[test]
    fn collect_inlines_files_present_in_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mohw_logo.png"), b"\x89PNG").unwrap();
        std::fs::write(dir.path().join("application_form.hwp"), b"HWP").unwrap();

        let config = EditionConfig::embedded().unwrap();
        let brand = BrandAssets::collect(&config, dir.path());

        assert!(brand.logos[0].asset.is_some());
        assert!(brand.logos[1].asset.is_none());
        assert!(brand.logos[2].asset.is_none());
        assert!(brand.downloads[0].asset.is_some());
        assert_eq!(brand.inlined_count(), 2);
        assert_eq!(brand.absent_count(), 2);
    }

    fn linked_edition() -> EditionConfig {
        let source = crate::web_assets::DEFAULT_EDITION.replace(
            "      path: application_form.hwp",
            "      url: \"https://example.com/form.hwp\"",
        );
        EditionConfig::from_yaml(&source).unwrap()
    }

    #[test]
    fn url_downloads_are_not_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("application_form.hwp"), b"HWP").unwrap();

        let brand = BrandAssets::collect(&linked_edition(), dir.path());
        assert!(brand.downloads[0].asset.is_none());
        assert_eq!(brand.linked_count(), 1);
        assert_eq!(brand.inlined_count(), 0);
        assert_eq!(brand.absent_count(), 3);
    }

    #[test]
    fn report_lists_url_download_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let brand = BrandAssets::collect(&linked_edition(), dir.path());
        let report = brand.report(dir.path());

        let form = &report[3];
        assert_eq!(form.role, "download");
        assert_eq!(form.path, "https://example.com/form.hwp");
        assert!(form.present);
        assert_eq!(form.media_type, None);
        assert_eq!(form.bytes, None);
    }

    #[test]
    fn absolute_paths_ignore_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("abs.png");
        assert_eq!(resolve(Path::new("/elsewhere"), &abs), abs);
        assert_eq!(
            resolve(Path::new("brand"), Path::new("logo.png")),
            PathBuf::from("brand/logo.png")
        );
    }

    #[test]
    fn report_lists_logos_then_downloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kssi_logo.png"), [0u8; 16]).unwrap();

        let config = EditionConfig::embedded().unwrap();
        let brand = BrandAssets::collect(&config, dir.path());
        let report = brand.report(dir.path());

        let roles: Vec<&str> = report.iter().map(|r| r.role).collect();
        assert_eq!(roles, vec!["logo", "logo", "logo", "download"]);

        let kssi = &report[1];
        assert_eq!(kssi.name, "중앙사회서비스원");
        assert!(kssi.present);
        assert_eq!(kssi.media_type, Some("image/png"));
        assert_eq!(kssi.bytes, Some(16));

        let form = &report[3];
        assert!(!form.present);
        assert_eq!(form.media_type, None);
        assert!(form.path.ends_with("application_form.hwp"));
    }
}
