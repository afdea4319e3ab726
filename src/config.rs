//! Edition configuration.
//!
//! Everything that changes from one event edition to the next (palette,
//! dates, copy, links, asset paths) lives in a YAML file deserialized into
//! [`EditionConfig`]. The page structure stays in `page.rs`. The 2025
//! edition is compiled into the binary and used when no `--config` is given.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::web_assets;

// ---------------------------------------------------------------------------
// Top-level document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditionConfig {
    pub site: Site,
    pub theme: Theme,
    pub nav: Vec<NavItem>,
    pub organizers: Vec<Organizer>,
    pub hero: Hero,
    pub introduction: Introduction,
    pub participation: Participation,
    pub timeline: Timeline,
    pub schedule: Schedule,
    pub application: Application,
    pub faq: Faq,
    pub contact: Contact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    /// Contents of `<title>`.
    pub page_title: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Target of the floating apply button and the hero CTA.
    pub apply_url: String,
    pub apply_label: String,
    /// Footer copyright line (markdown).
    pub copyright: String,
}

fn default_lang() -> String {
    "ko".to_owned()
}

/// Color palette and sizing, emitted as CSS custom properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    pub primary: String,
    pub primary_light: String,
    pub primary_dark: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_muted: String,
    pub background_light: String,
    pub background_dark: String,
    pub white: String,
    pub border: String,
    pub shadow_light: String,
    pub shadow_medium: String,
    pub shadow_dark: String,
    #[serde(default = "default_header_height")]
    pub header_height_px: u32,
}

fn default_header_height() -> u32 {
    70
}

/// The page sections a nav item can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Hero,
    Introduction,
    ParticipationGuide,
    EventComposition,
    AnnualSchedule,
    ApplicationMethod,
    Faq,
    Contact,
}

impl Section {
    /// Element id of the section in the rendered page.
    pub fn anchor(self) -> &'static str {
        match self {
            Section::Hero => "section-hero",
            Section::Introduction => "section-introduction",
            Section::ParticipationGuide => "section-participation-guide",
            Section::EventComposition => "section-event-composition",
            Section::AnnualSchedule => "section-annual-schedule",
            Section::ApplicationMethod => "section-application-method",
            Section::Faq => "section-faq",
            Section::Contact => "section-contact",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavItem {
    pub label: String,
    pub target: Section,
}

/// A hosting organization and its logo file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organizer {
    pub name: String,
    pub logo: PathBuf,
    /// Extra class added to the header logo (some marks need their own sizing).
    #[serde(default)]
    pub header_class: Option<String>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub title: String,
    pub catchphrases: Vec<String>,
    pub info_heading: String,
    pub date: String,
    pub theme: String,
    pub deadline: String,
    pub venue: String,
    pub cta_label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Introduction {
    pub heading: String,
    /// Markdown paragraphs.
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Participation {
    pub title: String,
    pub cards: Vec<GuideCard>,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuideCard {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeline {
    pub title: String,
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineItem {
    pub icon: String,
    /// Time range badge, e.g. `13:00 - 13:30 (30분)`.
    pub time: String,
    pub title: String,
    pub details: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    pub title: String,
    pub rounds: Vec<Round>,
}

/// Recruitment state of one round in the annual schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Closed,
    Open,
    Upcoming,
}

impl RoundStatus {
    /// Badge text used when a round does not override it.
    pub fn default_label(self) -> &'static str {
        match self {
            RoundStatus::Closed => "모집 마감",
            RoundStatus::Open => "모집중",
            RoundStatus::Upcoming => "모집예정",
        }
    }

    pub fn is_open(self) -> bool {
        self == RoundStatus::Open
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Round {
    pub status: RoundStatus,
    #[serde(default)]
    pub status_label: Option<String>,
    pub theme: String,
    pub date_venue: String,
    /// Markdown.
    pub details: String,
    pub button_label: String,
}

impl Round {
    pub fn badge(&self) -> &str {
        self.status_label
            .as_deref()
            .unwrap_or_else(|| self.status.default_label())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Application {
    pub title: String,
    pub deadline: String,
    pub steps: Vec<ApplicationStep>,
    pub downloads_title: String,
    #[serde(default)]
    pub downloads_note: Option<String>,
    #[serde(default)]
    pub downloads: Vec<Download>,
    pub required_docs: RequiredDocs,
    /// Markdown.
    pub notice: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationStep {
    pub title: String,
    /// Markdown.
    pub body: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Where a download comes from: a local file inlined into the page, or an
/// external link left as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Path(PathBuf),
    Url(String),
}

/// A document offered for download.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawDownload")]
pub struct Download {
    pub label: String,
    pub source: DownloadSource,
}

/// On-disk shape of a download: exactly one of `path` or `url`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDownload {
    label: String,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    url: Option<String>,
}

impl TryFrom<RawDownload> for Download {
    type Error = String;

    fn try_from(raw: RawDownload) -> Result<Self, Self::Error> {
        let source = match (raw.path, raw.url) {
            (Some(path), None) => DownloadSource::Path(path),
            (None, Some(url)) => {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(format!(
                        "download '{}': url must start with http:// or https://",
                        raw.label
                    ));
                }
                DownloadSource::Url(url)
            }
            (Some(_), Some(_)) => {
                return Err(format!(
                    "download '{}': set either path or url, not both",
                    raw.label
                ))
            }
            (None, None) => {
                return Err(format!("download '{}': path or url is required", raw.label))
            }
        };
        Ok(Download {
            label: raw.label,
            source,
        })
    }
}

impl Download {
    /// File name offered to the browser's save dialog. Links have none.
    pub fn file_name(&self) -> Option<String> {
        match &self.source {
            DownloadSource::Path(path) => Some(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            DownloadSource::Url(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredDocs {
    pub title: String,
    pub groups: Vec<DocGroup>,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocGroup {
    pub icon: String,
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Faq {
    pub title: String,
    pub intro: Vec<String>,
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaqItem {
    pub question: String,
    /// Markdown.
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    pub title: String,
    /// Markdown.
    pub subtitle: String,
    pub operator: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    /// `tel:` target with separators removed (`02-499-5111` → `024995111`).
    pub fn phone_href(&self) -> String {
        let digits: String = self
            .phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("tel:{digits}")
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl EditionConfig {
    /// Parse and validate an edition from YAML source.
    pub fn from_yaml(source: &str) -> Result<Self, String> {
        let config: EditionConfig =
            serde_yml::from_str(source).map_err(|e| format!("invalid edition file: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Read an edition file from disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => format!("config not found: {}", path.display()),
            io::ErrorKind::PermissionDenied => {
                format!("permission denied: {}", path.display())
            }
            _ => format!("reading '{}': {e}", path.display()),
        })?;
        Self::from_yaml(&source).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// The edition compiled into the binary.
    pub fn embedded() -> Result<Self, String> {
        Self::from_yaml(web_assets::DEFAULT_EDITION)
    }

    /// Load `path` when given, otherwise the embedded edition.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) => {
                eprintln!("[config] source={}", p.display());
                Self::load(p)
            }
            None => {
                eprintln!("[config] source=embedded");
                Self::embedded()
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.organizers.is_empty() {
            return Err("at least one organizer is required".to_owned());
        }
        if self.nav.is_empty() {
            return Err("nav must list at least one section".to_owned());
        }
        for (name, value) in self.theme.palette() {
            if value.trim().is_empty() {
                return Err(format!("theme.{name} must not be empty"));
            }
            // Values land verbatim inside <style>.
            if value.contains(['<', '>', '{', '}', ';']) {
                return Err(format!(
                    "theme.{name} contains a character not allowed in a CSS value: {value:?}"
                ));
            }
        }
        Ok(())
    }
}

impl Theme {
    fn palette(&self) -> [(&'static str, &str); 13] {
        [
            ("primary", self.primary.as_str()),
            ("primary_light", self.primary_light.as_str()),
            ("primary_dark", self.primary_dark.as_str()),
            ("text_primary", self.text_primary.as_str()),
            ("text_secondary", self.text_secondary.as_str()),
            ("text_muted", self.text_muted.as_str()),
            ("background_light", self.background_light.as_str()),
            ("background_dark", self.background_dark.as_str()),
            ("white", self.white.as_str()),
            ("border", self.border.as_str()),
            ("shadow_light", self.shadow_light.as_str()),
            ("shadow_medium", self.shadow_medium.as_str()),
            ("shadow_dark", self.shadow_dark.as_str()),
        ]
    }

    /// The `:root { … }` block consumed by the embedded stylesheet.
    pub fn css_variables(&self) -> String {
        format!(
            ":root {{\n\
  --primary-color: {}; --primary-color-light: {}; --primary-color-dark: {};\n\
  --text-primary: {}; --text-secondary: {}; --text-muted: {};\n\
  --background-light-gray: {}; --background-dark-gray: {};\n\
  --white-color: {}; --border-color: {};\n\
  --box-shadow-light: {}; --box-shadow-medium: {}; --box-shadow-dark: {};\n\
  --header-height: {}px;\n\
  --border-radius-sm: 6px; --border-radius-md: 10px; --border-radius-lg: 16px;\n\
}}\n",
            self.primary,
            self.primary_light,
            self.primary_dark,
            self.text_primary,
            self.text_secondary,
            self.text_muted,
            self.background_light,
            self.background_dark,
            self.white,
            self.border,
            self.shadow_light,
            self.shadow_medium,
            self.shadow_dark,
            self.header_height_px,
        )
    }
}
