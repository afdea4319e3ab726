//! Page assembly.
//!
//! Renders the edition as one standalone HTML document: palette variables and
//! the embedded stylesheet go into a `<style>` element, logos and downloads
//! are emitted as data URIs, and sections follow a fixed order. Fields the
//! edition marks as markdown are rendered with comrak; everything else is
//! escaped text.

use comrak::{markdown_to_html, Options};

use crate::brand::{BrandAssets, DownloadAsset, OrganizerLogo};
use crate::config::{
    Application, Contact, DownloadSource, EditionConfig, Faq, Hero, Introduction, Participation,
    Round, RoundStatus, Schedule, Section, Timeline,
};
use crate::web_assets;

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Minimal HTML entity escaping for text content and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// comrak options for edition copy.
///
/// Raw HTML in the edition file is not passed through; line breaks inside a
/// paragraph are kept as `<br>` because the copy is laid out line by line.
fn make_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = false;
    options
}

/// Render a markdown field as block HTML (`<p>…</p>` per paragraph).
pub fn markdown_block(source: &str) -> String {
    markdown_to_html(source, &make_options())
}

/// Render a single-paragraph markdown field without the wrapping `<p>`.
///
/// Multi-paragraph input is returned as block HTML unchanged.
pub fn markdown_inline(source: &str) -> String {
    let html = markdown_block(source);
    let trimmed = html.trim_end();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_owned(),
        _ => html,
    }
}

// ---------------------------------------------------------------------------
// Fixed chrome: header, floating button, footer
// ---------------------------------------------------------------------------

/// Logo group for the fixed header. Missing logos become a text label.
fn header_logo_html(logo: &OrganizerLogo) -> String {
    let name = html_escape(&logo.organizer.name);
    match &logo.asset {
        Some(asset) => {
            let class = match &logo.organizer.header_class {
                Some(extra) => format!("header-logo {}", html_escape(extra)),
                None => "header-logo".to_owned(),
            };
            // Base64 payloads never contain characters that need escaping.
            format!(
                "<img src=\"{}\" alt=\"{name}\" class=\"{class}\">",
                asset.data_uri()
            )
        }
        None => format!("<span class=\"header-logo-placeholder\">{name}</span>"),
    }
}

fn build_header_html(config: &EditionConfig, brand: &BrandAssets) -> String {
    let logos: String = brand.logos.iter().map(header_logo_html).collect();
    let nav: String = config
        .nav
        .iter()
        .map(|item| {
            format!(
                "<a href=\"#{}\" class=\"header-nav-item\">{}</a>",
                item.target.anchor(),
                html_escape(&item.label)
            )
        })
        .collect();
    format!(
        "<div class=\"fixed-header\"><div class=\"header-content\">\
<div class=\"header-logo-group\">{logos}</div>\
<nav class=\"header-nav\">{nav}</nav>\
</div></div>\n"
    )
}

fn build_fab_html(config: &EditionConfig) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"fab\">{}</a>\n",
        html_escape(&config.site.apply_url),
        html_escape(&config.site.apply_label)
    )
}

/// Selector list for `scroll-margin-top`: every nav target plus the hero.
fn scroll_margin_rule(config: &EditionConfig) -> String {
    let mut selectors: Vec<String> = config
        .nav
        .iter()
        .map(|item| format!("#{}", item.target.anchor()))
        .collect();
    let hero = format!("#{}", Section::Hero.anchor());
    if !selectors.contains(&hero) {
        selectors.push(hero);
    }
    format!(
        "{} {{ scroll-margin-top: calc(var(--header-height) + 30px); }}\n",
        selectors.join(", ")
    )
}

fn build_footer_html(config: &EditionConfig, brand: &BrandAssets) -> String {
    let mut logos = String::new();
    for logo in &brand.logos {
        let name = html_escape(&logo.organizer.name);
        let inner = match &logo.asset {
            Some(asset) => format!("<img src=\"{}\" alt=\"{name}\">", asset.data_uri()),
            None => format!("<span>{name}</span>"),
        };
        logos.push_str(&format!("<div class=\"footer-logo-item\">{inner}</div>\n"));
    }
    format!(
        "<footer class=\"page-footer\">\n\
<div class=\"footer-logo-container\">\n{logos}</div>\n\
<div class=\"footer-copyright\">{}</div>\n\
</footer>\n",
        markdown_inline(&config.site.copyright)
    )
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn build_hero_html(hero: &Hero, apply_url: &str) -> String {
    let catchphrases: String = hero
        .catchphrases
        .iter()
        .map(|c| format!("<p class=\"hero-catchphrase\">{}</p>\n", html_escape(c)))
        .collect();
    format!(
        "<section id=\"{id}\">\n\
<div class=\"hero-bg-elements\"><div class=\"bg-shape shape1\"></div><div class=\"bg-shape shape2\"></div><div class=\"bg-shape shape3\"></div></div>\n\
<div class=\"hero-content-wrapper\">\n\
<h1 class=\"hero-main-title\">{title}</h1>\n\
<div class=\"hero-catchphrase-container\">\n{catchphrases}</div>\n\
</div>\n\
<div class=\"hero-key-info\">\n\
<h3>{info_heading}</h3>\n\
<p><span class=\"info-label\">일시:</span> {date}</p>\n\
<p><span class=\"info-label\">주제:</span> {theme}</p>\n\
<p><span class=\"info-label\">신청마감:</span> <span class=\"deadline\">{deadline}</span></p>\n\
<p><span class=\"info-label\">장소:</span> {venue}</p>\n\
</div>\n\
<div class=\"hero-cta-button-container\">\n\
<a href=\"{apply_url}\" target=\"_blank\" rel=\"noopener\" class=\"hero-cta-button custom-button\">{cta}</a>\n\
</div>\n\
</section>\n",
        id = Section::Hero.anchor(),
        title = html_escape(&hero.title),
        info_heading = html_escape(&hero.info_heading),
        date = html_escape(&hero.date),
        theme = html_escape(&hero.theme),
        deadline = html_escape(&hero.deadline),
        venue = html_escape(&hero.venue),
        apply_url = html_escape(apply_url),
        cta = html_escape(&hero.cta_label),
    )
}

fn build_introduction_html(intro: &Introduction, brand: &BrandAssets) -> String {
    let paragraphs: String = intro.paragraphs.iter().map(|p| markdown_block(p)).collect();
    // Organizer row: a missing logo leaves its cell empty; the names already
    // appear in the copy above.
    let logos: String = brand
        .logos
        .iter()
        .map(|logo| {
            let inner = match &logo.asset {
                Some(asset) => format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    asset.data_uri(),
                    html_escape(&logo.organizer.name)
                ),
                None => String::new(),
            };
            format!("<div class=\"organizer-logo-item\">{inner}</div>\n")
        })
        .collect();
    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<div class=\"intro-text-content\">\n\
<h3>{heading}</h3>\n\
{paragraphs}\
<div class=\"organizers-section\"><div class=\"organizer-logos-flex\">\n{logos}</div></div>\n\
</div>\n\
</section>\n",
        id = Section::Introduction.anchor(),
        heading = html_escape(&intro.heading),
    )
}

fn build_participation_html(guide: &Participation) -> String {
    let cards: String = guide
        .cards
        .iter()
        .map(|card| {
            format!(
                "<div class=\"guide-card\">\n\
<h3 class=\"guide-card-title\"><span class=\"title-icon\">{}</span> {}</h3>\n\
<p class=\"guide-card-description\">{}</p>\n\
</div>\n",
                html_escape(&card.icon),
                html_escape(&card.title),
                html_escape(&card.description)
            )
        })
        .collect();
    let notice = match &guide.notice {
        Some(n) => format!("<p class=\"guide-notice\">{}</p>\n", html_escape(n)),
        None => String::new(),
    };
    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"guide-card-row\">\n{cards}</div>\n\
{notice}\
</section>\n",
        id = Section::ParticipationGuide.anchor(),
        title = html_escape(&guide.title),
    )
}

fn build_timeline_html(timeline: &Timeline) -> String {
    let mut items = String::new();
    for (i, item) in timeline.items.iter().enumerate() {
        items.push_str(&format!(
            "<div class=\"timeline-item\" style=\"animation-delay: {delay}ms;\">\
<div class=\"timeline-icon-wrapper\"><div class=\"timeline-icon\">{icon}</div></div>\
<div class=\"timeline-content-card\">\
<span class=\"time-duration-badge\">{time}</span>\
<h4 class=\"item-title-text\">{title}</h4>\
<p class=\"item-details-text\">{details}</p>\
</div></div>\n",
            delay = i * 100,
            icon = html_escape(&item.icon),
            time = html_escape(&item.time),
            title = html_escape(&item.title),
            details = html_escape(&item.details),
        ));
    }
    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"timeline-wrapper\">\n{items}</div>\n\
</section>\n",
        id = Section::EventComposition.anchor(),
        title = html_escape(&timeline.title),
    )
}

fn status_class(status: RoundStatus) -> &'static str {
    match status {
        RoundStatus::Closed => "status-closed",
        RoundStatus::Open => "status-open",
        RoundStatus::Upcoming => "status-upcoming",
    }
}

/// One card of the annual schedule. Only an open round links to the
/// application section; the others render a disabled button.
fn build_round_html(index: usize, round: &Round) -> String {
    let open = round.status.is_open();
    let card_class = if open {
        "event-schedule-card"
    } else {
        "event-schedule-card card-disabled-look"
    };
    let button = if open {
        format!(
            "<a href=\"#{}\" class=\"card-apply-button custom-button button-primary\">{}</a>",
            Section::ApplicationMethod.anchor(),
            html_escape(&round.button_label)
        )
    } else {
        format!(
            "<span class=\"card-apply-button custom-button button-disabled\" aria-disabled=\"true\">{}</span>",
            html_escape(&round.button_label)
        )
    };
    format!(
        "<div class=\"{card_class}\" style=\"animation-delay: {delay}ms;\">\n\
<div class=\"card-header\"><span class=\"event-status {status}\">{badge}</span></div>\n\
<h3 class=\"event-theme\">{theme}</h3>\n\
<span class=\"event-date-venue\">{date_venue}</span>\n\
<div class=\"event-details\">{details}</div>\n\
{button}\n\
</div>\n",
        delay = index * 150,
        status = status_class(round.status),
        badge = html_escape(round.badge()),
        theme = html_escape(&round.theme),
        date_venue = html_escape(&round.date_venue),
        details = markdown_inline(&round.details),
    )
}

fn build_schedule_html(schedule: &Schedule) -> String {
    let cards: String = schedule
        .rounds
        .iter()
        .enumerate()
        .map(|(i, round)| build_round_html(i, round))
        .collect();
    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"event-schedule-grid\">\n{cards}</div>\n\
</section>\n",
        id = Section::AnnualSchedule.anchor(),
        title = html_escape(&schedule.title),
    )
}

/// A download button. Local documents are inlined, or replaced by a visible
/// notice naming the file that could not be found. Links open in a new tab.
fn download_html(entry: &DownloadAsset) -> String {
    let label = html_escape(&entry.download.label);
    let file_name = html_escape(&entry.download.file_name().unwrap_or_default());
    match (&entry.download.source, &entry.asset) {
        (DownloadSource::Url(url), _) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"download-link-button\"><span class=\"icon\">📄</span>{label}</a>\n",
            html_escape(url)
        ),
        (DownloadSource::Path(_), Some(asset)) => format!(
            "<a href=\"{}\" download=\"{file_name}\" class=\"download-link-button\"><span class=\"icon\">📄</span>{label}</a>\n",
            asset.data_uri()
        ),
        (DownloadSource::Path(_), None) => format!(
            "<p class=\"download-missing\">⚠️ {label}: 파일을 찾을 수 없습니다 ({file_name})</p>\n"
        ),
    }
}

fn build_application_html(app: &Application, brand: &BrandAssets) -> String {
    let mut steps = String::new();
    for step in &app.steps {
        let link = match &step.link {
            Some(link) => format!(
                "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"form-link\">{}</a></p>\n",
                html_escape(&link.url),
                html_escape(&link.label)
            ),
            None => String::new(),
        };
        steps.push_str(&format!(
            "<div class=\"application-step\">\n\
<h3 class=\"application-step-title\">{}</h3>\n\
{}{link}</div>\n",
            html_escape(&step.title),
            markdown_block(&step.body),
        ));
    }

    let note = match &app.downloads_note {
        Some(n) => format!("<span class=\"download-links-note\">{}</span>\n", html_escape(n)),
        None => String::new(),
    };
    let downloads: String = brand.downloads.iter().map(download_html).collect();

    let mut groups = String::new();
    for (i, group) in app.required_docs.groups.iter().enumerate() {
        if i > 0 {
            groups.push_str("<hr>\n");
        }
        let items: String = group
            .items
            .iter()
            .map(|item| format!("<li>{}</li>\n", html_escape(item)))
            .collect();
        groups.push_str(&format!(
            "<h5>{} {}</h5>\n<ul>\n{items}</ul>\n",
            html_escape(&group.icon),
            html_escape(&group.title)
        ));
    }
    let docs_notice = match &app.required_docs.notice {
        Some(n) => format!("<p class=\"notice\">{}</p>\n", html_escape(n)),
        None => String::new(),
    };

    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"application-content\">\n\
<div class=\"application-deadline-highlight\">{deadline}</div>\n\
{steps}\
<div class=\"download-area\">\n\
<p class=\"download-links-title\">{downloads_title}</p>\n\
{note}\
<div class=\"download-links-grid\">\n{downloads}</div>\n\
</div>\n\
<div class=\"required-docs-section\">\n\
<h4>{docs_title}</h4>\n\
{groups}{docs_notice}\
</div>\n\
<div class=\"application-notice\">{notice}</div>\n\
</div>\n\
</section>\n",
        id = Section::ApplicationMethod.anchor(),
        title = html_escape(&app.title),
        deadline = html_escape(&app.deadline),
        downloads_title = html_escape(&app.downloads_title),
        docs_title = html_escape(&app.required_docs.title),
        notice = markdown_block(&app.notice),
    )
}

fn build_faq_html(faq: &Faq) -> String {
    let intro: String = faq
        .intro
        .iter()
        .map(|p| format!("<p>{}</p>\n", html_escape(p)))
        .collect();
    let items: String = faq
        .items
        .iter()
        .map(|item| {
            format!(
                "<details class=\"faq-item\">\n\
<summary class=\"faq-question\">{}</summary>\n\
<div class=\"faq-answer\">{}</div>\n\
</details>\n",
                html_escape(&item.question),
                markdown_block(&item.answer)
            )
        })
        .collect();
    format!(
        "<section id=\"{id}\" class=\"section\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"faq-intro\">\n{intro}</div>\n\
<div class=\"faq-list-container\">\n{items}</div>\n\
</section>\n",
        id = Section::Faq.anchor(),
        title = html_escape(&faq.title),
    )
}

fn build_contact_html(contact: &Contact) -> String {
    let email = html_escape(&contact.email);
    format!(
        "<section id=\"{id}\">\n\
<div class=\"content-wrapper\">\n\
<h2 class=\"section-title\">{title}</h2>\n\
<div class=\"section-subtitle\">{subtitle}</div>\n\
<div class=\"contact-card-styled\">\n\
<h3>{operator}</h3>\n\
<p><span class=\"icon\">✉️</span><strong>이메일:</strong>&nbsp;<a href=\"mailto:{email}\">{email}</a></p>\n\
<p><span class=\"icon\">📞</span><strong>연락처:</strong>&nbsp;<a href=\"{tel}\">{phone}</a></p>\n\
</div>\n\
</div>\n\
</section>\n",
        id = Section::Contact.anchor(),
        title = html_escape(&contact.title),
        subtitle = markdown_inline(&contact.subtitle),
        operator = html_escape(&contact.operator),
        tel = html_escape(&contact.phone_href()),
        phone = html_escape(&contact.phone),
    )
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Assemble the complete page.
///
/// Order: head, fixed header, floating apply button, hero, introduction,
/// participation guide, event timeline, annual schedule, application method,
/// FAQ, contact, footer. The output references no local files; the only
/// external fetch is the web font stylesheet.
pub fn build_page(config: &EditionConfig, brand: &BrandAssets) -> String {
    let title = html_escape(&config.site.page_title);
    let lang = html_escape(&config.site.lang);
    let palette = config.theme.css_variables();
    let scroll_margin = scroll_margin_rule(config);
    let css = web_assets::CSS;

    let sections = [
        build_hero_html(&config.hero, &config.site.apply_url),
        build_introduction_html(&config.introduction, brand),
        build_participation_html(&config.participation),
        build_timeline_html(&config.timeline),
        build_schedule_html(&config.schedule),
        build_application_html(&config.application, brand),
        build_faq_html(&config.faq),
        build_contact_html(&config.contact),
    ]
    .concat();

    let header = build_header_html(config, brand);
    let fab = build_fab_html(config);
    let footer = build_footer_html(config, brand);

    format!(
        "<!DOCTYPE html>\n\
<html lang=\"{lang}\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n\
<style>\n{palette}{scroll_margin}{css}</style>\n\
</head>\n\
<body>\n\
{header}\
{fab}\
<main>\n\
{sections}\
</main>\n\
{footer}\
</body>\n\
</html>\n"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
