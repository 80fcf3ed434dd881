//! Static site rendering: index page, one page per clinic, assets and data export.

pub mod templates;
pub mod views;

use askama::Template;
use chrono::{DateTime, Local};
use tracing::{debug, instrument};

use crate::constants::{ASSETS_DIR, DATA_DIR, PAGE_TITLE_SUFFIX};
use crate::error::Result;
use crate::pipeline::processing::catalog::ClinicCatalog;
use crate::types::ClinicRecord;
use templates::{ClinicTemplate, IndexTemplate};
use views::{page_path, ClinicView, SectionView};

pub use views::{community_anchor, page_href, star_markup};

const STYLE_CSS: &str = include_str!("../../assets/style.css");
const SEARCH_JS: &str = include_str!("../../assets/search.js");

pub const INDEX_PAGE: &str = "index.html";

/// One file of the generated site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    pub path: String,
    pub contents: Vec<u8>,
}

impl SiteFile {
    fn text(path: String, contents: String) -> Self {
        Self { path, contents: contents.into_bytes() }
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub data_source: String,
}

pub struct SiteBuilder {
    settings: SiteSettings,
    generated_at: String,
}

impl SiteBuilder {
    pub fn new(settings: SiteSettings, generated_at: DateTime<Local>) -> Self {
        Self { settings, generated_at: generated_at.format("%Y-%m-%d %H:%M").to_string() }
    }

    pub fn render_index(&self, catalog: &ClinicCatalog) -> Result<String> {
        let template = IndexTemplate {
            title: &self.settings.title,
            total: catalog.len(),
            sections: catalog.groups().iter().map(SectionView::new).collect(),
            data_source: &self.settings.data_source,
            generated_at: self.generated_at.clone(),
        };
        Ok(template.render()?)
    }

    pub fn render_clinic(&self, record: &ClinicRecord) -> Result<String> {
        let template = ClinicTemplate {
            title: &self.settings.title,
            page_title: format!("{} | {}", record.name, PAGE_TITLE_SUFFIX),
            clinic: ClinicView::new(record),
            data_source: &self.settings.data_source,
            generated_at: self.generated_at.clone(),
        };
        Ok(template.render()?)
    }

    /// Every file of the site except the ratings template
    #[instrument(skip(self, catalog), fields(clinics = catalog.len()))]
    pub fn build(&self, catalog: &ClinicCatalog) -> Result<Vec<SiteFile>> {
        let mut files = Vec::with_capacity(catalog.len() + 4);
        files.push(SiteFile::text(INDEX_PAGE.to_string(), self.render_index(catalog)?));

        for record in catalog.records() {
            files.push(SiteFile::text(page_path(&record.slug), self.render_clinic(record)?));
        }

        files.push(SiteFile::text(format!("{}/style.css", ASSETS_DIR), STYLE_CSS.to_string()));
        files.push(SiteFile::text(format!("{}/search.js", ASSETS_DIR), SEARCH_JS.to_string()));
        files.push(SiteFile {
            path: format!("{}/clinics.json", DATA_DIR),
            contents: serde_json::to_vec_pretty(catalog.records())?,
        });

        debug!("Rendered {} site files", files.len());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::TimeZone;

    fn record(name: &str, community: &str, slug: &str, rating: Option<Rating>) -> ClinicRecord {
        ClinicRecord {
            name: name.to_string(),
            city_code: "10018".to_string(),
            district_code: "10018010".to_string(),
            address: format!("東區{}1號", community),
            principal: "王小明".to_string(),
            phone: "03-1234567".to_string(),
            community: community.to_string(),
            slug: slug.to_string(),
            map_url: "https://www.google.com/maps/search/?api=1&query=x".to_string(),
            rating,
        }
    }

    fn builder() -> SiteBuilder {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        SiteBuilder::new(
            SiteSettings { title: "新竹市牙醫診所地圖".to_string(), data_source: "Dentist_Hsinchu_City.csv".to_string() },
            at,
        )
    }

    #[test]
    fn test_index_groups_and_footer() {
        let catalog = ClinicCatalog::new(vec![
            record("光明牙醫診所", "光明里", "guangming", Some(Rating::synthetic(3.4))),
            record("仁愛牙醫診所", "仁愛里", "renai", None),
        ]);
        let html = builder().render_index(&catalog).unwrap();

        assert!(html.contains(r#"id="community-%E4%BB%81%E6%84%9B%E9%87%8C""#));
        assert!(html.contains(r#"<span class="chip">1 間</span>"#));
        assert!(html.find("仁愛里").unwrap() < html.find("光明里").unwrap());
        assert!(html.contains("Dentist_Hsinchu_City.csv"));
        assert!(html.contains("2024-05-01 09:30"));
        assert!(html.contains("示意"));
        assert!(html.contains("尚未提供"));
        assert!(html.contains(r#"id="empty-state" class="empty-state" hidden"#));
        assert!(html.contains("assets"));
    }

    #[test]
    fn test_empty_catalog_shows_empty_state() {
        let html = builder().render_index(&ClinicCatalog::default()).unwrap();
        assert!(html.contains(r#"id="empty-state" class="empty-state">"#));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn test_clinic_page_content() {
        let html = builder()
            .render_clinic(&record("光明牙醫診所", "光明里", "guangming", Some(Rating::fetched(4.5, Some(88)))))
            .unwrap();
        assert!(html.contains("<title>光明牙醫診所 | 新竹市牙醫診所</title>"));
        assert!(html.contains(r#"<p class="badge">光明里</p>"#));
        assert!(html.contains("負責人：王小明"));
        assert!(html.contains(r#"<span class="rating-value">4.5</span>"#));
        assert!(html.contains("（88 則評論）"));
        assert!(!html.contains("rating-synthetic"));
        assert!(html.contains("03-1234567"));
        assert!(html.contains("10018010"));
        assert!(html.contains("community-%E5%85%89%E6%98%8E%E9%87%8C"));
    }

    #[test]
    fn test_names_are_html_escaped() {
        let html = builder()
            .render_clinic(&record("<script>alert(1)</script>", "光明里", "x", None))
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_build_lists_every_file() {
        let catalog = ClinicCatalog::new(vec![
            record("光明牙醫診所", "光明里", "guangming", None),
            record("仁愛牙醫診所", "仁愛里", "renai", None),
        ]);
        let files = builder().build(&catalog).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "clinics/guangming.html",
                "clinics/renai.html",
                "assets/style.css",
                "assets/search.js",
                "data/clinics.json",
            ]
        );

        let data = files.iter().find(|f| f.path == "data/clinics.json").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&data.contents).unwrap();
        assert_eq!(json[0]["slug"], "guangming");
        assert_eq!(json[1]["districtCode"], "10018010");
    }
}
