//! Display-ready values for the page templates.

use crate::constants::CLINICS_DIR;
use crate::pipeline::processing::normalize::slug::encode_component;
use crate::types::{ClinicRecord, CommunityGroup, Rating};

const MAX_STARS: usize = 5;

pub struct RatingView {
    pub present: bool,
    pub value_text: String,
    /// Pre-rendered star markup, empty when there is no rating
    pub stars: String,
    pub synthetic: bool,
    pub review_text: String,
}

impl RatingView {
    pub fn new(rating: Option<&Rating>) -> Self {
        match rating {
            None => Self {
                present: false,
                value_text: String::new(),
                stars: String::new(),
                synthetic: false,
                review_text: String::new(),
            },
            Some(rating) => Self {
                present: true,
                value_text: format!("{:.1}", rating.value),
                stars: star_markup(rating.value),
                synthetic: rating.is_synthetic(),
                review_text: rating
                    .review_count
                    .map(|n| format!("（{} 則評論）", n))
                    .unwrap_or_default(),
            },
        }
    }
}

pub struct ClinicView {
    pub name: String,
    pub community: String,
    pub address: String,
    pub principal: String,
    pub phone: String,
    pub tel_href: String,
    pub city_code: String,
    pub district_code: String,
    pub map_url: String,
    /// Link to the detail page, relative to the site root
    pub detail_href: String,
    /// Link from the detail page back to its community section
    pub back_href: String,
    pub search_text: String,
    pub rating: RatingView,
}

impl ClinicView {
    pub fn new(record: &ClinicRecord) -> Self {
        let tel = record.tel_target();
        Self {
            name: record.name.clone(),
            community: record.community.clone(),
            address: record.address.clone(),
            principal: record.principal.clone(),
            phone: record.phone.clone(),
            tel_href: if tel.is_empty() { String::new() } else { format!("tel:{}", tel) },
            city_code: record.city_code.clone(),
            district_code: record.district_code.clone(),
            map_url: record.map_url.clone(),
            detail_href: format!("{}/{}", CLINICS_DIR, page_href(&record.slug)),
            back_href: format!("../index.html#{}", community_anchor(&record.community)),
            search_text: format!("{} {} {}", record.name, record.community, record.address).to_lowercase(),
            rating: RatingView::new(record.rating.as_ref()),
        }
    }
}

pub struct SectionView {
    pub anchor: String,
    pub community: String,
    pub count: usize,
    pub clinics: Vec<ClinicView>,
}

impl SectionView {
    pub fn new(group: &CommunityGroup) -> Self {
        Self {
            anchor: community_anchor(&group.community),
            community: group.community.clone(),
            count: group.len(),
            clinics: group.clinics.iter().map(ClinicView::new).collect(),
        }
    }
}

/// Relative path of a clinic page inside the output directory
pub fn page_path(slug: &str) -> String {
    format!("{}/{}.html", CLINICS_DIR, slug)
}

/// Link target for a page file. Slugs may contain `%`, which must reach the server
/// as a literal character.
pub fn page_href(slug: &str) -> String {
    format!("{}.html", slug.replace('%', "%25"))
}

pub fn community_anchor(community: &str) -> String {
    format!("community-{}", encode_component(community))
}

/// Full, half and empty stars for a 0-5 rating
pub fn star_markup(value: f64) -> String {
    let clamped = if value.is_finite() { value.clamp(0.0, MAX_STARS as f64) } else { 0.0 };
    let full = clamped.floor() as usize;
    let half = usize::from(full < MAX_STARS && clamped - full as f64 >= 0.5);
    let empty = MAX_STARS - full - half;

    let mut markup = format!(r#"<span class="stars" aria-label="{:.1} / 5">"#, clamped);
    markup.push_str(&r#"<span class="star full">★</span>"#.repeat(full));
    markup.push_str(&r#"<span class="star half">★</span>"#.repeat(half));
    markup.push_str(&r#"<span class="star empty">☆</span>"#.repeat(empty));
    markup.push_str("</span>");
    markup
}
