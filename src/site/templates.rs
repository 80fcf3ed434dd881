use askama::Template;

use crate::site::views::{ClinicView, SectionView};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub total: usize,
    pub sections: Vec<SectionView>,
    pub data_source: &'a str,
    pub generated_at: String,
}

#[derive(Template)]
#[template(path = "clinic.html")]
pub struct ClinicTemplate<'a> {
    pub title: &'a str,
    pub page_title: String,
    pub clinic: ClinicView,
    pub data_source: &'a str,
    pub generated_at: String,
}
