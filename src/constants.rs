/// Column labels used by the Ministry of Health dental clinic export
/// These are the defaults; every label can be overridden in `[source.columns]`

pub const COLUMN_NAME: &str = "機構名稱";
pub const COLUMN_CITY_CODE: &str = "縣市別代碼";
pub const COLUMN_DISTRICT_CODE: &str = "行政區域代碼";
pub const COLUMN_ADDRESS: &str = "街道項弄號";
pub const COLUMN_PRINCIPAL: &str = "負責人";
pub const COLUMN_PHONE: &str = "電話";

// Fallback labels
pub const UNCATEGORIZED_COMMUNITY: &str = "未分類";
pub const UNKNOWN_CLINIC_NAME: &str = "未知名稱";
pub const DEFAULT_SLUG: &str = "clinic";

// Site defaults
pub const DEFAULT_SOURCE_FILE: &str = "Dentist_Hsinchu_City.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "docs";
pub const DEFAULT_CONFIG_FILE: &str = "clinic_directory.toml";
pub const DEFAULT_SITE_TITLE: &str = "新竹市牙醫診所地圖";
pub const PAGE_TITLE_SUFFIX: &str = "新竹市牙醫診所";

pub const CLINICS_DIR: &str = "clinics";
pub const ASSETS_DIR: &str = "assets";
pub const DATA_DIR: &str = "data";
pub const RATINGS_FILE: &str = "ratings.json";

pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
pub const PLACES_FIND_URL: &str =
    "https://maps.googleapis.com/maps/api/place/findplacefromtext/json";
pub const GOOGLE_MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Note stored for clinics that have no curated rating yet
pub const RATING_PENDING_NOTE: &str = "尚未提供星等，請點擊地圖查看最新評論";

/// Hsinchu City district codes and their names
pub const HSINCHU_DISTRICTS: [(&str, &str); 3] = [
    ("10018010", "東區"),
    ("10018020", "北區"),
    ("10018030", "香山區"),
];
