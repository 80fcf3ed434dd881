pub mod http_client;
pub mod places_rating;
pub mod ratings_file;
pub mod site_writer;
pub mod source;

pub use http_client::HttpSource;
pub use places_rating::PlacesRatingLookup;
pub use ratings_file::{RatingEntry, RatingsFileLookup, RatingsTable};
pub use site_writer::{FsSiteOutput, MemorySiteOutput};
pub use source::{source_for, FileSource};
