use serde::Deserialize;

use crate::entities::movie;

/// Rating given to a freshly added movie until the user edits it.
pub const PLACEHOLDER_RATING: f64 = 7.3;
/// Rank given to a freshly added movie; the next listing replaces it.
pub const PLACEHOLDER_RANKING: i32 = 10;
pub const PLACEHOLDER_REVIEW: &str = "My favourite character was the caller.";

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    pub ranking: i32,
    pub review: String,
    pub img_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            ranking: m.ranking,
            review: m.review,
            img_url: m.img_url,
        }
    }
}

/// A movie about to be inserted. `id: None` lets the store assign one.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub id: Option<i32>,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    pub ranking: i32,
    pub review: String,
    pub img_url: String,
}

impl NewMovie {
    /// Builds the initial record for a movie picked from search results.
    pub fn from_details(details: MovieDetails) -> Self {
        Self {
            id: Some(details.id),
            title: details.title,
            year: details.year,
            description: details.description,
            rating: PLACEHOLDER_RATING,
            ranking: PLACEHOLDER_RANKING,
            review: PLACEHOLDER_REVIEW.to_string(),
            img_url: details.img_url,
        }
    }
}

/// One entry of a title search, not yet persisted.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Full metadata for a single title, already mapped onto movie fields.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDetails {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MovieIdQuery {
    pub movie_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct FindQuery {
    pub id: i32,
}
