use serde::{Deserialize, Serialize};

/// Caller-supplied filters for a single recommendation request
///
/// Values are not validated: an inverted `year_range` simply matches nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, alias = "minRating")]
    pub min_rating: Option<f64>,
    #[serde(default, alias = "yearRange")]
    pub year_range: Option<(i32, i32)>,
}

impl FilterCriteria {
    pub fn has_genre_filter(&self) -> bool {
        !self.genres.is_empty()
    }

    pub fn has_service_filter(&self) -> bool {
        !self.services.is_empty()
    }

    /// Threshold of the min-rating filter, when it is active
    pub fn min_rating_threshold(&self) -> Option<f64> {
        self.min_rating.filter(|threshold| *threshold > 0.0)
    }

    /// Whether `year` lies inside the active year range (inclusive)
    pub fn year_in_range(&self, year: i32) -> Option<bool> {
        self.year_range
            .map(|(from, to)| year >= from && year <= to)
    }
}
