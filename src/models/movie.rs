use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier for a movie, normalised to its string form
///
/// Different sources hand out ids as JSON numbers (`550`) or strings (`"550"`).
/// Both deserialize to the same `MovieId`, so membership checks never depend on
/// which source produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawMovieId", into = "String")]
pub struct MovieId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMovieId {
    Number(i64),
    Float(f64),
    Text(String),
}

impl From<RawMovieId> for MovieId {
    fn from(raw: RawMovieId) -> Self {
        match raw {
            RawMovieId::Number(id) => MovieId(id.to_string()),
            RawMovieId::Float(id) if id.fract() == 0.0 => MovieId(format!("{}", id as i64)),
            RawMovieId::Float(id) => MovieId(id.to_string()),
            RawMovieId::Text(id) => MovieId::from(id.as_str()),
        }
    }
}

impl From<MovieId> for String {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        MovieId(id.trim().to_string())
    }
}

impl From<u64> for MovieId {
    fn from(id: u64) -> Self {
        MovieId(id.to_string())
    }
}

impl MovieId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie offered to the scorer
///
/// Every field other than `id` may be absent in upstream data; collections
/// default to empty and scalars to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMovie {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, alias = "genre")]
    pub genres: Vec<String>,
    /// Average audience rating on a 0-10 scale
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default, alias = "streamingOn")]
    pub streaming_on: Vec<String>,
}

impl CandidateMovie {
    /// Creates a movie with only an id and a title set
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: None,
            genres: Vec::new(),
            rating: None,
            cast: Vec::new(),
            director: None,
            streaming_on: Vec::new(),
        }
    }
}

/// A candidate together with the score assigned to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: CandidateMovie,
    pub recommendation_score: f64,
}

/// A genre as listed by the metadata provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}
