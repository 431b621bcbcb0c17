pub mod candidates;
pub mod clock;
pub mod profile;
pub mod providers;
pub mod recommendations;
pub mod scoring;

pub use candidates::{CandidateBatch, CandidateFetcher, CandidateSettings};
pub use clock::{Clock, FixedClock, SystemClock};
pub use profile::{build_profile, ProfileLimits};
pub use recommendations::{RecommendationInput, RecommendationService};
pub use scoring::{FallbackScorer, PrimaryScorer, Scorer};
