pub mod profile;
pub mod scored_candidate;
pub mod session;

pub use profile::{Coordinate, Location, LocationDocument, Profile, ProfileDocument};
pub use scored_candidate::ScoredCandidate;
pub use session::Session;
