use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{MatchEngineError, Result};

/// Point on the globe in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    /// `(0, 0)` is what a freshly signed-up user carries until they pick a place
    pub const UNSET: Location = Location {
        longitude: 0.0,
        latitude: 0.0,
    };

    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Unset only when both axes are zero
    pub fn is_unset(&self) -> bool {
        self.longitude == 0.0 && self.latitude == 0.0
    }

    /// Truncated great-circle distance in km
    pub fn distance_km(&self, other: &Location) -> i64 {
        crate::ranking::geo::distance_km(
            self.longitude,
            self.latitude,
            other.longitude,
            other.latitude,
        )
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::UNSET
    }
}

/// Coordinate as stored: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    /// Empty strings read as zero, like the mobile client writes them on signup
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(n) => *n,
            Coordinate::Text(s) if s.trim().is_empty() => 0.0,
            Coordinate::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Location as stored in a profile document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationDocument {
    #[serde(default)]
    pub long: Option<Coordinate>,
    #[serde(default)]
    pub lat: Option<Coordinate>,
}

/// Lenient, store-facing shape of a user document.
///
/// Every field is optional; [`Profile::try_from`] decides what is
/// acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<LocationDocument>,
    #[serde(default)]
    pub has_completed_onboarding: Option<bool>,
}

impl ProfileDocument {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A searching user or a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub has_completed_onboarding: bool,
}

impl Profile {
    /// Create a profile with the fields ranking cares about
    pub fn new<I, S>(id: impl Into<String>, skills: I, location: Location) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            photo_url: String::new(),
            address: String::new(),
            skills: skills.into_iter().map(Into::into).collect(),
            location,
            has_completed_onboarding: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Same person, searching for a different skill set
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// A candidate needs skills and a location to be rankable
    pub fn ensure_candidate(&self) -> Result<()> {
        if self.skills.is_empty() {
            return Err(MatchEngineError::invalid_profile(&self.id, "no skills"));
        }
        if self.location.is_unset() {
            return Err(MatchEngineError::invalid_profile(&self.id, "location not set"));
        }
        Ok(())
    }

    /// Without a location no distance can be computed
    pub fn ensure_searcher(&self) -> Result<()> {
        if self.location.is_unset() {
            return Err(MatchEngineError::invalid_profile(&self.id, "location not set"));
        }
        Ok(())
    }

    /// Display line for logging
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.clone()
        } else {
            format!("{} ({})", self.name, self.id)
        }
    }
}

impl TryFrom<ProfileDocument> for Profile {
    type Error = MatchEngineError;

    fn try_from(doc: ProfileDocument) -> Result<Self> {
        let id = match doc.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(MatchEngineError::invalid_profile("<unknown>", "missing id")),
        };

        let location = match doc.location {
            None => Location::UNSET,
            Some(loc) => {
                let axis = |c: Option<Coordinate>, name: &str| -> Result<f64> {
                    match c {
                        None => Ok(0.0),
                        Some(c) => c.parse().ok_or_else(|| {
                            MatchEngineError::invalid_profile(&id, format!("{name} is not numeric"))
                        }),
                    }
                };
                Location::new(axis(loc.long, "longitude")?, axis(loc.lat, "latitude")?)
            }
        };

        let skills = doc
            .skills
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Profile {
            id,
            name: doc.name.unwrap_or_default(),
            email: doc.email.unwrap_or_default(),
            photo_url: doc.photo_url.unwrap_or_default(),
            address: doc.address.unwrap_or_default(),
            skills,
            location,
            has_completed_onboarding: doc.has_completed_onboarding.unwrap_or(false),
        })
    }
}

impl From<&Profile> for ProfileDocument {
    fn from(profile: &Profile) -> Self {
        ProfileDocument {
            id: Some(profile.id.clone()),
            name: Some(profile.name.clone()),
            email: Some(profile.email.clone()),
            photo_url: Some(profile.photo_url.clone()),
            address: Some(profile.address.clone()),
            skills: Some(profile.skills.iter().cloned().collect()),
            location: Some(LocationDocument {
                long: Some(Coordinate::Number(profile.location.longitude)),
                lat: Some(Coordinate::Number(profile.location.latitude)),
            }),
            has_completed_onboarding: Some(profile.has_completed_onboarding),
        }
    }
}
