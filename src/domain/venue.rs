use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A farmers' market or other place where farms set up booths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    /// WGS84 degrees.
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct NewVenue {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}

impl NewVenue {
    pub fn normalized(self) -> Result<Self, DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput(
                "venue name must not be empty".to_string(),
            ));
        }
        let owner_id = self.owner_id.trim();
        if owner_id.is_empty() {
            return Err(DomainError::InvalidInput(
                "owner id must not be empty".to_string(),
            ));
        }
        coordinate("latitude", self.latitude, 90.0)?;
        coordinate("longitude", self.longitude, 180.0)?;

        Ok(Self {
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            ..self
        })
    }
}

fn coordinate(field: &str, value: f64, limit: f64) -> Result<(), DomainError> {
    if !(-limit..=limit).contains(&value) {
        return Err(DomainError::InvalidInput(format!(
            "{field} must be between -{limit} and {limit}, got {value}"
        )));
    }
    Ok(())
}
