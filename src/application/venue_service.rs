use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::VenueRepository;
use crate::domain::venue::{NewVenue, Venue, VenueId};

/// Market venues shoppers browse and owners register.
#[derive(Clone)]
pub struct VenueService {
    repo: Arc<dyn VenueRepository>,
}

impl VenueService {
    pub fn new(repo: Arc<dyn VenueRepository>) -> Self {
        Self { repo }
    }

    pub fn register_venue(&self, venue: NewVenue) -> Result<Venue, DomainError> {
        let venue = self.repo.create_venue(venue.normalized()?)?;
        log::info!(
            "venue {} '{}' registered by {}",
            venue.id,
            venue.name,
            venue.owner_id
        );
        Ok(venue)
    }

    pub fn venues(&self) -> Result<Vec<Venue>, DomainError> {
        self.repo.venues()
    }

    pub fn venues_for_owner(&self, owner_id: &str) -> Result<Vec<Venue>, DomainError> {
        self.repo.venues_for_owner(owner_id.trim())
    }

    pub fn get_venue(&self, venue_id: &VenueId) -> Result<Venue, DomainError> {
        self.repo
            .venue_by_id(venue_id)?
            .ok_or_else(|| DomainError::NotFound(format!("venue '{venue_id}'")))
    }
}
