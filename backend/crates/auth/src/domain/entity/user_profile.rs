//! User Profile
//!
//! Member directory fields attached to a user. Kept apart from the
//! credential columns on [`User`](super::user::User) so that profile edits
//! never touch authentication state.

use chrono::NaiveDate;

use crate::domain::value_object::membership::{Branch, Position};

/// Profile fields shown in the member directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// "first last", recomputed whenever either part changes
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Avatar URL
    pub image: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    pub graduation_date: Option<NaiveDate>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    pub graduation_date: Option<NaiveDate>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.image.is_none()
            && self.position.is_none()
            && self.branch.is_none()
            && self.graduation_date.is_none()
            && self.github.is_none()
            && self.linkedin.is_none()
            && self.bio.is_none()
            && self.website.is_none()
    }
}

impl UserProfile {
    /// Profile seeded from a federated account's display name and avatar
    pub fn from_display_name(name: &str, image: Option<String>) -> Self {
        let name = name.trim();
        Self {
            full_name: (!name.is_empty()).then(|| name.to_string()),
            image,
            ..Default::default()
        }
    }

    /// Set name parts and recompute `full_name`
    pub fn set_name(&mut self, first: Option<String>, last: Option<String>) {
        self.first_name = first;
        self.last_name = last;
        self.full_name = compose_full_name(self.first_name.as_deref(), self.last_name.as_deref())
            .or(self.full_name.take());
    }

    pub fn apply(&mut self, changes: ProfileChanges) {
        if changes.first_name.is_some() || changes.last_name.is_some() {
            let first = changes.first_name.or(self.first_name.take());
            let last = changes.last_name.or(self.last_name.take());
            self.set_name(first, last);
        }
        if let Some(image) = changes.image {
            self.image = Some(image);
        }
        if let Some(position) = changes.position {
            self.position = Some(position);
        }
        if let Some(branch) = changes.branch {
            self.branch = Some(branch);
        }
        if let Some(date) = changes.graduation_date {
            self.graduation_date = Some(date);
        }
        if let Some(github) = changes.github {
            self.github = Some(github);
        }
        if let Some(linkedin) = changes.linkedin {
            self.linkedin = Some(linkedin);
        }
        if let Some(bio) = changes.bio {
            self.bio = Some(bio);
        }
        if let Some(website) = changes.website {
            self.website = Some(website);
        }
    }
}

fn compose_full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
