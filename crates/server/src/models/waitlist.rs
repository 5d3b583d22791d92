//! Waitlist domain types.

use chrono::{DateTime, Utc};

use openwaitlist_core::{UserId, WaitlistId};

/// Soft-delete state of a waitlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveState {
    /// Visible to normal reads.
    #[default]
    Active,
    /// Soft-deleted; hidden from every read path.
    Archived {
        /// When the owner deleted the waitlist.
        at: DateTime<Utc>,
    },
}

impl ArchiveState {
    /// Build the state from the nullable `archived_at` column.
    #[must_use]
    pub const fn from_column(archived_at: Option<DateTime<Utc>>) -> Self {
        match archived_at {
            Some(at) => Self::Archived { at },
            None => Self::Active,
        }
    }

    /// The value for the nullable `archived_at` column.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Archived { at } => Some(*at),
        }
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self, Self::Archived { .. })
    }
}

/// A waitlist owned by a single user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waitlist {
    pub id: WaitlistId,
    /// URL identifier, regenerated from the name on every rename.
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
    pub is_public: bool,
    /// When false, badges and mentions of OpenWaitlist are hidden.
    pub show_vendor_branding: bool,
    pub created_at: DateTime<Utc>,
    pub state: ArchiveState,
}

impl Waitlist {
    /// Whether `user_id` owns this waitlist.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_user_id == user_id
    }
}

/// Data required to insert a waitlist; the store assigns ID and `created_at`.
#[derive(Debug, Clone)]
pub struct NewWaitlist {
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
    pub is_public: bool,
    pub show_vendor_branding: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_state_column_mapping() {
        assert_eq!(ArchiveState::from_column(None), ArchiveState::Active);
        assert_eq!(ArchiveState::Active.archived_at(), None);

        let now = Utc::now();
        let archived = ArchiveState::from_column(Some(now));
        assert!(archived.is_archived());
        assert_eq!(archived.archived_at(), Some(now));
    }
}
