//! In-memory [`Store`] for tests.
//!
//! Mirrors the constraints the `PostgreSQL` schema enforces: unique emails,
//! slugs unique among active waitlists, and archived rows hidden from reads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use openwaitlist_core::{Email, UserId, WaitlistId};

use super::{RepositoryError, Store};
use crate::models::{ArchiveState, NewUser, NewWaitlist, User, Waitlist};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    waitlists: Vec<Waitlist>,
    next_user_id: i64,
    next_waitlist_id: i64,
}

impl Tables {
    fn slug_taken(&self, slug: &str, except: Option<WaitlistId>) -> bool {
        self.waitlists
            .iter()
            .any(|w| w.slug == slug && !w.state.is_archived() && Some(w.id) != except)
    }
}

/// Thread-safe in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability. While unavailable every call fails with
    /// `RepositoryError::NotConnected`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every waitlist ever stored, archived ones included.
    #[must_use]
    pub fn all_waitlists(&self) -> Vec<Waitlist> {
        self.lock().waitlists.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(self.lock())
        } else {
            Err(RepositoryError::NotConnected)
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.tables().map(|_| ())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_user_id),
            email: user.email,
            provider: user.provider,
            display_name: user.display_name,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn get_waitlists_by_owner(
        &self,
        owner: UserId,
        search: Option<&str>,
    ) -> Result<Vec<Waitlist>, RepositoryError> {
        let tables = self.tables()?;
        let needle = search.map(str::to_lowercase);

        let mut found: Vec<Waitlist> = tables
            .waitlists
            .iter()
            .filter(|w| w.is_owned_by(owner) && !w.state.is_archived())
            .filter(|w| {
                needle
                    .as_deref()
                    .is_none_or(|n| w.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i64().cmp(&a.id.as_i64()))
        });
        Ok(found)
    }

    async fn create_waitlist(&self, waitlist: NewWaitlist) -> Result<Waitlist, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.slug_taken(&waitlist.slug, None) {
            return Err(RepositoryError::Conflict("slug already exists".to_string()));
        }

        tables.next_waitlist_id += 1;
        let created = Waitlist {
            id: WaitlistId::new(tables.next_waitlist_id),
            slug: waitlist.slug,
            name: waitlist.name,
            owner_user_id: waitlist.owner_user_id,
            is_public: waitlist.is_public,
            show_vendor_branding: waitlist.show_vendor_branding,
            created_at: Utc::now(),
            state: ArchiveState::Active,
        };
        tables.waitlists.push(created.clone());
        Ok(created)
    }

    async fn get_waitlist_by_id(
        &self,
        id: WaitlistId,
    ) -> Result<Option<Waitlist>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .waitlists
            .iter()
            .find(|w| w.id == id && !w.state.is_archived())
            .cloned())
    }

    async fn get_waitlist_by_slug(&self, slug: &str) -> Result<Option<Waitlist>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .waitlists
            .iter()
            .find(|w| w.slug == slug && !w.state.is_archived())
            .cloned())
    }

    async fn update_waitlist(&self, waitlist: &Waitlist) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.slug_taken(&waitlist.slug, Some(waitlist.id)) {
            return Err(RepositoryError::Conflict("slug already exists".to_string()));
        }

        if let Some(stored) = tables
            .waitlists
            .iter_mut()
            .find(|w| w.id == waitlist.id && !w.state.is_archived())
        {
            stored.slug.clone_from(&waitlist.slug);
            stored.name.clone_from(&waitlist.name);
            stored.is_public = waitlist.is_public;
            stored.show_vendor_branding = waitlist.show_vendor_branding;
        }
        Ok(())
    }

    async fn archive_waitlist(&self, id: WaitlistId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if let Some(stored) = tables
            .waitlists
            .iter_mut()
            .find(|w| w.id == id && !w.state.is_archived())
        {
            stored.state = ArchiveState::Archived { at: Utc::now() };
        }
        Ok(())
    }
}
