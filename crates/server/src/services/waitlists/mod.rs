//! Ownership-scoped waitlist operations.
//!
//! Every operation takes the resolved caller. Reads and writes by slug fail
//! with `NotFound` for missing or archived waitlists and `Forbidden` when the
//! caller is not the owner.

mod error;

pub use error::WaitlistError;

use openwaitlist_core::{UserId, generate_slug};

use crate::db::{RepositoryError, Store};
use crate::models::{NewWaitlist, Waitlist};

/// Attempts at generating a slug before giving up on collisions.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Caller-supplied fields for create and update.
#[derive(Debug, Clone, Default)]
pub struct WaitlistInput {
    pub name: String,
    pub is_public: bool,
    pub show_vendor_branding: bool,
}

impl WaitlistInput {
    /// The trimmed name, rejecting blanks.
    fn validated_name(&self) -> Result<String, WaitlistError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(WaitlistError::Validation("Name is required".to_string()));
        }
        Ok(name.to_owned())
    }
}

/// A caller's waitlists together with their count.
#[derive(Debug, Clone)]
pub struct WaitlistPage {
    pub waitlists: Vec<Waitlist>,
    pub total: usize,
}

/// Waitlist CRUD gated by ownership.
pub struct WaitlistService<'a> {
    store: &'a dyn Store,
}

impl<'a> WaitlistService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// List the caller's active waitlists, newest first.
    ///
    /// A blank `search` means no filter.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::Repository` if the store fails.
    pub async fn list(
        &self,
        caller: UserId,
        search: Option<&str>,
    ) -> Result<WaitlistPage, WaitlistError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let waitlists = self.store.get_waitlists_by_owner(caller, search).await?;

        Ok(WaitlistPage {
            total: waitlists.len(),
            waitlists,
        })
    }

    /// Create a waitlist owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::Validation` if the name is blank.
    /// Returns `WaitlistError::SlugExhausted` if no free slug was found.
    pub async fn create(
        &self,
        caller: UserId,
        input: WaitlistInput,
    ) -> Result<Waitlist, WaitlistError> {
        let name = input.validated_name()?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let new = NewWaitlist {
                slug: generate_slug(&name),
                name: name.clone(),
                owner_user_id: caller,
                is_public: input.is_public,
                show_vendor_branding: input.show_vendor_branding,
            };

            match self.store.create_waitlist(new).await {
                Ok(waitlist) => {
                    tracing::info!(
                        waitlist_id = %waitlist.id,
                        slug = %waitlist.slug,
                        owner = %caller,
                        "Waitlist created"
                    );
                    return Ok(waitlist);
                }
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(attempt, "Slug collision on create, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(WaitlistError::SlugExhausted(MAX_SLUG_ATTEMPTS))
    }

    /// Get one of the caller's waitlists by slug.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::NotFound` or `WaitlistError::Forbidden`.
    pub async fn get(&self, caller: UserId, slug: &str) -> Result<Waitlist, WaitlistError> {
        let waitlist = self
            .store
            .get_waitlist_by_slug(slug)
            .await?
            .ok_or(WaitlistError::NotFound)?;

        if !waitlist.is_owned_by(caller) {
            tracing::warn!(slug, caller = %caller, "Denied access to another user's waitlist");
            return Err(WaitlistError::Forbidden);
        }

        Ok(waitlist)
    }

    /// Rename and reconfigure a waitlist. The slug is regenerated from the new name.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::Validation` before any lookup if the name is blank,
    /// then `NotFound`/`Forbidden` as for [`Self::get`].
    pub async fn update(
        &self,
        caller: UserId,
        slug: &str,
        input: WaitlistInput,
    ) -> Result<Waitlist, WaitlistError> {
        let name = input.validated_name()?;
        let mut waitlist = self.get(caller, slug).await?;

        waitlist.name = name;
        waitlist.is_public = input.is_public;
        waitlist.show_vendor_branding = input.show_vendor_branding;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            waitlist.slug = generate_slug(&waitlist.name);

            match self.store.update_waitlist(&waitlist).await {
                Ok(()) => {
                    tracing::info!(
                        waitlist_id = %waitlist.id,
                        old_slug = slug,
                        new_slug = %waitlist.slug,
                        "Waitlist updated"
                    );
                    return Ok(waitlist);
                }
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(attempt, "Slug collision on update, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(WaitlistError::SlugExhausted(MAX_SLUG_ATTEMPTS))
    }

    /// Archive one of the caller's waitlists.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::NotFound` or `WaitlistError::Forbidden`.
    pub async fn delete(&self, caller: UserId, slug: &str) -> Result<(), WaitlistError> {
        let waitlist = self.get(caller, slug).await?;
        self.store.archive_waitlist(waitlist.id).await?;

        tracing::info!(waitlist_id = %waitlist.id, slug, "Waitlist archived");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn input(name: &str) -> WaitlistInput {
        WaitlistInput {
            name: name.to_string(),
            is_public: true,
            show_vendor_branding: false,
        }
    }

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    #[tokio::test]
    async fn test_create_trims_name_and_derives_slug() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);

        let waitlist = service.create(ALICE, input("  Beta Launch ")).await.unwrap();
        assert_eq!(waitlist.name, "Beta Launch");
        assert!(waitlist.slug.starts_with("beta-launch-"));
        assert_eq!(waitlist.owner_user_id, ALICE);
        assert!(waitlist.is_public);
        assert!(!waitlist.show_vendor_branding);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);

        assert!(matches!(
            service.create(ALICE, input("   ")).await,
            Err(WaitlistError::Validation(_))
        ));
        assert!(store.all_waitlists().is_empty());
    }

    #[tokio::test]
    async fn test_list_blank_search_is_no_filter() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);
        service.create(ALICE, input("Alpha")).await.unwrap();
        service.create(ALICE, input("Beta")).await.unwrap();

        let page = service.list(ALICE, Some("  ")).await.unwrap();
        assert_eq!(page.total, 2);

        let page = service.list(ALICE, Some(" alp ")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.waitlists[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_ownership_enforced() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);
        let waitlist = service.create(ALICE, input("Private")).await.unwrap();

        assert!(matches!(
            service.get(BOB, &waitlist.slug).await,
            Err(WaitlistError::Forbidden)
        ));
        assert!(matches!(
            service.update(BOB, &waitlist.slug, input("Stolen")).await,
            Err(WaitlistError::Forbidden)
        ));
        assert!(matches!(
            service.delete(BOB, &waitlist.slug).await,
            Err(WaitlistError::Forbidden)
        ));
        assert_eq!(service.list(BOB, None).await.unwrap().total, 0);
        assert_eq!(service.get(ALICE, &waitlist.slug).await.unwrap().name, "Private");
    }

    #[tokio::test]
    async fn test_update_regenerates_slug() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);
        let original = service.create(ALICE, input("Beta Launch")).await.unwrap();

        let updated = service
            .update(ALICE, &original.slug, input("Beta Launch v2"))
            .await
            .unwrap();
        assert!(updated.slug.starts_with("beta-launch-v2-"));
        assert_eq!(updated.id, original.id);

        assert!(matches!(
            service.get(ALICE, &original.slug).await,
            Err(WaitlistError::NotFound)
        ));
        assert_eq!(service.get(ALICE, &updated.slug).await.unwrap().name, "Beta Launch v2");
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);

        assert!(matches!(
            service.update(ALICE, "missing-abcdef", input("")).await,
            Err(WaitlistError::Validation(_))
        ));
        assert!(matches!(
            service.update(ALICE, "missing-abcdef", input("Name")).await,
            Err(WaitlistError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_archives() {
        let store = MemoryStore::new();
        let service = WaitlistService::new(&store);
        let waitlist = service.create(ALICE, input("Doomed")).await.unwrap();

        service.delete(ALICE, &waitlist.slug).await.unwrap();

        assert!(matches!(
            service.get(ALICE, &waitlist.slug).await,
            Err(WaitlistError::NotFound)
        ));
        assert!(matches!(
            service.delete(ALICE, &waitlist.slug).await,
            Err(WaitlistError::NotFound)
        ));
        assert_eq!(service.list(ALICE, None).await.unwrap().total, 0);
        assert!(store.all_waitlists()[0].state.is_archived());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MemoryStore::new();
        store.set_available(false);
        let service = WaitlistService::new(&store);

        assert!(matches!(
            service.list(ALICE, None).await,
            Err(WaitlistError::Repository(RepositoryError::NotConnected))
        ));
    }
}
