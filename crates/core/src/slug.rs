//! Waitlist slug generation.
//!
//! A slug is the URL-safe identifier of a waitlist: the normalized waitlist
//! name followed by a hyphen and a random six character suffix, e.g.
//! `beta-launch-x7k2p9`. Slugs are regenerated on every rename, so they are
//! not stable across updates.

use rand::seq::IndexedRandom;

/// Number of random characters appended to every slug.
pub const SLUG_SUFFIX_LEN: usize = 6;

/// Symbols the random suffix is drawn from.
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Normalize a waitlist name into the deterministic part of a slug.
///
/// The name is lowercased, every character outside `[a-z0-9]`, ASCII
/// whitespace and `-` is dropped, runs of whitespace and hyphens collapse into a single
/// hyphen, and leading/trailing hyphens are trimmed.
///
/// ```
/// use openwaitlist_core::slugify;
///
/// assert_eq!(slugify("My  List!!"), "my-list");
/// assert_eq!(slugify("--Beta -- Launch--"), "beta-launch");
/// assert_eq!(slugify("!!!"), "");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_ascii_whitespace() {
            pending_hyphen = true;
        }
    }

    slug
}

/// Generate a fresh slug for a waitlist name.
///
/// Returns `slugify(name)` joined to a [`SLUG_SUFFIX_LEN`] character suffix
/// drawn uniformly from `[0-9a-z]` with the thread-local CSPRNG. A name that
/// normalizes to nothing yields just `-<suffix>`.
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let base = slugify(name);
    let mut rng = rand::rng();

    let mut slug = String::with_capacity(base.len() + 1 + SLUG_SUFFIX_LEN);
    slug.push_str(&base);
    slug.push('-');
    slug.extend(
        (0..SLUG_SUFFIX_LEN)
            .filter_map(|_| SUFFIX_ALPHABET.choose(&mut rng))
            .map(|&b| char::from(b)),
    );
    slug
}
