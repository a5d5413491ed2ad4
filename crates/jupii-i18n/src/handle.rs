//! Shared, swappable reference to the active catalog.
//!
//! The UI session owns one [`CatalogHandle`] and passes clones to whoever
//! renders strings. Readers take a snapshot with [`CatalogHandle::current`]
//! and keep using it for as long as they like; a locale switch builds a new
//! catalog and installs it with [`CatalogHandle::replace`]. The lock is
//! held only for the pointer clone or swap, never during lookups, so a
//! reader can never observe a partially built catalog.

use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::Catalog;

/// Cloneable handle to the active catalog.
///
/// # Example
///
/// ```
/// use jupii_i18n::{Catalog, CatalogHandle, RawEntry};
///
/// let handle = CatalogHandle::new(Catalog::empty("en"));
/// let before = handle.current();
///
/// let german = Catalog::build("de", [RawEntry::new("AboutPage", "About", "Über")]).unwrap();
/// handle.replace(german);
///
/// assert_eq!(before.lookup("AboutPage", "About", None), "About");
/// assert_eq!(handle.current().lookup("AboutPage", "About", None), "Über");
/// ```
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    pub fn from_shared(catalog: Arc<Catalog>) -> Self {
        Self {
            current: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Snapshot of the active catalog.
    #[must_use]
    pub fn current(&self) -> Arc<Catalog> {
        // The slot always holds a complete catalog, so a poisoned lock is safe to reuse.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `catalog`, returning the one it replaces.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        self.replace_shared(Arc::new(catalog))
    }

    pub fn replace_shared(&self, catalog: Arc<Catalog>) -> Arc<Catalog> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            language = %catalog.language(),
            entries = catalog.len(),
            "switching translation catalog"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, catalog)
    }

    /// Language of the active catalog.
    #[must_use]
    pub fn language(&self) -> String {
        self.current().language().to_owned()
    }

    /// Identity-fallback translation through the active catalog.
    #[must_use]
    pub fn translate(&self, context: &str, source: &str, n: Option<i64>) -> String {
        self.current().translate(context, source, n)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::entry::RawEntry;

    fn catalog(language: &str, about: &str) -> Catalog {
        Catalog::build(language, [RawEntry::new("AboutPage", "About", about)]).unwrap()
    }

    #[test]
    fn clones_share_the_slot() {
        let handle = CatalogHandle::new(catalog("de", "Über"));
        let other = handle.clone();
        other.replace(catalog("fr", "À propos"));
        assert_eq!(handle.language(), "fr");
        assert_eq!(handle.translate("AboutPage", "About", None), "À propos");
    }

    #[test]
    fn replace_returns_previous() {
        let handle = CatalogHandle::new(catalog("de", "Über"));
        let previous = handle.replace(catalog("fr", "À propos"));
        assert_eq!(previous.language(), "de");
    }

    #[test]
    fn snapshots_are_stable_across_swaps() {
        let handle = CatalogHandle::new(catalog("de", "Über"));
        let snapshot = handle.current();
        handle.replace(Catalog::empty("en"));
        assert_eq!(snapshot.lookup("AboutPage", "About", None), "Über");
        assert_eq!(handle.current().lookup("AboutPage", "About", None), "About");
    }

    #[test]
    fn independent_handles_do_not_interfere() {
        let a = CatalogHandle::new(catalog("de", "Über"));
        let b = CatalogHandle::new(catalog("de", "Über"));
        b.replace(Catalog::empty("en"));
        assert_eq!(a.language(), "de");
        assert_eq!(b.language(), "en");
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let handle = CatalogHandle::new(catalog("de", "Über"));
        let holder = handle.clone();
        let panicked = thread::spawn(move || {
            let _guard = holder.current.write().unwrap();
            panic!("panic while holding the write lock");
        })
        .join();
        assert!(panicked.is_err());
        assert!(handle.current.is_poisoned());

        assert_eq!(handle.translate("AboutPage", "About", None), "Über");
        let previous = handle.replace(catalog("fr", "À propos"));
        assert_eq!(previous.language(), "de");
        assert_eq!(handle.current().lookup("AboutPage", "About", None), "À propos");
    }

    #[test]
    fn readers_see_whole_catalogs_during_swaps() {
        let handle = CatalogHandle::new(catalog("de", "Über"));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snapshot = handle.current();
                        let text = snapshot.lookup("AboutPage", "About", None);
                        let expected = if snapshot.language() == "de" { "Über" } else { "À propos" };
                        assert_eq!(text, expected);
                    }
                })
            })
            .collect();

        for i in 0..200 {
            if i % 2 == 0 {
                handle.replace(catalog("fr", "À propos"));
            } else {
                handle.replace(catalog("de", "Über"));
            }
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
