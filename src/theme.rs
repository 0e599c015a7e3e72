//! Dark-mode scheduling.
//!
//! [`resolve`] is the whole decision; [`DarkModeScheduler`] applies it to the
//! root element, persists it, and re-resolves on preference changes.

use chrono::{NaiveTime, Timelike};

use crate::config::DarkMode;
use crate::dom::{Document, DomError};
use crate::platform::Storage;

/// Persisted key holding `"true"` / `"false"`.
pub const STORAGE_KEY: &str = "uac-dark-mode";
/// Class on the root element while dark.
pub const DARK_CLASS: &str = "uac-dark-mode";

/// Night hours are `[18, 24) ∪ [0, 6)`.
fn is_night(now: NaiveTime) -> bool {
    let hour = now.hour();
    hour >= 18 || hour < 6
}

/// Light/dark decision. `None` means "make no decision" (`off`).
pub fn resolve(mode: DarkMode, now: NaiveTime, prefers_dark: bool) -> Option<bool> {
    match mode {
        DarkMode::Dark => Some(true),
        DarkMode::Light => Some(false),
        DarkMode::System => Some(prefers_dark),
        DarkMode::Auto => Some(prefers_dark || is_night(now)),
        DarkMode::Off => None,
    }
}

pub fn is_dark(doc: &Document) -> bool {
    doc.has_class(doc.document_element(), DARK_CLASS)
}

/// Set the root class. Returns whether the state changed.
fn set_dark(doc: &mut Document, dark: bool) -> Result<bool, DomError> {
    let before = is_dark(doc);
    doc.toggle_class(doc.document_element(), DARK_CLASS, Some(dark))?;
    Ok(before != dark)
}

/// Storage failures only cost persistence, never the applied theme.
fn persist(storage: &dyn Storage, dark: bool) {
    if let Err(e) = storage.set(STORAGE_KEY, if dark { "true" } else { "false" }) {
        crate::log!("warning"; "could not persist theme: {}", e);
    }
}

#[derive(Debug, Default)]
pub struct DarkModeScheduler {
    subscribed: bool,
}

impl DarkModeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Reapply the last persisted decision before anything else renders.
    pub fn restore(
        &self,
        doc: &mut Document,
        storage: &dyn Storage,
        mode: DarkMode,
    ) -> Result<Option<bool>, DomError> {
        if mode == DarkMode::Off {
            return Ok(None);
        }
        let saved = match storage.get(STORAGE_KEY).as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => return Ok(None),
        };
        set_dark(doc, saved)?;
        Ok(Some(saved))
    }

    /// Resolve, apply and persist, then start listening for preference
    /// changes. Returns `Some(dark)` when the root class changed.
    pub fn apply(
        &mut self,
        doc: &mut Document,
        storage: &dyn Storage,
        mode: DarkMode,
        now: NaiveTime,
        prefers_dark: bool,
    ) -> Result<Option<bool>, DomError> {
        self.subscribed = true;
        let Some(dark) = resolve(mode, now, prefers_dark) else {
            return Ok(None);
        };
        let changed = set_dark(doc, dark)?;
        persist(storage, dark);
        Ok(changed.then_some(dark))
    }

    /// Live preference change. Only `system` and `auto` react.
    pub fn on_preference_change(
        &self,
        doc: &mut Document,
        storage: &dyn Storage,
        mode: DarkMode,
        now: NaiveTime,
        prefers_dark: bool,
    ) -> Result<Option<bool>, DomError> {
        if !self.subscribed || !mode.follows_system() {
            return Ok(None);
        }
        let Some(dark) = resolve(mode, now, prefers_dark) else {
            return Ok(None);
        };
        let changed = set_dark(doc, dark)?;
        persist(storage, dark);
        Ok(changed.then_some(dark))
    }

    /// Flip the current state and persist it. Returns the new state.
    pub fn toggle(&self, doc: &mut Document, storage: &dyn Storage) -> Result<bool, DomError> {
        let dark = !is_dark(doc);
        set_dark(doc, dark)?;
        persist(storage, dark);
        Ok(dark)
    }

    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_table() {
        assert_eq!(resolve(DarkMode::Auto, at(3), false), Some(true));
        assert_eq!(resolve(DarkMode::Auto, at(13), false), Some(false));
        assert_eq!(resolve(DarkMode::Auto, at(13), true), Some(true));
        assert_eq!(resolve(DarkMode::Auto, at(18), false), Some(true));
        assert_eq!(resolve(DarkMode::Auto, at(6), false), Some(false));
        assert_eq!(resolve(DarkMode::System, at(13), true), Some(true));
        assert_eq!(resolve(DarkMode::System, at(23), false), Some(false));
        assert_eq!(resolve(DarkMode::Dark, at(12), false), Some(true));
        assert_eq!(resolve(DarkMode::Light, at(0), true), Some(false));
        assert_eq!(resolve(DarkMode::Off, at(0), true), None);
    }

    #[test]
    fn test_apply_persists_and_reports_change() {
        let mut doc = Document::new();
        let storage = MemoryStorage::new();
        let mut scheduler = DarkModeScheduler::new();

        let changed = scheduler
            .apply(&mut doc, &storage, DarkMode::Dark, at(12), false)
            .unwrap();
        assert_eq!(changed, Some(true));
        assert!(is_dark(&doc));
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some("true"));

        let again = scheduler
            .apply(&mut doc, &storage, DarkMode::Dark, at(12), false)
            .unwrap();
        assert_eq!(again, None);
    }

    #[test]
    fn test_off_leaves_state_untouched() {
        let mut doc = Document::new();
        doc.add_class(doc.document_element(), DARK_CLASS).unwrap();
        let storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "false").unwrap();
        let mut scheduler = DarkModeScheduler::new();

        assert_eq!(scheduler.restore(&mut doc, &storage, DarkMode::Off).unwrap(), None);
        assert_eq!(
            scheduler.apply(&mut doc, &storage, DarkMode::Off, at(2), true).unwrap(),
            None
        );
        assert!(is_dark(&doc));
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn test_restore_applies_saved_decision() {
        let mut doc = Document::new();
        let storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "true").unwrap();
        let scheduler = DarkModeScheduler::new();
        assert_eq!(
            scheduler.restore(&mut doc, &storage, DarkMode::Light).unwrap(),
            Some(true)
        );
        assert!(is_dark(&doc));
    }

    #[test]
    fn test_preference_change_only_for_following_modes() {
        let mut doc = Document::new();
        let storage = MemoryStorage::new();
        let mut scheduler = DarkModeScheduler::new();

        // Not subscribed yet
        assert_eq!(
            scheduler
                .on_preference_change(&mut doc, &storage, DarkMode::System, at(12), true)
                .unwrap(),
            None
        );

        scheduler
            .apply(&mut doc, &storage, DarkMode::Light, at(12), false)
            .unwrap();
        assert_eq!(
            scheduler
                .on_preference_change(&mut doc, &storage, DarkMode::Light, at(12), true)
                .unwrap(),
            None
        );
        assert_eq!(
            scheduler
                .on_preference_change(&mut doc, &storage, DarkMode::System, at(12), true)
                .unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let mut doc = Document::new();
        let storage = MemoryStorage::new();
        let scheduler = DarkModeScheduler::new();
        assert!(scheduler.toggle(&mut doc, &storage).unwrap());
        assert!(!scheduler.toggle(&mut doc, &storage).unwrap());
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some("false"));
    }
}
