//! Dialog persistence.

use crate::dialog::{Dialog, DialogKey};
use crate::error::DialogError;
use crate::preferences::UserPreferences;
use async_trait::async_trait;
use chrono::Utc;
use parlance_core::{DialogId, PlayerId};
use rootcause::Report;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage of dialogs and user preferences.
///
/// Callers hold the conversation's turn lock between `load_or_create` and
/// `commit`.
#[async_trait]
pub trait DialogStore: Send + Sync {
    /// Loads the dialog for `key`, creating an empty one on first contact.
    async fn load_or_create(&self, key: &DialogKey) -> Result<Dialog, Report<DialogError>>;

    /// Persists the mutations of a turn and bumps the dialog version.
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::Conflict`] when the stored dialog changed
    /// since it was loaded.
    async fn commit(&self, dialog: &mut Dialog) -> Result<(), Report<DialogError>>;

    /// Finds a dialog by id.
    async fn find(&self, id: DialogId) -> Result<Dialog, Report<DialogError>>;

    /// Returns a user's preferences, or the defaults when none were saved.
    async fn preferences(&self, user_id: &PlayerId) -> Result<UserPreferences, Report<DialogError>>;

    /// Saves a user's preferences.
    async fn save_preferences(
        &self,
        user_id: &PlayerId,
        preferences: UserPreferences,
    ) -> Result<(), Report<DialogError>>;
}

/// Process-local dialog store.
#[derive(Debug, Default)]
pub struct InMemoryDialogStore {
    dialogs: RwLock<HashMap<DialogKey, Dialog>>,
    preferences: RwLock<HashMap<PlayerId, UserPreferences>>,
}

impl InMemoryDialogStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored dialogs.
    pub async fn len(&self) -> usize {
        self.dialogs.read().await.len()
    }

    /// Returns true if no dialog is stored.
    pub async fn is_empty(&self) -> bool {
        self.dialogs.read().await.is_empty()
    }
}

#[async_trait]
impl DialogStore for InMemoryDialogStore {
    async fn load_or_create(&self, key: &DialogKey) -> Result<Dialog, Report<DialogError>> {
        let mut dialogs = self.dialogs.write().await;
        let dialog = dialogs.entry(key.clone()).or_insert_with(|| {
            debug!(dialog_key = %key, "creating dialog on first contact");
            Dialog::new(key.clone())
        });
        Ok(dialog.clone())
    }

    async fn commit(&self, dialog: &mut Dialog) -> Result<(), Report<DialogError>> {
        let mut dialogs = self.dialogs.write().await;

        if let Some(stored) = dialogs.get(&dialog.key) {
            if stored.id == dialog.id && stored.version != dialog.version {
                return Err(DialogError::Conflict {
                    id: dialog.id,
                    expected_version: dialog.version,
                    found_version: stored.version,
                }
                .into());
            }
        }

        dialog.version += 1;
        dialog.last_update = Utc::now();
        dialogs.insert(dialog.key.clone(), dialog.clone());

        debug!(dialog_id = %dialog.id, version = dialog.version, "dialog committed");
        Ok(())
    }

    async fn find(&self, id: DialogId) -> Result<Dialog, Report<DialogError>> {
        self.dialogs
            .read()
            .await
            .values()
            .find(|dialog| dialog.id == id)
            .cloned()
            .ok_or_else(|| DialogError::NotFound { id }.into())
    }

    async fn preferences(&self, user_id: &PlayerId) -> Result<UserPreferences, Report<DialogError>> {
        Ok(self
            .preferences
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_preferences(
        &self,
        user_id: &PlayerId,
        preferences: UserPreferences,
    ) -> Result<(), Report<DialogError>> {
        self.preferences
            .write()
            .await
            .insert(user_id.clone(), preferences);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use parlance_core::{ApplicationId, Locale};

    fn key() -> DialogKey {
        DialogKey::new(
            PlayerId::user("alice"),
            PlayerId::bot("helper"),
            ApplicationId::new("travel"),
        )
    }

    #[tokio::test]
    async fn load_or_create_returns_same_dialog() {
        let store = InMemoryDialogStore::new();

        let first = store.load_or_create(&key()).await.expect("create");
        let second = store.load_or_create(&key()).await.expect("load");

        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn commit_persists_and_bumps_version() {
        let store = InMemoryDialogStore::new();
        let mut dialog = store.load_or_create(&key()).await.expect("create");
        dialog.current_story.add_action(Action::text(
            PlayerId::bot("helper"),
            ApplicationId::new("travel"),
            PlayerId::user("alice"),
            "hello",
        ));

        store.commit(&mut dialog).await.expect("commit");

        let reloaded = store.load_or_create(&key()).await.expect("load");
        assert_eq!(reloaded.version, 1);
        assert_eq!(reloaded.all_actions().count(), 1);
    }

    #[tokio::test]
    async fn stale_commit_is_a_conflict() {
        let store = InMemoryDialogStore::new();
        let mut first = store.load_or_create(&key()).await.expect("load");
        let mut stale = store.load_or_create(&key()).await.expect("load");

        store.commit(&mut first).await.expect("first commit");
        let result = store.commit(&mut stale).await;

        let report = result.expect_err("stale commit must fail");
        assert!(report.to_string().contains("modified concurrently"));
    }

    #[tokio::test]
    async fn find_unknown_dialog_is_not_found() {
        let store = InMemoryDialogStore::new();
        let result = store.find(DialogId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn preferences_default_until_saved() {
        let store = InMemoryDialogStore::new();
        let alice = PlayerId::user("alice");

        assert_eq!(
            store.preferences(&alice).await.expect("prefs"),
            UserPreferences::default()
        );

        store
            .save_preferences(&alice, UserPreferences::new(Locale::new("fr-FR")).test_user())
            .await
            .expect("save");

        let saved = store.preferences(&alice).await.expect("prefs");
        assert_eq!(saved.locale, Locale::new("fr-FR"));
        assert!(saved.test);
    }
}
