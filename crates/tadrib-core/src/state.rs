//! Application state orchestrator.
//!
//! Holds every collection in memory, loaded once from the repositories, and
//! writes each mutation back through the matching repository. A write
//! rejected for lack of space raises one user-facing alert per cooldown
//! window; the in-memory state stays ahead of the store until the next
//! successful write of that collection. Failed writes are not retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::defaults;
use crate::error::{StateError, StoreError, ValidationError};
use crate::model::{
    move_item, next_id, Bilingual, ChatChannel, ChatMessage, PlatformUser, ProgressDataPoint,
    Resource, Skill, Specialization, Team, TestContext, Text, UserRole, UserStatus,
};
use crate::repository::Repositories;
use crate::store::KvStore;

/// Orchestrator settings, fixed for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Minimum interval between two storage-full alerts.
    pub alert_cooldown: Duration,
    /// Sender name on assistant messages.
    pub assistant_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert_cooldown: Duration::from_secs(3),
            assistant_name: "Tadrib".to_string(),
        }
    }
}

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    /// The store is full; the last change was kept in memory only.
    fn storage_full(&self);
}

/// Notifier that only logs.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn storage_full(&self) {
        tracing::error!("storage is full; recent changes were not saved");
    }
}

/// Lets at most one alert through per cooldown window.
#[derive(Debug)]
pub struct AlertThrottle {
    cooldown: Duration,
    last: Option<Instant>,
}

impl AlertThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Returns `true` if an alert raised at `now` should be shown.
    pub fn allow(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.cooldown => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Every collection held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub texts: Vec<Text>,
    pub skills: Vec<Skill>,
    pub teams: Vec<Team>,
    pub test_contexts: Vec<TestContext>,
    pub chat_channels: Vec<ChatChannel>,
    pub resources: Vec<Resource>,
    pub progress_data: Vec<ProgressDataPoint>,
    pub completed_skills: Vec<i64>,
    pub specializations: Vec<Specialization>,
    pub platform_users: Vec<PlatformUser>,
    pub theme: String,
    pub logo: Option<String>,
    pub admin_password: String,
}

impl AppState {
    fn load(repos: &Repositories) -> Self {
        Self {
            texts: repos.texts.get(),
            skills: repos.skills.get(),
            teams: repos.teams.get(),
            test_contexts: repos.test_contexts.get(),
            chat_channels: repos.chat_channels.get(),
            resources: repos.resources.get(),
            progress_data: repos.progress_data.get(),
            completed_skills: repos.completed_skills.get(),
            specializations: repos.specializations.get(),
            platform_users: repos.platform_users.get(),
            theme: repos
                .theme
                .get()
                .unwrap_or_else(|| defaults::DEFAULT_THEME.to_string()),
            logo: repos.logo.get(),
            admin_password: repos
                .admin_password
                .get()
                .unwrap_or_else(|| defaults::DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }
}

/// Fields of a platform user editable from the admin console.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub password: String,
}

/// Bridge between the repositories and the interactive layer.
pub struct Orchestrator {
    repos: Repositories,
    state: AppState,
    settings: Settings,
    notifier: Arc<dyn Notifier>,
    alerts: AlertThrottle,
}

impl Orchestrator {
    /// Load every collection once from `store`.
    pub fn load(store: Arc<dyn KvStore>, notifier: Arc<dyn Notifier>, settings: Settings) -> Self {
        let repos = Repositories::new(store);
        let state = AppState::load(&repos);
        tracing::info!(
            texts = state.texts.len(),
            skills = state.skills.len(),
            channels = state.chat_channels.len(),
            users = state.platform_users.len(),
            "application state loaded"
        );
        Self {
            repos,
            alerts: AlertThrottle::new(settings.alert_cooldown),
            state,
            settings,
            notifier,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        self.repos.store()
    }

    /// Re-read every collection, e.g. after an import overwrote the store.
    pub fn reload(&mut self) {
        self.state = AppState::load(&self.repos);
        tracing::info!("application state reloaded");
    }

    /// Route a write result through the storage-full alert policy.
    fn persisted(&mut self, what: &str, result: Result<(), StoreError>) -> Result<(), StateError> {
        if let Err(e) = result {
            if e.is_quota_exceeded() {
                if self.alerts.allow(Instant::now()) {
                    self.notifier.storage_full();
                }
                tracing::warn!(collection = what, "change kept in memory only: {e}");
            } else {
                tracing::error!(collection = what, "failed to persist change: {e}");
            }
            return Err(e.into());
        }
        Ok(())
    }

    // -- whole-collection mutators ------------------------------------------

    pub fn update_texts(&mut self, f: impl FnOnce(&mut Vec<Text>)) -> Result<(), StateError> {
        f(&mut self.state.texts);
        let result = self.repos.texts.save(&self.state.texts);
        self.persisted("texts", result)
    }

    pub fn update_skills(&mut self, f: impl FnOnce(&mut Vec<Skill>)) -> Result<(), StateError> {
        f(&mut self.state.skills);
        let result = self.repos.skills.save(&self.state.skills);
        self.persisted("skills", result)
    }

    pub fn update_teams(&mut self, f: impl FnOnce(&mut Vec<Team>)) -> Result<(), StateError> {
        f(&mut self.state.teams);
        let result = self.repos.teams.save(&self.state.teams);
        self.persisted("teams", result)
    }

    pub fn update_test_contexts(
        &mut self,
        f: impl FnOnce(&mut Vec<TestContext>),
    ) -> Result<(), StateError> {
        f(&mut self.state.test_contexts);
        let result = self.repos.test_contexts.save(&self.state.test_contexts);
        self.persisted("testContexts", result)
    }

    pub fn update_chat_channels(
        &mut self,
        f: impl FnOnce(&mut Vec<ChatChannel>),
    ) -> Result<(), StateError> {
        f(&mut self.state.chat_channels);
        let result = self.repos.chat_channels.save(&self.state.chat_channels);
        self.persisted("chatChannels", result)
    }

    pub fn update_resources(
        &mut self,
        f: impl FnOnce(&mut Vec<Resource>),
    ) -> Result<(), StateError> {
        f(&mut self.state.resources);
        let result = self.repos.resources.save(&self.state.resources);
        self.persisted("resources", result)
    }

    pub fn update_progress_data(
        &mut self,
        f: impl FnOnce(&mut Vec<ProgressDataPoint>),
    ) -> Result<(), StateError> {
        f(&mut self.state.progress_data);
        let result = self.repos.progress_data.save(&self.state.progress_data);
        self.persisted("progressData", result)
    }

    pub fn update_specializations(
        &mut self,
        f: impl FnOnce(&mut Vec<Specialization>),
    ) -> Result<(), StateError> {
        f(&mut self.state.specializations);
        let result = self.repos.specializations.save(&self.state.specializations);
        self.persisted("specializations", result)
    }

    fn save_users(&mut self) -> Result<(), StateError> {
        let result = self.repos.platform_users.save(&self.state.platform_users);
        self.persisted("platformUsers", result)
    }

    // -- skills -------------------------------------------------------------

    /// Record a skill as completed. Already-completed skills are left as is.
    pub fn mark_skill_completed(&mut self, skill_id: i64) -> Result<bool, StateError> {
        if self.state.completed_skills.contains(&skill_id) {
            return Ok(false);
        }
        self.state.completed_skills.push(skill_id);
        let result = self
            .repos
            .completed_skills
            .save(&self.state.completed_skills);
        self.persisted("completedSkills", result)?;
        Ok(true)
    }

    pub fn reorder_skills(&mut self, from: usize, to: usize) -> Result<(), StateError> {
        move_item(&mut self.state.skills, from, to)?;
        let result = self.repos.skills.save(&self.state.skills);
        self.persisted("skills", result)
    }

    // -- teams --------------------------------------------------------------

    fn team_mut(&mut self, team_id: i64) -> Result<&mut Team, ValidationError> {
        self.state
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(ValidationError::UnknownTeam(team_id))
    }

    pub fn remove_team_member(&mut self, team_id: i64, member: &str) -> Result<(), StateError> {
        self.team_mut(team_id)?.remove_member(member);
        let result = self.repos.teams.save(&self.state.teams);
        self.persisted("teams", result)
    }

    pub fn set_team_leader(&mut self, team_id: i64, leader: &str) -> Result<(), StateError> {
        self.team_mut(team_id)?.set_leader(leader)?;
        let result = self.repos.teams.save(&self.state.teams);
        self.persisted("teams", result)
    }

    // -- chat channels ------------------------------------------------------

    pub fn channel(&self, channel_id: &str) -> Option<&ChatChannel> {
        self.state.chat_channels.iter().find(|c| c.id == channel_id)
    }

    fn channel_mut(&mut self, channel_id: &str) -> Result<&mut ChatChannel, ValidationError> {
        self.state
            .chat_channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| ValidationError::UnknownChannel(channel_id.to_string()))
    }

    pub fn update_channel_prompt(
        &mut self,
        channel_id: &str,
        prompt: Bilingual,
    ) -> Result<(), StateError> {
        self.channel_mut(channel_id)?.system_prompt = prompt;
        let result = self.repos.chat_channels.save(&self.state.chat_channels);
        self.persisted("chatChannels", result)
    }

    /// Restore a channel's prompt to its seeded default.
    pub fn reset_channel_prompt(&mut self, channel_id: &str) -> Result<(), StateError> {
        self.channel_mut(channel_id)?.reset_system_prompt();
        let result = self.repos.chat_channels.save(&self.state.chat_channels);
        self.persisted("chatChannels", result)
    }

    // -- chat history -------------------------------------------------------

    /// Saved history, or a welcome message for a channel never used.
    pub fn chat_history(&self, channel_id: &str) -> Result<Vec<ChatMessage>, StateError> {
        if let Some(messages) = self.repos.chat_history.get(channel_id) {
            return Ok(messages);
        }
        let channel = self
            .channel(channel_id)
            .ok_or_else(|| ValidationError::UnknownChannel(channel_id.to_string()))?;
        Ok(vec![defaults::welcome_message(
            channel,
            &self.settings.assistant_name,
        )])
    }

    /// Append a message; its id is bumped if it collides with a stored one.
    pub fn append_chat_message(
        &mut self,
        channel_id: &str,
        mut message: ChatMessage,
    ) -> Result<Vec<ChatMessage>, StateError> {
        let mut messages = self.chat_history(channel_id)?;
        if messages.iter().any(|m| m.id == message.id) {
            message.id = next_id(messages.iter().map(|m| m.id));
        }
        messages.push(message);
        let result = self.repos.chat_history.save(channel_id, &messages);
        self.persisted("chatHistory", result)?;
        Ok(messages)
    }

    pub fn clear_chat_history(&mut self, channel_id: &str) -> Result<(), StateError> {
        let result = self.repos.chat_history.remove(channel_id);
        self.persisted("chatHistory", result)
    }

    // -- platform users -----------------------------------------------------

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.state
            .platform_users
            .iter()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn create_user(&mut self, draft: UserDraft) -> Result<PlatformUser, StateError> {
        if self.email_taken(&draft.email, None) {
            return Err(ValidationError::DuplicateEmail(draft.email).into());
        }
        let user = PlatformUser {
            id: next_id(self.state.platform_users.iter().map(|u| u.id)),
            name: draft.name,
            email: draft.email.trim().to_string(),
            phone: draft.phone,
            specialization: draft.specialization,
            role: draft.role,
            status: draft.status,
            password: draft.password,
            must_change_password: Some(true),
        };
        self.state.platform_users.push(user.clone());
        self.save_users()?;
        tracing::info!(id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn update_user(&mut self, id: i64, draft: UserDraft) -> Result<(), StateError> {
        if self.email_taken(&draft.email, Some(id)) {
            return Err(ValidationError::DuplicateEmail(draft.email).into());
        }
        let user = self
            .state
            .platform_users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ValidationError::UnknownUser(id))?;
        let password_changed = user.password != draft.password;
        user.name = draft.name;
        user.email = draft.email.trim().to_string();
        user.phone = draft.phone;
        user.specialization = draft.specialization;
        user.role = draft.role;
        user.status = draft.status;
        if password_changed {
            user.password = draft.password;
            user.must_change_password = Some(true);
        }
        self.save_users()
    }

    pub fn delete_user(&mut self, id: i64) -> Result<(), StateError> {
        let before = self.state.platform_users.len();
        self.state.platform_users.retain(|u| u.id != id);
        if self.state.platform_users.len() == before {
            return Err(ValidationError::UnknownUser(id).into());
        }
        self.save_users()
    }

    // -- settings values ----------------------------------------------------

    pub fn set_theme(&mut self, theme: &str) -> Result<(), StateError> {
        self.state.theme = theme.to_string();
        let result = self.repos.theme.save(theme);
        self.persisted("theme", result)
    }

    /// Store the logo as a data URL.
    pub fn set_logo(&mut self, data_url: &str) -> Result<(), StateError> {
        self.state.logo = Some(data_url.to_string());
        let result = self.repos.logo.save(data_url);
        self.persisted("appLogo", result)
    }

    pub fn clear_logo(&mut self) -> Result<(), StateError> {
        self.state.logo = None;
        let result = self.repos.logo.clear();
        self.persisted("appLogo", result)
    }

    pub fn verify_admin_password(&self, candidate: &str) -> bool {
        self.state.admin_password == candidate
    }

    pub fn change_admin_password(&mut self, current: &str, new: &str) -> Result<(), StateError> {
        if !self.verify_admin_password(current) {
            return Err(ValidationError::WrongPassword.into());
        }
        self.state.admin_password = new.to_string();
        let result = self.repos.admin_password.save(new);
        self.persisted("adminPassword", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        alerts: AtomicU32,
    }

    impl Notifier for CountingNotifier {
        fn storage_full(&self) {
            self.alerts.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn orchestrator(store: Arc<MemoryStore>) -> (Arc<CountingNotifier>, Orchestrator) {
        let notifier = Arc::new(CountingNotifier::default());
        let orch = Orchestrator::load(store, notifier.clone(), Settings::default());
        (notifier, orch)
    }

    fn draft(email: &str) -> UserDraft {
        UserDraft {
            name: "Nouveau".into(),
            email: email.into(),
            phone: "0550".into(),
            specialization: "Gestion".into(),
            role: UserRole::Trainee,
            status: UserStatus::Active,
            password: "secret".into(),
        }
    }

    #[test]
    fn throttle_allows_one_alert_per_window() {
        let mut throttle = AlertThrottle::new(Duration::from_secs(3));
        let t0 = Instant::now();
        assert!(throttle.allow(t0));
        assert!(!throttle.allow(t0 + Duration::from_millis(500)));
        assert!(!throttle.allow(t0 + Duration::from_millis(2999)));
        assert!(throttle.allow(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn load_seeds_every_collection() {
        let store = Arc::new(MemoryStore::new());
        let (_n, orch) = orchestrator(store.clone());
        assert_eq!(orch.state().skills, defaults::skills());
        for key in [
            keys::TEXTS,
            keys::SKILLS,
            keys::TEAMS,
            keys::TEST_CONTEXTS,
            keys::CHAT_CHANNELS,
            keys::RESOURCES,
            keys::PROGRESS_DATA,
            keys::COMPLETED_SKILLS,
            keys::SPECIALIZATIONS,
            keys::PLATFORM_USERS,
            keys::THEME,
            keys::ADMIN_PASSWORD,
        ] {
            assert!(store.read(key).is_some(), "{key} was not seeded");
        }
        assert!(store.read(keys::APP_LOGO).is_none());
    }

    #[test]
    fn mutation_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        orch.update_resources(|r| r.truncate(1)).unwrap();

        let (_n, reloaded) = orchestrator(store);
        assert_eq!(reloaded.state().resources.len(), 1);
    }

    #[test]
    fn storage_full_alerts_once_per_cooldown() {
        let store = Arc::new(MemoryStore::new());
        let (notifier, mut orch) = orchestrator(store.clone());

        // Shrink the effective space: fill the store right up to a quota.
        let full = Arc::new(MemoryStore::with_quota(store.used_bytes()));
        for key in store.keys() {
            full.write(&key, &store.read(&key).unwrap()).unwrap();
        }
        let (notifier_full, mut orch_full) = orchestrator(full.clone());
        let huge = "x".repeat(1024);

        let err = orch_full
            .update_texts(|texts| texts[0].content.fr.push_str(&huge))
            .unwrap_err();
        assert!(err.is_storage_full());
        let err = orch_full
            .update_texts(|texts| texts[0].content.ar.push_str(&huge))
            .unwrap_err();
        assert!(err.is_storage_full());
        assert_eq!(notifier_full.alerts.load(Ordering::Relaxed), 1);

        // In-memory state stays ahead of the store.
        assert!(orch_full.state().texts[0].content.fr.ends_with(&huge));
        let stored: Vec<Text> =
            serde_json::from_str(&full.read(keys::TEXTS).unwrap()).unwrap();
        assert_eq!(stored, defaults::texts());

        orch.update_texts(|texts| texts.truncate(1)).unwrap();
        assert_eq!(notifier.alerts.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn completed_skills_are_deduplicated() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store);
        assert!(orch.mark_skill_completed(3).unwrap());
        assert!(orch.mark_skill_completed(1).unwrap());
        assert!(!orch.mark_skill_completed(3).unwrap());
        assert_eq!(orch.state().completed_skills, vec![3, 1]);
    }

    #[test]
    fn reorder_skills_persists_order() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        orch.reorder_skills(5, 0).unwrap();
        assert_eq!(orch.state().skills[0].id, 6);

        let (_n, reloaded) = orchestrator(store);
        assert_eq!(reloaded.state().skills[0].id, 6);
        assert!(orch.reorder_skills(10, 0).is_err());
    }

    #[test]
    fn duplicate_email_rejected_without_mutation() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        let raw_before = store.read(keys::PLATFORM_USERS).unwrap();

        let err = orch.create_user(draft("ADMIN@tadrib.local")).unwrap_err();
        assert_eq!(err.message_key(), "error.duplicateEmail");
        assert_eq!(orch.state().platform_users, defaults::platform_users());
        assert_eq!(store.read(keys::PLATFORM_USERS).unwrap(), raw_before);
    }

    #[test]
    fn create_user_after_maximal_id() {
        let store = Arc::new(MemoryStore::new());
        let mut users = defaults::platform_users();
        users[0].id = i64::MAX;
        store
            .write(keys::PLATFORM_USERS, &serde_json::to_string(&users).unwrap())
            .unwrap();
        let (_n, mut orch) = orchestrator(store);

        let user = orch.create_user(draft("late@tadrib.local")).unwrap();
        assert!(user.id > 0);
        let ids: Vec<i64> = orch.state().platform_users.iter().map(|u| u.id).collect();
        assert_eq!(ids.iter().filter(|&&id| id == user.id).count(), 1);
    }

    #[test]
    fn user_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store);
        let user = orch.create_user(draft("new@tadrib.local")).unwrap();
        assert_eq!(user.must_change_password, Some(true));

        // Keeping one's own email is not a duplicate.
        let mut edit = draft("new@tadrib.local");
        edit.name = "Renamed".into();
        orch.update_user(user.id, edit).unwrap();

        let err = orch
            .update_user(user.id, draft("admin@tadrib.local"))
            .unwrap_err();
        assert!(matches!(
            err,
            StateError::Validation(ValidationError::DuplicateEmail(_))
        ));

        orch.delete_user(user.id).unwrap();
        assert!(orch.delete_user(user.id).is_err());
        assert_eq!(orch.state().platform_users.len(), 3);
    }

    #[test]
    fn channel_prompt_edit_and_reset() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        let id = defaults::GENERAL_CHANNEL_ID;

        orch.update_channel_prompt(id, Bilingual::same("custom"))
            .unwrap();
        let (_n, reloaded) = orchestrator(store.clone());
        assert_eq!(
            reloaded.channel(id).unwrap().system_prompt,
            Bilingual::same("custom")
        );

        orch.reset_channel_prompt(id).unwrap();
        let channel = orch.channel(id).unwrap();
        assert_eq!(channel.system_prompt, channel.default_system_prompt);
        assert!(orch.reset_channel_prompt("nope").is_err());
    }

    #[test]
    fn chat_history_starts_with_welcome() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store);
        let id = defaults::GENERAL_CHANNEL_ID;

        let history = orch.chat_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, "Tadrib");

        let messages = orch
            .append_chat_message(id, ChatMessage::new("Amina", "user", "Bonjour"))
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(orch.chat_history(id).unwrap(), messages);

        orch.clear_chat_history(id).unwrap();
        assert_eq!(orch.chat_history(id).unwrap().len(), 1);
        assert!(orch.chat_history("unknown").is_err());
    }

    #[test]
    fn team_leader_operations() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store);
        orch.remove_team_member(1, "Amina").unwrap();
        assert_eq!(orch.state().teams[0].team_leader, "");
        assert!(orch.set_team_leader(1, "Amina").is_err());
        orch.set_team_leader(1, "Karim").unwrap();
        assert_eq!(orch.state().teams[0].team_leader, "Karim");
        assert!(orch.set_team_leader(99, "Karim").is_err());
    }

    #[test]
    fn admin_password_and_settings_values() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        assert!(orch.verify_admin_password(defaults::DEFAULT_ADMIN_PASSWORD));
        assert!(orch.change_admin_password("wrong", "x").is_err());
        orch.change_admin_password(defaults::DEFAULT_ADMIN_PASSWORD, "n3w")
            .unwrap();
        assert_eq!(store.read(keys::ADMIN_PASSWORD).as_deref(), Some("n3w"));

        orch.set_theme("dark").unwrap();
        orch.set_logo("data:image/png;base64,AAAA").unwrap();
        let (_n, mut reloaded) = orchestrator(store.clone());
        assert_eq!(reloaded.state().theme, "dark");
        assert!(reloaded.state().logo.is_some());
        reloaded.clear_logo().unwrap();
        assert!(store.read(keys::APP_LOGO).is_none());
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let store = Arc::new(MemoryStore::new());
        let (_n, mut orch) = orchestrator(store.clone());
        store.write(keys::COMPLETED_SKILLS, "[4]").unwrap();
        assert!(orch.state().completed_skills.is_empty());
        orch.reload();
        assert_eq!(orch.state().completed_skills, vec![4]);
    }
}
