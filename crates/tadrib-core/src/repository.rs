//! Domain repositories.
//!
//! One repository per entity collection, each bound to a fixed storage key
//! and a seed dataset. Reads never fail: an absent key is seeded with the
//! default, an unparsable one is logged and replaced by the default in
//! memory. Writes report storage-full distinctly from other failures.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::defaults;
use crate::error::StoreError;
use crate::keys;
use crate::merge::{reconcile_channels, ChatChannelPatch};
use crate::model::{
    ChatChannel, ChatMessage, PlatformUser, ProgressDataPoint, Resource, Skill, Specialization,
    Team, TestContext, Text,
};
use crate::store::KvStore;

/// Serialize `value` as JSON and write it at `key`.
fn write_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.write(key, &json)
}

/// Persist a seed value; a failure here only costs the next read a re-seed.
fn seed<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) {
    if let Err(e) = write_json(store, key, value) {
        tracing::warn!(key, "failed to seed default value: {e}");
    }
}

// ---------------------------------------------------------------------------
// Generic collection repository
// ---------------------------------------------------------------------------

/// Repository for a JSON-serialized value with a compiled-in default.
pub struct Repository<T> {
    store: Arc<dyn KvStore>,
    key: &'static str,
    default: fn() -> T,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KvStore>, key: &'static str, default: fn() -> T) -> Self {
        Self {
            store,
            key,
            default,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Current value, seeding the default on first read.
    pub fn get(&self) -> T {
        match self.store.read(self.key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key = self.key, "stored value unreadable, using default: {e}");
                    (self.default)()
                }
            },
            None => {
                let value = (self.default)();
                seed(self.store.as_ref(), self.key, &value);
                value
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), self.key, value)
    }
}

// ---------------------------------------------------------------------------
// Chat channels
// ---------------------------------------------------------------------------

/// Chat channel repository; reconciles persisted records on every read.
pub struct ChatChannelRepository {
    store: Arc<dyn KvStore>,
}

impl ChatChannelRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Vec<ChatChannel> {
        let defaults = defaults::chat_channels();
        match self.store.read(keys::CHAT_CHANNELS) {
            Some(raw) => match serde_json::from_str::<Vec<ChatChannelPatch>>(&raw) {
                Ok(persisted) => reconcile_channels(persisted, &defaults),
                Err(e) => {
                    tracing::warn!(
                        key = keys::CHAT_CHANNELS,
                        "stored value unreadable, using default: {e}"
                    );
                    defaults
                }
            },
            None => {
                seed(self.store.as_ref(), keys::CHAT_CHANNELS, &defaults);
                defaults
            }
        }
    }

    pub fn save(&self, channels: &[ChatChannel]) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), keys::CHAT_CHANNELS, channels)
    }
}

// ---------------------------------------------------------------------------
// Chat history
// ---------------------------------------------------------------------------

/// Per-channel message history. No default: absence is reported as `None`.
pub struct ChatHistoryRepository {
    store: Arc<dyn KvStore>,
}

impl ChatHistoryRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Saved history, or `None` if the channel never had one.
    ///
    /// An unreadable history is treated as absent.
    pub fn get(&self, channel_id: &str) -> Option<Vec<ChatMessage>> {
        let key = keys::chat_history_key(channel_id);
        let raw = self.store.read(&key)?;
        match serde_json::from_str(&raw) {
            Ok(messages) => Some(messages),
            Err(e) => {
                tracing::warn!(key = %key, "chat history unreadable: {e}");
                None
            }
        }
    }

    pub fn save(&self, channel_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        write_json(
            self.store.as_ref(),
            &keys::chat_history_key(channel_id),
            messages,
        )
    }

    pub fn remove(&self, channel_id: &str) -> Result<(), StoreError> {
        self.store.remove(&keys::chat_history_key(channel_id))
    }

    /// Channels that currently have a stored history.
    pub fn channel_ids(&self) -> Vec<String> {
        self.store
            .keys()
            .iter()
            .filter_map(|k| keys::channel_id_from_key(k).map(str::to_string))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Raw string values
// ---------------------------------------------------------------------------

/// A plain string value stored without JSON encoding (theme, logo, password).
pub struct ValueRepository {
    store: Arc<dyn KvStore>,
    key: &'static str,
    default: Option<&'static str>,
}

impl ValueRepository {
    pub fn new(store: Arc<dyn KvStore>, key: &'static str, default: Option<&'static str>) -> Self {
        Self {
            store,
            key,
            default,
        }
    }

    /// Stored value, seeding the default (if any) on first read.
    pub fn get(&self) -> Option<String> {
        if let Some(value) = self.store.read(self.key) {
            return Some(value);
        }
        let default = self.default?;
        if let Err(e) = self.store.write(self.key, default) {
            tracing::warn!(key = self.key, "failed to seed default value: {e}");
        }
        Some(default.to_string())
    }

    pub fn save(&self, value: &str) -> Result<(), StoreError> {
        self.store.write(self.key, value)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.key)
    }
}

// ---------------------------------------------------------------------------
// Repository bundle
// ---------------------------------------------------------------------------

/// Every repository, sharing one store.
pub struct Repositories {
    store: Arc<dyn KvStore>,
    pub texts: Repository<Vec<Text>>,
    pub skills: Repository<Vec<Skill>>,
    pub teams: Repository<Vec<Team>>,
    pub test_contexts: Repository<Vec<TestContext>>,
    pub chat_channels: ChatChannelRepository,
    pub resources: Repository<Vec<Resource>>,
    pub progress_data: Repository<Vec<ProgressDataPoint>>,
    /// Append-ordered set of completed skill ids.
    pub completed_skills: Repository<Vec<i64>>,
    pub specializations: Repository<Vec<Specialization>>,
    pub platform_users: Repository<Vec<PlatformUser>>,
    pub chat_history: ChatHistoryRepository,
    pub logo: ValueRepository,
    pub theme: ValueRepository,
    pub admin_password: ValueRepository,
}

impl Repositories {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let s = || Arc::clone(&store);
        Self {
            texts: Repository::new(s(), keys::TEXTS, defaults::texts),
            skills: Repository::new(s(), keys::SKILLS, defaults::skills),
            teams: Repository::new(s(), keys::TEAMS, defaults::teams),
            test_contexts: Repository::new(s(), keys::TEST_CONTEXTS, defaults::test_contexts),
            chat_channels: ChatChannelRepository::new(s()),
            resources: Repository::new(s(), keys::RESOURCES, defaults::resources),
            progress_data: Repository::new(s(), keys::PROGRESS_DATA, defaults::progress_data),
            completed_skills: Repository::new(
                s(),
                keys::COMPLETED_SKILLS,
                defaults::completed_skills,
            ),
            specializations: Repository::new(
                s(),
                keys::SPECIALIZATIONS,
                defaults::specializations,
            ),
            platform_users: Repository::new(s(), keys::PLATFORM_USERS, defaults::platform_users),
            chat_history: ChatHistoryRepository::new(s()),
            logo: ValueRepository::new(s(), keys::APP_LOGO, None),
            theme: ValueRepository::new(s(), keys::THEME, Some(defaults::DEFAULT_THEME)),
            admin_password: ValueRepository::new(
                s(),
                keys::ADMIN_PASSWORD,
                Some(defaults::DEFAULT_ADMIN_PASSWORD),
            ),
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }
}
