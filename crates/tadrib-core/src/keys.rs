//! Storage key space.
//!
//! These names are part of the on-disk format: existing stores and backup
//! documents are keyed by them, so they must not change.

pub const TEXTS: &str = "texts";
pub const SKILLS: &str = "skills";
pub const TEAMS: &str = "teams";
pub const TEST_CONTEXTS: &str = "testContexts";
pub const CHAT_CHANNELS: &str = "chatChannels";
pub const RESOURCES: &str = "resources";
pub const PROGRESS_DATA: &str = "progressData";
pub const COMPLETED_SKILLS: &str = "completedSkills";
pub const SPECIALIZATIONS: &str = "specializations";
pub const PLATFORM_USERS: &str = "platformUsers";
pub const APP_LOGO: &str = "appLogo";
pub const THEME: &str = "theme";
pub const ADMIN_PASSWORD: &str = "adminPassword";

/// Prefix of the per-channel chat history keys.
pub const CHAT_HISTORY_PREFIX: &str = "chatHistory_";

/// Every static key, in export order.
pub const KNOWN_KEYS: &[&str] = &[
    TEXTS,
    SKILLS,
    TEAMS,
    TEST_CONTEXTS,
    CHAT_CHANNELS,
    RESOURCES,
    PROGRESS_DATA,
    COMPLETED_SKILLS,
    SPECIALIZATIONS,
    PLATFORM_USERS,
    APP_LOGO,
    THEME,
    ADMIN_PASSWORD,
];

/// Keys holding a plain string rather than a JSON document.
pub const RAW_VALUE_KEYS: &[&str] = &[APP_LOGO, THEME, ADMIN_PASSWORD];

pub fn is_raw_value_key(key: &str) -> bool {
    RAW_VALUE_KEYS.contains(&key)
}

pub fn chat_history_key(channel_id: &str) -> String {
    format!("{CHAT_HISTORY_PREFIX}{channel_id}")
}

pub fn is_chat_history_key(key: &str) -> bool {
    key.starts_with(CHAT_HISTORY_PREFIX) && key.len() > CHAT_HISTORY_PREFIX.len()
}

/// Extract the channel id from a chat history key.
pub fn channel_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(CHAT_HISTORY_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Returns `true` for keys owned by the application.
pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key) || is_chat_history_key(key)
}
