//! Bulk export and import of the whole store.
//!
//! Export bundles every known key, plus each chat history key discovered at
//! export time, into one JSON object. Import writes a document back verbatim.
//! Import is destructive and not transactional: a failure partway through
//! leaves a mix of old and new keys.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::TransferError;
use crate::keys;
use crate::store::KvStore;

/// Parsed form of a backup document.
pub type ExportDocument = Map<String, Value>;

/// Explicit user answer to the "overwrite everything?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Outcome of a completed import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Keys written, in document order.
    pub written: Vec<String>,
    /// Written keys the application does not recognize.
    pub unknown: Vec<String>,
}

/// Collect the persisted key space into one document.
///
/// Theme, logo and password are always embedded as strings, even when they
/// happen to look like JSON. Other values that parse as JSON are embedded
/// as JSON, anything else as a string. Absent keys are skipped.
pub fn export_document(store: &dyn KvStore) -> ExportDocument {
    let history_keys = store
        .keys()
        .into_iter()
        .filter(|k| keys::is_chat_history_key(k));

    let mut document = Map::new();
    for key in keys::KNOWN_KEYS
        .iter()
        .map(|k| k.to_string())
        .chain(history_keys)
    {
        let Some(raw) = store.read(&key) else {
            continue;
        };
        let value = if keys::is_raw_value_key(&key) {
            Value::String(raw)
        } else {
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => value,
                Err(_) => Value::String(raw),
            }
        };
        document.insert(key, value);
    }
    tracing::debug!(keys = document.len(), "export document built");
    document
}

/// Timestamped name for a backup file.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("tadrib-backup-{}.json", now.format("%Y-%m-%dT%H%M%S"))
}

/// Export the store into a timestamped file under `dir`.
pub fn write_export(store: &dyn KvStore, dir: &Path) -> Result<PathBuf, TransferError> {
    let document = export_document(store);
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| TransferError::InvalidFormat(e.to_string()))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(Utc::now()));
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), keys = document.len(), "store exported");
    Ok(path)
}

/// Parse an uploaded backup document.
///
/// The document must be a JSON object carrying at least the platform users.
pub fn parse_import(text: &str) -> Result<ExportDocument, TransferError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| TransferError::InvalidFormat(format!("not JSON: {e}")))?;
    let Value::Object(document) = value else {
        return Err(TransferError::InvalidFormat(
            "top level is not an object".to_string(),
        ));
    };
    if !document.contains_key(keys::PLATFORM_USERS) {
        return Err(TransferError::InvalidFormat(format!(
            "missing '{}'",
            keys::PLATFORM_USERS
        )));
    }
    Ok(document)
}

/// Overwrite the store with every key of `document`.
///
/// Strings are written raw, other values re-serialized. The caller must
/// reload its in-memory state afterwards.
pub fn apply_import(
    store: &dyn KvStore,
    document: &ExportDocument,
    confirmation: Confirmation,
) -> Result<ImportSummary, TransferError> {
    if confirmation != Confirmation::Confirmed {
        return Err(TransferError::NotConfirmed);
    }

    let mut summary = ImportSummary::default();
    for (key, value) in document {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if let Err(e) = store.write(key, &raw) {
            tracing::error!(
                key = %key,
                written = summary.written.len(),
                "import aborted; store now mixes old and new keys: {e}"
            );
            return Err(e.into());
        }
        if !keys::is_known_key(key) {
            tracing::warn!(key = %key, "imported unrecognized key");
            summary.unknown.push(key.clone());
        }
        summary.written.push(key.clone());
    }
    tracing::info!(keys = summary.written.len(), "store imported");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatMessage;
    use crate::repository::Repositories;
    use crate::state::{Orchestrator, Settings, TracingNotifier};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut orch = Orchestrator::load(
            store.clone(),
            Arc::new(TracingNotifier),
            Settings::default(),
        );
        orch.set_theme("dark").unwrap();
        orch.set_logo("data:image/png;base64,iVBORw0KGgo=").unwrap();
        orch.mark_skill_completed(2).unwrap();
        orch.append_chat_message(
            "ai-assistant-general",
            ChatMessage::new("Amina", "user", "Bonjour"),
        )
        .unwrap();
        store
    }

    #[test]
    fn export_includes_known_and_history_keys() {
        let store = seeded_store();
        store.write("unrelated", "1").unwrap();

        let document = export_document(store.as_ref());
        assert!(document.contains_key(keys::PLATFORM_USERS));
        assert!(document.contains_key("chatHistory_ai-assistant-general"));
        assert!(!document.contains_key("unrelated"));
        assert_eq!(document[keys::THEME], Value::String("dark".into()));
        assert!(document[keys::SKILLS].is_array());
    }

    #[test]
    fn export_skips_absent_keys() {
        let store = MemoryStore::new();
        store.write(keys::PLATFORM_USERS, "[]").unwrap();
        let document = export_document(&store);
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn export_then_import_reproduces_store() {
        let source = seeded_store();
        let document = export_document(source.as_ref());
        let text = serde_json::to_string_pretty(&document).unwrap();

        let target = Arc::new(MemoryStore::new());
        let parsed = parse_import(&text).unwrap();
        let summary = apply_import(target.as_ref(), &parsed, Confirmation::Confirmed).unwrap();
        assert!(summary.unknown.is_empty());
        assert_eq!(summary.written.len(), source.keys().len());

        for key in source.keys() {
            let before = source.read(&key).unwrap();
            let after = target.read(&key).unwrap();
            match serde_json::from_str::<Value>(&before) {
                Ok(v) => assert_eq!(v, serde_json::from_str::<Value>(&after).unwrap(), "{key}"),
                Err(_) => assert_eq!(before, after, "{key}"),
            }
        }

        let a = Repositories::new(source);
        let b = Repositories::new(target);
        assert_eq!(a.texts.get(), b.texts.get());
        assert_eq!(a.chat_channels.get(), b.chat_channels.get());
        assert_eq!(
            a.chat_history.get("ai-assistant-general"),
            b.chat_history.get("ai-assistant-general")
        );
        assert_eq!(a.logo.get(), b.logo.get());
    }

    #[test]
    fn raw_values_that_look_like_json_survive_a_backup() {
        let source = Arc::new(MemoryStore::new());
        let mut orch = Orchestrator::load(
            source.clone(),
            Arc::new(TracingNotifier),
            Settings::default(),
        );
        orch.change_admin_password("admin123", "1.50").unwrap();
        orch.set_theme("1e3").unwrap();
        orch.set_logo(" 42").unwrap();

        let document = export_document(source.as_ref());
        assert_eq!(document[keys::ADMIN_PASSWORD], Value::String("1.50".into()));
        let text = serde_json::to_string(&document).unwrap();

        let target = Arc::new(MemoryStore::new());
        apply_import(
            target.as_ref(),
            &parse_import(&text).unwrap(),
            Confirmation::Confirmed,
        )
        .unwrap();
        assert_eq!(target.read(keys::THEME).as_deref(), Some("1e3"));
        assert_eq!(target.read(keys::APP_LOGO).as_deref(), Some(" 42"));

        let restored = Orchestrator::load(target, Arc::new(TracingNotifier), Settings::default());
        assert!(restored.verify_admin_password("1.50"));
    }

    #[test]
    fn import_requires_platform_users() {
        let err = parse_import(r#"{"skills": []}"#).unwrap_err();
        assert!(matches!(err, TransferError::InvalidFormat(_)));
        assert_eq!(err.message_key(), "error.invalidFormat");

        assert!(parse_import("[1, 2]").is_err());
        assert!(parse_import("garbage").is_err());
    }

    #[test]
    fn import_requires_confirmation() {
        let store = MemoryStore::new();
        let document = parse_import(r#"{"platformUsers": []}"#).unwrap();
        let err = apply_import(&store, &document, Confirmation::Declined).unwrap_err();
        assert!(matches!(err, TransferError::NotConfirmed));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn failed_import_is_not_rolled_back() {
        let store = MemoryStore::with_quota(40);
        store.write(keys::THEME, "light").unwrap();
        let document = parse_import(
            r#"{"appLogo": "tiny", "platformUsers": [], "theme": "this value is far too long to fit"}"#,
        )
        .unwrap();

        let err = apply_import(&store, &document, Confirmation::Confirmed).unwrap_err();
        assert!(matches!(err, TransferError::Store(ref e) if e.is_quota_exceeded()));
        // Keys before the failure were written; the old theme survives.
        assert_eq!(store.read(keys::APP_LOGO).as_deref(), Some("tiny"));
        assert_eq!(store.read(keys::PLATFORM_USERS).as_deref(), Some("[]"));
        assert_eq!(store.read(keys::THEME).as_deref(), Some("light"));
    }

    #[test]
    fn unknown_keys_are_written_and_reported() {
        let store = MemoryStore::new();
        let document = parse_import(r#"{"platformUsers": [], "legacy": {"a": 1}}"#).unwrap();
        let summary = apply_import(&store, &document, Confirmation::Confirmed).unwrap();
        assert_eq!(summary.unknown, vec!["legacy"]);
        assert_eq!(store.read("legacy").as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn backup_file_name_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_file_name(now),
            "tadrib-backup-2025-03-09T140507.json"
        );
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store();
        let path = write_export(store.as_ref(), &dir.path().join("backups")).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(parse_import(&text).is_ok());
    }
}
