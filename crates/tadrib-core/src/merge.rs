//! Migration merge for chat channels.
//!
//! Persisted channel records may predate fields the current defaults carry.
//! The store has no schema version, so every read reconciles the persisted
//! list against the defaults: default fields form the base, persisted fields
//! override them. Fields outside the known set are dropped on parse.

use std::collections::HashMap;

use serde::Deserialize;

use crate::model::{Bilingual, ChatChannel};

/// A bilingual field as it may appear in an older record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BilingualPatch {
    #[serde(default)]
    pub ar: Option<String>,
    #[serde(default)]
    pub fr: Option<String>,
}

impl BilingualPatch {
    /// Overlay this patch on `base`, per locale.
    pub fn apply(self, base: &Bilingual) -> Bilingual {
        Bilingual {
            ar: self.ar.unwrap_or_else(|| base.ar.clone()),
            fr: self.fr.unwrap_or_else(|| base.fr.clone()),
        }
    }
}

impl From<Bilingual> for BilingualPatch {
    fn from(b: Bilingual) -> Self {
        Self {
            ar: Some(b.ar),
            fr: Some(b.fr),
        }
    }
}

/// A persisted chat channel with every field but `id` optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChannelPatch {
    pub id: String,
    #[serde(default)]
    pub name: Option<BilingualPatch>,
    #[serde(default)]
    pub default_system_prompt: Option<BilingualPatch>,
    #[serde(default)]
    pub system_prompt: Option<BilingualPatch>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ChatChannelPatch {
    fn is_complete(&self) -> bool {
        let full = |b: &Option<BilingualPatch>| {
            b.as_ref()
                .is_some_and(|b| b.ar.is_some() && b.fr.is_some())
        };
        full(&self.name)
            && full(&self.default_system_prompt)
            && full(&self.system_prompt)
            && self.icon.is_some()
            && self.model.is_some()
    }
}

impl From<ChatChannel> for ChatChannelPatch {
    fn from(c: ChatChannel) -> Self {
        Self {
            id: c.id,
            name: Some(c.name.into()),
            default_system_prompt: Some(c.default_system_prompt.into()),
            system_prompt: Some(c.system_prompt.into()),
            icon: Some(c.icon),
            model: Some(c.model),
        }
    }
}

/// Deep-merge a persisted record over its default counterpart.
pub fn merge_channel(default: &ChatChannel, patch: ChatChannelPatch) -> ChatChannel {
    let bilingual = |p: Option<BilingualPatch>, base: &Bilingual| match p {
        Some(p) => p.apply(base),
        None => base.clone(),
    };
    ChatChannel {
        id: patch.id,
        name: bilingual(patch.name, &default.name),
        default_system_prompt: bilingual(
            patch.default_system_prompt,
            &default.default_system_prompt,
        ),
        system_prompt: bilingual(patch.system_prompt, &default.system_prompt),
        icon: patch.icon.unwrap_or_else(|| default.icon.clone()),
        model: patch.model.unwrap_or_else(|| default.model.clone()),
    }
}

/// Materialize a channel that has no default counterpart.
///
/// Missing fields become empty values; a user-created channel saved by this
/// crate is always complete, so this only triggers on hand-edited stores.
fn standalone_channel(patch: ChatChannelPatch) -> ChatChannel {
    if !patch.is_complete() {
        tracing::warn!(id = %patch.id, "user-created chat channel is missing fields");
    }
    merge_channel(
        &ChatChannel {
            id: String::new(),
            name: Bilingual::default(),
            default_system_prompt: Bilingual::default(),
            system_prompt: Bilingual::default(),
            icon: String::new(),
            model: String::new(),
        },
        patch,
    )
}

/// Reconcile every persisted record with the current defaults.
///
/// The persisted order is kept. Defaults absent from the persisted list stay
/// absent: the user deleted them.
pub fn reconcile_channels(
    persisted: Vec<ChatChannelPatch>,
    defaults: &[ChatChannel],
) -> Vec<ChatChannel> {
    let by_id: HashMap<&str, &ChatChannel> =
        defaults.iter().map(|c| (c.id.as_str(), c)).collect();

    persisted
        .into_iter()
        .map(|patch| match by_id.get(patch.id.as_str()) {
            Some(default) => merge_channel(default, patch),
            None => standalone_channel(patch),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    fn general() -> ChatChannel {
        defaults::chat_channels()
            .into_iter()
            .find(|c| c.id == defaults::GENERAL_CHANNEL_ID)
            .unwrap()
    }

    #[test]
    fn missing_model_is_backfilled_and_prompt_kept() {
        let persisted: Vec<ChatChannelPatch> = serde_json::from_str(
            r#"[{"id":"ai-assistant-general","systemPrompt":{"ar":"custom","fr":"custom"}}]"#,
        )
        .unwrap();

        let merged = reconcile_channels(persisted, &defaults::chat_channels());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].model, "gemini-2.5-pro");
        assert_eq!(merged[0].system_prompt, Bilingual::same("custom"));
        assert_eq!(merged[0].name, general().name);
    }

    #[test]
    fn missing_default_prompt_comes_from_defaults() {
        let persisted = vec![ChatChannelPatch {
            id: defaults::GENERAL_CHANNEL_ID.into(),
            system_prompt: Some(Bilingual::same("edited").into()),
            ..Default::default()
        }];

        let merged = reconcile_channels(persisted, &defaults::chat_channels());
        assert_eq!(
            merged[0].default_system_prompt,
            general().default_system_prompt
        );
        assert_eq!(merged[0].system_prompt, Bilingual::same("edited"));
    }

    #[test]
    fn bilingual_fields_merge_per_locale() {
        let persisted: Vec<ChatChannelPatch> = serde_json::from_str(
            r#"[{"id":"ai-assistant-general","name":{"fr":"Mon assistant"}}]"#,
        )
        .unwrap();

        let merged = reconcile_channels(persisted, &defaults::chat_channels());
        assert_eq!(merged[0].name.fr, "Mon assistant");
        assert_eq!(merged[0].name.ar, general().name.ar);
    }

    #[test]
    fn user_created_channel_passes_through() {
        let custom = ChatChannel {
            id: "my-channel".into(),
            name: Bilingual::new("قناتي", "Mon canal"),
            default_system_prompt: Bilingual::same("p"),
            system_prompt: Bilingual::same("p2"),
            icon: "star".into(),
            model: "gemini-2.5-flash".into(),
        };

        let merged =
            reconcile_channels(vec![custom.clone().into()], &defaults::chat_channels());
        assert_eq!(merged, vec![custom]);
    }

    #[test]
    fn unknown_fields_are_dropped_and_order_kept() {
        let persisted: Vec<ChatChannelPatch> = serde_json::from_str(
            r#"[
                {"id":"ai-pedagogy-coach","legacyFlag":true},
                {"id":"ai-assistant-general","color":"red"}
            ]"#,
        )
        .unwrap();

        let merged = reconcile_channels(persisted, &defaults::chat_channels());
        let ids: Vec<_> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ai-pedagogy-coach", "ai-assistant-general"]);

        let json = serde_json::to_value(&merged[1]).unwrap();
        assert!(json.get("color").is_none());
    }

    #[test]
    fn complete_record_survives_unchanged() {
        let mut edited = general();
        edited.system_prompt = Bilingual::new("خاص", "spécial");
        edited.model = "gemini-2.5-flash".into();

        let merged = reconcile_channels(vec![edited.clone().into()], &defaults::chat_channels());
        assert_eq!(merged, vec![edited]);
    }
}
