//! The `tadrib chat` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::defaults::ASSISTANT_AVATAR;
use tadrib_core::model::{ChatMessage, Locale};
use tadrib_core::traits::{ChatRequest, ChatTurn};

use crate::session::{run_cancellable, Session};

pub async fn execute(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    channel_id: String,
    message: String,
    sender: String,
    locale: Locale,
) -> Result<()> {
    let session = Session::open(store, config)?;
    let mut orchestrator = session.orchestrator();
    let Some(channel) = orchestrator.channel(&channel_id) else {
        anyhow::bail!("chat channel not found: {channel_id}");
    };
    let model = channel.model.clone();
    let system_prompt = channel.system_prompt.get(locale).to_string();

    let assistant_name = orchestrator.settings().assistant_name.clone();
    let history = orchestrator.chat_history(&channel_id)?;
    let request = ChatRequest {
        model,
        system_prompt,
        history: ChatTurn::from_history(&history, &assistant_name),
        message: message.clone(),
    };

    orchestrator.append_chat_message(&channel_id, ChatMessage::new(sender, "user", message))?;

    let assistant = session.assistant()?;
    let reply = run_cancellable(async move { assistant.chat(&request).await }).await?;

    let stored = orchestrator.append_chat_message(
        &channel_id,
        ChatMessage::new(assistant_name.as_str(), ASSISTANT_AVATAR, reply.as_str()),
    )?;
    println!("{assistant_name}: {reply}");
    tracing::debug!(channel = %channel_id, messages = stored.len(), "chat history saved");
    Ok(())
}
