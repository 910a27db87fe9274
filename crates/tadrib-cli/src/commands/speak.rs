//! The `tadrib speak` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tadrib_core::traits::{SpeechAudio, SpeechRequest};

use crate::session::{run_cancellable, Session};

const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Sample rate of raw 16-bit PCM (`audio/L16;...;rate=N`), if it is PCM.
fn pcm_sample_rate(mime_type: &str) -> Option<u32> {
    let mut params = mime_type.split(';').map(str::trim);
    if !params.next()?.eq_ignore_ascii_case("audio/L16") {
        return None;
    }
    Some(
        params
            .find_map(|p| p.strip_prefix("rate="))
            .and_then(|r| r.parse().ok())
            .unwrap_or(DEFAULT_SAMPLE_RATE),
    )
}

/// Wrap mono 16-bit little-endian PCM in a WAV container.
fn wav_from_pcm(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

fn playable(audio: SpeechAudio) -> Vec<u8> {
    match pcm_sample_rate(&audio.mime_type) {
        Some(rate) => wav_from_pcm(&audio.data, rate),
        None => audio.data,
    }
}

pub async fn execute(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    text: String,
    output: PathBuf,
    voice: Option<String>,
) -> Result<()> {
    let session = Session::open(store, config)?;
    let request = SpeechRequest { text, voice };

    let assistant = session.assistant()?;
    let audio =
        run_cancellable(async move { assistant.synthesize_speech(&request).await }).await?;
    let mime_type = audio.mime_type.clone();
    let bytes = playable(audio);

    std::fs::write(&output, &bytes)
        .with_context(|| format!("failed to write audio: {}", output.display()))?;
    println!(
        "Wrote {} bytes ({mime_type}) to {}",
        bytes.len(),
        output.display()
    );
    Ok(())
}
