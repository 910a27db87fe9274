//! tadrib CLI: inspect, back up, and restore the LMS store.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tadrib_core::model::Locale;

mod commands;
mod session;

#[derive(Parser)]
#[command(name = "tadrib", version, about = "Local store and AI tooling for the tadrib LMS")]
struct Cli {
    /// Store file (overrides `store_path` from the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter tadrib.toml
    Init,

    /// List stored keys and their sizes
    Keys,

    /// Print the value stored under a key
    Show {
        /// Storage key (e.g. "skills", "chatHistory_ai-assistant-general")
        key: String,
    },

    /// Seed every missing collection with its defaults
    Seed,

    /// Write a timestamped backup of the whole store
    Export {
        /// Directory to write the backup into
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },

    /// Overwrite the store with a backup document
    Import {
        /// Backup file produced by `tadrib export`
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete every stored key
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Generate a multiple-choice quiz from a test context
    Quiz {
        /// Test context id
        #[arg(long)]
        context: i64,

        /// Number of questions
        #[arg(long, default_value = "5")]
        count: usize,

        /// Language: ar or fr
        #[arg(long, default_value = "fr")]
        locale: Locale,
    },

    /// Grade a free-text answer to a reading question
    Evaluate {
        /// Text id
        #[arg(long)]
        text: i64,

        /// Question id within the text
        #[arg(long)]
        question: i64,

        /// The trainee's answer
        #[arg(long)]
        answer: String,

        /// Language: ar or fr
        #[arg(long, default_value = "fr")]
        locale: Locale,
    },

    /// Synthesize speech into a WAV file
    Speak {
        /// Text to read aloud
        text: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Voice name (defaults to `tts_voice` from the config)
        #[arg(long)]
        voice: Option<String>,
    },

    /// Send a message to a chat channel and store the exchange
    Chat {
        /// Channel id
        #[arg(long, default_value = "ai-assistant-general")]
        channel: String,

        /// Message to send
        message: String,

        /// Sender name shown in the history
        #[arg(long, default_value = "Admin")]
        sender: String,

        /// Prompt language: ar or fr
        #[arg(long, default_value = "fr")]
        locale: Locale,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tadrib=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let store = cli.store;
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Keys => commands::keys::execute(store, config),
        Commands::Show { key } => commands::show::execute(store, config, key),
        Commands::Seed => commands::seed::execute(store, config),
        Commands::Export { output } => commands::export::execute(store, config, output),
        Commands::Import { file, yes } => commands::import::execute(store, config, file, yes),
        Commands::Clear { yes } => commands::clear::execute(store, config, yes),
        Commands::Quiz {
            context,
            count,
            locale,
        } => commands::quiz::execute(store, config, context, count, locale).await,
        Commands::Evaluate {
            text,
            question,
            answer,
            locale,
        } => commands::evaluate::execute(store, config, text, question, answer, locale).await,
        Commands::Speak {
            text,
            output,
            voice,
        } => commands::speak::execute(store, config, text, output, voice).await,
        Commands::Chat {
            channel,
            message,
            sender,
            locale,
        } => commands::chat::execute(store, config, channel, message, sender, locale).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
