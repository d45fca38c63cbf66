use clap::Parser;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant";

/// Interact with the Gemini API.
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-ask")]
#[command(version)]
#[command(about = "Send messages and files to the Gemini API and print the reply", long_about = None)]
pub struct Cli {
    /// Message(s) to Gemini. The last one is the current question.
    #[arg(short = 'm', long = "message", required = true)]
    pub messages: Vec<String>,

    /// Input file(s); media files are uploaded, everything else is inlined as text
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub inputs: Vec<String>,

    /// Gemini model to use
    #[arg(short = 'M', long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Custom instructions for the agent
    #[arg(short = 'I', long, default_value = DEFAULT_INSTRUCTIONS)]
    pub instructions: String,

    /// Treat history messages starting with "<MARKER>:" as model replies
    #[arg(long, value_name = "MARKER")]
    pub role_marker: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
