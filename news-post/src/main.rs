//! news-post - Publish a news post

use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use libnewsdesk::logging;
use libnewsdesk::service::events::Event;
use libnewsdesk::{
    Draft, MediaAttachments, MediaFile, NewsError, NewsService, PublicationResult, Result,
};
use secrecy::SecretString;

#[derive(Parser, Debug)]
#[command(name = "news-post")]
#[command(version, about = "Publish a news post")]
#[command(long_about = "\
Publish a news post to the remote store, or to local storage when no remote
store is configured.

EXAMPLES:
    news-post --title \"Opening hours\" \"We are open on Sunday\"
    echo \"Long body text\" | news-post --title \"From stdin\"
    news-post -t \"Gallery\" --image photo.jpg --link example.com \"New photos\"

PIN:
    Read from --pin, the NEWSDESK_PIN environment variable, or prompted
    for on the terminal.

EXIT CODES:
    0 - Published
    1 - Save or configuration failure (the post was not stored)
    2 - PIN does not match any publisher role
    3 - Invalid input (empty title, content or PIN)
    4 - Publishing quota exhausted
")]
struct Cli {
    /// Post body (reads from stdin if not provided)
    content: Option<String>,

    /// Post title
    #[arg(short, long)]
    title: String,

    /// External link; `https://` is added when no scheme is given
    #[arg(short, long)]
    link: Option<String>,

    /// Image file to upload (remote store only)
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Video file to upload (remote store only)
    #[arg(long, value_name = "PATH")]
    video: Option<PathBuf>,

    /// Publisher PIN
    #[arg(long, env = "NEWSDESK_PIN", hide_env_values = true)]
    pin: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let content = match cli.content.clone() {
        Some(content) => content,
        None => read_stdin()?,
    };
    let pin = read_pin(cli.pin.clone())?;

    let mut draft = Draft::new(cli.title.clone(), content);
    draft.link_url = cli.link.clone();

    let media = MediaAttachments {
        image: load_media(cli.image.as_ref()).await?,
        video: load_media(cli.video.as_ref()).await?,
    };

    let service = NewsService::new()?;
    let mut events = service.subscribe();

    let result = service.publish(draft, &pin, media).await;

    while let Ok(event) = events.try_recv() {
        if let Event::MediaUploadFailed { file_name, error } = event {
            eprintln!("Warning: {} was not uploaded ({})", file_name, error);
        }
    }

    match result {
        PublicationResult::Published(item) => {
            if cli.format == "json" {
                let json = serde_json::to_string_pretty(&item)
                    .map_err(|e| NewsError::InvalidInput(e.to_string()))?;
                println!("{}", json);
            } else {
                let id = item.id.as_ref().map(|id| id.as_text());
                println!("published: {}", id.as_deref().unwrap_or("-"));
            }
            Ok(())
        }
        PublicationResult::Rejected(err) => Err(err),
        PublicationResult::PersistFailed { error, .. } => {
            eprintln!(
                "The post was not saved; nothing was lost, retry when the store is reachable."
            );
            Err(error.into())
        }
    }
}

fn read_stdin() -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        return Err(NewsError::InvalidInput(
            "No content provided. Pass it as an argument or pipe it via stdin".to_string(),
        ));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| NewsError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(buffer)
}

fn read_pin(flag: Option<String>) -> Result<SecretString> {
    if let Some(pin) = flag {
        return Ok(SecretString::from(pin));
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(NewsError::InvalidInput(
            "PIN required: use --pin or NEWSDESK_PIN when not running interactively".to_string(),
        ));
    }
    let pin = rpassword::prompt_password("PIN: ")
        .map_err(|e| NewsError::InvalidInput(format!("Failed to read PIN: {}", e)))?;
    Ok(SecretString::from(pin))
}

async fn load_media(path: Option<&PathBuf>) -> Result<Option<MediaFile>> {
    match path {
        Some(path) => Ok(Some(MediaFile::from_path(path).await?)),
        None => Ok(None),
    }
}
