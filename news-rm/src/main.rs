//! news-rm - Delete news posts

use std::io::{self, Write};

use clap::Parser;
use libnewsdesk::{logging, ItemId, NewsError, NewsService, Result};
use secrecy::SecretString;

#[derive(Parser, Debug)]
#[command(name = "news-rm")]
#[command(version, about = "Delete news posts")]
#[command(long_about = "\
Delete a single news post by id, or every post with --all.

Deleting everything requires the admin PIN. Both forms ask for confirmation
on a terminal unless --force is given; non-interactive use requires --force.

EXAMPLES:
    news-rm 42
    news-rm --force 3f2c9a1e-5b7d-4c1e-9a0b-2d6e8f4a7c11
    NEWSDESK_PIN=... news-rm --all --force

EXIT CODES:
    0 - Deleted (or cancelled at the prompt)
    1 - Store failure
    2 - PIN is not the admin PIN
    3 - Invalid input
")]
struct Cli {
    /// Id of the post to delete
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    id: Option<String>,

    /// Delete every post (admin only)
    #[arg(long)]
    all: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,

    /// Admin PIN, used with --all
    #[arg(long, env = "NEWSDESK_PIN", hide_env_values = true)]
    pin: Option<String>,

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
    let service = NewsService::new()?;

    if cli.all {
        let pin = read_pin(cli.pin)?;
        if !confirm("Delete ALL news posts? Type 'delete' to confirm: ", cli.force)? {
            println!("Cancelled");
            return Ok(());
        }
        service.clear_all(&pin).await?;
        println!("deleted: all");
        return Ok(());
    }

    let id: ItemId = cli
        .id
        .as_deref()
        .ok_or_else(|| NewsError::InvalidInput("An id or --all is required".to_string()))?
        .parse()?;

    let prompt = format!("Delete post {}? Type 'delete' to confirm: ", id);
    if !confirm(&prompt, cli.force)? {
        println!("Cancelled");
        return Ok(());
    }
    service.delete_one(&id).await?;
    println!("deleted: {}", id);
    Ok(())
}

fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(NewsError::InvalidInput(
            "Refusing to delete without confirmation; pass --force when not running interactively"
                .to_string(),
        ));
    }

    print!("{}", prompt);
    io::stdout()
        .flush()
        .map_err(|e| NewsError::InvalidInput(format!("Failed to write prompt: {}", e)))?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| NewsError::InvalidInput(format!("Failed to read confirmation: {}", e)))?;
    Ok(input.trim() == "delete")
}

fn read_pin(flag: Option<String>) -> Result<SecretString> {
    if let Some(pin) = flag {
        return Ok(SecretString::from(pin));
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(NewsError::InvalidInput(
            "Admin PIN required: use --pin or NEWSDESK_PIN when not running interactively"
                .to_string(),
        ));
    }
    let pin = rpassword::prompt_password("Admin PIN: ")
        .map_err(|e| NewsError::InvalidInput(format!("Failed to read PIN: {}", e)))?;
    Ok(SecretString::from(pin))
}
