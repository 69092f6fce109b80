use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::Parser;
use libnewsdesk::{logging, NewsItem, NewsService, Role};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "news-list")]
#[command(version, about = "List published news posts")]
#[command(long_about = r#"List published news posts, newest first.

When the remote store cannot be reached the locally stored posts are shown
instead, so this command never fails because of the network.

EXAMPLES:
    # Show the latest posts
    news-list

    # Only posts published with the user PIN
    news-list --role user

    # Search titles and bodies
    news-list --search "opening hours"

    # JSON output for scripting
    news-list --format json | jq '.[] | .title'

    # Export to CSV
    news-list --format csv > news.csv

OUTPUT FORMATS:
    text  - Human-readable summary (default)
    json  - JSON array
    jsonl - JSON lines, one object per line
    csv   - CSV with headers
"#)]
struct Args {
    /// Filter by publisher role
    #[arg(short, long, value_name = "ROLE", value_parser = ["admin", "user"])]
    role: Option<String>,

    /// Case-insensitive substring match on title and content
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Maximum number of posts to show
    #[arg(short, long, default_value = "20", value_name = "N")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json", "jsonl", "csv"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Flattened row used for json/csv output
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    id: String,
    date: String,
    title: &'a str,
    content: &'a str,
    author: &'a str,
    publisher_role: Role,
    link_url: Option<&'a str>,
    image_url: Option<&'a str>,
    video_url: Option<&'a str>,
}

impl<'a> From<&'a NewsItem> for ListEntry<'a> {
    fn from(item: &'a NewsItem) -> Self {
        Self {
            id: item.id.as_ref().map(|id| id.as_text()).unwrap_or_default(),
            date: item.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            title: &item.title,
            content: &item.content,
            author: &item.author,
            publisher_role: item.publisher_role,
            link_url: item.link_url.as_deref(),
            image_url: item.image_url.as_deref(),
            video_url: item.video_url.as_deref(),
        }
    }
}

fn filter_items(items: Vec<NewsItem>, args: &Args) -> Vec<NewsItem> {
    let search = args.search.as_ref().map(|s| s.to_lowercase());
    items
        .into_iter()
        .filter(|item| {
            args.role
                .as_deref()
                .map_or(true, |role| item.publisher_role.as_str() == role)
        })
        .filter(|item| {
            search.as_ref().map_or(true, |term| {
                item.title.to_lowercase().contains(term)
                    || item.content.to_lowercase().contains(term)
            })
        })
        .take(args.limit)
        .collect()
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    } else {
        flat
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_default(args.verbose);

    let service = NewsService::new().context("Failed to initialize news service")?;
    let items = filter_items(service.list().await, &args);
    let entries: Vec<ListEntry> = items.iter().map(ListEntry::from).collect();

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "jsonl" => {
            for entry in &entries {
                println!("{}", serde_json::to_string(entry)?);
            }
        }
        "csv" => {
            println!("id,date,publisher_role,author,title,link_url,content");
            for entry in &entries {
                println!(
                    "{},{},{},{},{},{},{}",
                    entry.id,
                    entry.date,
                    entry.publisher_role,
                    csv_field(entry.author),
                    csv_field(entry.title),
                    entry.link_url.unwrap_or(""),
                    csv_field(entry.content)
                );
            }
        }
        _ => {
            for entry in &entries {
                println!("{} | {} | {} ({})", entry.date, entry.id, entry.title, entry.author);
                println!("  {}", preview(entry.content, 72));
                if let Some(link) = entry.link_url {
                    println!("  link: {}", link);
                }
                for media in [entry.image_url, entry.video_url].into_iter().flatten() {
                    println!("  media: {}", media);
                }
                println!();
            }
        }
    }

    Ok(())
}
