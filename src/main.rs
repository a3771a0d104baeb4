use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use teradl::settings::Settings;
use teradl::{transfer, AsClient, FileDescriptor, Progress, Resolve, ShareLink, TeraResult, Terabox};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch a file shared through a TeraBox link.
#[derive(Debug, Parser)]
#[command(name = "teradl", version)]
struct Args {
    /// Share link, e.g. https://terabox.com/s/1AbC123
    url: String,
    /// Directory the file is saved to.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Raw Cookie header sent with every request.
    #[arg(long)]
    cookie: Option<String>,
    /// Netscape cookie jar exported from a logged-in browser.
    #[arg(long)]
    cookie_file: Option<PathBuf>,
    /// Settings file used instead of ./teradl.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print what was resolved and stop.
    #[arg(long)]
    info: bool,
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,teradl=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

fn describe(d: &FileDescriptor) {
    println!("File: {}", d.filename.as_deref().unwrap_or("unknown"));
    if d.is_low_confidence() {
        println!("      (guessed from the page title)");
    }
    match d.size {
        Some(size) => println!("Size: {:.1} MB", megabytes(size)),
        None => println!("Size: unknown"),
    }
    if let Some(description) = &d.description {
        println!("Description: {}", description);
    }
    if let Some(provenance) = d.provenance {
        println!("Found via: {:?}", provenance);
    }
}

fn manual_method(link: &ShareLink) {
    println!();
    println!("Direct download is not available. To fetch the file manually:");
    println!("  1. open {} in a browser", link);
    println!("  2. wait for the page to load");
    println!("  3. use the download button");
    println!("Some files require a login or have download restrictions.");
}

fn show_progress(p: Progress) {
    match p.percent() {
        Some(percent) => eprint!(
            "\rDownloading: {:.1}% ({:.1} MB)",
            percent,
            megabytes(p.downloaded)
        ),
        None => eprint!("\rDownloading: {:.1} MB", megabytes(p.downloaded)),
    }
}

async fn run(args: &Args, settings: Settings) -> TeraResult<()> {
    let link = ShareLink::parse(&args.url)?;
    let mut terabox = Terabox::with_config(settings.resolver.clone());
    if let Some(cookie) = args.cookie.as_ref().or(settings.cookie.as_ref()) {
        terabox.client_mut().push_cookie(cookie)?;
    }
    if let Some(jar) = args.cookie_file.as_ref().or(settings.cookie_file.as_ref()) {
        terabox.client_mut().load_netscape_cookie(jar)?;
    }

    let file = terabox.resolve(&link).await?;
    if args.info {
        println!("{}", serde_json::to_string_pretty(&file).unwrap_or_default());
        return Ok(());
    }
    describe(&file);
    if file.direct_url.is_none() {
        manual_method(&link);
        return Ok(());
    }

    let dir = args.output.clone().unwrap_or(settings.output_dir);
    let downloaded = transfer::download(
        terabox.client(),
        &file,
        &dir,
        &settings.limits,
        &settings.transfer,
        show_progress,
    )
    .await?;
    eprintln!();
    let delivery = downloaded.check_delivery(settings.limits.delivery_limit);
    let saved = downloaded.persist(&dir)?;
    println!("Saved to {}", saved.display());
    delivery
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();
    let args = Args::parse();

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "failed to load settings");
            eprintln!("teradl: invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };
    info!(output_dir = %settings.output_dir.display(), "settings loaded");

    match run(&args, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
