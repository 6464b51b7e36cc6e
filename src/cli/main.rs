use core::time::Duration;
use std::{
    env::current_dir,
    io::{self, Write},
    process::exit,
};

use clap::{Parser, Subcommand};
use color_eyre::{Section, config::HookBuilder, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use quill::workspace::Workspace;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    article::{ArticleCommands, run_article},
    blog::{run_blog, run_read},
    category::{CategoryCommands, run_category},
    contact::{ContactCommands, run_contact},
};

mod article;
mod blog;
mod category;
mod contact;

#[derive(Parser)]
#[command(about = "Write, publish and read your blog", long_about = None)]
#[command(version, author)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new blog workspace in the current directory
    Create { name: Option<String> },

    /// Write and manage articles
    #[command(subcommand)]
    Article(ArticleCommands),

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// List published articles
    Blog {
        /// Only show articles in this category (by name, `All` for everything)
        #[arg(long)]
        category: Option<String>,
    },

    /// Read a published article
    Read { slug: String },

    /// Messages from readers
    #[command(subcommand)]
    Contact(ContactCommands),
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    HookBuilder::default()
        .display_env_section(true)
        .panic_section("It looks like Quill encountered a bug")
        .install()
        .expect("Failed to install color-eyre hook");

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    if let Err(err) = entry(cli).await {
        error!("{:#}", err);
        exit(1);
    }
}

async fn entry(cli: Cli) -> eyre::Result<()> {
    let current_dir = current_dir()?;

    if let Commands::Create { name } = cli.command {
        let name = match name {
            Some(name) => name,
            None => prompt_blog_name()?,
        };
        Workspace::create(current_dir, name).await?;
        info!("Workspace created successfully");
        return Ok(());
    }

    let workspace = Workspace::open(&current_dir)
        .await
        .note("Can't open workspace")?;
    match cli.command {
        Commands::Article(command) => run_article(&workspace, command, cli.json).await,
        Commands::Category(command) => run_category(&workspace, command, cli.json).await,
        Commands::Blog { category } => run_blog(&workspace, category, cli.json).await,
        Commands::Read { slug } => run_read(&workspace, &slug, cli.json).await,
        Commands::Contact(command) => run_contact(&workspace, command, cli.json).await,
        Commands::Create { .. } => Ok(()),
    }
}

pub async fn long_task<T, E>(
    loading_msg: &'static str,
    f: impl Future<Output = Result<T, E>>,
    complete_msg: &'static str,
) -> Result<T, E> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(loading_msg);

    let result = f.await;
    match &result {
        Ok(_) => pb.finish_with_message(complete_msg),
        Err(_) => pb.finish_and_clear(),
    }
    result
}

/// Print `value` as pretty JSON.
pub fn print_json(value: &impl serde::Serialize) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask before doing something that cannot be undone.
pub fn confirm(prompt: String) -> eyre::Result<bool> {
    use color_eyre::eyre::WrapErr;
    use dialoguer::{Confirm, theme::ColorfulTheme};

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .wrap_err("Failed to read confirmation")
}

fn prompt_blog_name() -> eyre::Result<String> {
    loop {
        print!("Blog name: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let name = input.trim().to_string();

        if !name.is_empty() {
            return Ok(name);
        }

        println!("Blog name cannot be empty. Please enter a name.");
    }
}
