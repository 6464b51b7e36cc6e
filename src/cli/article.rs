use std::path::{Path, PathBuf};

use clap::Subcommand;
use color_eyre::{
    Section,
    eyre::{self, WrapErr},
};
use quill::{
    article::{Article, ArticleDraft},
    image::{ImageFile, StagedImage, select_image},
    publish::PublishState,
    session::Session,
    slug::suggest_slug,
    storage::FsStorage,
    store::Database,
    studio::Studio,
    utils::display_date,
    workspace::Workspace,
};
use tracing::info;

use crate::{confirm, long_task, print_json};

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// Write a new article from a text file
    New {
        title: String,
        /// File holding the article body
        #[arg(long)]
        content: PathBuf,
        /// Defaults to a slug derived from the title
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        /// Category slug or id
        #[arg(long)]
        category: Option<String>,
        /// Featured image to upload
        #[arg(long)]
        image: Option<PathBuf>,
        /// Publish right away instead of saving a draft
        #[arg(long)]
        publish: bool,
    },

    /// Change an existing article
    Edit {
        /// Article slug or id
        key: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<PathBuf>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long, conflicts_with = "uncategorized")]
        category: Option<String>,
        #[arg(long)]
        uncategorized: bool,
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        clear_image: bool,
    },

    /// Make an article visible to readers
    Publish { key: String },

    /// Move an article back to drafts
    Unpublish { key: String },

    /// Delete an article
    Delete {
        key: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List every article, drafts included
    List,

    /// Show one article, drafts included
    Show { key: String },
}

pub async fn run_article(
    workspace: &Workspace,
    command: ArticleCommands,
    json: bool,
) -> eyre::Result<()> {
    let studio = workspace.studio(workspace.local_session());
    match command {
        ArticleCommands::New {
            title,
            content,
            slug,
            excerpt,
            category,
            image,
            publish,
        } => {
            let slug = slug.unwrap_or_else(|| suggest_slug(&title));
            let mut draft = ArticleDraft::new()
                .with_title(title)
                .with_slug(slug)
                .with_content(read_content(&content).await?)
                .with_excerpt(excerpt.unwrap_or_default())
                .with_published(publish);
            if let Some(key) = category {
                draft = draft.with_category(category_id(&studio, &key).await?);
            }
            let image = stage(image.as_deref()).await?;

            let article = long_task(
                "Saving article...",
                studio.create_article(draft, image),
                "Article saved",
            )
            .await
            .note("Failed to create article")?;
            report(&article, json)
        }
        ArticleCommands::Edit {
            key,
            title,
            content,
            slug,
            excerpt,
            category,
            uncategorized,
            image,
            clear_image,
        } => {
            let article = studio.find_article(&key).await?;
            let mut draft = ArticleDraft::from(&article);
            if let Some(title) = title {
                draft = draft.with_title(title);
            }
            if let Some(path) = content {
                draft = draft.with_content(read_content(&path).await?);
            }
            if let Some(slug) = slug {
                draft = draft.with_slug(slug);
            }
            if let Some(excerpt) = excerpt {
                draft = draft.with_excerpt(excerpt);
            }
            if let Some(key) = category {
                draft = draft.with_category(category_id(&studio, &key).await?);
            } else if uncategorized {
                draft = draft.uncategorized();
            }
            if clear_image {
                draft = draft.without_image();
            }
            let image = stage(image.as_deref()).await?;

            let article = long_task(
                "Saving article...",
                studio.update_article(article.id(), draft, image),
                "Article saved",
            )
            .await
            .note("Failed to update article")?;
            report(&article, json)
        }
        ArticleCommands::Publish { key } => {
            let article = studio.find_article(&key).await?;
            let article = studio
                .set_published(article.id(), PublishState::Published)
                .await?;
            report(&article, json)
        }
        ArticleCommands::Unpublish { key } => {
            let article = studio.find_article(&key).await?;
            let article = studio
                .set_published(article.id(), PublishState::Draft)
                .await?;
            report(&article, json)
        }
        ArticleCommands::Delete { key, yes } => {
            let article = studio.find_article(&key).await?;
            if !yes && !confirm(format!("Delete `{}`? This cannot be undone", article.title()))? {
                info!("Kept `{}`", article.slug());
                return Ok(());
            }
            studio.delete_article(article.id()).await?;
            Ok(())
        }
        ArticleCommands::List => {
            let articles = studio.articles().await?;
            if json {
                return print_json(&articles);
            }
            if articles.is_empty() {
                println!("No articles yet");
                return Ok(());
            }
            for article in &articles {
                println!(
                    "{:<9} {:<14} {} ({})",
                    article.state(),
                    display_date(article.created_at()),
                    article.title(),
                    article.slug()
                );
            }
            Ok(())
        }
        ArticleCommands::Show { key } => {
            let article = studio.find_article(&key).await?;
            if json {
                return print_json(&article);
            }
            println!("{} [{}]", article.title(), article.state());
            println!("slug: {}", article.slug());
            if let Some(image) = article.featured_image() {
                println!("image: {image}");
            }
            println!();
            println!("{}", article.content());
            Ok(())
        }
    }
}

fn report(article: &Article, json: bool) -> eyre::Result<()> {
    if json {
        return print_json(article);
    }
    println!("{} `{}` ({})", article.state(), article.slug(), article.id());
    Ok(())
}

async fn read_content(path: &Path) -> eyre::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))
}

async fn stage(path: Option<&Path>) -> eyre::Result<Option<StagedImage>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file = ImageFile::read(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(select_image(file)?))
}

async fn category_id<A: Session>(
    studio: &Studio<Database, FsStorage, A>,
    key: &str,
) -> eyre::Result<String> {
    let category = studio
        .find_category(key)
        .await
        .note("Create it first with `quill category new`")?;
    Ok(category.id().to_string())
}
