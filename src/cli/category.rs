use clap::Subcommand;
use color_eyre::{Section, eyre};
use quill::{
    category::{Category, CategoryDraft},
    slug::suggest_slug,
    workspace::Workspace,
};
use tracing::info;

use crate::{confirm, print_json};

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category
    New {
        name: String,
        /// Defaults to a slug derived from the name
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or describe a category
    Edit {
        /// Category slug or id
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a category nothing files under
    Delete {
        key: String,
        #[arg(short, long)]
        yes: bool,
    },

    /// List categories by name
    List,
}

pub async fn run_category(
    workspace: &Workspace,
    command: CategoryCommands,
    json: bool,
) -> eyre::Result<()> {
    let studio = workspace.studio(workspace.local_session());
    match command {
        CategoryCommands::New {
            name,
            slug,
            description,
        } => {
            let slug = slug.unwrap_or_else(|| suggest_slug(&name));
            let draft = CategoryDraft::new()
                .with_name(name)
                .with_slug(slug)
                .with_description(description.unwrap_or_default());
            let category = studio.create_category(draft).await?;
            report(&category, json)
        }
        CategoryCommands::Edit {
            key,
            name,
            slug,
            description,
        } => {
            let category = studio.find_category(&key).await?;
            let mut draft = CategoryDraft::from(&category);
            if let Some(name) = name {
                draft = draft.with_name(name);
            }
            if let Some(slug) = slug {
                draft = draft.with_slug(slug);
            }
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            let category = studio.update_category(category.id(), draft).await?;
            report(&category, json)
        }
        CategoryCommands::Delete { key, yes } => {
            let category = studio.find_category(&key).await?;
            if !yes && !confirm(format!("Delete category `{}`?", category.name()))? {
                info!("Kept `{}`", category.slug());
                return Ok(());
            }
            studio
                .delete_category(category.id())
                .await
                .note("Move its articles to another category first")?;
            Ok(())
        }
        CategoryCommands::List => {
            let categories = studio.categories().await?;
            if json {
                return print_json(&categories);
            }
            for category in &categories {
                println!("{} ({})", category.name(), category.slug());
                if !category.description().is_empty() {
                    println!("  {}", category.description());
                }
            }
            Ok(())
        }
    }
}

fn report(category: &Category, json: bool) -> eyre::Result<()> {
    if json {
        return print_json(category);
    }
    println!("{} `{}` ({})", category.name(), category.slug(), category.id());
    Ok(())
}
