use color_eyre::{Section, eyre};
use quill::{
    index::Selection,
    render::Block,
    utils::display_date,
    workspace::Workspace,
};
use serde_json::json;

use crate::print_json;

pub async fn run_blog(
    workspace: &Workspace,
    category: Option<String>,
    json: bool,
) -> eyre::Result<()> {
    let index = workspace.reader().index().await?;
    let selection = category.as_deref().map(Selection::from).unwrap_or_default();
    let entries = index.entries(&selection);

    if json {
        let entries: Vec<_> = entries
            .iter()
            .map(|entry| {
                json!({
                    "title": entry.article.title(),
                    "slug": entry.article.slug(),
                    "excerpt": entry.article.excerpt(),
                    "category": entry.category_label(),
                    "date": display_date(entry.article.created_at()),
                    "featured_image": entry.article.featured_image(),
                })
            })
            .collect();
        return print_json(&entries);
    }

    let manifest = workspace.manifest();
    println!("{}", manifest.title());
    if !manifest.description().is_empty() {
        println!("{}", manifest.description());
    }
    let filters: Vec<String> = index.selections().iter().map(ToString::to_string).collect();
    println!("[{}]", filters.join(" | "));
    println!();

    if entries.is_empty() {
        println!("No articles in {selection}");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{} · {} · {}",
            entry.article.title(),
            entry.category_label(),
            display_date(entry.article.created_at())
        );
        if !entry.article.excerpt().is_empty() {
            println!("  {}", entry.article.excerpt());
        }
        println!("  quill read {}", entry.article.slug());
    }
    Ok(())
}

pub async fn run_read(workspace: &Workspace, slug: &str, json: bool) -> eyre::Result<()> {
    let view = workspace
        .reader()
        .article(slug)
        .await
        .note("Only published articles can be read")?;
    let article = view.article();

    if json {
        return print_json(&json!({
            "title": article.title(),
            "slug": article.slug(),
            "category": view.category_label(),
            "date": view.date(),
            "featured_image": article.featured_image(),
            "blocks": view.blocks(),
            "html": view.html(),
        }));
    }

    println!("{}", article.title());
    println!("{} · {}", view.category_label(), view.date());
    if let Some(image) = article.featured_image() {
        println!("{image}");
    }
    println!();
    for block in view.blocks() {
        match block {
            Block::Heading1(text) => println!("{}\n", text.to_uppercase()),
            Block::Heading2(text) => println!("{text}\n"),
            Block::Heading3(text) => println!("{text}"),
            Block::ListItem(text) => println!("  • {text}"),
            Block::Paragraph(text) => println!("{text}\n"),
        }
    }
    Ok(())
}
