//! Category listing and the category filter of the public blog page.

use std::{collections::HashMap, convert::Infallible, fmt, str::FromStr};

use uuid::Uuid;

use crate::{article::Article, category::Category};

/// Label shown for articles without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

const ALL: &str = "All";

/// Which slice of the published articles to show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    /// Articles whose category name matches exactly, case included.
    Category(String),
}

impl FromStr for Selection {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(if value == ALL {
            Self::All
        } else {
            Self::Category(value.to_string())
        })
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(selection) => selection,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Category(name) => f.write_str(name),
        }
    }
}

/// An article joined with its category, if it still exists.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub article: &'a Article,
    pub category: Option<&'a Category>,
}

impl Entry<'_> {
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.map(Category::name)
    }

    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name().unwrap_or(UNCATEGORIZED)
    }
}

/// Categories (by name) and published articles (newest first), loaded
/// independently and joined on demand.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: Vec<Category>,
    articles: Vec<Article>,
    by_id: HashMap<Uuid, usize>,
}

impl CategoryIndex {
    #[must_use]
    pub fn new(categories: Vec<Category>, articles: Vec<Article>) -> Self {
        let by_id = categories
            .iter()
            .enumerate()
            .map(|(index, category)| (category.id(), index))
            .collect();
        Self {
            categories,
            articles,
            by_id,
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// `All` followed by every category, in name order.
    #[must_use]
    pub fn selections(&self) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(
                self.categories
                    .iter()
                    .map(|category| Selection::Category(category.name().to_string())),
            )
            .collect()
    }

    #[must_use]
    pub fn category_of(&self, article: &Article) -> Option<&Category> {
        let id = article.category_id()?;
        self.by_id.get(&id).map(|&index| &self.categories[index])
    }

    fn entry<'a>(&'a self, article: &'a Article) -> Entry<'a> {
        Entry {
            article,
            category: self.category_of(article),
        }
    }

    /// Entries matching `selection`, keeping the article order.
    ///
    /// Uncategorized articles, and those whose category is gone, only show up
    /// under [`Selection::All`].
    #[must_use]
    pub fn entries(&self, selection: &Selection) -> Vec<Entry<'_>> {
        self.articles
            .iter()
            .map(|article| self.entry(article))
            .filter(|entry| match selection {
                Selection::All => true,
                Selection::Category(name) => entry.category_name() == Some(name.as_str()),
            })
            .collect()
    }

    #[must_use]
    pub fn filtered(&self, selection: &Selection) -> Vec<&Article> {
        self.entries(selection)
            .into_iter()
            .map(|entry| entry.article)
            .collect()
    }
}
