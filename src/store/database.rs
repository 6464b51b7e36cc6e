use std::{fmt, path::Path, sync::Arc};

use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use tokio::task::spawn_blocking;
use tracing::debug;
use uuid::Uuid;

use super::{
    DataStore, NewArticle, StoreError, Visibility, sort_articles, sort_categories, sort_contacts,
    stamp_category,
};
use crate::{
    article::{Article, ArticleFields},
    category::{Category, CategoryFields},
    contact::ContactEntry,
};

const ARTICLES: TableDefinition<u128, &[u8]> = TableDefinition::new("articles");
const ARTICLE_SLUGS: TableDefinition<&str, u128> = TableDefinition::new("article_slugs");
const CATEGORIES: TableDefinition<u128, &[u8]> = TableDefinition::new("categories");
const CATEGORY_SLUGS: TableDefinition<&str, u128> = TableDefinition::new("category_slugs");
const CONTACTS: TableDefinition<u128, &[u8]> = TableDefinition::new("contact_entries");

macro_rules! from_redb {
    ($($ty:ty),*) => {
        $(
        impl From<$ty> for StoreError {
            fn from(err: $ty) -> Self {
                Self::Database(err.into())
            }
        })*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError
);

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Data store backed by an embedded `redb` file.
///
/// Each entity lives in its own table keyed by id, with a slug table next to
/// it that maps every slug to its owner. Both are written in one transaction.
#[derive(Clone)]
pub struct Database(Arc<redb::Database>);

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open the database at `path`, creating it and its tables if needed.
    ///
    /// # Errors
    /// Returns a [`StoreError::Database`] if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        spawn_blocking(move || -> Result<Self, StoreError> {
            let db = redb::Database::create(&path)?;
            let txn = db.begin_write()?;
            {
                txn.open_table(ARTICLES)?;
                txn.open_table(ARTICLE_SLUGS)?;
                txn.open_table(CATEGORIES)?;
                txn.open_table(CATEGORY_SLUGS)?;
                txn.open_table(CONTACTS)?;
            }
            txn.commit()?;
            debug!("Opened database at {}", path.display());
            Ok(Self(Arc::new(db)))
        })
        .await?
    }

    async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&redb::ReadTransaction) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.0.clone();
        spawn_blocking(move || -> Result<T, StoreError> {
            let txn = db.begin_read()?;
            f(&txn)
        })
        .await?
    }

    /// Run `f` in a write transaction, committing only if it succeeds.
    async fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTransaction) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.0.clone();
        spawn_blocking(move || -> Result<T, StoreError> {
            let txn = db.begin_write()?;
            let value = f(&txn)?;
            txn.commit()?;
            Ok(value)
        })
        .await?
    }
}

fn all_rows<T: DeserializeOwned>(
    table: &impl ReadableTable<u128, &'static [u8]>,
) -> Result<Vec<T>, StoreError> {
    let mut rows = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        rows.push(decode(value.value())?);
    }
    Ok(rows)
}

fn row<T: DeserializeOwned>(
    table: &impl ReadableTable<u128, &'static [u8]>,
    id: Uuid,
) -> Result<Option<T>, StoreError> {
    table
        .get(id.as_u128())?
        .map(|value| decode(value.value()))
        .transpose()
}

fn slug_owner(
    table: &impl ReadableTable<&'static str, u128>,
    slug: &str,
) -> Result<Option<Uuid>, StoreError> {
    Ok(table.get(slug)?.map(|owner| Uuid::from_u128(owner.value())))
}

fn check_category(txn: &WriteTransaction, fields: &ArticleFields) -> Result<(), StoreError> {
    if let Some(id) = fields.category_id {
        let categories = txn.open_table(CATEGORIES)?;
        if categories.get(id.as_u128())?.is_none() {
            return Err(StoreError::MissingCategory(id));
        }
    }
    Ok(())
}

/// Point `slug` at `id`, releasing `previous` if the slug changed.
fn claim_slug(
    txn: &WriteTransaction,
    table: TableDefinition<'static, &'static str, u128>,
    entity: &'static str,
    id: Uuid,
    slug: &str,
    previous: Option<&str>,
) -> Result<(), StoreError> {
    let mut slugs = txn.open_table(table)?;
    if let Some(owner) = slug_owner(&slugs, slug)? {
        if owner != id {
            return Err(StoreError::SlugTaken {
                entity,
                slug: slug.to_string(),
            });
        }
    }
    if let Some(previous) = previous {
        if previous != slug {
            slugs.remove(previous)?;
        }
    }
    slugs.insert(slug, id.as_u128())?;
    Ok(())
}

impl DataStore for Database {
    async fn list_articles(&self, visibility: Visibility) -> Result<Vec<Article>, StoreError> {
        self.read(move |txn| {
            let table = txn.open_table(ARTICLES)?;
            let mut articles: Vec<Article> = all_rows(&table)?;
            articles.retain(|article| visibility.admits(article));
            sort_articles(&mut articles);
            Ok(articles)
        })
        .await
    }

    async fn article(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        self.read(move |txn| row(&txn.open_table(ARTICLES)?, id))
            .await
    }

    async fn article_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Article>, StoreError> {
        let slug = slug.to_string();
        self.read(move |txn| {
            let Some(id) = slug_owner(&txn.open_table(ARTICLE_SLUGS)?, &slug)? else {
                return Ok(None);
            };
            let article: Option<Article> = row(&txn.open_table(ARTICLES)?, id)?;
            Ok(article.filter(|article| visibility.admits(article)))
        })
        .await
    }

    async fn insert_article(&self, article: NewArticle) -> Result<Article, StoreError> {
        self.write(move |txn| {
            check_category(txn, &article.fields)?;
            let article = article.stamp();
            claim_slug(
                txn,
                ARTICLE_SLUGS,
                "article",
                article.id(),
                article.slug().as_str(),
                None,
            )?;
            txn.open_table(ARTICLES)?
                .insert(article.id().as_u128(), encode(&article)?.as_slice())?;
            Ok(article)
        })
        .await
    }

    async fn update_article(&self, id: Uuid, fields: ArticleFields) -> Result<Article, StoreError> {
        self.write(move |txn| {
            let mut articles = txn.open_table(ARTICLES)?;
            let current: Article = row(&articles, id)?.ok_or(StoreError::article_not_found(id))?;
            check_category(txn, &fields)?;
            claim_slug(
                txn,
                ARTICLE_SLUGS,
                "article",
                id,
                fields.slug.as_str(),
                Some(current.slug().as_str()),
            )?;
            let updated = current.with_fields(fields, OffsetDateTime::now_utc());
            articles.insert(id.as_u128(), encode(&updated)?.as_slice())?;
            Ok(updated)
        })
        .await
    }

    async fn delete_article(&self, id: Uuid) -> Result<(), StoreError> {
        self.write(move |txn| {
            let mut articles = txn.open_table(ARTICLES)?;
            let current: Article = row(&articles, id)?.ok_or(StoreError::article_not_found(id))?;
            articles.remove(id.as_u128())?;
            txn.open_table(ARTICLE_SLUGS)?
                .remove(current.slug().as_str())?;
            Ok(())
        })
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.read(|txn| {
            let mut categories: Vec<Category> = all_rows(&txn.open_table(CATEGORIES)?)?;
            sort_categories(&mut categories);
            Ok(categories)
        })
        .await
    }

    async fn category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        self.read(move |txn| row(&txn.open_table(CATEGORIES)?, id))
            .await
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let slug = slug.to_string();
        self.read(move |txn| {
            match slug_owner(&txn.open_table(CATEGORY_SLUGS)?, &slug)? {
                Some(id) => row(&txn.open_table(CATEGORIES)?, id),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_category(&self, fields: CategoryFields) -> Result<Category, StoreError> {
        self.write(move |txn| {
            let category = stamp_category(fields);
            claim_slug(
                txn,
                CATEGORY_SLUGS,
                "category",
                category.id(),
                category.slug().as_str(),
                None,
            )?;
            txn.open_table(CATEGORIES)?
                .insert(category.id().as_u128(), encode(&category)?.as_slice())?;
            Ok(category)
        })
        .await
    }

    async fn update_category(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> Result<Category, StoreError> {
        self.write(move |txn| {
            let mut categories = txn.open_table(CATEGORIES)?;
            let current: Category =
                row(&categories, id)?.ok_or(StoreError::category_not_found(id))?;
            claim_slug(
                txn,
                CATEGORY_SLUGS,
                "category",
                id,
                fields.slug.as_str(),
                Some(current.slug().as_str()),
            )?;
            let updated = current.with_fields(fields);
            categories.insert(id.as_u128(), encode(&updated)?.as_slice())?;
            Ok(updated)
        })
        .await
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.write(move |txn| {
            let articles: Vec<Article> = all_rows(&txn.open_table(ARTICLES)?)?;
            if articles.iter().any(|article| article.category_id() == Some(id)) {
                return Err(StoreError::CategoryInUse(id));
            }
            let mut categories = txn.open_table(CATEGORIES)?;
            let current: Category =
                row(&categories, id)?.ok_or(StoreError::category_not_found(id))?;
            categories.remove(id.as_u128())?;
            txn.open_table(CATEGORY_SLUGS)?
                .remove(current.slug().as_str())?;
            Ok(())
        })
        .await
    }

    async fn insert_contact(&self, entry: ContactEntry) -> Result<(), StoreError> {
        self.write(move |txn| {
            txn.open_table(CONTACTS)?
                .insert(entry.id().as_u128(), encode(&entry)?.as_slice())?;
            Ok(())
        })
        .await
    }

    async fn list_contacts(&self) -> Result<Vec<ContactEntry>, StoreError> {
        self.read(|txn| {
            let mut entries: Vec<ContactEntry> = all_rows(&txn.open_table(CONTACTS)?)?;
            sort_contacts(&mut entries);
            Ok(entries)
        })
        .await
    }
}
