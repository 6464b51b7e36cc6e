use time::OffsetDateTime;
use tokio::sync::RwLock;
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

/// Data store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    articles: Vec<Article>,
    categories: Vec<Category>,
    contacts: Vec<ContactEntry>,
}

impl Tables {
    fn slug_owner(&self, slug: &str) -> Option<Uuid> {
        self.articles
            .iter()
            .find(|article| article.slug() == slug)
            .map(Article::id)
    }

    fn category_slug_owner(&self, slug: &str) -> Option<Uuid> {
        self.categories
            .iter()
            .find(|category| category.slug() == slug)
            .map(Category::id)
    }

    fn check_category(&self, fields: &ArticleFields) -> Result<(), StoreError> {
        match fields.category_id {
            Some(id) if !self.categories.iter().any(|c| c.id() == id) => {
                Err(StoreError::MissingCategory(id))
            }
            _ => Ok(()),
        }
    }
}

fn taken(entity: &'static str, slug: &str) -> StoreError {
    StoreError::SlugTaken {
        entity,
        slug: slug.to_string(),
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for MemoryStore {
    async fn list_articles(&self, visibility: Visibility) -> Result<Vec<Article>, StoreError> {
        let tables = self.tables.read().await;
        // Reversed so that equal timestamps list the later insert first.
        let mut articles: Vec<Article> = tables
            .articles
            .iter()
            .rev()
            .filter(|article| visibility.admits(article))
            .cloned()
            .collect();
        sort_articles(&mut articles);
        Ok(articles)
    }

    async fn article(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.articles.iter().find(|a| a.id() == id).cloned())
    }

    async fn article_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Article>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .find(|article| article.slug() == slug && visibility.admits(article))
            .cloned())
    }

    async fn insert_article(&self, article: NewArticle) -> Result<Article, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.slug_owner(article.fields.slug.as_str()).is_some() {
            return Err(taken("article", article.fields.slug.as_str()));
        }
        tables.check_category(&article.fields)?;

        let article = article.stamp();
        tables.articles.push(article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: Uuid, fields: ArticleFields) -> Result<Article, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(owner) = tables.slug_owner(fields.slug.as_str()) {
            if owner != id {
                return Err(taken("article", fields.slug.as_str()));
            }
        }
        tables.check_category(&fields)?;

        let slot = tables
            .articles
            .iter_mut()
            .find(|article| article.id() == id)
            .ok_or(StoreError::article_not_found(id))?;
        let updated = slot.clone().with_fields(fields, OffsetDateTime::now_utc());
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_article(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let index = tables
            .articles
            .iter()
            .position(|article| article.id() == id)
            .ok_or(StoreError::article_not_found(id))?;
        tables.articles.remove(index);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.tables.read().await.categories.clone();
        sort_categories(&mut categories);
        Ok(categories)
    }

    async fn category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id() == id).cloned())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|category| category.slug() == slug)
            .cloned())
    }

    async fn insert_category(&self, fields: CategoryFields) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.category_slug_owner(fields.slug.as_str()).is_some() {
            return Err(taken("category", fields.slug.as_str()));
        }
        let category = stamp_category(fields);
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(owner) = tables.category_slug_owner(fields.slug.as_str()) {
            if owner != id {
                return Err(taken("category", fields.slug.as_str()));
            }
        }
        let slot = tables
            .categories
            .iter_mut()
            .find(|category| category.id() == id)
            .ok_or(StoreError::category_not_found(id))?;
        let updated = slot.clone().with_fields(fields);
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .articles
            .iter()
            .any(|article| article.category_id() == Some(id))
        {
            return Err(StoreError::CategoryInUse(id));
        }
        let index = tables
            .categories
            .iter()
            .position(|category| category.id() == id)
            .ok_or(StoreError::category_not_found(id))?;
        tables.categories.remove(index);
        Ok(())
    }

    async fn insert_contact(&self, entry: ContactEntry) -> Result<(), StoreError> {
        self.tables.write().await.contacts.push(entry);
        Ok(())
    }

    async fn list_contacts(&self) -> Result<Vec<ContactEntry>, StoreError> {
        let mut entries: Vec<ContactEntry> =
            self.tables.read().await.contacts.iter().rev().cloned().collect();
        sort_contacts(&mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleDraft;

    fn fields(slug: &str) -> ArticleFields {
        ArticleFields::from_draft(
            &ArticleDraft::new()
                .with_title("Title")
                .with_slug(slug)
                .with_content("Body"),
        )
        .unwrap()
    }

    fn new_article(slug: &str) -> NewArticle {
        NewArticle {
            fields: fields(slug),
            author_id: "author".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        let first = store.insert_article(new_article("same")).await.unwrap();
        let err = store.insert_article(new_article("same")).await.unwrap_err();
        assert!(err.is_conflict());

        let found = store
            .article_by_slug("same", Visibility::Everything)
            .await
            .unwrap();
        assert_eq!(found, Some(first));
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_public_reads() {
        let store = MemoryStore::new();
        store.insert_article(new_article("draft")).await.unwrap();
        assert_eq!(
            store.article_by_slug("draft", Visibility::Public).await.unwrap(),
            None
        );
        assert!(store.list_articles(Visibility::Public).await.unwrap().is_empty());
        assert_eq!(store.list_articles(Visibility::Everything).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_can_keep_its_own_slug_but_not_steal_one() {
        let store = MemoryStore::new();
        let a = store.insert_article(new_article("a")).await.unwrap();
        store.insert_article(new_article("b")).await.unwrap();

        let kept = store.update_article(a.id(), fields("a")).await.unwrap();
        assert_eq!(kept.created_at(), a.created_at());
        assert_eq!(kept.author_id(), "author");

        let err = store.update_article(a.id(), fields("b")).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken { .. }));
    }

    #[tokio::test]
    async fn missing_category_is_a_conflict() {
        let store = MemoryStore::new();
        let mut with_category = new_article("x");
        with_category.fields.category_id = Some(Uuid::new_v4());
        let err = store.insert_article(with_category).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingCategory(_)));
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let store = MemoryStore::new();
        let category = store
            .insert_category(CategoryFields {
                name: "Money".into(),
                slug: "money".parse().unwrap(),
                description: String::new(),
            })
            .await
            .unwrap();
        let mut article = new_article("x");
        article.fields.category_id = Some(category.id());
        let article = store.insert_article(article).await.unwrap();

        let err = store.delete_category(category.id()).await.unwrap_err();
        assert!(matches!(err, StoreError::CategoryInUse(_)));

        store.delete_article(article.id()).await.unwrap();
        store.delete_category(category.id()).await.unwrap();
        assert!(store.list_categories().await.unwrap().is_empty());
    }
}
