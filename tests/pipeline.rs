use std::sync::Arc;

use quill::{
    Error,
    article::{ArticleDraft, ArticleFields},
    category::CategoryDraft,
    contact::ContactDraft,
    image::{ImageFile, ImagePipeline, UploadError, select_image},
    index::Selection,
    publish::PublishState,
    reader::Reader,
    render::Block,
    session::StaticSession,
    storage::MemoryStorage,
    store::{MemoryStore, StoreError},
    studio::Studio,
    validate::Field,
};

const MIB: usize = 1024 * 1024;

type TestStudio = Studio<MemoryStore, MemoryStorage, StaticSession>;

fn setup_with(storage: MemoryStorage, session: StaticSession) -> (TestStudio, Reader<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let studio = Studio::new(
        store.clone(),
        ImagePipeline::new(storage, "article-images"),
        session,
    );
    (studio, Reader::new(store))
}

fn setup() -> (TestStudio, Reader<MemoryStore>) {
    setup_with(MemoryStorage::new(), StaticSession::admin("admin"))
}

fn draft(title: &str, slug: &str) -> ArticleDraft {
    ArticleDraft::new()
        .with_title(title)
        .with_slug(slug)
        .with_content("# Hi\n\nHello")
}

fn cover(size: usize) -> ImageFile {
    ImageFile::new("cover.png", "image/png", vec![7; size])
}

#[tokio::test]
async fn published_article_reads_back() {
    let (studio, reader) = setup();
    let category = studio
        .create_category(CategoryDraft::new().with_name("Notes").with_slug("notes"))
        .await
        .unwrap();
    let submitted = draft("Hello", "hello-world")
        .with_excerpt("A first post")
        .with_category(category.id().to_string())
        .with_featured_image("https://cdn.example.com/hello.jpg")
        .with_published(true);
    let created = studio
        .create_article(submitted.clone(), None)
        .await
        .unwrap();
    assert_eq!(created.author_id(), "admin");

    let view = reader.article("hello-world").await.unwrap();
    assert_eq!(
        view.article().fields(),
        &ArticleFields::from_draft(&submitted).unwrap()
    );
    assert_eq!(view.category_label(), "Notes");
    assert_eq!(
        view.blocks(),
        vec![
            Block::Heading1("Hi".into()),
            Block::Paragraph("Hello".into())
        ]
    );
}

#[tokio::test]
async fn uuid_shaped_slugs_are_found() {
    let (studio, _) = setup();
    let slug = "deadbeefdeadbeefdeadbeefdeadbeef";
    let category = studio
        .create_category(CategoryDraft::new().with_name("Hex").with_slug(slug))
        .await
        .unwrap();
    let article = studio
        .create_article(draft("Hex", slug), None)
        .await
        .unwrap();

    assert_eq!(studio.find_category(slug).await.unwrap().id(), category.id());
    assert_eq!(studio.find_article(slug).await.unwrap().id(), article.id());

    let hyphenated = "6f1c2a4e-3b7d-4c5e-9a8b-1d2e3f4a5b6c";
    let article = studio
        .create_article(draft("Dashed", hyphenated), None)
        .await
        .unwrap();
    assert_eq!(studio.find_article(hyphenated).await.unwrap().id(), article.id());
    assert_eq!(
        studio.find_article(&article.id().to_string()).await.unwrap().id(),
        article.id()
    );
}

#[tokio::test]
async fn drafts_are_hidden_from_readers() {
    let (studio, reader) = setup();
    let created = studio
        .create_article(draft("Secret", "secret"), None)
        .await
        .unwrap();
    assert_eq!(created.state(), PublishState::Draft);

    assert!(matches!(reader.article("secret").await, Err(Error::NotFound)));
    assert!(reader.index().await.unwrap().articles().is_empty());
    assert_eq!(studio.find_article("secret").await.unwrap().id(), created.id());
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let (studio, _) = setup();
    let first = studio
        .create_article(draft("First", "same"), None)
        .await
        .unwrap();

    let err = studio
        .create_article(draft("Second", "same"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::WriteConflict(StoreError::SlugTaken { .. })
    ));
    assert_eq!(studio.find_article("same").await.unwrap().id(), first.id());
    assert_eq!(studio.articles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_draft_stops_before_upload() {
    let (studio, _) = setup();
    let image = select_image(cover(1024)).unwrap();
    let err = studio
        .create_article(draft("Bad", "Not A Slug"), Some(image))
        .await
        .unwrap_err();
    match err {
        Error::Validation(err) => assert_eq!(err.field(), Field::Slug),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(studio.images().storage().upload_attempts(), 0);
}

#[tokio::test]
async fn oversized_image_never_reaches_storage() {
    let (studio, _) = setup();
    let err = select_image(cover(6 * MIB)).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { .. }));

    studio
        .create_article(draft("Plain", "plain"), None)
        .await
        .unwrap();
    assert_eq!(studio.images().storage().upload_attempts(), 0);
}

#[tokio::test]
async fn failed_upload_writes_nothing() {
    let (studio, _) = setup_with(
        MemoryStorage::failing("bucket offline"),
        StaticSession::admin("admin"),
    );
    let image = select_image(cover(1024)).unwrap();
    let err = studio
        .create_article(draft("Cover", "cover"), Some(image))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upload(UploadError::Storage(_))));
    assert_eq!(studio.images().storage().upload_attempts(), 1);
    assert!(studio.articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn uploaded_image_url_is_stored() {
    let (studio, _) = setup();
    let image = select_image(cover(1024)).unwrap();
    let article = studio
        .create_article(draft("Cover", "cover"), Some(image))
        .await
        .unwrap();

    let url = article.featured_image().unwrap();
    let key = url.strip_prefix("memory://article-images/").unwrap();
    assert!(key.ends_with(".png"));
    let stored = studio
        .images()
        .storage()
        .object("article-images", key)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1024);
}

#[tokio::test]
async fn edits_keep_or_clear_the_image() {
    let (studio, _) = setup();
    let article = studio
        .create_article(
            draft("Pasted", "pasted").with_featured_image("https://cdn.example.com/a.jpg"),
            None,
        )
        .await
        .unwrap();

    let kept = studio
        .update_article(
            article.id(),
            ArticleDraft::from(&article).with_title("Renamed"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(kept.featured_image(), Some("https://cdn.example.com/a.jpg"));

    let cleared = studio
        .update_article(article.id(), ArticleDraft::from(&kept).without_image(), None)
        .await
        .unwrap();
    assert_eq!(cleared.featured_image(), None);
    assert_eq!(studio.images().storage().upload_attempts(), 0);
}

#[tokio::test]
async fn publish_and_unpublish() {
    let (studio, reader) = setup();
    let article = studio
        .create_article(draft("Toggle", "toggle"), None)
        .await
        .unwrap();

    studio
        .set_published(article.id(), PublishState::Published)
        .await
        .unwrap();
    assert!(reader.article("toggle").await.is_ok());

    let back = studio
        .set_published(article.id(), PublishState::Draft)
        .await
        .unwrap();
    assert_eq!(back.state(), PublishState::Draft);
    assert_eq!(back.created_at(), article.created_at());
    assert!(matches!(reader.article("toggle").await, Err(Error::NotFound)));
}

#[tokio::test]
async fn visitors_cannot_author() {
    for session in [StaticSession::visitor("guest"), StaticSession::anonymous()] {
        let (studio, _) = setup_with(MemoryStorage::new(), session);
        let image = select_image(cover(16)).unwrap();
        let err = studio
            .create_article(draft("Nope", "nope"), Some(image))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(studio.images().storage().upload_attempts(), 0);
        assert!(matches!(studio.articles().await, Err(Error::Unauthorized)));
        assert!(matches!(
            studio.create_category(CategoryDraft::new().with_name("X").with_slug("x")).await,
            Err(Error::Unauthorized)
        ));
    }
}

#[tokio::test]
async fn blog_filters_by_category_name() {
    let (studio, reader) = setup();
    let money = studio
        .create_category(CategoryDraft::new().with_name("money").with_slug("money"))
        .await
        .unwrap();
    let vlogs = studio
        .create_category(CategoryDraft::new().with_name("vlogs").with_slug("vlogs"))
        .await
        .unwrap();

    for (slug, category) in [("a", Some(&money)), ("b", Some(&vlogs)), ("c", None)] {
        let mut article = draft(slug, slug).with_published(true);
        if let Some(category) = category {
            article = article.with_category(category.id().to_string());
        }
        studio.create_article(article, None).await.unwrap();
    }
    studio
        .create_article(
            draft("hidden", "hidden").with_category(money.id().to_string()),
            None,
        )
        .await
        .unwrap();

    let index = reader.index().await.unwrap();
    let slugs = |selection: Selection| -> Vec<String> {
        let mut slugs: Vec<String> = index
            .filtered(&selection)
            .iter()
            .map(|article| article.slug().to_string())
            .collect();
        slugs.sort();
        slugs
    };
    assert_eq!(slugs("money".into()), ["a"]);
    assert_eq!(slugs("vlogs".into()), ["b"]);
    assert_eq!(slugs(Selection::All), ["a", "b", "c"]);

    let view = reader.article("a").await.unwrap();
    assert_eq!(view.category_label(), "money");
}

#[tokio::test]
async fn categories_in_use_cannot_be_deleted() {
    let (studio, _) = setup();
    let category = studio
        .create_category(CategoryDraft::new().with_name("Travel").with_slug("travel"))
        .await
        .unwrap();
    let article = studio
        .create_article(
            draft("Trip", "trip").with_category(category.id().to_string()),
            None,
        )
        .await
        .unwrap();

    let err = studio.delete_category(category.id()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::WriteConflict(StoreError::CategoryInUse(_))
    ));

    studio.delete_article(article.id()).await.unwrap();
    studio.delete_category(category.id()).await.unwrap();
    assert!(studio.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (studio, _) = setup();
    let missing = uuid_string();
    let err = studio
        .create_article(draft("Lost", "lost").with_category(missing), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::WriteConflict(StoreError::MissingCategory(_))
    ));
}

#[tokio::test]
async fn contact_messages_reach_the_author() {
    let (studio, reader) = setup();
    let err = reader
        .send_contact(&ContactDraft::new("Ann", "not-an-email", "Hello there, long enough"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    reader
        .send_contact(&ContactDraft::new("Ann", "ann@example.com", "Hello there, long enough"))
        .await
        .unwrap();
    let contacts = studio.contacts().await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email(), "ann@example.com");
}

fn uuid_string() -> String {
    "6f1c2a4e-3b7d-4c5e-9a8b-1d2e3f4a5b6c".to_string()
}
