//! Use-case tests: the `forum-core` services wired to the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use forum_core::domain::{Post, PostChanges, Principal};
use forum_core::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, SessionStore,
    UserRepository,
};
use forum_core::DomainError;
use forum_core::error::RepoError;
use forum_core::services::{
    AuthService, CommentService, Credentials, DUPLICATE_ACCOUNT, LikeService, PostService,
    Registration,
};

use crate::database::memory::InMemoryPostRepository;
use crate::{
    Argon2PasswordService, CacheSessionStore, InMemoryCache, InMemoryDatabase,
    RepositoryAuthenticationManager,
};

struct Fixture {
    db: InMemoryDatabase,
    sessions: Arc<CacheSessionStore>,
    auth: AuthService,
    posts: PostService,
    comments: CommentService,
    likes: LikeService,
}

fn fixture() -> Fixture {
    let db = InMemoryDatabase::new();
    let users: Arc<dyn UserRepository> = Arc::new(db.users());
    let passwords = Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap());
    let sessions = Arc::new(CacheSessionStore::new(
        Arc::new(InMemoryCache::new()),
        Duration::from_secs(60),
    ));
    let authenticator = Arc::new(RepositoryAuthenticationManager::new(
        users.clone(),
        passwords.clone(),
    ));
    let posts = Arc::new(db.posts());

    Fixture {
        auth: AuthService::new(users, passwords, authenticator, sessions.clone()),
        posts: PostService::new(posts.clone()),
        comments: CommentService::new(posts.clone(), Arc::new(db.comments())),
        likes: LikeService::new(posts, Arc::new(db.likes())),
        sessions,
        db,
    }
}

fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

impl Fixture {
    async fn member(&self, username: &str) -> Principal {
        self.auth
            .signup(registration(username, &format!("{username}@example.com")))
            .await
            .unwrap();
        self.auth
            .login(credentials(username, "correct horse battery"), None)
            .await
            .unwrap()
            .principal
    }
}

#[tokio::test]
async fn test_signup_hashes_password() {
    let f = fixture();
    let user = f
        .auth
        .signup(registration("alice", "Alice@Example.com"))
        .await
        .unwrap();

    let stored = f.db.users().find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.id, user.id);
    assert_eq!(stored.email, "alice@example.com");
    assert_ne!(stored.password_hash, "correct horse battery");
}

#[tokio::test]
async fn test_signup_rejects_taken_username_or_email() {
    let f = fixture();
    f.auth
        .signup(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    for attempt in [
        registration("alice", "new@example.com"),
        registration("bob", "alice@example.com"),
    ] {
        match f.auth.signup(attempt).await {
            Err(DomainError::Duplicate(msg)) => assert_eq!(msg, DUPLICATE_ACCOUNT),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    assert!(!f.db.users().exists_by_username("bob").await.unwrap());
}

#[tokio::test]
async fn test_login_opens_session() {
    let f = fixture();
    f.auth
        .signup(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let session = f
        .auth
        .login(credentials("alice", "correct horse battery"), None)
        .await
        .unwrap();

    assert_eq!(session.principal.username, "alice");
    let loaded = f.sessions.load(&session.id).await.unwrap();
    assert_eq!(loaded, Some(session.principal));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let f = fixture();
    f.auth
        .signup(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let wrong_password = f.auth.login(credentials("alice", "nope"), None).await;
    let unknown_user = f.auth.login(credentials("mallory", "nope"), None).await;

    assert!(matches!(wrong_password, Err(DomainError::Unauthorized)));
    assert!(matches!(unknown_user, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn test_login_replaces_existing_session() {
    let f = fixture();
    f.auth
        .signup(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let first = f
        .auth
        .login(credentials("alice", "correct horse battery"), None)
        .await
        .unwrap();

    let second = f
        .auth
        .login(credentials("alice", "correct horse battery"), Some(&first.id))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(f.sessions.load(&first.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_current_user_requires_principal() {
    let f = fixture();
    assert!(matches!(
        f.auth.current_user(None).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        f.auth.current_principal(None),
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_current_user_and_principal() {
    let f = fixture();
    let principal = f.member("alice").await;

    let user = f.auth.current_user(Some(&principal)).await.unwrap();
    assert_eq!(user.id, principal.user_id);
    assert_eq!(f.auth.current_principal(Some(&principal)).unwrap(), principal);
}

#[tokio::test]
async fn test_current_user_not_found_when_account_gone() {
    let f = fixture();
    let principal = f.member("alice").await;
    f.db.users().delete(principal.user_id).await.unwrap();

    assert!(matches!(
        f.auth.current_user(Some(&principal)).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let f = fixture();
    f.auth
        .signup(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = f
        .auth
        .login(credentials("alice", "correct horse battery"), None)
        .await
        .unwrap();

    f.auth.logout(Some(&session.id)).await.unwrap();
    f.auth.logout(None).await.unwrap();

    let principal = f.sessions.load(&session.id).await.unwrap();
    assert!(principal.is_none());
    assert!(matches!(
        f.auth.current_user(principal.as_ref()).await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_post_lifecycle() {
    let f = fixture();
    let alice = f.member("alice").await;

    assert!(matches!(
        f.posts.create(None, "t".into(), "c".into()).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        f.posts.create(Some(&alice), "  ".into(), "c".into()).await,
        Err(DomainError::Validation(_))
    ));

    let post = f
        .posts
        .create(Some(&alice), "Hello".into(), "World".into())
        .await
        .unwrap();
    assert_eq!(post.author_id, alice.user_id);

    let edited = f
        .posts
        .update(
            Some(&alice),
            post.id,
            PostChanges {
                title: Some("Hello again".into()),
                content: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.title, "Hello again");
    assert_eq!(edited.content, "World");
    assert!(edited.updated_at >= post.updated_at);

    assert_eq!(f.posts.list(10, 0).await.unwrap().len(), 1);
    assert_eq!(f.posts.list_by_author(alice.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_author_may_edit_or_delete_post() {
    let f = fixture();
    let alice = f.member("alice").await;
    let bob = f.member("bob").await;
    let post = f
        .posts
        .create(Some(&alice), "Mine".into(), "Body".into())
        .await
        .unwrap();

    let edit = f
        .posts
        .update(Some(&bob), post.id, PostChanges::default())
        .await;
    assert!(matches!(edit, Err(DomainError::Forbidden)));
    assert!(matches!(
        f.posts.delete(Some(&bob), post.id).await,
        Err(DomainError::Forbidden)
    ));
    assert!(f.posts.get(post.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_post_removes_comments_and_likes() {
    let f = fixture();
    let alice = f.member("alice").await;
    let bob = f.member("bob").await;
    let post = f
        .posts
        .create(Some(&alice), "Doomed".into(), "Body".into())
        .await
        .unwrap();

    let comment = f
        .comments
        .add(Some(&bob), post.id, "nice".into())
        .await
        .unwrap();
    f.likes.like(Some(&bob), post.id).await.unwrap();

    f.posts.delete(Some(&alice), post.id).await.unwrap();

    assert!(matches!(
        f.posts.get(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(
        f.db.comments()
            .find_by_post(post.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(f.db.comments().find_by_id(comment.id).await.unwrap().is_none());
    assert_eq!(f.db.likes().count_by_post(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_comments() {
    let f = fixture();
    let alice = f.member("alice").await;
    let bob = f.member("bob").await;
    let post = f
        .posts
        .create(Some(&alice), "Topic".into(), "Body".into())
        .await
        .unwrap();

    let first = f
        .comments
        .add(Some(&bob), post.id, "first".into())
        .await
        .unwrap();
    f.comments
        .add(Some(&alice), post.id, "second".into())
        .await
        .unwrap();

    let listed = f.comments.list(post.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);

    assert!(matches!(
        f.comments.delete(Some(&alice), first.id).await,
        Err(DomainError::Forbidden)
    ));
    f.comments.delete(Some(&bob), first.id).await.unwrap();
    assert_eq!(f.comments.list(post.id).await.unwrap().len(), 1);

    assert!(matches!(
        f.comments
            .add(Some(&bob), uuid::Uuid::new_v4(), "lost".into())
            .await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_like_and_unlike_are_idempotent() {
    let f = fixture();
    let alice = f.member("alice").await;
    let bob = f.member("bob").await;
    let post = f
        .posts
        .create(Some(&alice), "Likeable".into(), "Body".into())
        .await
        .unwrap();

    f.likes.like(Some(&bob), post.id).await.unwrap();
    let summary = f.likes.like(Some(&bob), post.id).await.unwrap();
    assert_eq!(summary.likes, 1);
    assert!(summary.liked);

    let anonymous = f.likes.summary(None, post.id).await.unwrap();
    assert_eq!(anonymous.likes, 1);
    assert!(!anonymous.liked);

    f.likes.unlike(Some(&bob), post.id).await.unwrap();
    let summary = f.likes.unlike(Some(&bob), post.id).await.unwrap();
    assert_eq!(summary.likes, 0);
    assert!(!summary.liked);

    assert!(matches!(
        f.likes.like(None, post.id).await,
        Err(DomainError::Unauthorized)
    ));
}

/// Post table whose rows disappear right after they are read, as if the
/// author deleted the post between the existence check and the insert.
struct VanishingPosts(InMemoryPostRepository);

#[async_trait]
impl BaseRepository<Post, Uuid> for VanishingPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let post = self.0.find_by_id(id).await?;
        if post.is_some() {
            self.0.delete(id).await?;
        }
        Ok(post)
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.0.save(post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0.delete(id).await
    }
}

#[async_trait]
impl PostRepository for VanishingPosts {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.0.find_by_author(author_id).await
    }

    async fn list_recent(&self, limit: u64, offset: u64) -> Result<Vec<Post>, RepoError> {
        self.0.list_recent(limit, offset).await
    }
}

#[tokio::test]
async fn test_children_of_concurrently_deleted_post_are_not_found() {
    let f = fixture();
    let alice = f.member("alice").await;
    let vanishing: Arc<dyn PostRepository> = Arc::new(VanishingPosts(f.db.posts()));
    let comments = CommentService::new(vanishing.clone(), Arc::new(f.db.comments()));
    let likes = LikeService::new(vanishing, Arc::new(f.db.likes()));

    let first = f
        .posts
        .create(Some(&alice), "Gone soon".into(), "Body".into())
        .await
        .unwrap();
    let err = comments
        .add(Some(&alice), first.id, "Too late".into())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound { entity_type: "Post", ref id } if *id == first.id.to_string()
    ));

    let second = f
        .posts
        .create(Some(&alice), "Also gone".into(), "Body".into())
        .await
        .unwrap();
    let err = likes.like(Some(&alice), second.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound { entity_type: "Post", ref id } if *id == second.id.to_string()
    ));
}

#[tokio::test]
async fn test_post_by_deleted_account_is_not_found() {
    let f = fixture();
    let alice = f.member("alice").await;
    f.db.users().delete(alice.user_id).await.unwrap();

    let err = f
        .posts
        .create(Some(&alice), "Orphan".into(), "Body".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "User", .. }));
}
