//! Chat store tests against a real PostgreSQL database.
//!
//! Set `QUILL_TEST_DATABASE_URL` to run them; without it every test returns
//! early. The full migration set is applied, so the database needs the
//! `vector` extension available. Each test works under fresh user ids and
//! tests share one database without cleanup.

use quill_core::chats::{self, ChatError, ChatRow, MessageRow, Role};
use quill_core::uuid::uuidv7;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("QUILL_TEST_DATABASE_URL") else {
        eprintln!("QUILL_TEST_DATABASE_URL not set, skipping");
        return None;
    };
    let pool = PgPool::connect(&url).await.expect("connect test database");
    quill_core::migrate::migrate(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

fn fresh_user() -> String {
    format!("user-{}", uuidv7())
}

async fn create(pool: &PgPool, user: &str, title: Option<&str>) -> ChatRow {
    chats::create_chat(pool, user, title).await.unwrap()
}

async fn fetch(pool: &PgPool, user: &str, id: &Uuid) -> Option<ChatRow> {
    chats::get_chat(pool, user, id).await.unwrap()
}

async fn append(pool: &PgPool, user: &str, id: &Uuid, role: Role, content: &str) -> MessageRow {
    chats::append_message(pool, user, id, role, content)
        .await
        .unwrap()
}

async fn messages(pool: &PgPool, user: &str, id: &Uuid) -> Vec<MessageRow> {
    chats::list_messages(pool, user, id).await.unwrap()
}

#[tokio::test]
async fn foreign_chat_reads_as_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = fresh_user();
    let intruder = fresh_user();
    let chat = create(&pool, &owner, Some("Private")).await;

    assert!(fetch(&pool, &intruder, &chat.id).await.is_none());
    assert!(chats::list_chats(&pool, &intruder).await.unwrap().is_empty());

    let listed = chats::list_messages(&pool, &intruder, &chat.id).await;
    assert!(matches!(listed, Err(ChatError::NotFound)));
    let appended = chats::append_message(&pool, &intruder, &chat.id, Role::User, "hi")
        .await;
    assert!(matches!(appended, Err(ChatError::NotFound)));
    let renamed = chats::rename_chat(&pool, &intruder, &chat.id, Some("Mine now"))
        .await;
    assert!(matches!(renamed, Err(ChatError::NotFound)));
    let deleted = chats::delete_chat(&pool, &intruder, &chat.id).await;
    assert!(matches!(deleted, Err(ChatError::NotFound)));

    let kept = fetch(&pool, &owner, &chat.id).await.unwrap();
    assert_eq!(kept.title, "Private");
    assert!(messages(&pool, &owner, &chat.id).await.is_empty());
}

#[tokio::test]
async fn chats_list_most_recently_updated_first() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let first = create(&pool, &user, None).await;
    let second = create(&pool, &user, Some("  Second  ")).await;
    assert_eq!(first.title, "New chat");
    assert_eq!(second.title, "Second");

    let listed = chats::list_chats(&pool, &user).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    append(&pool, &user, &first.id, Role::User, "bump").await;

    let listed = chats::list_chats(&pool, &user).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn append_touches_the_chat() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let chat = create(&pool, &user, None).await;

    let message = append(&pool, &user, &chat.id, Role::Assistant, "Draft").await;
    assert_eq!(message.role(), Role::Assistant);
    assert_eq!(message.chat_id, chat.id);

    let touched = fetch(&pool, &user, &chat.id).await.unwrap();
    assert!(touched.updated_at > chat.updated_at);
    assert_eq!(touched.created_at, chat.created_at);
}

#[tokio::test]
async fn empty_content_leaves_chat_untouched() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let chat = create(&pool, &user, None).await;

    let appended = chats::append_message(&pool, &user, &chat.id, Role::User, "").await;
    assert!(matches!(appended, Err(ChatError::EmptyContent)));

    let after = fetch(&pool, &user, &chat.id).await.unwrap();
    assert_eq!(after.updated_at, chat.updated_at);
    assert!(messages(&pool, &user, &chat.id).await.is_empty());
}

#[tokio::test]
async fn messages_come_back_oldest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let chat = create(&pool, &user, None).await;

    let script = [
        (Role::User, "Write a hook"),
        (Role::Assistant, "Here is a hook"),
        (Role::User, "Shorter"),
    ];
    for (role, content) in script {
        append(&pool, &user, &chat.id, role, content).await;
    }

    let listed = messages(&pool, &user, &chat.id).await;
    let got: Vec<(Role, &str)> = listed
        .iter()
        .map(|m| (m.role(), m.content.as_str()))
        .collect();
    assert_eq!(got, script);
}

#[tokio::test]
async fn rename_trims_and_rejects_blank() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let chat = create(&pool, &user, Some("Draft")).await;

    let renamed = chats::rename_chat(&pool, &user, &chat.id, Some("  Launch plan "))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Launch plan");
    assert!(renamed.updated_at > chat.updated_at);

    let blank = chats::rename_chat(&pool, &user, &chat.id, Some("  ")).await;
    assert!(matches!(blank, Err(ChatError::MissingTitle)));
    let kept = fetch(&pool, &user, &chat.id).await.unwrap();
    assert_eq!(kept.title, "Launch plan");
}

#[tokio::test]
async fn delete_removes_messages() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = fresh_user();
    let chat = create(&pool, &user, None).await;
    append(&pool, &user, &chat.id, Role::User, "gone soon").await;

    chats::delete_chat(&pool, &user, &chat.id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT count(*) FROM messages WHERE chat_id = $1")
        .bind(chat.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(fetch(&pool, &user, &chat.id).await.is_none());

    let again = chats::delete_chat(&pool, &user, &chat.id).await;
    assert!(matches!(again, Err(ChatError::NotFound)));
}
