//! `PgStore` against a real database. Every test is skipped unless `DATABASE_URL`
//! points at a Postgres instance the migrations can run in.

use chrono::{DateTime, TimeZone, Utc};
use dotenv::dotenv;
use pretty_assertions::assert_eq;
use sqlx::PgPool;
use uuid::Uuid;

use todoforge::error::AppError;
use todoforge::models::{NewTodo, Todo, TodoChanges, TodoPriority, TodoStatus, User};
use todoforge::query::{SortDirection, SortField, SortSpec, TodoFilter};
use todoforge::store::{PgStore, TodoStore, UserStore};

async fn connect() -> Option<PgStore> {
    dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            log::warn!("DATABASE_URL is not set, skipping Postgres store test");
            return None;
        }
    };
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    let store = PgStore::new(pool);
    store.migrate().await.expect("Failed to run migrations");
    Some(store)
}

/// A fresh owner per test so runs never see each other's rows.
fn owner() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

fn day(month: u32, day: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap())
}

async fn insert(
    store: &PgStore,
    owner: &str,
    title: &str,
    priority: TodoPriority,
    due_date: Option<DateTime<Utc>>,
) -> Todo {
    let todo = Todo::new(
        NewTodo {
            title: title.to_string(),
            description: None,
            due_date,
            priority,
            status: None,
        },
        owner,
    );
    store.insert_todo(&todo).await.unwrap();
    todo
}

fn owned_by(owner: &str) -> TodoFilter {
    TodoFilter {
        owner: Some(owner.to_string()),
        ..TodoFilter::default()
    }
}

async fn titles(
    store: &PgStore,
    filter: &TodoFilter,
    field: SortField,
    direction: SortDirection,
) -> Vec<String> {
    let sort = SortSpec { field, direction };
    store
        .find_todos(filter, &sort, 0, 50)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect()
}

#[test_log::test(actix_rt::test)]
async fn test_partial_update_and_due_date_clearing() {
    let Some(store) = connect().await else { return };
    let alice = owner();
    let todo = insert(&store, &alice, "Write report", TodoPriority::Low, day(6, 1)).await;

    let priority_only = TodoChanges {
        priority: Some(TodoPriority::High),
        ..TodoChanges::default()
    };
    let updated = store
        .update_todo(todo.id, Some(alice.as_str()), &priority_only)
        .await
        .unwrap()
        .expect("todo exists");
    assert_eq!(updated.priority, TodoPriority::High);
    assert_eq!(updated.title, "Write report");
    assert_eq!(updated.status, TodoStatus::Pending);
    assert_eq!(updated.due_date, day(6, 1));

    let clear_due = TodoChanges {
        due_date: Some(None),
        status: Some(TodoStatus::Done),
        ..TodoChanges::default()
    };
    let updated = store
        .update_todo(todo.id, Some(alice.as_str()), &clear_due)
        .await
        .unwrap()
        .expect("todo exists");
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.status, TodoStatus::Done);
    assert_eq!(updated.priority, TodoPriority::High);
}

#[test_log::test(actix_rt::test)]
async fn test_owner_scoping() {
    let Some(store) = connect().await else { return };
    let alice = owner();
    let bob = owner();
    let todo = insert(&store, &alice, "Private", TodoPriority::Medium, None).await;

    assert!(store.get_todo(todo.id, Some(bob.as_str())).await.unwrap().is_none());
    assert!(store.get_todo(todo.id, Some(alice.as_str())).await.unwrap().is_some());
    assert!(store.get_todo(todo.id, None).await.unwrap().is_some());

    let rename = TodoChanges {
        title: Some("Hijacked".into()),
        ..TodoChanges::default()
    };
    assert!(store
        .update_todo(todo.id, Some(bob.as_str()), &rename)
        .await
        .unwrap()
        .is_none());

    assert_eq!(store.delete_todo(todo.id, Some(bob.as_str())).await.unwrap(), 0);
    assert_eq!(store.delete_todo(todo.id, Some(alice.as_str())).await.unwrap(), 1);
    assert_eq!(store.delete_todo(todo.id, Some(alice.as_str())).await.unwrap(), 0);
}

#[test_log::test(actix_rt::test)]
async fn test_enum_filters_compare_as_text() {
    let Some(store) = connect().await else { return };
    let alice = owner();
    insert(&store, &alice, "Low one", TodoPriority::Low, None).await;
    insert(&store, &alice, "High one", TodoPriority::High, None).await;

    let bogus = TodoFilter {
        status: Some("bogus".into()),
        ..owned_by(&alice)
    };
    assert!(store
        .find_todos(&bogus, &SortSpec::default(), 0, 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.count_todos(&bogus).await.unwrap(), 0);

    let high = TodoFilter {
        priority: Some("high".into()),
        ..owned_by(&alice)
    };
    assert_eq!(
        titles(&store, &high, SortField::Title, SortDirection::Asc).await,
        vec!["High one"]
    );
    assert_eq!(store.count_todos(&owned_by(&alice)).await.unwrap(), 2);
}

#[test_log::test(actix_rt::test)]
async fn test_sort_order_matches_memory_store() {
    let Some(store) = connect().await else { return };
    let alice = owner();
    insert(&store, &alice, "apple", TodoPriority::Low, day(3, 1)).await;
    insert(&store, &alice, "Zebra", TodoPriority::High, None).await;
    insert(&store, &alice, "mango", TodoPriority::Medium, day(1, 1)).await;
    let filter = owned_by(&alice);

    assert_eq!(
        titles(&store, &filter, SortField::Title, SortDirection::Asc).await,
        vec!["Zebra", "apple", "mango"]
    );
    assert_eq!(
        titles(&store, &filter, SortField::DueDate, SortDirection::Asc).await,
        vec!["Zebra", "mango", "apple"]
    );
    assert_eq!(
        titles(&store, &filter, SortField::DueDate, SortDirection::Desc).await,
        vec!["apple", "mango", "Zebra"]
    );
    assert_eq!(
        titles(&store, &filter, SortField::Priority, SortDirection::Desc).await,
        vec!["Zebra", "mango", "apple"]
    );
}

#[test_log::test(actix_rt::test)]
async fn test_duplicate_email_is_rejected() {
    let Some(store) = connect().await else { return };
    let email = owner();

    let user = User::new(email.clone(), Some("First".into()), "hash".into());
    store.insert_user(&user).await.unwrap();

    let again = User::new(email.clone(), None, "hash".into());
    match store.insert_user(&again).await {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Email already exists"),
        other => panic!("expected a duplicate-email error, got {:?}", other),
    }

    let found = store.find_user_by_email(&email).await.unwrap().expect("user exists");
    assert_eq!(found.id, user.id);
    assert_eq!(store.list_users(Some(email.as_str())).await.unwrap().len(), 1);
}
