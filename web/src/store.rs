use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use todo_model::{validate_title, StatusFilter, Todo, TodoDraft, TodoError, TodoPatch};
use tokio::sync::Mutex;
use tracing::info;

/// The record store. Todos live in memory and are flushed to a versioned
/// RON file after every mutation; the in-memory map stays authoritative if
/// a flush fails.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    next_id: AtomicU64,
    todos: Mutex<HashMap<u64, Todo>>,
}

impl Store {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::empty(path));
            }
            Err(err) => eyre::bail!(err),
        };
        let data: DataOwned = ron::de::from_reader(file)?;

        match data {
            DataOwned::V1 { next_id, todos } => Ok(Self {
                path,
                next_id: AtomicU64::new(next_id),
                todos: Mutex::new(todos),
            }),
        }
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            next_id: AtomicU64::new(1),
            todos: Mutex::new(HashMap::new()),
        }
    }

    fn flush(&self, todos: &HashMap<u64, Todo>) -> eyre::Result<()> {
        let data = DataBorrowed::V1 {
            next_id: self.next_id.load(Ordering::Relaxed),
            todos,
        };

        let file = fs::File::create(&self.path)?;
        let mut ron = ron::Serializer::new(file, Some(Default::default()))?;
        data.serialize(&mut ron)?;

        Ok(())
    }

    fn flush_or_log(&self, todos: &HashMap<u64, Todo>) {
        if let Err(err) = self.flush(todos) {
            tracing::error!("Failed to store data: {:?}", err);
        }
    }
}

impl Store {
    pub async fn list(&self, filter: StatusFilter) -> Vec<Todo> {
        let todos = self.todos.lock().await;
        let mut todos: Vec<_> = todos
            .values()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect();

        // newest first, id as the tiebreak for equal timestamps
        todos.sort_unstable_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)).reverse());
        todos
    }

    pub async fn create(&self, draft: TodoDraft) -> Result<Todo, TodoError> {
        validate_title(&draft.title)?;

        let mut todos = self.todos.lock().await;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let todo = Todo::new(id, draft)?;
        todos.insert(id, todo.clone());
        self.flush_or_log(&todos);

        info!(
            id = todo.id,
            title = %todo.title,
            "created todo"
        );

        Ok(todo)
    }

    pub async fn get(&self, id: u64) -> Result<Todo, TodoError> {
        let todos = self.todos.lock().await;
        todos.get(&id).cloned().ok_or(TodoError::NotFound(id))
    }

    pub async fn update(&self, id: u64, patch: TodoPatch) -> Result<Todo, TodoError> {
        let mut todos = self.todos.lock().await;

        let todo = todos.get_mut(&id).ok_or(TodoError::NotFound(id))?;
        todo.apply(patch)?;
        let todo = todo.clone();
        self.flush_or_log(&todos);

        info!(
            id = todo.id,
            title = %todo.title,
            "updated todo"
        );

        Ok(todo)
    }

    pub async fn delete(&self, id: u64) -> Result<(), TodoError> {
        let mut todos = self.todos.lock().await;

        todos.remove(&id).ok_or(TodoError::NotFound(id))?;
        self.flush_or_log(&todos);

        info!(id, "deleted todo");

        Ok(())
    }

    pub async fn toggle(&self, id: u64) -> Result<Todo, TodoError> {
        let mut todos = self.todos.lock().await;

        let todo = todos.get_mut(&id).ok_or(TodoError::NotFound(id))?;
        todo.toggle();
        let todo = todo.clone();
        self.flush_or_log(&todos);

        info!(
            id = todo.id,
            resolved = todo.resolved,
            "toggled todo"
        );

        Ok(todo)
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 {
        next_id: u64,
        todos: &'a HashMap<u64, Todo>,
    },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 {
        next_id: u64,
        todos: HashMap<u64, Todo>,
    },
}

#[cfg(test)]
mod tests {
    use chrono::{Days, Utc};
    use todo_model::ValidationError;

    use super::*;

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn store(dir: &tempfile::TempDir) -> Store {
        Store::load(dir.path().join("todos.ron")).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let first = store.create(draft("first")).await.unwrap();
        let second = store.create(draft("second")).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn create_validates_title() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let err = store.create(draft("")).await.unwrap_err();
        assert_eq!(err, TodoError::Validation(ValidationError::TitleEmpty));

        let err = store.create(draft(&"a".repeat(201))).await.unwrap_err();
        assert_eq!(
            err,
            TodoError::Validation(ValidationError::TitleTooLong(201))
        );

        assert!(store.create(draft(&"a".repeat(200))).await.is_ok());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let first = store.create(draft("first")).await.unwrap();
        let second = store.create(draft("second")).await.unwrap();
        let third = store.create(draft("third")).await.unwrap();
        store.toggle(second.id).await.unwrap();

        let all = store.list(StatusFilter::All).await;
        let ids: Vec<_> = all.iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let active = store.list(StatusFilter::Active).await;
        assert!(active.iter().all(|todo| !todo.resolved));
        assert_eq!(active.len(), 2);

        let resolved = store.list(StatusFilter::Resolved).await;
        assert!(resolved.iter().all(|todo| todo.resolved));
        assert_eq!(resolved.len(), 1);

        assert_eq!(active.len() + resolved.len(), all.len());
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.list(StatusFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn get_update_delete_report_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert_eq!(store.get(42).await.unwrap_err(), TodoError::NotFound(42));
        assert_eq!(
            store.update(42, TodoPatch::default()).await.unwrap_err(),
            TodoError::NotFound(42)
        );
        assert_eq!(store.toggle(42).await.unwrap_err(), TodoError::NotFound(42));
        assert_eq!(store.delete(42).await.unwrap_err(), TodoError::NotFound(42));
    }

    #[tokio::test]
    async fn delete_twice_fails_the_second_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let todo = store.create(draft("doomed")).await.unwrap();
        store.delete(todo.id).await.unwrap();

        assert_eq!(
            store.delete(todo.id).await.unwrap_err(),
            TodoError::NotFound(todo.id)
        );
    }

    #[tokio::test]
    async fn update_bumps_updated_at_but_not_created_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let todo = store.create(draft("original")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let patch = TodoPatch {
            title: Some("renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update(todo.id, patch).await.unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
    }

    #[tokio::test]
    async fn toggle_round_trip_clears_overdue() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let yesterday = Utc::now().date_naive() - Days::new(1);
        let todo = store
            .create(TodoDraft {
                title: "Buy milk".to_string(),
                due_date: Some(yesterday),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(todo.is_overdue());

        let toggled = store.toggle(todo.id).await.unwrap();
        assert!(toggled.resolved);
        assert!(!toggled.is_overdue());

        let toggled = store.toggle(todo.id).await.unwrap();
        assert_eq!(toggled.resolved, todo.resolved);
    }

    #[tokio::test]
    async fn survives_reload_without_reusing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.ron");

        let store = Store::load(&path).unwrap();
        let kept = store.create(draft("kept")).await.unwrap();
        let deleted = store.create(draft("deleted")).await.unwrap();
        store.delete(deleted.id).await.unwrap();
        drop(store);

        let store = Store::load(&path).unwrap();
        let todos = store.list(StatusFilter::All).await;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, kept.id);
        assert_eq!(todos[0].title, "kept");

        let fresh = store.create(draft("fresh")).await.unwrap();
        assert!(fresh.id > deleted.id);
    }
}
