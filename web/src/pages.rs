use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use todo_model::{StatusFilter, Todo, TodoPatch};

use crate::{
    error::PageError,
    forms::{FormErrors, TodoForm, TODO_FIELDS},
    store::Store,
    templates,
};

pub fn router() -> Router<Arc<Store>> {
    Router::new()
        .route("/", get(todo_list))
        .route("/create/", get(todo_create).post(todo_create_submit))
        .route("/:id/edit/", get(todo_edit).post(todo_edit_submit))
        .route("/:id/delete/", get(todo_delete).post(todo_delete_submit))
        .route("/:id/toggle/", get(todo_toggle))
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<String>,
}

/// What the list template sees for one todo: the stored fields plus the
/// derived overdue flag, evaluated against a single "today" per request.
#[derive(Serialize)]
struct TodoRow {
    id: u64,
    title: String,
    description: String,
    due_date: Option<NaiveDate>,
    resolved: bool,
    overdue: bool,
}

impl TodoRow {
    fn new(todo: Todo, today: NaiveDate) -> Self {
        let overdue = todo.is_overdue_on(today);

        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            due_date: todo.due_date,
            resolved: todo.resolved,
            overdue,
        }
    }
}

async fn todo_list(
    State(store): State<Arc<Store>>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, PageError> {
    let filter = StatusFilter::from_query(query.status.as_deref());
    let todos = store.list(filter).await;

    let today = Utc::now().date_naive();
    let rows: Vec<_> = todos
        .into_iter()
        .map(|todo| TodoRow::new(todo, today))
        .collect();

    let mut context = tera::Context::new();
    context.insert("todos", &rows);
    context.insert("filter", filter.as_str());
    Ok(templates::render("todo_list.html", &context)?)
}

fn form_page(editing: bool, form: &TodoForm, errors: &FormErrors) -> Result<Html<String>, PageError> {
    let mut context = tera::Context::new();
    context.insert("fields", &TODO_FIELDS);
    context.insert("values", &form.values());
    context.insert("errors", errors);
    context.insert("editing", &editing);
    Ok(templates::render("todo_form.html", &context)?)
}

async fn todo_create() -> Result<Html<String>, PageError> {
    form_page(false, &TodoForm::default(), &FormErrors::none())
}

async fn todo_create_submit(
    State(store): State<Arc<Store>>,
    Form(form): Form<TodoForm>,
) -> Result<Response, PageError> {
    match form.parse() {
        Ok(draft) => {
            store.create(draft).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => Ok(form_page(false, &form, &errors)?.into_response()),
    }
}

async fn todo_edit(
    State(store): State<Arc<Store>>,
    Path(id): Path<u64>,
) -> Result<Html<String>, PageError> {
    let todo = store.get(id).await?;
    form_page(true, &TodoForm::from_todo(&todo), &FormErrors::none())
}

async fn todo_edit_submit(
    State(store): State<Arc<Store>>,
    Path(id): Path<u64>,
    Form(form): Form<TodoForm>,
) -> Result<Response, PageError> {
    // missing ids 404 even when the submission is invalid
    store.get(id).await?;

    match form.parse() {
        Ok(draft) => {
            let patch = TodoPatch {
                title: Some(draft.title),
                description: Some(draft.description),
                due_date: Some(draft.due_date),
                resolved: Some(draft.resolved),
            };
            store.update(id, patch).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => Ok(form_page(true, &form, &errors)?.into_response()),
    }
}

async fn todo_delete(
    State(store): State<Arc<Store>>,
    Path(id): Path<u64>,
) -> Result<Html<String>, PageError> {
    let todo = store.get(id).await?;

    let mut context = tera::Context::new();
    context.insert("todo", &todo);
    Ok(templates::render("todo_confirm_delete.html", &context)?)
}

async fn todo_delete_submit(
    State(store): State<Arc<Store>>,
    Path(id): Path<u64>,
) -> Result<Redirect, PageError> {
    store.delete(id).await?;
    Ok(Redirect::to("/"))
}

async fn todo_toggle(
    State(store): State<Arc<Store>>,
    Path(id): Path<u64>,
) -> Result<Redirect, PageError> {
    store.toggle(id).await?;
    Ok(Redirect::to("/"))
}
