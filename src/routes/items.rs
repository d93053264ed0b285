use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::Markup;

use crate::{
    error::{AppError, AppResult, OptionExt},
    render::{self, FormView, ListingView},
    state::AppState,
    types::{ItemForm, ListParams, Notice},
};

/// GET `/` - all items, optionally narrowed by free-text search and status.
///
/// The per-status counts are always computed over the unfiltered table so
/// the header numbers do not change while filtering.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Markup> {
    let filter = params.filter();
    let items = state.store.list_items(&filter).await?;
    let counts = state.store.status_counts().await?;
    let view = ListingView {
        items,
        counts,
        query: filter.q,
        status_filter: filter.status,
        notice: params.notice(),
    };
    Ok(render::listing_page(&view))
}

/// GET `/items/new`
pub async fn new_item_form() -> Markup {
    render::item_form_page(&FormView::blank())
}

/// POST `/items/new`
pub async fn create_item(
    State(state): State<AppState>,
    Form(form): Form<ItemForm>,
) -> AppResult<Response> {
    match form.normalize() {
        Ok(input) => {
            let id = state.store.insert_item(&input).await?;
            tracing::info!("Created item {}", id);
            Ok(see_listing(Notice::Created))
        }
        // Plain 200 with the form again; the submission is discarded
        Err(err) => Ok(render::item_form_page(&FormView::blank().with_error(err)).into_response()),
    }
}

/// GET `/items/{id}`
pub async fn show_item(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Markup> {
    let item = state.store.get_item(id).await?.ok_or_not_found("Item")?;
    Ok(render::show_page(&item))
}

/// GET `/items/{id}/edit`
pub async fn edit_item_form(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Markup> {
    let item = state.store.get_item(id).await?.ok_or_not_found("Item")?;
    Ok(render::item_form_page(&FormView::for_item(&item)))
}

/// POST `/items/{id}/edit`
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> AppResult<Response> {
    match form.normalize() {
        Ok(input) => {
            if !state.store.update_item(id, &input).await? {
                return Err(AppError::NotFound("Item not found".to_string()));
            }
            Ok(see_listing(Notice::Updated))
        }
        Err(err) => {
            // Re-render with the stored values, not the rejected submission
            let item = state.store.get_item(id).await?.ok_or_not_found("Item")?;
            Ok(render::item_form_page(&FormView::for_item(&item).with_error(err)).into_response())
        }
    }
}

/// POST `/items/{id}/delete`
pub async fn delete_item(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Response> {
    if !state.store.delete_item(id).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }
    tracing::info!("Deleted item {}", id);
    Ok(see_listing(Notice::Deleted))
}

/// 303 redirect to the listing, carrying the one-shot notice in the query.
fn see_listing(notice: Notice) -> Response {
    Redirect::to(&format!("/?notice={}", notice.as_str())).into_response()
}
