#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt; // for .collect()
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::db::Store;
    use crate::routes;
    use crate::state::AppState;
    use crate::types::{ItemFilter, ItemInput, Status};

    // The NamedTempFile guard must outlive the pool using it.
    async fn setup_test_app() -> (axum::Router, AppState, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());

        let store = Store::connect(&db_url, 5).await.unwrap();
        store.init_schema().await.unwrap();

        let state = AppState::new(store, AppConfig::default());
        let app = routes::router(state.clone());
        (app, state, temp_db)
    }

    async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
        app.clone().oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn post_form(app: &axum::Router, uri: &str, body: &str) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    fn seed(title: &str, description: Option<&str>, status: Status) -> ItemInput {
        ItemInput { title: title.to_string(), description: description.map(str::to_string), status }
    }

    #[tokio::test]
    async fn listing_starts_empty() {
        let (app, _state, _db) = setup_test_app().await;
        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("No items found."));
        assert!(body.contains("All: 0"));
    }

    #[tokio::test]
    async fn create_then_list_shows_item_and_notice() {
        let (app, _state, _db) = setup_test_app().await;

        let response = post_form(&app, "/items/new", "title=Buy+milk&description=&status=todo").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=created");

        let body = body_string(get(&app, "/?notice=created").await).await;
        assert!(body.contains("Item created"));
        assert!(body.contains("Buy milk"));
        assert!(body.contains("All: 1"));
        assert!(body.contains("Todo: 1"));
    }

    #[tokio::test]
    async fn create_with_empty_title_rerenders_form() {
        let (app, state, _db) = setup_test_app().await;

        // '+' decodes to spaces; a whitespace-only title counts as empty
        let response = post_form(&app, "/items/new", "title=+++&description=whatever&status=todo").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Title is required"));

        assert_eq!(state.store.status_counts().await.unwrap().all, 0);
    }

    #[tokio::test]
    async fn create_coerces_unknown_status() {
        let (app, state, _db) = setup_test_app().await;

        let response = post_form(&app, "/items/new", "title=Triage&status=urgent").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let items = state.store.list_items(&ItemFilter::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, Status::Todo);
    }

    #[tokio::test]
    async fn detail_page_shows_record() {
        let (app, state, _db) = setup_test_app().await;
        let id = state
            .store
            .insert_item(&seed("Write docs", Some("user guide"), Status::InProgress))
            .await
            .unwrap();

        let response = get(&app, &format!("/items/{}", id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Write docs"));
        assert!(body.contains("user guide"));
        assert!(body.contains("In progress"));
    }

    #[tokio::test]
    async fn missing_ids_return_not_found() {
        let (app, _state, _db) = setup_test_app().await;
        assert_eq!(get(&app, "/items/999").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/items/999/edit").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            post_form(&app, "/items/999/edit", "title=Valid&status=todo").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(post_form(&app, "/items/999/delete", "").await.status(), StatusCode::NOT_FOUND);

        let body = body_string(get(&app, "/items/999").await).await;
        assert!(body.contains("Item not found"));
    }

    #[tokio::test]
    async fn edit_form_is_prefilled() {
        let (app, state, _db) = setup_test_app().await;
        let id =
            state.store.insert_item(&seed("Old title", Some("old text"), Status::Done)).await.unwrap();

        let body = body_string(get(&app, &format!("/items/{}/edit", id)).await).await;
        assert!(body.contains(r#"value="Old title""#));
        assert!(body.contains("old text"));
        assert!(body.contains(r#"value="done" selected"#));
    }

    #[tokio::test]
    async fn edit_updates_record() {
        let (app, state, _db) = setup_test_app().await;
        let id = state.store.insert_item(&seed("Old title", None, Status::Todo)).await.unwrap();

        let response = post_form(
            &app,
            &format!("/items/{}/edit", id),
            "title=New+title&description=now+with+text&status=in-progress",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=updated");

        let item = state.store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.title, "New title");
        assert_eq!(item.description.as_deref(), Some("now with text"));
        assert_eq!(item.status, Status::InProgress);
    }

    #[tokio::test]
    async fn edit_with_empty_title_keeps_stored_values() {
        let (app, state, _db) = setup_test_app().await;
        let id =
            state.store.insert_item(&seed("Keep me", Some("unchanged"), Status::Todo)).await.unwrap();

        let response =
            post_form(&app, &format!("/items/{}/edit", id), "title=&description=rejected&status=done")
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Title is required"));
        // The form shows what is stored, not the rejected submission
        assert!(body.contains(r#"value="Keep me""#));
        assert!(body.contains("unchanged"));
        assert!(!body.contains("rejected"));

        let item = state.store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.title, "Keep me");
        assert_eq!(item.status, Status::Todo);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (app, state, _db) = setup_test_app().await;
        let id = state.store.insert_item(&seed("Ephemeral", None, Status::Todo)).await.unwrap();

        let response = post_form(&app, &format!("/items/{}/delete", id), "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=deleted");
        assert!(state.store.get_item(id).await.unwrap().is_none());

        let response = post_form(&app, &format!("/items/{}/delete", id), "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_filters_and_echoes_parameters() {
        let (app, state, _db) = setup_test_app().await;
        state.store.insert_item(&seed("Buy milk", None, Status::Todo)).await.unwrap();
        state
            .store
            .insert_item(&seed("Ship release", Some("final milestone"), Status::Done))
            .await
            .unwrap();
        state.store.insert_item(&seed("Clean desk", None, Status::Done)).await.unwrap();

        // Case-insensitive free-text search over title and description
        let body = body_string(get(&app, "/?q=MILK").await).await;
        assert!(body.contains("Buy milk"));
        assert!(!body.contains("Ship release"));
        assert!(body.contains(r#"value="MILK""#));

        // Status filter
        let body = body_string(get(&app, "/?status=done").await).await;
        assert!(body.contains("Ship release"));
        assert!(body.contains("Clean desk"));
        assert!(!body.contains("Buy milk"));

        // Intersection of both, with counts still covering the whole table
        let body = body_string(get(&app, "/?status=done&q=milestone").await).await;
        assert!(body.contains("Ship release"));
        assert!(!body.contains("Clean desk"));
        assert!(body.contains("All: 3"));
        assert!(body.contains("Done: 2"));

        // Unknown status value matches nothing instead of erroring
        let body = body_string(get(&app, "/?status=shipped").await).await;
        assert!(body.contains("No items found."));
    }

    #[tokio::test]
    async fn unknown_notice_is_not_rendered() {
        let (app, _state, _db) = setup_test_app().await;
        let body = body_string(get(&app, "/?notice=bogus").await).await;
        assert!(!body.contains("Item created"));
        assert!(!body.contains("Item updated"));
        assert!(!body.contains("Item deleted"));
    }

    #[tokio::test]
    async fn oversized_form_is_rejected() {
        let (app, _state, _db) = setup_test_app().await;
        let huge = format!("title=Big&description={}", "a".repeat(128 * 1024));
        let response = post_form(&app, "/items/new", &huge).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn full_item_lifecycle() {
        let (app, state, _db) = setup_test_app().await;

        // Create
        let response = post_form(&app, "/items/new", "title=Buy+milk&status=todo").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let body = body_string(get(&app, "/").await).await;
        assert!(body.contains("Buy milk"));
        assert!(body.contains("Todo: 1"));

        let created = state.store.list_items(&ItemFilter::default()).await.unwrap().remove(0);

        // Edit to done
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let response =
            post_form(&app, &format!("/items/{}/edit", created.id), "title=Buy+milk&status=done").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let body = body_string(get(&app, "/?status=done").await).await;
        assert!(body.contains("Buy milk"));
        let body = body_string(get(&app, "/").await).await;
        assert!(body.contains("Todo: 0"));
        assert!(body.contains("Done: 1"));

        let edited = state.store.get_item(created.id).await.unwrap().unwrap();
        assert_eq!(edited.created_at, created.created_at);
        assert!(edited.updated_at > created.updated_at);

        // Delete
        let response = post_form(&app, &format!("/items/{}/delete", created.id), "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let body = body_string(get(&app, "/").await).await;
        assert!(!body.contains("Buy milk"));
        assert!(body.contains("All: 0"));
    }
}
