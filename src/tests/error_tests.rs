#[cfg(test)]
mod tests {
    use crate::error::{AppError, AppResult, OptionExt};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn error_display_is_stable() {
        let error = AppError::NotFound("Resource not found".to_string());
        assert_eq!(format!("{}", error), "Not found: Resource not found");

        let error = AppError::Database("connection reset".to_string());
        assert_eq!(format!("{}", error), "Database error: connection reset");

        let error = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(format!("{}", error), "Internal error: boom");
    }

    #[test]
    fn errors_map_to_status_codes() {
        let response = AppError::NotFound("Item not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Database("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sqlx_errors_are_wrapped() {
        let app_error: AppError = sqlx::Error::RowNotFound.into();
        match app_error {
            AppError::NotFound(msg) => assert_eq!(msg, "Record not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let app_error: AppError = sqlx::Error::PoolTimedOut.into();
        match app_error {
            AppError::Database(msg) => assert!(msg.contains("pool timed out")),
            other => panic!("Expected Database, got {:?}", other),
        }
    }

    #[test]
    fn anyhow_errors_become_internal() {
        fn fails() -> AppResult<()> {
            Err(anyhow::anyhow!("background job choked"))?;
            Ok(())
        }

        match fails().unwrap_err() {
            AppError::Internal(e) => assert_eq!(e.to_string(), "background job choked"),
            other => panic!("Expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn option_ext_maps_none_to_not_found() {
        let some_value: Option<i32> = Some(42);
        let result: AppResult<i32> = some_value.ok_or_not_found("Item");
        assert_eq!(result.unwrap(), 42);

        let none_value: Option<i32> = None;
        let result: AppResult<i32> = none_value.ok_or_not_found("Item");
        match result.unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Item not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
