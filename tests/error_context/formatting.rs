use signalhub_core::{BoxError, Classify, ErrorKind};
use signalhub_errors::{
    CONNECTIVITY_MESSAGE, OperationError, ServiceError, format_service_error_for_user,
};
use signalhub_executor::{RequestExecutor, RequestOptions};
use std::io;
use std::time::Duration;

#[test]
fn create_failure_gets_generic_message() {
    let err = ServiceError::new(
        "BrandService",
        "create",
        OperationError::create("Failed to create X"),
    );
    assert_eq!(
        err.to_string(),
        "BrandService.create failed: Failed to create X"
    );
    assert_eq!(
        format_service_error_for_user(&err),
        "Unable to create the item. Please try again."
    );
}

#[test]
fn update_and_delete_failures() {
    let update = ServiceError::new(
        "GoalService",
        "update",
        OperationError::update("Failed to update goal"),
    );
    let delete = ServiceError::new(
        "GoalService",
        "delete",
        OperationError::delete("Failed to delete goal"),
    );
    assert_eq!(
        format_service_error_for_user(&update),
        "Unable to update the item. Please try again."
    );
    assert_eq!(
        format_service_error_for_user(&delete),
        "Unable to delete the item. Please try again."
    );
}

#[test]
fn foreign_crud_failures_get_generic_messages() {
    let boxed = ServiceError::new(
        "BrandService",
        "create",
        BoxError::from("Failed to create X"),
    );
    assert_eq!(boxed.kind(), ErrorKind::Create);
    assert_eq!(
        format_service_error_for_user(&boxed),
        "Unable to create the item. Please try again."
    );

    let io_update = ServiceError::new(
        "GoalService",
        "update",
        io::Error::other("Failed to update goal 3"),
    );
    assert_eq!(
        format_service_error_for_user(&io_update),
        "Unable to update the item. Please try again."
    );

    let io_delete = ServiceError::new(
        "GoalService",
        "delete",
        io::Error::other("Failed to delete goal 3"),
    );
    assert_eq!(
        format_service_error_for_user(&io_delete),
        "Unable to delete the item. Please try again."
    );
}

#[test]
fn unrecognized_errors_pass_through() {
    let err = ServiceError::new(
        "CompetitorService",
        "list",
        OperationError::new(ErrorKind::Other, "quota exceeded for workspace"),
    );
    assert_eq!(
        format_service_error_for_user(&err),
        "quota exceeded for workspace"
    );
}

#[tokio::test]
async fn unreachable_backend_reads_as_connectivity() {
    let executor = RequestExecutor::builder()
        .max_retries(1)
        .timeout(Duration::from_secs(2))
        .build();
    let request_error = executor
        .execute::<serde_json::Value>("http://127.0.0.1:1/", RequestOptions::get(), "down")
        .await
        .unwrap_err();

    let err = ServiceError::new("AssistantService", "list", request_error);
    assert_eq!(format_service_error_for_user(&err), CONNECTIVITY_MESSAGE);
}
