//! Integration tests for the HTTP surface.
//!
//! Drives the full router with `tower::ServiceExt::oneshot`, so every
//! request goes through routing, extraction, the store, and error
//! mapping exactly as in production.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use supportdesk_core::types::{Status, UserId};
use supportdesk_core::TicketStore;
use supportdesk_realtime::{OpenGateway, RoomBus};
use supportdesk_testing::test_clock;
use supportdesk_web::{build_router, AppState};
use tower::ServiceExt;

fn test_app() -> (Router, Arc<TicketStore>) {
    let bus = RoomBus::new();
    let store = Arc::new(TicketStore::new(
        Arc::new(test_clock()),
        Arc::new(bus.clone()),
    ));
    let state = AppState::new(Arc::clone(&store), bus, Arc::new(OpenGateway));
    (build_router(state), store)
}

fn create_request(subject: &str, requester: UserId) -> Request<Body> {
    let body = json!({
        "subject": subject,
        "category": "product_quality",
        "order": uuid::Uuid::new_v4(),
        "requester": requester,
        "body": "The food arrived cold",
    });
    Request::builder()
        .method("POST")
        .uri("/api/tickets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_then_get_round_trips_through_the_api() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(create_request("Order arrived cold", UserId::new()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let ticket = json_body(response).await;
    assert_eq!(ticket["status"], "open");
    let id = ticket["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/tickets/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response).await;
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_subject_is_rejected_with_400() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(create_request("   ", UserId::new()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_ticket_returns_404() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/tickets/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn status_change_returns_the_badge_delta() {
    let (app, store) = test_app();
    let ticket = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/tickets/{}/status", ticket.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "resolved"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let change = json_body(response).await;
    assert_eq!(change["old_status"], "open");
    assert_eq!(change["new_status"], "resolved");
    assert_eq!(change["delta"], -1);
}

#[tokio::test]
async fn malformed_enum_values_are_bad_requests_not_422() {
    let (app, store) = test_app();
    let ticket = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();

    // Unknown status value on a status change
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/tickets/{}/status", ticket.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "bogus"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");

    // Unknown category on creation
    let create = json!({
        "subject": "Wrong pizza",
        "category": "not_a_category",
        "order": uuid::Uuid::new_v4(),
        "requester": uuid::Uuid::new_v4(),
        "body": "I ordered margherita",
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tickets")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_list_reports_the_store_open_count() {
    let (app, store) = test_app();
    let first = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();
    store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();
    store
        .set_status(first.id, Status::Resolved, None)
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tickets?scope=admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(body["open_count"], 1);
}

#[tokio::test]
async fn user_scope_filters_to_the_requester() {
    let (app, store) = test_app();
    let requester = UserId::new();
    store
        .create_ticket(supportdesk_testing::fixtures::complaint_from(requester))
        .await
        .unwrap();
    store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/tickets?scope=user&user={requester}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);

    // scope=user without a user parameter is a bad request
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tickets?scope=user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messages_to_closed_tickets_conflict() {
    let (app, store) = test_app();
    let ticket = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();
    store
        .set_status(ticket.id, Status::Closed, None)
        .await
        .unwrap();

    let response = app
        .oneshot(multipart_message_request(
            &ticket.id.to_string(),
            "any update?",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn multipart_message_appends_to_the_thread() {
    let (app, store) = test_app();
    let ticket = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();

    let response = app
        .oneshot(multipart_message_request(
            &ticket.id.to_string(),
            "Here is a photo of the order",
            Some(("photo.jpg", vec![0xFF; 128])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let message = json_body(response).await;
    assert_eq!(message["attachment"], "photo.jpg");

    let fetched = store.get(ticket.id).await.unwrap();
    assert_eq!(fetched.messages.len(), 2);
}

#[tokio::test]
async fn oversized_attachments_are_rejected() {
    let bus = RoomBus::new();
    let store = Arc::new(TicketStore::new(
        Arc::new(test_clock()),
        Arc::new(bus.clone()),
    ));
    // Shrink the cap so the test does not allocate megabytes
    let state = AppState::new(Arc::clone(&store), bus, Arc::new(OpenGateway))
        .with_max_attachment_bytes(1024);
    let app = build_router(state);

    let ticket = store
        .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
        .await
        .unwrap();

    let response = app
        .oneshot(multipart_message_request(
            &ticket.id.to_string(),
            "photo attached",
            Some(("huge.jpg", vec![0u8; 2048])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ATTACHMENT_TOO_LARGE");

    // The rejected message must not have been committed
    let fetched = store.get(ticket.id).await.unwrap();
    assert_eq!(fetched.messages.len(), 1);
}

fn multipart_message_request(
    ticket_id: &str,
    body_text: &str,
    attachment: Option<(&str, Vec<u8>)>,
) -> Request<Body> {
    const BOUNDARY: &str = "supportdesk-test-boundary";

    let mut payload = Vec::new();
    payload.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"body\"\r\n\r\n{body_text}\r\n"
        )
        .as_bytes(),
    );
    if let Some((file_name, bytes)) = attachment {
        payload.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachment\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        payload.extend_from_slice(&bytes);
        payload.extend_from_slice(b"\r\n");
    }
    payload.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/api/tickets/{ticket_id}/messages"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(payload))
        .unwrap()
}
