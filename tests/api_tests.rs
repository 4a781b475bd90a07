//! API integration tests
//!
//! Run against a live server with a reachable database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:4000";

/// Unique suffix so repeated runs do not collide on fixture data
fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Helper to create a book and return its id
async fn create_book(client: &Client, title: &str, author: &str, copies: i32) -> i64 {
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": author,
            "copies": copies
        }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    body["data"]["id"].as_i64().expect("No book ID")
}

async fn get_book(client: &Client, id: i64) -> Value {
    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore]
async fn test_liveness() {
    let client = Client::new();

    let response = client
        .get(BASE_URL)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["version"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_book() {
    let client = Client::new();
    let title = format!("Test Book {}", unique_suffix());

    let book_id = create_book(&client, &title, "Test Author", 3).await;

    let body = get_book(&client, book_id).await;
    assert_eq!(body["data"]["title"], title.as_str());
    assert_eq!(body["data"]["copies"], 3);
    assert_eq!(body["data"]["available"], true);

    // Fetching twice without mutation returns identical data
    let again = get_book(&client, book_id).await;
    assert_eq!(body["data"], again["data"]);
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_title_and_author() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .json(&json!({ "title": "No Author" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_list_books_default_projection() {
    let client = Client::new();
    let title = format!("Projection Book {}", unique_suffix());
    create_book(&client, &title, "Projection Author", 1).await;

    let response = client
        .get(format!("{}/api/books?keyword={}", BASE_URL, title.replace(' ', "+")))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["total"].as_i64().expect("total") >= 1);

    let data = body["data"].as_array().expect("data array");
    assert_eq!(body["count"].as_u64().expect("count") as usize, data.len());
    for book in data {
        assert!(book.get("revision").is_none());
        assert!(book.get("title").is_some());
    }
}

#[tokio::test]
#[ignore]
async fn test_list_books_field_selection() {
    let client = Client::new();
    let title = format!("Fields Book {}", unique_suffix());
    create_book(&client, &title, "Fields Author", 1).await;

    let response = client
        .get(format!(
            "{}/api/books?fields=title,author&limit=5",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    for book in body["data"].as_array().expect("data array") {
        let keys: Vec<&String> = book.as_object().expect("object").keys().collect();
        for key in keys {
            assert!(key == "id" || key == "title" || key == "author");
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_list_books_pagination_clamps() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/books?limit=1000&page=0", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["count"].as_u64().expect("count") <= 100);
}

#[tokio::test]
#[ignore]
async fn test_update_book_recomputes_availability() {
    let client = Client::new();
    let title = format!("Updatable Book {}", unique_suffix());
    let book_id = create_book(&client, &title, "Updatable Author", 2).await;

    let response = client
        .put(format!("{}/api/books/{}", BASE_URL, book_id))
        .json(&json!({ "copies": 0 }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["copies"], 0);
    assert_eq!(body["data"]["available"], false);

    let response = client
        .put(format!("{}/api/books/{}", BASE_URL, book_id))
        .json(&json!({ "copies": 5 }))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["copies"], 5);
    assert_eq!(body["data"]["available"], true);
}

#[tokio::test]
#[ignore]
async fn test_delete_book() {
    let client = Client::new();
    let title = format!("Deletable Book {}", unique_suffix());
    let book_id = create_book(&client, &title, "Deletable Author", 1).await;

    let response = client
        .delete(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_malformed_book_id() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/books/64f1a2b3c4", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_unmatched_route_returns_envelope() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/nothing-here", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_borrow_decrements_copies_until_insufficient() {
    let client = Client::new();
    let title = format!("Dune {}", unique_suffix());
    let book_id = create_book(&client, &title, "Herbert", 3).await;

    // First borrow of 2 succeeds and leaves 1 copy
    let response = client
        .post(format!("{}/api/borrows/{}", BASE_URL, book_id))
        .json(&json!({
            "quantity": 2,
            "dueDate": "2030-06-01",
            "borrowerName": "Paul Atreides"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["borrowerName"], "Paul Atreides");
    assert_eq!(body["data"]["returned"], false);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["data"]["copies"], 1);
    assert_eq!(book["data"]["available"], true);

    // Second borrow of 2 exceeds the remaining copy and is rejected
    let response = client
        .post(format!("{}/api/borrows/{}", BASE_URL, book_id))
        .json(&json!({
            "quantity": 2,
            "dueDate": "2030-06-01",
            "borrowerName": "Chani"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["data"]["copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_validation_leaves_book_untouched() {
    let client = Client::new();
    let title = format!("Untouched Book {}", unique_suffix());
    let book_id = create_book(&client, &title, "Careful Author", 4).await;

    // Missing borrowerName
    let response = client
        .post(format!("{}/api/borrows/{}", BASE_URL, book_id))
        .json(&json!({
            "quantity": 1,
            "dueDate": "2030-06-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["data"]["copies"], 4);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book() {
    let client = Client::new();

    let response = client
        .post(format!("{}/api/borrows/2000000000", BASE_URL))
        .json(&json!({
            "quantity": 1,
            "dueDate": "2030-06-01",
            "borrowerName": "Nobody"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_summary_aggregates_quantities() {
    let client = Client::new();
    let title = format!("Summed Book {}", unique_suffix());
    let book_id = create_book(&client, &title, "Summed Author", 10).await;

    for (quantity, borrower) in [(2, "Duncan"), (3, "Gurney")] {
        let response = client
            .post(format!("{}/api/borrows/{}", BASE_URL, book_id))
            .json(&json!({
                "quantity": quantity,
                "dueDate": "2030-06-01",
                "borrowerName": borrower
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .get(format!("{}/api/borrows/summary", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);

    let row = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .find(|row| row["bookId"].as_i64() == Some(book_id))
        .expect("summary row for book");

    assert_eq!(row["title"], title.as_str());
    assert_eq!(row["totalQuantity"], 5);
}
