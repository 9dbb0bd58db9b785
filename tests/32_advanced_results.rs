mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{bootcamps, call, get, test_app, MemoryRecords};

// Listing endpoints run through the advanced results middleware against an
// in-memory record source holding five bootcamps.

fn names(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn first_page_uses_default_window() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps")).await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    assert_eq!(body["pagination"], json!({ "next": { "page": 2, "perpage": 3 } }));
    assert_eq!(
        names(&body),
        vec!["Devworks Bootcamp", "ModernTech Bootcamp", "Codemasters"],
        "default sort is createdAt ascending"
    );
    Ok(())
}

#[tokio::test]
async fn last_page_only_links_back() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?page=2")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["pagination"], json!({ "prev": { "page": 1, "perpage": 3 } }));
    Ok(())
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_prev() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?page=4&perpage=2")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"], json!({ "prev": { "page": 3, "perpage": 2 } }));
    Ok(())
}

#[tokio::test]
async fn malformed_page_numbers_fall_back_to_defaults() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?page=abc&perpage=-4")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["pagination"]["next"], json!({ "page": 2, "perpage": 3 }));
    assert!(body["pagination"].get("prev").is_none());
    Ok(())
}

#[tokio::test]
async fn empty_collection_has_no_links() -> Result<()> {
    let app = test_app(MemoryRecords::default())?;
    let (status, body) = call(app, get("/api/v1/bootcamps")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "count": 0, "pagination": {}, "data": [] }));
    Ok(())
}

#[tokio::test]
async fn select_sort_and_career_filter_together() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let uri = "/api/v1/bootcamps?careers%5Bin%5D=Web%20Development&select=name,description&sort=-averageCost";
    let (status, body) = call(app, get(uri)).await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(
        names(&body),
        vec!["ModernTech Bootcamp", "Devworks Bootcamp", "Devcentral Bootcamp"]
    );
    for record in body["data"].as_array().cloned().unwrap_or_default() {
        let mut keys: Vec<&String> = record.as_object().map(|o| o.keys().collect()).unwrap_or_default();
        keys.sort();
        assert_eq!(keys, vec!["description", "id", "name"], "projection leaked fields: {}", record);
    }
    Ok(())
}

#[tokio::test]
async fn range_operators_filter_before_counting() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?averageCost[lte]=9000&perpage=2")).await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["count"], 2);
    assert_eq!(body["pagination"], json!({ "next": { "page": 2, "perpage": 2 } }));
    assert_eq!(names(&body), vec!["Devworks Bootcamp", "Devcentral Bootcamp"]);
    Ok(())
}

#[tokio::test]
async fn plain_equality_filter() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?housing=true&select=name")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Devworks Bootcamp", "Northside Coders"]);
    assert!(body["pagination"].as_object().map(|p| p.is_empty()).unwrap_or(false));
    Ok(())
}

#[tokio::test]
async fn unknown_filter_field_is_rejected() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/bootcamps?colour=blue")).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn unsupported_operator_is_rejected() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, _) = call(app, get("/api/v1/bootcamps?averageCost[ne]=1000")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_select_or_sort_field_is_rejected() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, _) = call(app.clone(), get("/api/v1/bootcamps?select=name,secret")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(app, get("/api/v1/bootcamps?sort=-nope")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn user_listing_requires_a_token() -> Result<()> {
    let app = test_app(MemoryRecords::new(bootcamps()))?;
    let (status, body) = call(app, get("/api/v1/users")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to access this route");
    Ok(())
}
