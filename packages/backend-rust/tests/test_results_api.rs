use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get as get_route;
use axum::{Json, Router};
use serde_json::json;

mod common;

use common::{delete, get, json_body, post_json, send, TEST_SECRET};
use neuroai_backend::config::Config;

async fn attempt(
    app: &Router,
    token: &str,
    letter: &str,
    word: &str,
    accuracy: f64,
) -> serde_json::Value {
    let body = json!({
        "letter": letter,
        "word": word,
        "pronunciation": "/x/",
        "accuracy": accuracy,
    });
    let response = send(app, post_json("/api/test/attempt", Some(token), body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

async fn analyze(app: &Router, body: serde_json::Value) -> serde_json::Value {
    json_body(send(app, post_json("/api/test/analyze", None, body)).await).await
}

/// Stand-in phoneme service: S has a word, Q is unknown, X answers with
/// plain text and anything else fails.
async fn upstream_word(Path(letter): Path<String>) -> Response {
    match letter.as_str() {
        "S" => Json(json!({
            "letter": "S",
            "word1": "sailboat",
            "pronunciation": "ˈseɪl.boʊt",
            "image_link": "https://example.org/sailboat.png",
        }))
        .into_response(),
        "Q" => (StatusCode::NOT_FOUND, "no word").into_response(),
        "X" => "not json".into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_phoneme_service() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = Router::new().route("/test/:letter", get_route(upstream_word));
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn test_word_for_letter_from_catalog() {
    let app = common::create_test_app().await;

    let body = json_body(send(&app, get("/api/test/word/s", None)).await).await;
    assert_eq!(body["data"]["letter"], "S");
    assert_eq!(body["data"]["word1"], "sunday");
    assert!(body["data"]["image_link"].as_str().unwrap().starts_with("https://"));

    let unknown = send(&app, get("/api/test/word/q", None)).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let letters = json_body(send(&app, get("/api/test/letters", None)).await).await;
    assert_eq!(letters["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_word_for_letter_from_phoneme_service() {
    let base_url = spawn_phoneme_service().await;
    let app = common::create_test_app_with(Config {
        phoneme_api_url: Some(base_url),
        ..Config::in_memory(TEST_SECRET)
    })
    .await;

    let found = send(&app, get("/api/test/word/s", None)).await;
    assert_eq!(found.status(), StatusCode::OK);
    let body = json_body(found).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["word1"], "sailboat");
    assert_eq!(body["data"]["image_link"], "https://example.org/sailboat.png");

    let unknown = send(&app, get("/api/test/word/q", None)).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let body = json_body(unknown).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "No example found for letter Q");

    for letter in ["e", "x"] {
        let failed = send(&app, get(&format!("/api/test/word/{letter}"), None)).await;
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(failed).await;
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"], "Failed to fetch word for letter");
    }
}

#[tokio::test]
async fn test_analyze_scores_transcript() {
    let app = common::create_test_app().await;

    let body = analyze(&app, json!({ "letter": "s", "transcript": "sun is out" })).await;
    assert_eq!(body["data"]["word"], "sunday");
    assert_eq!(body["data"]["percentage"], 70);
    assert_eq!(body["data"]["remedy"].as_array().unwrap().len(), 0);

    let exact = analyze(&app, json!({ "letter": "B", "transcript": "Boat." })).await;
    assert_eq!(exact["data"]["percentage"], 100);

    let miss = analyze(&app, json!({ "letter": "S", "transcript": "xyz" })).await;
    assert_eq!(miss["data"]["percentage"], 0);
    assert!(!miss["data"]["remedy"].as_array().unwrap().is_empty());

    let custom = analyze(&app, json!({ "letter": "V", "word": "van", "transcript": "van" })).await;
    assert_eq!(custom["data"]["percentage"], 100);

    let missing = send(&app, post_json("/api/test/analyze", None, json!({ "letter": "S" }))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_defaults_to_empty_shape() {
    let app = common::create_test_app().await;
    let token = common::token_for("learner-1");

    let body = json_body(send(&app, get("/api/test/progress/z", Some(&token))).await).await;
    assert_eq!(body["data"]["letter"], "Z");
    assert_eq!(body["data"]["attempts"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["averageAccuracy"], 0);
    assert_eq!(body["data"]["completed"], false);
}

#[tokio::test]
async fn test_attempts_accumulate_per_letter() {
    let app = common::create_test_app().await;
    let token = common::token_for("learner-1");

    attempt(&app, &token, "f", "free", 40.0).await;
    attempt(&app, &token, "F", "ignored", 60.0).await;
    let body = attempt(&app, &token, "F", "free", 80.0).await;

    let result = &body["data"];
    assert_eq!(result["letter"], "F");
    assert_eq!(result["word"], "free");
    assert_eq!(result["averageAccuracy"], 60);
    assert_eq!(result["completed"], true);
    assert_eq!(result["attempts"][2]["attemptNumber"], 3);

    let progress = json_body(send(&app, get("/api/test/progress/f", Some(&token))).await).await;
    assert_eq!(progress["data"]["_id"], result["_id"]);

    // another learner's records stay separate
    let other = common::token_for("learner-2");
    let theirs = json_body(send(&app, get("/api/test/progress/F", Some(&other))).await).await;
    assert_eq!(theirs["data"]["attempts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_attempt_validation() {
    let app = common::create_test_app().await;
    let token = common::token_for("learner-1");

    let missing = send(
        &app,
        post_json(
            "/api/test/attempt",
            Some(&token),
            json!({ "letter": "S", "word": "sunday", "pronunciation": "/s/" }),
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let out_of_range = send(
        &app,
        post_json(
            "/api/test/attempt",
            Some(&token),
            json!({ "letter": "S", "word": "sunday", "pronunciation": "/s/", "accuracy": 140 }),
        ),
    )
    .await;
    assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);

    let numeric_string = send(
        &app,
        post_json(
            "/api/test/attempt",
            Some(&token),
            json!({ "letter": "S", "word": "sunday", "pronunciation": "/s/", "accuracy": "75" }),
        ),
    )
    .await;
    assert_eq!(numeric_string.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_reset_and_list() {
    let app = common::create_test_app().await;
    let token = common::token_for("learner-1");

    let missing = send(&app, delete("/api/test/reset/s", Some(&token))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    attempt(&app, &token, "S", "sunday", 90.0).await;
    attempt(&app, &token, "L", "love", 70.0).await;

    let all = json_body(send(&app, get("/api/test/all", Some(&token))).await).await;
    assert_eq!(all["count"], 2);
    assert_eq!(all["data"][0]["letter"], "L");
    assert_eq!(all["data"][1]["letter"], "S");

    let reset = json_body(send(&app, delete("/api/test/reset/s", Some(&token))).await).await;
    assert_eq!(reset["data"]["attempts"].as_array().unwrap().len(), 0);
    assert_eq!(reset["data"]["averageAccuracy"], 0);
    assert_eq!(reset["data"]["word"], "sunday");
}

#[tokio::test]
async fn test_statistics() {
    let app = common::create_test_app().await;
    let token = common::token_for("learner-1");

    for _ in 0..3 {
        attempt(&app, &token, "L", "love", 90.0).await;
    }
    attempt(&app, &token, "S", "sunday", 20.0).await;
    attempt(&app, &token, "S", "sunday", 30.0).await;

    let body = json_body(send(&app, get("/api/test/statistics", Some(&token))).await).await;
    let stats = &body["data"];
    assert_eq!(stats["totalTests"], 2);
    assert_eq!(stats["completedTests"], 1);
    assert_eq!(stats["inProgressTests"], 1);
    assert_eq!(stats["totalAttempts"], 5);
    assert_eq!(stats["averageOverallAccuracy"], 57.5);
    assert_eq!(stats["bestLetter"]["letter"], "L");
    assert_eq!(stats["worstLetter"]["letter"], "S");
    assert_eq!(stats["letterProgress"]["S"]["attempts"], 2);
}

#[tokio::test]
async fn test_recommendations() {
    let app = common::create_test_app().await;
    common::seed_courses(&app).await;
    let token = common::token_for("learner-1");

    let empty = json_body(send(&app, get("/api/test/recommendations", Some(&token))).await).await;
    assert!(empty["data"]["message"].is_string());
    assert_eq!(empty["data"]["recommendedCourses"].as_array().unwrap().len(), 0);

    for _ in 0..3 {
        attempt(&app, &token, "L", "love", 90.0).await;
    }
    attempt(&app, &token, "S", "sunday", 20.0).await;
    attempt(&app, &token, "S", "sunday", 30.0).await;

    let body = json_body(send(&app, get("/api/test/recommendations", Some(&token))).await).await;
    let recs = &body["data"];

    let weak = recs["keyAreasForImprovement"].as_array().unwrap();
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0]["letter"], "S");
    assert_eq!(weak[0]["priority"], "high");

    let courses = recs["recommendedCourses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["phoneme2"], "Sh");
    assert_eq!(courses[0]["score"], 130);

    assert_eq!(recs["overallProgress"], 58);
    assert_eq!(recs["strengthAreas"][0]["letter"], "L");
    assert_eq!(recs["strengthAreas"][0]["word"], "love");
    assert_eq!(recs["improvingAreas"][0]["letter"], "S");
    assert_eq!(recs["improvingAreas"][0]["word"], "sunday");
    assert!(recs.get("message").is_none());
}
