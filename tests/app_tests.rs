//! End-to-end tests over the HTTP surface, with the search client in offline mode.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use movieshelf::{AppState, config::Config, csrf, models::NewMovie};
use tower::ServiceExt;

async fn spawn_app() -> (Arc<AppState>, Router) {
    let config = Config { database_url: "sqlite::memory:".to_string(), ..Config::default() };

    let state = movieshelf::build_state(config).await.expect("failed to build app state");
    let router = movieshelf::router(state.clone());
    (state, router)
}

fn movie(id: i32, title: &str, rating: f64) -> NewMovie {
    NewMovie {
        id: Some(id),
        title: title.to_string(),
        year: 2001,
        description: format!("About {title}."),
        rating,
        ranking: 0,
        review: "Solid.".to_string(),
        img_url: String::new(),
    }
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn edit_form(state: &AppState, rating: &str, review: &str) -> String {
    let token = state.csrf.issue(csrf::EDIT_FORM);
    format!("new_rating={rating}&new_review={review}&csrf_token={token}")
}

fn add_form(state: &AppState, title: &str) -> String {
    format!("title={title}&csrf_token={}", state.csrf.issue(csrf::ADD_FORM))
}

/// Pulls the hidden form token out of a rendered page.
fn hidden_token(body: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = body.find(marker).expect("form has a token field") + marker.len();
    let end = body[start..].find('"').unwrap();
    body[start..start + end].to_string()
}

fn location(response: &axum::response::Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn listing_ranks_highest_rating_first() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Low", 3.0)).await.unwrap();
    state.store.insert(movie(2, "High", 9.5)).await.unwrap();
    state.store.insert(movie(3, "Middle", 6.0)).await.unwrap();

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    let high = body.find("High").unwrap();
    let middle = body.find("Middle").unwrap();
    let low = body.find("Low").unwrap();
    assert!(high < middle && middle < low);

    assert_eq!(state.store.get(2).await.unwrap().unwrap().ranking, 1);
    assert_eq!(state.store.get(3).await.unwrap().unwrap().ranking, 2);
    assert_eq!(state.store.get(1).await.unwrap().unwrap().ranking, 3);
}

#[tokio::test]
async fn edit_updates_rating_review_and_rank() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Drive", 5.0)).await.unwrap();
    state.store.insert(movie(2, "Heat", 7.0)).await.unwrap();
    get(&app, "/").await;
    assert_eq!(state.store.get(1).await.unwrap().unwrap().ranking, 2);

    let response = post_form(&app, "/edit?movie_id=1", &edit_form(&state, "8.2", "Great")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let body = body_text(get(&app, "/").await).await;
    assert!(body.contains("8.2"));
    assert!(body.contains("Great"));

    let drive = state.store.get(1).await.unwrap().unwrap();
    assert_eq!(drive.rating, 8.2);
    assert_eq!(drive.review, "Great");
    assert_eq!(drive.ranking, 1);
}

#[tokio::test]
async fn edit_with_empty_review_changes_nothing() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Drive", 5.0)).await.unwrap();

    let response = post_form(&app, "/edit?movie_id=1", &edit_form(&state, "9", "")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_text(response).await;
    assert!(body.contains("<form"));
    assert!(body.contains("This field is required."));

    let drive = state.store.get(1).await.unwrap().unwrap();
    assert_eq!(drive.rating, 5.0);
    assert_eq!(drive.review, "Solid.");
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(4, "Ronin", 6.5)).await.unwrap();

    let response = get(&app, "/edit?movie_id=4").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Ronin"));
    assert!(body.contains("value=\"6.5\""));
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let (state, app) = spawn_app().await;

    assert_eq!(get(&app, "/edit?movie_id=42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        post_form(&app, "/edit?movie_id=42", &edit_form(&state, "1", "x")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(get(&app, "/delete?movie_id=42").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_one_movie_and_reranks() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "One", 1.0)).await.unwrap();
    state.store.insert(movie(2, "Two", 5.0)).await.unwrap();
    state.store.insert(movie(3, "Three", 9.0)).await.unwrap();

    let response = get(&app, "/delete?movie_id=3").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    assert!(state.store.get(3).await.unwrap().is_none());
    assert_eq!(state.store.list_all().await.unwrap().len(), 2);

    get(&app, "/").await;
    assert_eq!(state.store.get(2).await.unwrap().unwrap().ranking, 1);
    assert_eq!(state.store.get(1).await.unwrap().unwrap().ranking, 2);
}

#[tokio::test]
async fn add_pipeline_inserts_selected_movie() {
    let (state, app) = spawn_app().await;

    let response = post_form(&app, "/add", &add_form(&state, "Inception")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/find?id=27205"));

    let response = get(&app, "/find?id=27205").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/edit?movie_id=27205");

    let all = state.store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);

    let inception = &all[0];
    assert_eq!(inception.id, 27205);
    assert_eq!(inception.title, "Inception");
    assert_eq!(inception.year, 2010);
    assert_eq!(inception.rating, 7.3);
    assert_eq!(inception.ranking, 10);
    assert_eq!(inception.review, "My favourite character was the caller.");
    assert!(inception.img_url.starts_with("https://image.tmdb.org/t/p/w500/"));
}

#[tokio::test]
async fn adding_the_same_movie_twice_conflicts() {
    let (state, app) = spawn_app().await;

    assert_eq!(get(&app, "/find?id=550").await.status(), StatusCode::SEE_OTHER);
    assert_eq!(get(&app, "/find?id=550").await.status(), StatusCode::CONFLICT);
    assert_eq!(state.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_with_blank_title_redisplays_form() {
    let (state, app) = spawn_app().await;

    let response = post_form(&app, "/add", &add_form(&state, "+")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("This field is required."));
}

#[tokio::test]
async fn unknown_external_id_is_a_bad_gateway() {
    let (state, app) = spawn_app().await;

    assert_eq!(get(&app, "/find?id=1").await.status(), StatusCode::BAD_GATEWAY);
    assert!(state.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn select_redirects_to_add() {
    let (_, app) = spawn_app().await;

    let response = get(&app, "/select").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/add");
    assert_eq!(get(&app, "/add").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn rendered_token_is_accepted() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Drive", 5.0)).await.unwrap();

    let token = hidden_token(&body_text(get(&app, "/edit?movie_id=1").await).await);
    let form = format!("new_rating=7.5&new_review=Tense&csrf_token={token}");
    let response = post_form(&app, "/edit?movie_id=1", &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.store.get(1).await.unwrap().unwrap().rating, 7.5);

    let token = hidden_token(&body_text(get(&app, "/add").await).await);
    let response = post_form(&app, "/add", &format!("title=Fight&csrf_token={token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/find?id=550"));
}

#[tokio::test]
async fn edit_without_valid_token_changes_nothing() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Drive", 5.0)).await.unwrap();

    let response = post_form(&app, "/edit?movie_id=1", "new_rating=9&new_review=Great").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("The CSRF token is missing."));
    assert!(!hidden_token(&body).is_empty());

    let forged = "new_rating=9&new_review=Great&csrf_token=1.AAAA.AAAA";
    let response = post_form(&app, "/edit?movie_id=1", forged).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("The CSRF token is invalid."));

    let drive = state.store.get(1).await.unwrap().unwrap();
    assert_eq!(drive.rating, 5.0);
    assert_eq!(drive.review, "Solid.");
}

#[tokio::test]
async fn add_with_token_for_another_form_does_not_search() {
    let (state, app) = spawn_app().await;

    let wrong_form =
        format!("title=Inception&csrf_token={}", state.csrf.issue(csrf::EDIT_FORM));
    let response = post_form(&app, "/add", &wrong_form).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_text(response).await;
    assert!(body.contains("The CSRF token is invalid."));
    assert!(!body.contains("/find?id=27205"));
}

#[tokio::test]
async fn equal_ratings_rank_larger_id_first() {
    let (state, app) = spawn_app().await;
    state.store.insert(movie(1, "Older", 7.0)).await.unwrap();
    state.store.insert(movie(2, "Newer", 7.0)).await.unwrap();

    let body = body_text(get(&app, "/").await).await;
    assert!(body.find("Newer").unwrap() < body.find("Older").unwrap());

    assert_eq!(state.store.get(2).await.unwrap().unwrap().ranking, 1);
    assert_eq!(state.store.get(1).await.unwrap().unwrap().ranking, 2);
}
