use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, breed, Breed, CatImage, Fixture, FixtureImage, API_KEY};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("host", "cats.test")
        .header("x-api-key", API_KEY)
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_is_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/v1/breeds").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/breeds/abys")
                .header("x-api-key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- breeds ---

#[tokio::test]
async fn list_breeds_returns_fixture() {
    let resp = app().oneshot(authed("/v1/breeds")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let breeds: Vec<Breed> = body_json(resp).await;
    let ids: Vec<_> = breeds.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["abys", "beng"]);
}

#[tokio::test]
async fn list_breeds_uses_snake_case() {
    let resp = app().oneshot(authed("/v1/breeds")).await.unwrap();
    let raw: serde_json::Value = body_json(resp).await;
    assert_eq!(raw[0]["life_span"], "12 - 15");
    assert!(raw[0].get("lifeSpan").is_none());
}

#[tokio::test]
async fn get_breed_found() {
    let resp = app().oneshot(authed("/v1/breeds/beng")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let breed: Breed = body_json(resp).await;
    assert_eq!(breed.name, "Bengal");
}

#[tokio::test]
async fn get_breed_not_found() {
    let resp = app().oneshot(authed("/v1/breeds/sphy")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- image search ---

#[tokio::test]
async fn search_filters_by_breed() {
    let resp = app()
        .oneshot(authed("/v1/images/search?breed_ids=abys&limit=8"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let images: Vec<CatImage> = body_json(resp).await;
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, "0XYvRd7oD");
    assert_eq!(images[0].url, "http://cats.test/images/0XYvRd7oD.png");
    assert_eq!(images[0].breeds[0].id, "abys");
}

#[tokio::test]
async fn search_respects_limit() {
    let fixture = Fixture {
        breeds: vec![breed("abys", "Abyssinian", "Egypt", "Active")],
        images: (0..5)
            .map(|i| FixtureImage {
                id: format!("img{i}"),
                breed_id: "abys".to_string(),
                width: 2,
                height: 2,
            })
            .collect(),
    };
    let resp = app_with(fixture)
        .oneshot(authed("/v1/images/search?breed_ids=abys&limit=3"))
        .await
        .unwrap();
    let images: Vec<CatImage> = body_json(resp).await;
    assert_eq!(images.len(), 3);
}

#[tokio::test]
async fn search_unknown_breed_is_empty() {
    let resp = app()
        .oneshot(authed("/v1/images/search?breed_ids=sphy&limit=8"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let images: Vec<CatImage> = body_json(resp).await;
    assert!(images.is_empty());
}

#[tokio::test]
async fn search_bad_limit_is_400() {
    let resp = app()
        .oneshot(authed("/v1/images/search?breed_ids=abys&limit=many"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- image bytes ---

#[tokio::test]
async fn image_bytes_are_png_without_api_key() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/images/0XYvRd7oD.png")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/png");

    let body = body_bytes(resp).await;
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn unknown_image_is_404() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/images/nope.png")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
