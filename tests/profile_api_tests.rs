
use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};
use test_utils::{gif_bytes, png_bytes, profile, TestApp};

fn image_form(profile: &Value, file_name: &str, mime: &str, bytes: Vec<u8>) -> multipart::Form {
    let profile_part = multipart::Part::text(profile.to_string())
        .mime_str("application/json")
        .unwrap();
    let image_part = multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap();

    multipart::Form::new()
        .part("profile", profile_part)
        .part("image", image_part)
}

#[actix_rt::test]
async fn create_profile_from_json_returns_201() {
    let app = TestApp::spawn().await;

    let response = app
        .create_profile(&json!({
            "name": "  Ann ",
            "email": "ann@example.com",
            "languages": "EN, FR",
            "specialization": "Design"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["languages"], json!(["EN", "FR"]));
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["createdAt"].is_string());

    assert_eq!(app.stored_profiles().len(), 1);
    app.cleanup();
}

#[actix_rt::test]
async fn create_without_name_returns_400() {
    let app = TestApp::spawn().await;

    let response = app.create_profile(&json!({"name": "", "email": "ann@example.com"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "missing_required_field");
    assert_eq!(body["details"][0]["field"], "name");
    assert!(app.stored_profiles().is_empty());
    app.cleanup();
}

#[actix_rt::test]
async fn list_applies_query_filters() {
    let mut ann = profile("1", "Ann", "ann@example.com");
    ann.document.languages = vec!["EN".into(), "FR".into()];
    let mut bo = profile("2", "Bo", "bo@example.com");
    bo.document.languages = vec!["EN".into()];
    let app = TestApp::spawn_with(&[ann, bo]).await;

    let all = app.list_profiles(&[]).await;
    let french = app.list_profiles(&[("language", "FR")]).await;
    let searched = app.list_profiles(&[("search", "BO@")]).await;

    assert_eq!(all["total"], 2);
    assert_eq!(all["matched"], 2);
    assert_eq!(french["matched"], 1);
    assert_eq!(french["profiles"][0]["id"], "1");
    assert_eq!(searched["profiles"][0]["name"], "Bo");
    app.cleanup();
}

#[actix_rt::test]
async fn facets_list_distinct_values() {
    let mut ann = profile("1", "Ann", "ann@example.com");
    ann.document.languages = vec!["FR".into(), "EN".into()];
    ann.document.education = "Masters".into();
    let mut bo = profile("2", "Bo", "bo@example.com");
    bo.document.languages = vec!["EN".into()];
    bo.document.specialization = "Dev".into();
    let app = TestApp::spawn_with(&[ann, bo]).await;

    let body: Value = app
        .client
        .get(&app.url("/profiles/facets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["languages"], json!(["EN", "FR"]));
    assert_eq!(body["education"], json!(["Masters"]));
    assert_eq!(body["specializations"], json!(["Dev"]));
    app.cleanup();
}

#[actix_rt::test]
async fn get_update_and_delete_a_profile() {
    let app = TestApp::spawn().await;
    let created: Value = app
        .create_profile(&json!({"name": "Ann", "email": "ann@example.com"}))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let fetched = app.client.get(&app.url(&format!("/profiles/{}", id))).send().await.unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);

    let updated = app
        .client
        .put(&app.url(&format!("/profiles/{}", id)))
        .json(&json!({"name": "Ann B", "email": "ann@example.com", "education": "PhD"}))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = updated.json().await.unwrap();
    assert_eq!(updated["name"], "Ann B");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert!(updated["updatedAt"].is_string());
    assert_eq!(app.stored_profiles()[0].document.education, "PhD");

    let deleted = app.client.delete(&app.url(&format!("/profiles/{}", id))).send().await.unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(app.stored_profiles().is_empty());

    let gone = app.client.get(&app.url(&format!("/profiles/{}", id))).send().await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    app.cleanup();
}

#[actix_rt::test]
async fn update_of_unknown_profile_returns_404() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .put(&app.url("/profiles/does-not-exist"))
        .json(&json!({"name": "Ann", "email": "ann@example.com"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    app.cleanup();
}

#[actix_rt::test]
async fn multipart_create_stores_a_servable_image() {
    let app = TestApp::spawn().await;
    let form = image_form(
        &json!({"name": "Ann", "email": "ann@example.com"}),
        "me.png",
        "image/png",
        png_bytes(),
    );

    let response = app.client.post(&app.url("/profiles")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let image_url = body["imageUrl"].as_str().unwrap();
    let uploads_root = format!("{}/uploads/", app.address);
    assert!(image_url.starts_with(&format!("{}profile_images/", uploads_root)));
    assert!(image_url.ends_with("_me.png"));

    let object = image_url.trim_start_matches(&uploads_root);
    assert!(app.config.local_upload_dir.join(object).exists());

    let served = app.client.get(image_url).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().to_vec(), png_bytes());
    app.cleanup();
}

#[actix_rt::test]
async fn image_above_sixteen_mib_is_accepted_when_configured() {
    let app = TestApp::spawn_configured(&[], |cfg| cfg.max_image_bytes = 20 * 1024 * 1024).await;
    let mut bytes = png_bytes();
    bytes.resize(17 * 1024 * 1024, 0);
    let form = image_form(
        &json!({"name": "Ann", "email": "ann@example.com"}),
        "big.png",
        "image/png",
        bytes,
    );

    let response = app.client.post(&app.url("/profiles")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    app.cleanup();
}

#[actix_rt::test]
async fn image_over_the_limit_is_reported_as_too_large() {
    let app = TestApp::spawn_configured(&[], |cfg| cfg.max_image_bytes = 1024).await;
    let mut bytes = png_bytes();
    bytes.resize(4096, 0);
    let form = image_form(
        &json!({"name": "Ann", "email": "ann@example.com"}),
        "big.png",
        "image/png",
        bytes,
    );

    let response = app.client.post(&app.url("/profiles")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "image_too_large");
    app.cleanup();
}

#[actix_rt::test]
async fn multipart_with_gif_is_rejected() {
    let app = TestApp::spawn().await;
    let form = image_form(
        &json!({"name": "Ann", "email": "ann@example.com"}),
        "anim.gif",
        "image/gif",
        gif_bytes(),
    );

    let response = app.client.post(&app.url("/profiles")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_image_type");
    assert_eq!(app.state.profile_handler.store.len(), 0);
    let written = std::fs::read_dir(&app.config.local_upload_dir).unwrap().count();
    assert_eq!(written, 0);
    app.cleanup();
}

#[actix_rt::test]
async fn reload_reads_the_repository_again() {
    let app = TestApp::spawn_with(&[profile("1", "Ann", "ann@example.com")]).await;

    let seeded = vec![
        profile("1", "Ann", "ann@example.com"),
        profile("2", "Bo", "bo@example.com"),
    ];
    std::fs::write(&app.config.local_data_path, serde_json::to_vec(&seeded).unwrap()).unwrap();

    let response = app.client.post(&app.url("/profiles/reload")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loaded"], 2);
    assert_eq!(app.list_profiles(&[]).await["total"], 2);
    app.cleanup();
}

#[actix_rt::test]
async fn health_reports_loaded_profiles() {
    let app = TestApp::spawn_with(&[profile("1", "Ann", "ann@example.com")]).await;

    let body: Value = app
        .client
        .get(&app.url("/admin/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["repository"], "OK");
    assert_eq!(body["profiles_loaded"], 1);
    app.cleanup();
}
