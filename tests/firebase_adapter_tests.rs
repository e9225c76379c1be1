
use httpmock::prelude::*;
use profile_directory::{
    constants::STORAGE_UNAUTHORIZED,
    entities::{image::ImageUpload, profile::ProfileInput},
    errors::AppError,
    http::client::create_http_client,
    repositories::{
        blob::BlobStore,
        clients::{FirebaseBlobStore, FirebaseProfileRepo},
        profile::ProfileRepository,
    },
};
use serde_json::json;
use test_utils::png_bytes;
use url::Url;

const TOKEN: &str = "secret-token";

fn repo(server: &MockServer, auth_token: Option<&str>) -> FirebaseProfileRepo {
    let client = create_http_client("profile-directory-test", 5).unwrap();
    let database_url = Url::parse(&server.base_url()).unwrap();
    FirebaseProfileRepo::new(client, database_url, "users", auth_token.map(str::to_string))
}

fn blobs(server: &MockServer) -> FirebaseBlobStore {
    let client = create_http_client("profile-directory-test", 5).unwrap();
    FirebaseBlobStore::new(client, "demo.appspot.com", Some(TOKEN.to_string()))
        .with_api_base(format!("{}/v0/b/", server.base_url()))
}

fn document(name: &str) -> profile_directory::entities::profile::ProfileDocument {
    ProfileInput {
        name: name.to_string(),
        email: "ann@example.com".to_string(),
        ..Default::default()
    }
    .normalize(None)
    .unwrap()
}

// === Realtime Database ===

#[tokio::test]
async fn list_reads_the_collection_with_auth() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/users.json").query_param("auth", TOKEN);
        then.status(200).json_body(json!({
            "-Nb": {"name": "Bo", "email": "bo@example.com"},
            "-Na": {"name": "Ann", "email": "ann@example.com", "languages": ["EN"]}
        }));
    });

    let profiles = repo(&server, Some(TOKEN)).list_profiles().await.unwrap();

    mock.assert();
    let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["-Na", "-Nb"]);
    assert_eq!(profiles[0].document.languages, vec!["EN"]);
}

#[tokio::test]
async fn empty_collection_is_null() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users.json");
        then.status(200).body("null");
    });

    let profiles = repo(&server, None).list_profiles().await.unwrap();

    assert!(profiles.is_empty());
}

#[tokio::test]
async fn database_url_path_is_kept() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tenant/users.json");
        then.status(200).body("null");
    });
    let client = create_http_client("profile-directory-test", 5).unwrap();
    let database_url = Url::parse(&format!("{}/tenant/", server.base_url())).unwrap();
    let repo = FirebaseProfileRepo::new(client, database_url, "users", None);

    repo.list_profiles().await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn health_check_uses_a_shallow_read() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/users.json").query_param("shallow", "true");
        then.status(200).json_body(json!({"-Na": true}));
    });

    repo(&server, None).check_connection().await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn unreachable_database_is_a_repository_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users.json");
        then.status(503);
    });
    let repo = repo(&server, None);

    assert!(matches!(repo.check_connection().await, Err(AppError::RepositoryFailure(_))));
    assert!(matches!(repo.list_profiles().await, Err(AppError::RepositoryFailure(_))));
}

#[tokio::test]
async fn create_posts_the_document_and_returns_the_push_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/users.json")
            .query_param("auth", TOKEN)
            .body_includes(r#""name":"Ann""#)
            .body_includes(r#""imageUrl":"#);
        then.status(200).json_body(json!({"name": "-Nnew"}));
    });

    let id = repo(&server, Some(TOKEN)).create_profile(&document("Ann")).await.unwrap();

    mock.assert();
    assert_eq!(id, "-Nnew");
}

#[tokio::test]
async fn create_without_a_push_id_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/users.json");
        then.status(200).json_body(json!({"name": ""}));
    });

    let result = repo(&server, None).create_profile(&document("Ann")).await;

    assert!(matches!(result, Err(AppError::RepositoryFailure(_))));
}

#[tokio::test]
async fn replace_puts_to_the_record_path() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/users/-Na.json").body_includes(r#""name":"Annie""#);
        then.status(200).json_body(json!({"name": "Annie"}));
    });

    repo(&server, None).replace_profile("-Na", &document("Annie")).await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn replace_with_a_null_echo_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT).path("/users/-Na.json");
        then.status(200).body("null");
    });

    let result = repo(&server, None).replace_profile("-Na", &document("Annie")).await;

    assert!(matches!(result, Err(AppError::RepositoryFailure(_))));
}

#[tokio::test]
async fn delete_targets_the_record_path() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/users/-Na.json").query_param("auth", TOKEN);
        then.status(200).body("null");
    });

    repo(&server, Some(TOKEN)).delete_profile("-Na").await.unwrap();

    mock.assert_calls(1);
}

// === Storage ===

#[tokio::test]
async fn upload_returns_a_token_download_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v0/b/demo.appspot.com/o")
            .query_param("uploadType", "media")
            .header("authorization", format!("Bearer {}", TOKEN))
            .header("content-type", "image/png");
        then.status(200).json_body(json!({
            "name": "profile_images/1_me.png",
            "downloadTokens": "tok-1,tok-2"
        }));
    });
    let image = ImageUpload::new("me.png", "image/png", png_bytes());

    let url = blobs(&server).upload_image(&image).await.unwrap();

    mock.assert();
    assert_eq!(
        url,
        format!(
            "{}/v0/b/demo.appspot.com/o/profile_images%2F1_me.png?alt=media&token=tok-1",
            server.base_url()
        )
    );
}

#[tokio::test]
async fn rejected_credentials_map_to_unauthorized() {
    for status in [401, 403] {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v0/b/demo.appspot.com/o");
            then.status(status);
        });
        let image = ImageUpload::new("me.png", "image/png", png_bytes());

        let result = blobs(&server).upload_image(&image).await;

        assert!(matches!(result, Err(AppError::UploadFailure(msg)) if msg == STORAGE_UNAUTHORIZED));
    }
}

#[tokio::test]
async fn upload_without_download_token_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v0/b/demo.appspot.com/o");
        then.status(200).json_body(json!({"name": "profile_images/1_me.png"}));
    });
    let image = ImageUpload::new("me.png", "image/png", png_bytes());

    let result = blobs(&server).upload_image(&image).await;

    assert!(matches!(result, Err(AppError::UploadFailure(_))));
}
