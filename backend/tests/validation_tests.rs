mod common;

use common::*;

use http::StatusCode;

#[tokio::test]
async fn test_invalid_bucket_name_is_rejected_before_provider_call() {
    let setup = TestSetup::offline("", true).await;

    for name in ["ab", "Upper-Case", "under_score", "-leading"] {
        let response = setup
            .send_get_request(&setup.oss_route(&format!("/bucket/{name}")))
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for bucket name: {name}"
        );
    }
}

#[tokio::test]
async fn test_invalid_presign_expiry_is_rejected() {
    let setup = TestSetup::offline("", true).await;

    for expires in ["0", "10081", "-1", "soon"] {
        let response = setup
            .send_get_request(&setup.oss_route(&format!("/object/test-oss/test.txt/{expires}")))
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for expires: {expires}"
        );
    }
}

#[tokio::test]
async fn test_blank_object_name_is_rejected() {
    let setup = TestSetup::offline("", true).await;

    for route in [
        "/object/test-oss/%20%20/5",
        "/object/put/test-oss/%20%20/5",
        "/object/test-oss/%20%20",
    ] {
        let response = setup
            .send_get_request(&setup.oss_route(route))
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for route: {route}"
        );
    }
}

#[tokio::test]
async fn test_object_name_over_key_limit_is_rejected() {
    let setup = TestSetup::offline("", true).await;
    // 342 three-byte characters: 1026 bytes, percent-encoded
    let name = "%E2%82%AC".repeat(342);

    let response = setup
        .send_get_request(&setup.oss_route(&format!("/object/test-oss/{name}/5")))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_presigned_url_is_generated_offline() {
    let setup = TestSetup::offline("", true).await;

    let response = setup
        .send_get_request(&setup.oss_route("/object/put/test-oss/test.txt/3"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let url = body["url"].as_str().expect("Expected a URL");
    assert!(url.starts_with("http://127.0.0.1:9/test-oss/test.txt?"));
    assert!(url.contains("X-Amz-Expires=180"));

    let expires_at = body["expires_at"].as_str().expect("Expected a timestamp");
    assert!(expires_at.ends_with('Z'));
    assert_eq!(expires_at.len(), "2023-11-14T22:13:20.000Z".len());
}

#[tokio::test]
async fn test_upload_without_object_field_is_rejected() {
    let setup = TestSetup::offline("", true).await;

    let response = setup
        .send_multipart_request(
            &setup.oss_route("/object/test-oss/test.txt"),
            "file",
            Some("test.txt"),
            b"Hello,World!",
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "missing_object");
}

#[tokio::test]
async fn test_unreachable_provider_is_a_server_error() {
    let setup = TestSetup::offline("", true).await;

    let response = setup
        .send_get_request(&setup.oss_route("/bucket"))
        .await
        .expect("Failed to send request");

    assert!(response.status().is_server_error());
    let body = parse_response_body(response).await;
    assert_eq!(body["allowRetry"], true);
}

#[tokio::test]
async fn test_oss_routes_follow_prefix() {
    let setup = TestSetup::offline("/storage", true).await;

    let response = setup
        .send_get_request("/oss/bucket/Invalid")
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = setup
        .send_get_request("/storage/oss/bucket/Invalid")
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oss_routes_absent_when_not_mounted() {
    let setup = TestSetup::offline("", false).await;

    let response = setup
        .send_get_request("/oss/bucket")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let setup = TestSetup::offline("", false).await;

    let response = setup
        .send_get_request("/health")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["storage_enabled"], true);
}

#[tokio::test]
async fn test_openapi_document_lists_oss_routes() {
    let setup = TestSetup::offline("", true).await;

    let response = setup
        .send_get_request("/openapi.json")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["paths"]["/oss/bucket/{bucket_name}"].is_object());
    assert!(body["paths"]["/oss/object/put/{bucket_name}/{object_name}/{expires}"].is_object());
}
