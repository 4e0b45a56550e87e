use axum::response::Response;
use http_body_util::BodyExt;
use rand::RngCore;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Generate random test content of the given size
pub fn generate_test_content(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Percent-encodes `/` so a nested key fits in one path segment
pub fn encode_key(key: &str) -> String {
    key.replace('/', "%2F")
}
