mod common;

use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_state();
    let server = common::make_server(&ctx);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory");
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let ctx = common::create_test_state();
    let server = common::make_server(&ctx);

    let response = server.get("/health").await;

    let json = response.json::<Value>();
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("cache").is_some());
}
