//! Integration tests: start the server on a free port, GET /, assert the status line.
//! Telegram is either not contacted (bot user name configured) or stood in for by mockito.
//! Server tasks are left running when the tests end.

use paintbot::config::Config;
use paintbot::server;
use std::time::Duration;

const TEST_TOKEN: &str = "123:health";

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn test_config(port: u16, api_base: &str, user_name: Option<&str>) -> Config {
    let mut config = Config::default();
    config.server.port = port;
    config.server.bind = "127.0.0.1".to_string();
    config.bot.token = Some(TEST_TOKEN.to_string());
    config.bot.user_name = user_name.map(str::to_string);
    config.bot.api_base = Some(api_base.to_string());
    config
}

/// Spawn the server and poll GET / until it answers 200; returns the body.
async fn start_and_fetch_status(config: Config) -> String {
    let port = config.server.port;
    let server_handle = tokio::spawn(async move {
        let _ = server::run_server(config).await;
    });

    let url = format!("http://127.0.0.1:{}/", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                return resp.text().await.expect("read body");
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    server_handle.abort();
    panic!(
        "GET {} did not return 200 with the status line within 5s; last error: {:?}",
        url, last_err
    );
}

#[tokio::test]
async fn server_status_http_responds_with_running() {
    let config = test_config(free_port(), "http://127.0.0.1:9", Some("health_bot"));
    let body = start_and_fetch_status(config).await;
    assert_eq!(body, "The health_bot app is running.");
}

#[tokio::test]
async fn display_name_comes_from_get_me_when_unset() {
    let mut telegram = mockito::Server::new_async().await;
    let get_me = telegram
        .mock("GET", format!("/bot{}/getMe", TEST_TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"ok": true, "result": {"id": 7, "is_bot": true, "first_name": "Paint", "username": "discovered_bot"}}"#,
        )
        .create_async()
        .await;

    let config = test_config(free_port(), &telegram.url(), None);
    let body = start_and_fetch_status(config).await;
    assert_eq!(body, "The discovered_bot app is running.");
    get_me.assert_async().await;
}

#[tokio::test]
async fn display_name_falls_back_when_get_me_fails() {
    let mut telegram = mockito::Server::new_async().await;
    let _get_me = telegram
        .mock("GET", format!("/bot{}/getMe", TEST_TOKEN).as_str())
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
        .create_async()
        .await;

    let config = test_config(free_port(), &telegram.url(), None);
    let body = start_and_fetch_status(config).await;
    assert_eq!(body, "The bot app is running.");
}
