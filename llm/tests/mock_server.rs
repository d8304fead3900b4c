#![allow(dead_code)]
use std::time::Duration;
use tokio::sync::mpsc;
use warp::Filter;

fn sse_line(delta: &str) -> String {
    let obj = serde_json::json!({
        "object": "chat.completion.chunk",
        "choices": [{ "index": 0, "delta": { "content": delta } }]
    });
    format!("data: {}\n\n", obj)
}

/// Serve `deltas` as a streamed chat completion, pausing `delay_ms` between events.
pub async fn spawn_delayed_mock_server(
    deltas: Vec<&'static str>,
    delay_ms: u64,
) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

    let route = warp::post()
        .and(warp::path!("v1" / "chat" / "completions"))
        .and(warp::header::exact("authorization", "Bearer test-key"))
        .map(move || {
            let deltas = deltas.clone();
            let (mut tx, body) = warp::hyper::Body::channel();
            tokio::spawn(async move {
                let role = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
                if tx.send_data(role.into()).await.is_err() {
                    return;
                }
                for d in deltas {
                    if delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                    if tx.send_data(sse_line(d).into()).await.is_err() {
                        return;
                    }
                }
                let _ = tx.send_data("data: [DONE]\n\n".into()).await;
            });
            warp::http::Response::builder()
                .header("content-type", "text/event-stream")
                .body(body)
                .unwrap()
        });

    let shutdown = async move {
        shutdown_rx.recv().await;
    };
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), shutdown);
    tokio::spawn(server);
    let url = format!("http://{}", addr);
    (url, shutdown_tx)
}

pub async fn spawn_mock_server(deltas: Vec<&'static str>) -> (String, mpsc::Sender<()>) {
    spawn_delayed_mock_server(deltas, 0).await
}

/// Serve a fixed non-streamed completion body.
pub async fn spawn_completion_server(content: &'static str) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let route = warp::post()
        .and(warp::path!("v1" / "chat" / "completions"))
        .map(move || {
            warp::reply::json(&serde_json::json!({
                "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
            }))
        });
    let shutdown = async move {
        shutdown_rx.recv().await;
    };
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), shutdown);
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx)
}

/// Reject every request with `status`.
pub async fn spawn_failing_server(status: u16) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let code = warp::http::StatusCode::from_u16(status).unwrap();
    let route = warp::post().map(move || warp::reply::with_status("invalid api key", code));
    let shutdown = async move {
        shutdown_rx.recv().await;
    };
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), shutdown);
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx)
}

/// Serve `deltas` as a streamed chat completion, then drop the connection
/// before the terminating `[DONE]` event.
pub async fn spawn_aborting_server(deltas: Vec<&'static str>) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let route = warp::post()
        .and(warp::path!("v1" / "chat" / "completions"))
        .map(move || {
            let deltas = deltas.clone();
            let (mut tx, body) = warp::hyper::Body::channel();
            tokio::spawn(async move {
                for d in deltas {
                    if tx.send_data(sse_line(d).into()).await.is_err() {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
                tx.abort();
            });
            warp::http::Response::builder()
                .header("content-type", "text/event-stream")
                .body(body)
                .unwrap()
        });
    let shutdown = async move {
        shutdown_rx.recv().await;
    };
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), shutdown);
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx)
}
