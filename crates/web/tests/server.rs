use express_web::middleware::middleware_fn;
use express_web::router::{all, delete, get, post, put};
use express_web::{BoxError, Request, Response, Server, ServerConfig, handler_fn};
use futures::FutureExt;
use indoc::indoc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

async fn body_size(req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.text(req.body().len().to_string()).await?;
    Ok(())
}

async fn describe(req: &Request, res: &mut Response) -> Result<(), BoxError> {
    let mut params = req.params().iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
    params.sort();
    let mut query = req.query_params().iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
    query.sort();
    res.text(format!("{} params[{}] query[{}]", req.method(), params.join(","), query.join(","))).await?;
    Ok(())
}

async fn first(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.text("first").await?;
    Ok(())
}

async fn second(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.text("second").await?;
    Ok(())
}

async fn blob(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    let data = (0..5000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    res.send_binary(&data, "application/octet-stream").await?;
    Ok(())
}

async fn go_home(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.redirect("/").await?;
    Ok(())
}

async fn twice(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.text("once").await?;
    res.code(500).header("X-Late", "1");
    res.text("twice").await?;
    res.end().await?;
    Ok(())
}

async fn explode(_req: &Request, _res: &mut Response) -> Result<(), BoxError> {
    Err("led driver fault".into())
}

async fn maintenance(_req: &mut Request, _res: &mut Response) -> Result<bool, BoxError> {
    Ok(false)
}

async fn audit(req: &mut Request, res: &mut Response) -> Result<bool, BoxError> {
    res.header("X-Audited", req.path());
    Ok(true)
}

fn server(config: ServerConfig) -> Server {
    Server::builder()
        .config(config)
        .address("127.0.0.1:0")
        .use_at("/admin", middleware_fn(|req, res| audit(req, res).boxed()))
        .use_at("/maintenance", middleware_fn(|req, res| maintenance(req, res).boxed()))
        .route("/upload", post(handler_fn(|req, res| body_size(req, res).boxed())))
        .route("/user/:id", get(handler_fn(|req, res| describe(req, res).boxed())))
        .route("/user/:uid/posts/:pid", put(handler_fn(|req, res| describe(req, res).boxed())))
        .route("/dup", get(handler_fn(|req, res| first(req, res).boxed())))
        .route("/maintenance/status", get(handler_fn(|req, res| first(req, res).boxed())))
        .route("/dup", get(handler_fn(|req, res| second(req, res).boxed())))
        .route("/admin/:page", all(handler_fn(|req, res| describe(req, res).boxed())))
        .route("/blob", get(handler_fn(|req, res| blob(req, res).boxed())))
        .route("/old", get(handler_fn(|req, res| go_home(req, res).boxed())))
        .route("/twice", get(handler_fn(|req, res| twice(req, res).boxed())))
        .route("/explode", delete(handler_fn(|req, res| explode(req, res).boxed())))
        .serve_content("/index.html", "<p>index</p>", "text/html")
        .build()
        .unwrap()
}

async fn read_response(mut client: DuplexStream) -> (String, Vec<u8>) {
    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();

    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").expect("response has a head");
    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    (head, raw[split + 4..].to_vec())
}

async fn exchange(server: &Server, request: &[u8]) -> (String, String) {
    let (mut client, stream) = tokio::io::duplex(64 * 1024);
    client.write_all(request).await.unwrap();
    let _ = server.handle_connection(stream).await;

    let (head, body) = read_response(client).await;
    (head, String::from_utf8(body).unwrap())
}

#[tokio::test]
async fn params_and_query_are_extracted() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /user/42?verbose=true HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(body, "GET params[id=42] query[verbose=true]");
}

#[tokio::test]
async fn multiple_params_map_positionally() {
    let (_, body) = exchange(&server(ServerConfig::default()), b"PUT /user/7/posts/hello%20world/ HTTP/1.1\r\n\r\n").await;
    assert_eq!(body, "PUT params[pid=hello world,uid=7] query[]");
}

#[tokio::test]
async fn query_is_percent_decoded() {
    let (_, body) = exchange(&server(ServerConfig::default()), b"GET /user/1?a=1&b=two+words&c=%2Fx HTTP/1.1\r\n\r\n").await;
    assert_eq!(body, "GET params[id=1] query[a=1,b=two words,c=/x]");
}

#[tokio::test]
async fn earlier_route_wins() {
    let (_, body) = exchange(&server(ServerConfig::default()), b"GET /dup HTTP/1.1\r\n\r\n").await;
    assert_eq!(body, "first");
}

#[tokio::test]
async fn literal_route_is_case_sensitive() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /DUP HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 404 Not Found"));
    assert_eq!(body, "Not Found: /DUP");

    let (_, body) = exchange(&server(ServerConfig::default()), b"GET /dup/ HTTP/1.1\r\n\r\n").await;
    assert_eq!(body, "first");
}

#[tokio::test]
async fn middleware_halt_skips_routing_and_ends_empty() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /maintenance/status HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Content-Length: 0"));
    assert!(head.contains("Connection: close"));
    assert_eq!(body, "");
}

#[tokio::test]
async fn oversized_body_is_truncated() {
    let mut request = b"POST /upload HTTP/1.1\r\nContent-Length: 10000\r\n\r\n".to_vec();
    request.extend(std::iter::repeat_n(b'x', 10_000));

    let (mut client, stream) = tokio::io::duplex(64 * 1024);
    client.write_all(&request).await.unwrap();
    let server = server(ServerConfig::default());
    server.handle_connection(stream).await.unwrap();

    let (_, body) = read_response(client).await;
    assert_eq!(body, b"4096");
}

#[tokio::test(start_paused = true)]
async fn short_body_is_accepted_after_timeout() {
    let (mut client, stream) = tokio::io::duplex(64 * 1024);
    client.write_all(b"POST /upload HTTP/1.1\r\nContent-Length: 100\r\n\r\n0123456789").await.unwrap();

    let server = server(ServerConfig::default());
    server.handle_connection(stream).await.unwrap();

    let (_, body) = read_response(client).await;
    assert_eq!(body, b"10");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /missing/page HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 404 Not Found"));
    assert_eq!(body, "Not Found: /missing/page");
}

#[tokio::test]
async fn content_store_serves_exact_path() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /index.html HTTP/1.1\r\n\r\n").await;
    assert!(head.contains("Content-Type: text/html"));
    assert_eq!(body, "<p>index</p>");
}

#[tokio::test]
async fn middleware_runs_only_under_prefix() {
    let server = server(ServerConfig::default());

    let (head, body) = exchange(&server, b"POST /admin/x HTTP/1.1\r\n\r\n").await;
    assert!(head.contains("X-Audited: /admin/x"));
    assert_eq!(body, "POST params[page=x] query[]");

    let (head, _) = exchange(&server, b"GET /user/1 HTTP/1.1\r\n\r\n").await;
    assert!(!head.contains("X-Audited"));
}

#[tokio::test]
async fn binary_payload_arrives_intact() {
    let (mut client, stream) = tokio::io::duplex(64 * 1024);
    client.write_all(b"GET /blob HTTP/1.1\r\n\r\n").await.unwrap();
    server(ServerConfig::default()).handle_connection(stream).await.unwrap();

    let (head, body) = read_response(client).await;
    assert!(head.contains("Content-Length: 5000"));
    assert!(head.contains("Content-Type: application/octet-stream"));
    assert_eq!(body, (0..5000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>());
}

#[tokio::test]
async fn redirect_sets_location() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /old HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 302 Found"));
    assert!(head.contains("Location: /"));
    assert!(body.contains("<a href=\"/\">"));
}

#[tokio::test]
async fn response_is_sent_once() {
    let (head, body) = exchange(&server(ServerConfig::default()), b"GET /twice HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(!head.contains("X-Late"));
    assert_eq!(body, "once");
}

#[tokio::test]
async fn handler_error_becomes_500() {
    let (head, _) = exchange(&server(ServerConfig::default()), b"DELETE /explode HTTP/1.1\r\n\r\n").await;
    assert!(head.starts_with("HTTP/1.1 500 Internal Server Error"));
}

#[tokio::test]
async fn every_response_closes_the_connection() {
    let request = indoc! {r##"
    GET /user/5 HTTP/1.1
    Host: esp32.local
    Connection: keep-alive

    "##};

    let (head, _) = exchange(&server(ServerConfig::default()), request.as_bytes()).await;
    assert!(head.contains("Connection: close"));
}

#[tokio::test]
async fn unknown_method_policy_is_configurable() {
    let request = b"BREW /user/3 HTTP/1.1\r\n\r\n";

    let (head, _) = exchange(&server(ServerConfig::default()), request).await;
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));

    let mut config = ServerConfig::default();
    config.connection.unknown_method_as_get = true;
    let (_, body) = exchange(&server(config), request).await;
    assert_eq!(body, "GET params[id=3] query[]");
}
