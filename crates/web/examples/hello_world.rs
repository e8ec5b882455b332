use express_web::router::{get, post};
use express_web::{BoxError, Request, Response, Server, handler_fn};
use futures::FutureExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

async fn hello_world(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
    res.text("hello world").await?;
    Ok(())
}

// curl -v http://127.0.0.1:3000/user/42?verbose=true
async fn show_user(req: &Request, res: &mut Response) -> Result<(), BoxError> {
    let id = req.param("id").unwrap_or_default();
    let verbose = req.query("verbose") == Some("true");
    res.json(format!(r#"{{"id":"{id}","verbose":{verbose}}}"#)).await?;
    Ok(())
}

// curl -v -d 'ping' http://127.0.0.1:3000/echo
async fn echo(req: &Request, res: &mut Response) -> Result<(), BoxError> {
    info!(body = %req.body_text(), "receiving request body");
    res.send(req.body().clone(), req.header("content-type").unwrap_or("text/plain")).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = Server::builder()
        .address("127.0.0.1:3000")
        .route("/", get(handler_fn(|req, res| hello_world(req, res).boxed())))
        .route("/user/:id", get(handler_fn(|req, res| show_user(req, res).boxed())))
        .route("/echo", post(handler_fn(|req, res| echo(req, res).boxed())))
        .build()
        .expect("invalid server setup");

    if let Err(e) = server.start_with_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    {
        error!(cause = %e, "server stopped");
    }
}
