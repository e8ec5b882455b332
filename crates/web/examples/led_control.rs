//! An LED controlled manually or through a text-generation service.
//!
//! - `GET /manual/on`, `GET /manual/off`: switch the LED directly
//! - `GET /api/ask?q=...`: ask the text generator which command the question means, apply it
//!   and answer `{"answer":"<command>"}`
//! - `GET /`: the control page, served from the content store
//!
//! The LED and the text generator are traits; this demo ships stand-ins that only log.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use express_web::router::get;
use express_web::{BoxError, Request, RequestHandler, Response, Server};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8" /><title>LED Controller</title></head>
<body>
  <h1>LED Controller</h1>
  <p><a href="/manual/on">on</a> | <a href="/manual/off">off</a></p>
  <form action="/api/ask"><input name="q" placeholder="ask something" /><button>ask</button></form>
</body>
</html>
"#;

trait Actuator: Send + Sync {
    fn set(&self, on: bool);
}

#[derive(Debug, Default)]
struct LoggingLed {
    on: AtomicBool,
}

impl Actuator for LoggingLed {
    fn set(&self, on: bool) {
        self.on.store(on, Ordering::Relaxed);
        info!(on, "LED switched");
    }
}

#[async_trait]
trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BoxError>;
}

/// Answers by keyword instead of calling a remote model.
#[derive(Debug)]
struct KeywordGenerator;

#[async_trait]
impl TextGenerator for KeywordGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, BoxError> {
        let input = prompt.rsplit("Input: ").next().unwrap_or_default().to_lowercase();
        let answer = if input.contains("off") || input.contains("dark") {
            "turn off"
        } else if input.contains("on") || input.contains("light") {
            "turn on"
        } else {
            "no command"
        };
        Ok(answer.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    TurnOn,
    TurnOff,
    None,
}

impl Command {
    fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "turn on" => Command::TurnOn,
            "turn off" => Command::TurnOff,
            _ => Command::None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::TurnOn => "turn on",
            Command::TurnOff => "turn off",
            Command::None => "no command",
        })
    }
}

fn prompt(question: &str) -> String {
    format!(
        "You are a precise command interpreter for a digital LED. When given an input, respond with EXACTLY one of \
         these commands: 'turn on', 'turn off', or 'no command'. Do not include any extra words, punctuation, or \
         explanations. Input: {question}"
    )
}

struct ManualSwitch {
    led: Arc<dyn Actuator>,
    on: bool,
}

#[async_trait]
impl RequestHandler for ManualSwitch {
    async fn invoke(&self, _req: &Request, res: &mut Response) -> Result<(), BoxError> {
        self.led.set(self.on);
        res.text(if self.on { "LED turned ON" } else { "LED turned OFF" }).await?;
        Ok(())
    }
}

struct Ask {
    led: Arc<dyn Actuator>,
    generator: Arc<dyn TextGenerator>,
}

#[async_trait]
impl RequestHandler for Ask {
    async fn invoke(&self, req: &Request, res: &mut Response) -> Result<(), BoxError> {
        let question = req.query("q").unwrap_or_default();
        info!(question, "api question");

        let command = match self.generator.generate(&prompt(question)).await {
            Ok(answer) => Command::parse(&answer),
            Err(e) => {
                warn!(cause = %e, "text generation failed");
                Command::None
            }
        };

        match command {
            Command::TurnOn => self.led.set(true),
            Command::TurnOff => self.led.set(false),
            Command::None => info!("no valid command received"),
        }

        let body = serde_json::json!({ "answer": command.to_string() });
        res.json(body.to_string()).await?;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let led: Arc<dyn Actuator> = Arc::new(LoggingLed::default());
    let generator: Arc<dyn TextGenerator> = Arc::new(KeywordGenerator);

    let server = Server::builder()
        .address("0.0.0.0:8080")
        .route("/manual/on", get(ManualSwitch { led: Arc::clone(&led), on: true }))
        .route("/manual/off", get(ManualSwitch { led: Arc::clone(&led), on: false }))
        .route("/api/ask", get(Ask { led, generator }))
        .serve_content("/", INDEX_HTML, "text/html")
        .build()
        .expect("invalid server setup");

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
