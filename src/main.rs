use std::sync::Arc;

use clap::Parser;
use stockroom::config::{API_URL_ENV, ClientConfig, ConfigError};
use stockroom::guard::RouteGuard;
use stockroom::nav::{Router, View};
use stockroom::net::{ApiClient, ApiError};
use stockroom::notify::ToastQueue;
use stockroom::pages::PageContext;
use stockroom::shell::Shell;
use stockroom::state::Session;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(#[from] ApiError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "stockroom", about = "Inventory dashboard client")]
struct Cli {
    /// API base URL. Blank falls back to the built-in default.
    #[arg(long, env = API_URL_ENV)]
    base_url: Option<String>,
}

impl Cli {
    fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::resolve(self.base_url.as_deref())
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            eprintln!("ignoring .env: {error}");
        }
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.config()?;

    let router = Arc::new(Router::new(View::Home));
    let toasts = Arc::new(ToastQueue::new());
    let api = Arc::new(ApiClient::with_reqwest(&config, router.clone())?);
    let session = Session::new(api.clone(), router.clone(), toasts.clone());
    tracing::info!(base_url = %config.base_url, "stockroom starting");

    session.probe().await;
    let guard = tokio::spawn(RouteGuard::new(router.clone()).run(session.subscribe()));

    let ctx = PageContext { api, session, navigator: router, notifier: toasts.clone() };
    let mut shell = Shell::new(ctx, toasts);
    let result = repl(&mut shell).await;

    guard.abort();
    result
}

async fn repl(shell: &mut Shell) -> Result<(), CliError> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(shell.prompt().as_bytes()).await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let reply = shell.execute(&line).await;
        for text in &reply.lines {
            stdout.write_all(format!("{text}\n").as_bytes()).await?;
        }
        if reply.quit {
            return Ok(());
        }
    }
}
