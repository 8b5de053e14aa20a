use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod clients;
mod config;
mod event;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

/// Pending connection queue size for the listener
const LISTEN_BACKLOG: i32 = 128;

/// Command line options
struct Args {
    /// Settings file path, without extension
    config_path: String,
    /// Route a single event file and exit instead of serving HTTP
    event_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config_path: config::DEFAULT_SETTINGS_PATH.to_string(),
        event_path: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                args.config_path = iter.next().ok_or("--config requires a path")?;
            }
            "--event" | "-e" => {
                args.event_path = Some(iter.next().ok_or("--event requires a path")?);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }

    Ok(args)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    let settings = config::Settings::load_from(&args.config_path)?;
    logger::init(&settings)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = settings.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let router = routing::Router::new(
        clients::object_store_from(&settings.backends),
        clients::invoker_from(&settings.backends),
    );

    match args.event_path {
        Some(path) => runtime.block_on(run_event(&path, &router, &settings)),
        None => runtime.block_on(run_server(settings, router)),
    }
}

/// Route one event read from `path` and print the reply
async fn run_event(
    path: &str,
    router: &routing::Router,
    settings: &config::Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let reply = handler::handle_event(router, &settings.function, &raw).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn run_server(
    settings: config::Settings,
    router: routing::Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = settings.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, LISTEN_BACKLOG)?;

    let state = Arc::new(config::AppState::new(settings, router));
    server::signal::start_signal_handler(Arc::clone(&state))?;

    logger::log_server_start(&addr, &state.settings);
    server::start_server_loop(listener, state, Arc::new(AtomicUsize::new(0))).await;
    Ok(())
}
