// Server loop module
// Accepts connections until shutdown begins, then waits for open ones to finish

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Accept connections on `listener` until `state.shutdown` flips to `true`.
///
/// The listener is closed first, then open connections get up to the
/// configured write timeout to finish their current request.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) {
    let mut shutdown = state.shutdown.subscribe();

    loop {
        let stopping = *shutdown.borrow();
        if stopping {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.changed() => {}
        }
    }

    drop(listener);
    let remaining = active_connections.load(Ordering::SeqCst);
    logger::log_server_stop(remaining);

    let grace = Duration::from_secs(state.settings.performance.write_timeout);
    let left = drain_connections(&active_connections, grace).await;
    if left > 0 {
        logger::log_warning(&format!(
            "{left} connection(s) still open after {}s, closing them",
            grace.as_secs()
        ));
    }
}

/// Wait until no connection is open or `grace` elapses.
/// Returns the number of connections still open.
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = Instant::now() + grace;
    loop {
        let open = active_connections.load(Ordering::SeqCst);
        if open == 0 || Instant::now() >= deadline {
            return open;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
