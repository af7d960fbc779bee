//! Live status updates over Socket.IO (socketioxide on axum).

use socketioxide::{SocketIo, extract::SocketRef};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;

use postpilot_core::domain::StatusEvent;

/// Event name viewers listen on.
pub const STATUS_UPDATE: &str = "status_update";

/// Configure WebSocket handlers.
pub fn configure_socket_handlers(io: &SocketIo) {
    io.ns("/", |socket: SocketRef| {
        tracing::info!(socket_id = %socket.id, "Viewer connected");

        socket.on("ping", |socket: SocketRef| {
            socket.emit("pong", &chrono::Utc::now().to_rfc3339()).ok();
        });

        socket.on_disconnect(|socket: SocketRef| {
            tracing::info!(socket_id = %socket.id, "Viewer disconnected");
        });
    });
}

/// Forward every status event to all connected viewers.
pub fn spawn_status_relay(
    io: SocketIo,
    mut events: broadcast::Receiver<StatusEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = io.emit(STATUS_UPDATE, &event) {
                        tracing::warn!(post_id = event.post_id, error = %e, "Failed to relay status update");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Status relay lagged behind, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Status channel closed, relay stopping");
                    break;
                }
            }
        }
    })
}

/// Serve Socket.IO on its own port until `shutdown` resolves.
pub async fn serve<F>(
    host: String,
    port: u16,
    io_layer: socketioxide::layer::SocketIoLayer,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "postpilot socket.io" }))
        .layer(ServiceBuilder::new().layer(io_layer));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "Socket.IO listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Create the Socket.IO layer with handlers attached.
pub fn create_socketio_layer() -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::new_layer();
    configure_socket_handlers(&io);
    (layer, io)
}
