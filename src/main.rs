/// Entry point for the Prefix Monitor.
///
/// This binary serves prefix length statistics of a BIRD routing daemon, read over its
/// control socket, as JSON over HTTP.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., invalid environment variables or an
/// address that cannot be bound).
///
/// # Examples
///
/// ```bash
/// BIRD_SOCKET=/run/bird/bird.ctl RUST_LOG=info cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    prefix_monitor::run().await
}
