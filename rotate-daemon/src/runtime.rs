use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use rotate_core::{codec, Command, Event};

use crate::actuator::RotationActuator;
use crate::broadcast::{ProxySet, StatusBroadcaster, Subscription};
use crate::config::DaemonConfig;
use crate::error::{io_err, DaemonError};
use crate::protocol::relay_status;
use crate::sensor::sensor_task;
use crate::state::DaemonState;

/// Start the `status` runtime and block the current thread until it exits.
///
/// SIGINT and SIGTERM both end the run cleanly.
pub fn start_blocking(config: DaemonConfig) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;

    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let signals = ShutdownSignals::install()?;
        let signal_handle = tokio::spawn(shutdown_on_signal(signals, cancel.clone()));

        let result = run(config, cancel.clone()).await;
        cancel.cancel();
        handle_join("signal_handler", signal_handle.await)?;
        result
    })
}

/// Become the daemon, or a proxy of the one already serving this session.
pub async fn run(config: DaemonConfig, cancel: CancellationToken) -> Result<(), DaemonError> {
    match bind_exclusive(&config.socket) {
        Ok(listener) => serve(config, listener, tokio::io::stdout(), cancel).await,
        Err(DaemonError::AlreadyRunning { socket }) => {
            tracing::info!(
                socket = %socket.display(),
                "an instance of 'status' is already running, relaying its status stream",
            );
            tracing::info!(
                "if you are certain no other instance is running, remove {}",
                socket.display()
            );
            relay_status(&socket, &mut tokio::io::stdout(), cancel).await
        }
        Err(err) => Err(err),
    }
}

/// Bind the control socket, failing with [`DaemonError::AlreadyRunning`]
/// when a live daemon already answers on it.
///
/// A socket file nobody answers on is left over from a crashed instance and
/// is replaced.
pub fn bind_exclusive(socket: &Path) -> Result<UnixListener, DaemonError> {
    let listener = match UnixListener::bind(socket) {
        Ok(listener) => listener,
        Err(err) if err.kind() == ErrorKind::AddrInUse => {
            if StdUnixStream::connect(socket).is_ok() {
                return Err(DaemonError::AlreadyRunning {
                    socket: socket.to_path_buf(),
                });
            }
            tracing::warn!(socket = %socket.display(), "removing stale daemon socket before bind");
            match fs::remove_file(socket) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(io_err(socket, err)),
            }
            UnixListener::bind(socket).map_err(|e| io_err(socket, e))?
        }
        Err(err) => return Err(io_err(socket, err)),
    };
    set_socket_permissions(socket)?;
    tracing::info!(socket = %socket.display(), "control socket bound");
    Ok(listener)
}

/// Run the daemon on an already bound listener, publishing status to `out`.
///
/// Returns when `cancel` fires or a fatal error occurs; the socket file is
/// removed either way.
pub async fn serve<W>(
    config: DaemonConfig,
    listener: UnixListener,
    out: W,
    cancel: CancellationToken,
) -> Result<(), DaemonError>
where
    W: AsyncWrite + Unpin,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let proxies = ProxySet::new();

    let sensor_handle = {
        let cancel = cancel.clone();
        let command = config.sensor_command.clone();
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let result = sensor_task(command, event_tx, cancel.clone()).await;
            // Losing the sensor is survivable, failing to start it is not.
            if result.is_err() {
                cancel.cancel();
            }
            result
        })
    };

    let socket_handle = {
        let cancel = cancel.clone();
        let socket = config.socket.clone();
        let proxies = proxies.clone();
        tokio::spawn(async move {
            let result =
                socket_server_task(&socket, listener, event_tx, proxies, cancel.clone()).await;
            cancel.cancel();
            result
        })
    };

    let broadcaster = StatusBroadcaster::new(out, proxies);
    let state_result = state_machine_task(&config, event_rx, broadcaster, cancel.clone()).await;
    cancel.cancel();

    let (sensor_result, socket_result) = tokio::join!(sensor_handle, socket_handle);
    remove_socket(&config.socket);

    state_result?;
    handle_join("sensor", sensor_result)?;
    handle_join("socket_server", socket_result)?;
    Ok(())
}

async fn state_machine_task<W>(
    config: &DaemonConfig,
    mut events: mpsc::UnboundedReceiver<Event>,
    mut broadcaster: StatusBroadcaster<W>,
    cancel: CancellationToken,
) -> Result<(), DaemonError>
where
    W: AsyncWrite + Unpin,
{
    let actuator = RotationActuator::from_command(&config.transform_command, &config.output)?;
    let mut state = DaemonState::default();
    broadcaster.publish(&state.status(&config.labels)).await?;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        tracing::debug!(?event, "handling event");

        if let Some(rotation) = state.apply(event, config.hardware_disabled_orientation) {
            actuator.actuate(rotation).await?;
        }
        broadcaster.publish(&state.status(&config.labels)).await?;
    }
    Ok(())
}

async fn socket_server_task(
    socket: &Path,
    listener: UnixListener,
    events: mpsc::UnboundedSender<Event>,
    proxies: ProxySet,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(socket, e))?;
                let events = events.clone();
                let proxies = proxies.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket_client(stream, events, proxies, cancel).await {
                        tracing::warn!(error = %err, "socket client error");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn handle_socket_client(
    stream: UnixStream,
    events: mpsc::UnboundedSender<Event>,
    proxies: ProxySet,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    let (mut reader, mut writer) = stream.into_split();

    let byte = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        byte = reader.read_u8() => byte,
    };
    let byte = match byte {
        Ok(byte) => byte,
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
            tracing::debug!("client closed the connection without a command");
            return Ok(());
        }
        Err(err) => return Err(io_err("daemon socket read", err)),
    };

    let command = match codec::decode(byte) {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(error = %err, "received invalid command from client");
            return Ok(());
        }
    };
    tracing::debug!(%command, "received command");

    if command != Command::ProxyEvents {
        send_event(&events, command.into())?;
        return Ok(());
    }

    let mut subscription = proxies.register().await;
    let result = match send_event(&events, command.into()) {
        Ok(()) => serve_subscriber(&mut reader, &mut writer, &mut subscription, &cancel).await,
        Err(err) => Err(err),
    };
    proxies.remove(subscription.id).await;
    result
}

/// Copy published lines to a subscriber until a write fails or we shut down.
///
/// A peer that half-closes its side after the command byte stays subscribed.
async fn serve_subscriber(
    reader: &mut OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
    subscription: &mut Subscription,
    cancel: &CancellationToken,
) -> Result<(), DaemonError> {
    let mut scratch = [0u8; 64];
    let mut reading = true;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read(&mut scratch), if reading => match read {
                // Anything sent after the command byte is ignored.
                Ok(n) if n > 0 => continue,
                Ok(_) => {
                    tracing::debug!(subscriber = subscription.id, "proxy closed its write side");
                    reading = false;
                }
                Err(err) => {
                    tracing::debug!(subscriber = subscription.id, error = %err, "proxy read failed");
                    break;
                }
            },
            line = subscription.next_line() => {
                let Some(line) = line else { break };
                if let Err(err) = writer.write_all(line.as_bytes()).await {
                    tracing::debug!(subscriber = subscription.id, error = %err, "proxy write failed");
                    break;
                }
            }
        }
    }
    let _ = writer.shutdown().await;
    Ok(())
}

fn send_event(events: &mpsc::UnboundedSender<Event>, event: Event) -> Result<(), DaemonError> {
    events
        .send(event)
        .map_err(|_| DaemonError::Protocol("event queue closed".to_string()))
}

/// SIGINT and SIGTERM listeners. Installed before the socket is bound.
struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignals {
    fn install() -> Result<Self, DaemonError> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(|e| io_err("SIGINT handler", e))?,
            terminate: signal(SignalKind::terminate()).map_err(|e| io_err("SIGTERM handler", e))?,
        })
    }
}

async fn shutdown_on_signal(
    mut signals: ShutdownSignals,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        _ = signals.interrupt.recv() => {
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = signals.terminate.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
    cancel.cancel();
    Ok(())
}

fn remove_socket(socket: &Path) {
    match fs::remove_file(socket) {
        Ok(()) => tracing::debug!(socket = %socket.display(), "control socket removed"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(socket = %socket.display(), error = %err, "failed to remove control socket")
        }
    }
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the stderr log subscriber.
///
/// `verbosity` picks the default level (0 warn, 1 info, 2+ debug);
/// `RUST_LOG` overrides it. Stdout is reserved for the status stream.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    #[tokio::test]
    async fn bind_restricts_socket_to_owner() {
        let dir = TempDir::new().expect("tempdir");
        let socket = dir.path().join("sway-rotate.sock");
        let _listener = bind_exclusive(&socket).expect("bind");

        let mode = fs::metadata(&socket).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn live_socket_reports_already_running() {
        let dir = TempDir::new().expect("tempdir");
        let socket = dir.path().join("sway-rotate.sock");
        let _first = bind_exclusive(&socket).expect("first bind");

        let err = bind_exclusive(&socket).expect_err("second bind");
        assert!(matches!(err, DaemonError::AlreadyRunning { .. }));
    }

    #[tokio::test]
    async fn stale_socket_is_replaced() {
        let dir = TempDir::new().expect("tempdir");
        let socket = dir.path().join("sway-rotate.sock");
        drop(bind_exclusive(&socket).expect("first bind"));
        assert!(socket.exists(), "dropping a listener leaves the file behind");

        let _listener = bind_exclusive(&socket).expect("rebind over stale socket");
    }

    #[tokio::test]
    async fn sigterm_after_install_cancels_instead_of_exiting() {
        let signals = ShutdownSignals::install().expect("install handlers");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(shutdown_on_signal(signals, cancel.clone()));

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .expect("run kill");
        assert!(status.success());

        tokio::time::timeout(std::time::Duration::from_secs(5), cancel.cancelled())
            .await
            .expect("SIGTERM cancels the token");
        handle_join("signal_handler", handle.await).expect("handler exits cleanly");
    }

    #[test]
    fn join_passes_inner_error_through() {
        let err = handle_join("sensor", Ok(Err(DaemonError::Protocol("boom".into()))))
            .expect_err("inner error");
        assert_eq!(err.to_string(), "daemon protocol error: boom");
    }
}
