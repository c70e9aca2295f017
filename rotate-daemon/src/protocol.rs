//! Client side of the control socket: one-shot commands and the status relay.

use std::io::{ErrorKind, Write};
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

use rotate_core::{codec, Command};

use crate::error::{io_err, DaemonError};

fn connect_error(socket: &Path, err: std::io::Error) -> DaemonError {
    if matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset
    ) {
        DaemonError::DaemonNotRunning {
            socket: socket.to_path_buf(),
        }
    } else {
        io_err(socket, err)
    }
}

/// Send one command byte to the running daemon.
pub fn send_command(socket: &Path, command: Command) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Err(DaemonError::DaemonNotRunning {
            socket: socket.to_path_buf(),
        });
    }

    let mut stream = StdUnixStream::connect(socket).map_err(|e| connect_error(socket, e))?;
    stream
        .write_all(&[codec::encode(command)])
        .map_err(|e| io_err(socket, e))?;
    stream.flush().map_err(|e| io_err(socket, e))?;
    tracing::debug!(%command, socket = %socket.display(), "command sent");
    Ok(())
}

/// Subscribe to a running daemon and copy its status lines to `out` until
/// the daemon closes the connection or `cancel` fires.
pub async fn relay_status<W>(
    socket: &Path,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<(), DaemonError>
where
    W: AsyncWrite + Unpin,
{
    let stream = UnixStream::connect(socket)
        .await
        .map_err(|e| connect_error(socket, e))?;
    let (reader, mut writer) = stream.into_split();
    writer
        .write_all(&[codec::encode(Command::ProxyEvents)])
        .await
        .map_err(|e| io_err(socket, e))?;
    writer.flush().await.map_err(|e| io_err(socket, e))?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_line(&mut line) => read.map_err(|e| io_err(socket, e))?,
        };
        if read == 0 {
            tracing::info!(socket = %socket.display(), "daemon closed the status stream");
            break;
        }
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| io_err("stdout", e))?;
        out.flush().await.map_err(|e| io_err("stdout", e))?;
    }
    Ok(())
}
