use std::{net::Ipv4Addr, time::Duration};

use tokio::net::TcpStream;

use crate::Error;

/// Poll `127.0.0.1:port` until it accepts a TCP connection.
///
/// Gives up after `n_retries` failed attempts, sleeping `retry_interval` between them.
#[tracing::instrument(level = "debug", skip(retry_interval))]
pub async fn wait_for_port(port: u16, n_retries: u32, retry_interval: Duration) -> Result<(), Error> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await {
            Ok(_) => {
                tracing::debug!(attempt, "port {} is ready", port);
                return Ok(());
            }
            Err(err) => {
                tracing::debug!(attempt, "port {} not ready yet: {}", port, err);
                if attempt >= n_retries {
                    return Err(Error::NotReady {
                        port,
                        attempts: attempt,
                    });
                }
                tokio::time::sleep(retry_interval).await;
            }
        }
    }
}
