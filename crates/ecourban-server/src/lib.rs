//! # EcoUrban Server
//!
//! HTTP endpoint over the core predictor:
//!
//! - `GET /` health message
//! - `POST /predict-energy` with `{"last_24_values": [..24 numbers..]}`
//!
//! Each connection carries one request and is handled on its own task. The
//! prediction itself runs on the blocking pool.

pub mod http;
pub mod routes;
pub mod state;

pub use routes::{handle, ApiError, PredictRequest, PredictResponse};
pub use state::AppState;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use http::{read_request, HttpError, Response};

/// Accept connections forever.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &state).await {
                debug!(%peer, "connection error: {e}");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, state: &AppState) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let response = match read_request(&mut reader).await {
        Ok(Some(request)) => handle(state, request).await,
        Ok(None) => return Ok(()),
        Err(HttpError::Io(e)) => return Err(e),
        Err(HttpError::TooLarge) => Response::detail(413, "Request too large"),
        Err(e) => {
            warn!("{e}");
            Response::detail(400, &e.to_string())
        }
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await
}
