// Chunked snapshot streaming - one length-prefixed JSON frame per snapshot
use crate::domain::window::WindowSnapshot;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Create a chunked streaming response of snapshots.
pub fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = WindowSnapshot> + Send + 'static,
{
    let byte_stream = stream.then(move |snapshot| async move { encode_chunk(&snapshot, compress).await });

    // Frames are compressed one by one, so no Content-Encoding on the response.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndframe+json")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Encode one snapshot as `u32` big-endian length + JSON (optionally Brotli).
pub async fn encode_chunk(snapshot: &WindowSnapshot, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(snapshot).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len()).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current snapshot and then every later one the reader keeps up with.
pub fn stream_from_watch(rx: watch::Receiver<WindowSnapshot>, compress: bool) -> impl IntoResponse {
    let snapshots = async_stream::stream! {
        let mut updates = WatchStream::new(rx);
        while let Some(snapshot) = updates.next().await {
            yield snapshot;
        }
    };

    match chunked_json_stream(snapshots, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
