//! Line-oriented transport loop.

use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::context::AppContext;
use crate::mcp::protocol::{handle_message, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR};
use crate::types::Result;

/// Serve JSON-RPC on the process's stdin and stdout until EOF.
pub async fn serve_stdio(ctx: &AppContext) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(ctx, reader, writer).await
}

/// Serve newline-delimited JSON-RPC over any reader/writer pair.
///
/// Messages are handled in arrival order; each reply is written as one line.
/// A line that is too long or not UTF-8 gets an error reply and the loop
/// moves on to the next line. Only I/O failures end the session early.
pub async fn serve<R, W>(ctx: &AppContext, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let max_bytes = ctx.config().ipc.max_frame_bytes as usize;
    let mut buf = Vec::new();
    tracing::info!("Serving tool protocol on stdio");

    loop {
        buf.clear();
        let response = match read_line_bounded(&mut reader, &mut buf, max_bytes).await? {
            LineRead::Closed => {
                tracing::info!("Input closed, stopping");
                break;
            }
            LineRead::Oversized(bytes) => {
                tracing::warn!(bytes, "Oversized JSON-RPC message");
                Some(JsonRpcResponse::error(
                    Value::Null,
                    INVALID_REQUEST,
                    "request too large",
                ))
            }
            LineRead::Line => match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }
                    handle_message(ctx, message).await
                }
                Err(e) => {
                    tracing::debug!(error = %e, "JSON-RPC message is not UTF-8");
                    Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "parse error"))
                }
            },
        };

        if let Some(response) = response {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

enum LineRead {
    Closed,
    Line,
    /// Line longer than the limit; carries the number of bytes skipped.
    Oversized(usize),
}

/// Read one line into `buf`, never buffering more than `max_bytes + 1` bytes.
///
/// The remainder of an oversized line is consumed and dropped so the next
/// read starts on a fresh line.
async fn read_line_bounded<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max_bytes as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(LineRead::Closed);
    }
    if buf.last() == Some(&b'\n') || buf.len() <= max_bytes {
        return Ok(LineRead::Line);
    }
    let skipped = discard_line(reader).await?;
    Ok(LineRead::Oversized(buf.len() + skipped))
}

async fn discard_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }
        let (consumed, done) = match available.iter().position(|b| *b == b'\n') {
            Some(end) => (end + 1, true),
            None => (available.len(), false),
        };
        reader.consume(consumed);
        skipped += consumed;
        if done {
            return Ok(skipped);
        }
    }
}
