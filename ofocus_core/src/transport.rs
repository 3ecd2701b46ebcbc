use serde_json::Value;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::mcp_server::JsonRpcHandler;

/// Newline-delimited JSON-RPC over stdin/stdout. Stdout carries protocol
/// messages only.
pub struct StdioTransport {
    handler: JsonRpcHandler,
}

impl StdioTransport {
    pub fn new(handler: JsonRpcHandler) -> Self {
        Self { handler }
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> io::Result<()> {
        info!("Starting stdio transport");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        info!("stdio transport finished");
        Ok(())
    }

    /// Answer each line of `input` on `output`, one request at a time and in
    /// arrival order. Returns at end of input.
    pub async fn serve<R, W>(&self, input: R, mut output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    return Ok(());
                }
                Err(e) => {
                    error!("Error reading request line: {}", e);
                    return Err(e);
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.respond(&line).await {
                write_response(&mut output, &response).await?;
            }
        }
    }

    /// The reply for one input line, if it needs one.
    pub async fn respond(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(request) => self.handler.handle_request(request).await,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                Some(serde_json::json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": -32700,
                        "message": "Parse error",
                        "data": e.to_string()
                    },
                    "id": null
                }))
            }
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(output: &mut W, response: &Value) -> io::Result<()> {
    let mut encoded = serde_json::to_vec(response)?;
    encoded.push(b'\n');
    output.write_all(&encoded).await?;
    output.flush().await?;

    debug!(bytes = encoded.len(), "sent response");
    Ok(())
}
