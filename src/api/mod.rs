mod error;
mod protocol;
mod router;
mod server;

use std::io::{self, BufRead, Write};

use serde_json::json;

pub use error::ApiError;
pub use protocol::{ApiMessage, ApiMessageContent, ApiRequest, ApiResponse};
pub use router::{resolve, Route};
pub use server::{read_message, value_as_id, write_message, ApiServer, MAX_FRAME_SIZE};

fn is_disconnect(path: &str) -> bool {
    path.trim_matches('/') == "disconnect"
}

/// Serve framed requests from `reader` until end of input or a disconnect request.
pub fn run_server_mode<R: BufRead, W: Write>(
    server: &mut ApiServer,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<()> {
    tracing::info!("API server starting");
    let mut msg_count = 0u64;

    loop {
        let msg = match read_message(reader) {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                tracing::info!("Input closed after {} messages", msg_count);
                break;
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Dropping malformed message: {}", err);
                continue;
            }
            Err(err) => return Err(err),
        };
        msg_count += 1;
        tracing::debug!("Received message #{}: {:?}", msg_count, msg.content);

        match msg.content {
            ApiMessageContent::Request { method, path, body } if msg.msg_type == "request" => {
                if is_disconnect(&path) {
                    let reply = server.respond(msg.seq, ApiResponse::ok(json!({ "success": true })));
                    write_message(writer, &reply)?;
                    break;
                }
                let response = server.dispatch(&ApiRequest { method, path, body });
                let reply = server.respond(msg.seq, response);
                write_message(writer, &reply)?;
            }
            _ => {
                tracing::warn!("Ignoring {} message #{}", msg.msg_type, msg.seq);
            }
        }
    }

    tracing::info!("API server exiting");
    Ok(())
}
