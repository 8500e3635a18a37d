//! Turns a parsed request into a response against the document root.

use std::path::Path;

use tokio::io::AsyncWrite;
use tracing::{debug, warn};

use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Body, Response, ResponseBuilder, StatusCode};
use crate::http::static_files::{self, FileInfo};
use crate::http::writer::ResponseWriter;

/// Builds the response for `request` and writes it to `out`, flushing at the end.
///
/// Returns the status that was sent.
pub async fn respond<W>(request: &Request, document_root: &Path, out: &mut W) -> anyhow::Result<StatusCode>
where
    W: AsyncWrite + Unpin,
{
    let response = build_response(request, document_root).await;
    ResponseWriter::new(&response).write_to_stream(out).await?;
    Ok(response.status)
}

pub async fn build_response(request: &Request, document_root: &Path) -> Response {
    let minor = request.minor_version;

    let builder = match request.method {
        Method::GET | Method::HEAD => file_response(request, document_root).await,
        Method::POST => Response::method_not_allowed(minor),
        _ => Response::not_implemented(minor),
    };

    let builder = if request.method == Method::HEAD {
        builder.omit_body()
    } else {
        builder
    };

    builder.build()
}

async fn file_response(request: &Request, document_root: &Path) -> ResponseBuilder {
    let minor = request.minor_version;

    let Some(path) = static_files::resolve_path(document_root, &request.path) else {
        warn!(path = %request.path, "rejected path outside the document root");
        return Response::not_found(minor);
    };

    let info = FileInfo::stat(path).await;
    if !info.is_servable() {
        debug!(path = %info.path.display(), exists = info.exists, "nothing to serve");
        return Response::not_found(minor);
    }

    let content_type = mime::content_type_for(&info.path);
    ResponseBuilder::new(StatusCode::Ok)
        .version(minor)
        .header("Content-Length", info.size.to_string())
        .header("Content-Type", content_type)
        .body(Body::File {
            path: info.path,
            len: info.size,
        })
}
