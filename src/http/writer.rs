use std::io;
use std::path::Path;

use anyhow::Context;
use bytes::{BufMut, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response};

/// Block size used when copying a file to the peer.
pub const BUFFER_SIZE: usize = 8192;

/// Status line, headers and the blank separator line.
pub fn serialize_head(resp: &Response) -> BytesMut {
    let mut buf = BytesMut::with_capacity(256);

    // Status line
    buf.put_slice(
        format!(
            "HTTP/1.{} {} {}\r\n",
            resp.minor_version,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );

    // Headers
    for (k, v) in &resp.headers {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    buf
}

pub struct ResponseWriter<'a> {
    response: &'a Response,
    head: BytesMut,
    written: usize,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(response: &'a Response) -> Self {
        Self {
            response,
            head: serialize_head(response),
            written: 0,
        }
    }

    /// Writes the whole response and flushes `stream`.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.head.len() {
            let n = stream.write(&self.head[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                )
                .into());
            }

            self.written += n;
        }

        match &self.response.body {
            Body::Empty => {}
            Body::Bytes(bytes) => stream.write_all(bytes).await?,
            Body::File { path, .. } => copy_file(path, stream).await?,
        }

        stream.flush().await?;
        Ok(())
    }
}

async fn copy_file<W>(path: &Path, stream: &mut W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut file = File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut block = vec![0u8; BUFFER_SIZE];

    loop {
        let n = file
            .read(&mut block)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        stream.write_all(&block[..n]).await?;
    }

    Ok(())
}
