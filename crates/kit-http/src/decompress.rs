use std::io::Read;

use bytes::Bytes;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH};
use http::{HeaderValue, Request, Response};
use tracing::debug;

use crate::{RoundTrip, TransportError};

pub const DEFAULT_MAX_DECODED_BYTES: usize = 32 * 1024 * 1024;
const ADVERTISED_ENCODINGS: &str = "gzip, deflate, br, zstd";
const SUPPORTED: [&str; 5] = ["gzip", "x-gzip", "deflate", "br", "zstd"];
const BROTLI_BUFFER: usize = 4096;

/// Decodes `Content-Encoding` response bodies (gzip, deflate, br, zstd).
///
/// Responses with an unsupported encoding are passed through untouched.
#[derive(Debug, Clone)]
pub struct Decompress<T> {
    inner: T,
    advertise: bool,
    max_decoded_bytes: usize,
}

impl<T> Decompress<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            advertise: true,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }

    /// Whether to add `Accept-Encoding` to requests that lack one.
    pub fn advertise(mut self, advertise: bool) -> Self {
        self.advertise = advertise;
        self
    }

    pub fn max_decoded_bytes(mut self, limit: usize) -> Self {
        self.max_decoded_bytes = limit;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn decode(&self, response: Response<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let encodings = content_encodings(&response);
        if encodings.is_empty() || response.body().is_empty() {
            return Ok(response);
        }
        if let Some(unknown) = encodings.iter().find(|e| !SUPPORTED.contains(&e.as_str())) {
            debug!(encoding = %unknown, "unsupported content-encoding, passing through");
            return Ok(response);
        }

        let (mut parts, body) = response.into_parts();
        let mut data = body.to_vec();
        for encoding in encodings.iter().rev() {
            data = decode_layer(encoding, &data, self.max_decoded_bytes)?;
        }

        parts.headers.remove(CONTENT_ENCODING);
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(data.len()));
        Ok(Response::from_parts(parts, Bytes::from(data)))
    }
}

fn content_encodings(response: &Response<Bytes>) -> Vec<String> {
    response
        .headers()
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e != "identity")
        .collect()
}

fn decode_layer(encoding: &str, input: &[u8], limit: usize) -> Result<Vec<u8>, TransportError> {
    match encoding {
        "gzip" | "x-gzip" => read_limited(flate2::read::MultiGzDecoder::new(input), encoding, limit),
        "deflate" => match read_limited(flate2::read::ZlibDecoder::new(input), encoding, limit) {
            Err(TransportError::Decode { .. }) => {
                read_limited(flate2::read::DeflateDecoder::new(input), encoding, limit)
            }
            other => other,
        },
        "br" => read_limited(brotli::Decompressor::new(input, BROTLI_BUFFER), encoding, limit),
        "zstd" => {
            let decoder = zstd::stream::read::Decoder::new(input).map_err(|source| TransportError::Decode {
                encoding: encoding.to_string(),
                source,
            })?;
            read_limited(decoder, encoding, limit)
        }
        other => Err(TransportError::Decode {
            encoding: other.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Unsupported, "unsupported encoding"),
        }),
    }
}

fn read_limited<R: Read>(reader: R, encoding: &str, limit: usize) -> Result<Vec<u8>, TransportError> {
    let mut out = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|source| TransportError::Decode {
            encoding: encoding.to_string(),
            source,
        })?;
    if out.len() > limit {
        return Err(TransportError::BodyTooLarge { limit });
    }
    Ok(out)
}

impl<T: RoundTrip> RoundTrip for Decompress<T> {
    async fn round_trip(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        if self.advertise && !request.headers().contains_key(ACCEPT_ENCODING) {
            request
                .headers_mut()
                .insert(ACCEPT_ENCODING, HeaderValue::from_static(ADVERTISED_ENCODINGS));
        }
        let response = self.inner.round_trip(request).await?;
        self.decode(response)
    }
}
