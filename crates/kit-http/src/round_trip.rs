use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use crate::TransportError;

/// A single HTTP request/response exchange.
///
/// Decorators such as [`Decompress`](crate::Decompress) and
/// [`Logging`](crate::Logging) wrap one `RoundTrip` in another.
pub trait RoundTrip: Send + Sync {
    fn round_trip(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send;
}

impl<T: RoundTrip + ?Sized> RoundTrip for &T {
    fn round_trip(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send {
        (**self).round_trip(request)
    }
}

impl<T: RoundTrip + ?Sized> RoundTrip for Arc<T> {
    fn round_trip(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send {
        (**self).round_trip(request)
    }
}

pub trait RoundTripExt: RoundTrip {
    fn get(&self, url: &str) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send {
        let request = Request::get(url)
            .body(Bytes::new())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()));
        async move { self.round_trip(request?).await }
    }
}

impl<T: RoundTrip + ?Sized> RoundTripExt for T {}
