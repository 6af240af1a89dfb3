//! Response side of the transport collaborator.
//!
//! [`ResponseHandle`] buffers the status, headers and body for one request.
//! Writing the body is an exclusive, single-write operation; a second write is
//! a programming error and is reported, not silently ignored. The finished
//! body is handed to the transport as a [`ResponseBody`] implementing
//! [`http_body::Body`].

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use crate::error::ExecuteError;

#[derive(Debug)]
pub struct ResponseHandle {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
    body_written: bool,
    aborted: Arc<AtomicBool>,
}

impl ResponseHandle {
    pub(crate) fn new(aborted: Arc<AtomicBool>) -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: None, body_written: false, aborted }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body_written(&self) -> bool {
        self.body_written
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Writes the response body.
    ///
    /// Fails with [`ExecuteError::ResponseAlreadyWritten`] on a second write
    /// and with [`ExecuteError::Aborted`] when the request was aborted.
    pub fn write_body(&mut self, bytes: Bytes) -> Result<(), ExecuteError> {
        if self.aborted.load(Ordering::Acquire) {
            return Err(ExecuteError::Aborted);
        }
        if self.body_written {
            return Err(ExecuteError::ResponseAlreadyWritten);
        }
        self.body_written = true;
        self.body = Some(bytes);
        Ok(())
    }

    /// Consumes the handle, yielding the body for the transport to stream out.
    pub fn into_body(self) -> ResponseBody {
        ResponseBody { inner: self.body }
    }
}

/// A buffered, write-once response body.
#[derive(Debug)]
pub struct ResponseBody {
    inner: Option<Bytes>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn once(bytes: Bytes) -> Self {
        Self { inner: Some(bytes) }
    }
}

impl From<Option<Bytes>> for ResponseBody {
    fn from(option: Option<Bytes>) -> Self {
        match option {
            Some(bytes) => Self::once(bytes),
            None => Self::empty(),
        }
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let inner = &mut self.get_mut().inner;
        match inner.take() {
            Some(bytes) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            Some(bytes) => SizeHint::with_exact(bytes.len() as u64),
            None => SizeHint::with_exact(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ResponseBody, ResponseHandle};
    use crate::error::ExecuteError;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body::Body as HttpBody;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn handle() -> (ResponseHandle, Arc<AtomicBool>) {
        let aborted = Arc::new(AtomicBool::new(false));
        (ResponseHandle::new(Arc::clone(&aborted)), aborted)
    }

    #[test]
    fn second_write_is_reported() {
        let (mut response, _) = handle();
        response.write_body(Bytes::from_static(b"first")).unwrap();
        let err = response.write_body(Bytes::from_static(b"second")).unwrap_err();
        assert!(matches!(err, ExecuteError::ResponseAlreadyWritten));
        // first write stays intact
        assert_eq!(response.body(), Some(&Bytes::from_static(b"first")));
    }

    #[test]
    fn write_after_abort_is_reported_not_a_crash() {
        let (mut response, aborted) = handle();
        aborted.store(true, Ordering::Release);
        let err = response.write_body(Bytes::from_static(b"late")).unwrap_err();
        assert!(matches!(err, ExecuteError::Aborted));
        assert!(!response.body_written());
    }

    #[test]
    fn defaults_to_ok_with_no_body() {
        let (response, _) = handle();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_none());
        assert!(response.into_body().is_end_stream());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn body_yields_single_frame() {
        let (mut response, _) = handle();
        response.write_body(Bytes::from_static(b"hello")).unwrap();

        let mut body = response.into_body();
        assert_eq!(body.size_hint().exact(), Some(5));
        assert!(!body.is_end_stream());

        let frame = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(frame, Bytes::from_static(b"hello"));

        assert!(body.is_end_stream());
        assert!(body.frame().await.is_none());
    }
}
