use http::StatusCode;

use super::ActorError;
use crate::transport::{ResponseBody, TransportResponse};

/// The response captured by the most recent send.
#[derive(Debug)]
pub(super) struct LastResponse {
    status: StatusCode,
    body: Option<ResponseBody>,
}

impl LastResponse {
    pub(super) fn status(&self) -> StatusCode {
        self.status
    }

    /// Reads the whole body; a body can only be taken once.
    pub(super) fn take_body(&mut self) -> Result<Vec<u8>, ActorError> {
        let body = self.body.take().ok_or(ActorError::BodyConsumed)?;
        body.into_bytes()
            .map_err(|error| ActorError::BodyReadError { error })
    }

    pub(super) fn take_text(&mut self) -> Result<String, ActorError> {
        let bytes = self.take_body()?;
        String::from_utf8(bytes).map_err(|error| ActorError::NotText { error })
    }
}

impl From<TransportResponse> for LastResponse {
    fn from(response: TransportResponse) -> Self {
        Self {
            status: response.status,
            body: Some(response.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use http::HeaderMap;

    use super::*;

    fn last_response(body: ResponseBody) -> LastResponse {
        LastResponse::from(TransportResponse {
            status: StatusCode::CREATED,
            headers: HeaderMap::new(),
            body,
        })
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_body_can_be_taken_once() {
        let mut response = last_response(ResponseBody::from_bytes("hello"));

        let first = response.take_text().expect("first read");
        let second = response.take_body();

        assert_eq!(first, "hello");
        assert!(matches!(second, Err(ActorError::BodyConsumed)));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_body_read_error() {
        let mut response = last_response(ResponseBody::from_reader(BrokenReader));

        let result = response.take_body();

        insta::assert_snapshot!(
            result.expect_err("should fail"),
            @"cannot read response: reset"
        );
    }

    #[test]
    fn test_body_not_text() {
        let mut response = last_response(ResponseBody::from_bytes(vec![0xff, 0xfe]));

        let result = response.take_text();

        assert!(matches!(result, Err(ActorError::NotText { .. })));
    }
}
