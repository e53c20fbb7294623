//! Helpers shared by the HTTP backends: classifying transport failures and
//! turning non-success responses into backend errors.

use reqwest::{Response, StatusCode};
use thiserror::Error;

pub(crate) use url::Url;

use crate::backends::{Error, ErrorKind};

fn transport_kind(err: &reqwest::Error) -> ErrorKind {
    if err.is_decode() {
        ErrorKind::UnexpectedResponse
    } else if err.is_timeout() {
        ErrorKind::TimedOut
    } else if err.is_redirect() {
        ErrorKind::UnexpectedResponse
    } else if err.is_connect() {
        ErrorKind::Connection
    } else if let Some(status) = err.status() {
        status_kind(status)
    } else {
        ErrorKind::UnspecifiedError
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::from_source(transport_kind(&value), Box::new(value))
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Error::from_source(ErrorKind::BadRequest, Box::new(value))
    }
}

/// A non-success HTTP response. The body is kept verbatim since services
/// disagree on the shape of their error documents.
#[derive(Error, Debug)]
#[error("{url} returned {status}: {body}")]
pub(crate) struct StatusError {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

pub(crate) fn status_kind(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ErrorKind::TimedOut,
        code => match code.as_u16() {
            400..=499 => ErrorKind::BadRequest,
            500..=599 => ErrorKind::InternalError,
            _ => ErrorKind::UnspecifiedError,
        },
    }
}

/// Passes successful responses through and turns anything else into an [`Error`].
pub(crate) async fn check_status(res: Response) -> Result<Response, Error> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let url = res.url().to_string();
    let body = res.text().await.unwrap_or_default();

    Err(Error::from_source(
        status_kind(status),
        Box::new(StatusError { url, status, body }),
    ))
}

/// Joins `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| {
            Error::from_source(
                ErrorKind::BadRequest,
                format!("{} cannot be used as an API base", base).into(),
            )
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
