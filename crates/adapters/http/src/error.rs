//! HTTP adapter error types.

use zonekit_domain::error::ZoneKitError;

/// Errors specific to the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Request construction, connection, timeout, or status failure.
    #[error("HTTP request error")]
    Request(#[from] reqwest::Error),
}

impl HttpError {
    /// Convert into a [`ZoneKitError::Dispatch`] (callback delivery path).
    #[must_use]
    pub fn into_dispatch(self) -> ZoneKitError {
        ZoneKitError::Dispatch(Box::new(self))
    }

    /// Convert into a [`ZoneKitError::Directory`] (definition fetch path).
    #[must_use]
    pub fn into_directory(self) -> ZoneKitError {
        ZoneKitError::Directory(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_request_error() {
        // Build a reqwest error via an invalid URL parse at request time.
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = HttpError::from(err);
        assert_eq!(err.to_string(), "HTTP request error");
    }

    #[test]
    fn should_convert_into_dispatch_and_directory_variants() {
        let make = || {
            HttpError::from(reqwest::Client::new().get("not a url").build().unwrap_err())
        };
        assert!(matches!(make().into_dispatch(), ZoneKitError::Dispatch(_)));
        assert!(matches!(make().into_directory(), ZoneKitError::Directory(_)));
    }
}
