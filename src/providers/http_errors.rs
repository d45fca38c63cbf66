use std::error::Error as StdError;
use std::io::ErrorKind;

use reqwest::StatusCode;

use crate::config::API_KEY_ENV;
use crate::model::GenerateError;

fn error_chain_has_kind(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    needle: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_kind(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_kind(err, ErrorKind::TimedOut, "timed out")
}

pub(crate) fn api_request_error(err: reqwest::Error, api_url: &str) -> GenerateError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return GenerateError::Network(format!(
            "Request to Gemini API at '{api_url}' timed out."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return GenerateError::Network(format!(
                "Connection refused by Gemini API at '{api_url}'. \
                 Check GEMINI_BASE_URL."
            ));
        }

        return GenerateError::Network(format!(
            "Failed to connect to Gemini API at '{api_url}'. \
             Check GEMINI_BASE_URL and network connectivity."
        ));
    }

    GenerateError::Network(format!("Failed to call Gemini API at '{api_url}': {err}"))
}

pub(crate) fn api_status_error(status: StatusCode, api_url: &str, body: &str) -> GenerateError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerateError::Unauthenticated(
            format!("Gemini API at '{api_url}' rejected the credential ({status}): {body}"),
        ),
        _ => GenerateError::Other(format!(
            "Gemini API request to '{api_url}' failed with status {status}: {body}"
        )),
    }
}

pub(crate) fn missing_api_key() -> GenerateError {
    GenerateError::Unauthenticated(format!("{API_KEY_ENV} is not set"))
}
