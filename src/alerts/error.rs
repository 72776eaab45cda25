use thiserror::Error;

/// Why a single delivery attempt failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The delivery settings could not be turned into a request
    #[error("Invalid delivery configuration: {0}")]
    Config(String),

    /// No response was received (DNS, connect, TLS, proxy, timeout)
    #[error("API request failed: {0}")]
    Transport(String),

    /// The API answered with something other than 200
    #[error("API request was unsuccessful ({status}): {body}")]
    Api { status: u16, body: String },
}
