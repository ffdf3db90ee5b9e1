//! Error types and handling for the `WeatherChat` application

use thiserror::Error;

/// Main error type for the `WeatherChat` application
#[derive(Error, Debug)]
pub enum WeatherChatError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport errors and non-success responses from a remote lookup
    #[error("API error: {message}")]
    Api { message: String },

    /// A remote lookup answered with a body we could not use
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherChatError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new invalid-response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Lookup failures never expose the underlying cause; it belongs in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherChatError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file.")
            }
            WeatherChatError::Api { .. } | WeatherChatError::InvalidResponse { .. } => {
                "Oops! Something went wrong while fetching the weather. Please try again. 😓"
                    .to_string()
            }
            WeatherChatError::Io { .. } => {
                "Terminal I/O failed. Please restart the chat.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for WeatherChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherChatError::invalid_response(err.to_string())
        } else {
            WeatherChatError::api(err.to_string())
        }
    }
}
