//! Error taxonomy for backend calls
//!
//! User-facing messages stay in the clinic's language; the variants are what
//! the view-models and the CLI branch on.

use thiserror::Error;

/// Errors that can occur when talking to the clinic backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all (connection refused, DNS, dropped socket)
    #[error("No se recibió respuesta del servidor")]
    Network(String),

    #[error("Tiempo de espera agotado")]
    Timeout,

    /// The server answered with a non-2xx status
    #[error("El servidor rechazó la solicitud ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The body did not match the expected shape
    #[error("Respuesta del servidor con formato inesperado: {0}")]
    Decode(String),

    /// Login reported `success: false`; carries the server's message
    #[error("{0}")]
    LoginFailed(String),

    /// An authenticated call was issued with no stored token
    #[error("No se encontró el token")]
    MissingToken,
}
