//! Worker-side error kinds (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Transport(#[from] fleet_wire::TransportError),
    #[error("coordinator did not ACK registration")]
    RegistrationRejected,
    #[error("coordinator closed the connection before registration completed")]
    RegistrationClosed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
