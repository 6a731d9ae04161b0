/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer sent a line longer than the transport accepts. The rest
    /// of that line has been discarded; the connection is still usable.
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    /// A write did not complete within the configured deadline.
    #[error("write timed out after {0:?}")]
    Timeout(std::time::Duration),
}
