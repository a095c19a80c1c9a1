//! Error taxonomy for txload
//!
//! Every failure the harness can hit falls into one of four kinds. The kind
//! decides the policy: configuration problems end the process, bind failures
//! end one listener, accept failures are skipped, and I/O failures end one
//! connection. Nothing is retried.

use thiserror::Error;

/// Result type alias for txload operations
pub type Result<T> = std::result::Result<T, TxLoadError>;

/// Error kinds, one per failure domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration missing or malformed
    Config,
    /// A listening port could not be bound
    Listen,
    /// A listener failed to accept one connection
    Accept,
    /// Dial, read or write failure on an established or pending connection
    Connection,
}

/// What the owner of a failing unit does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Report to the operator and exit the process
    Exit,
    /// Stop the listener for this port, keep the others running
    StopListener,
    /// Log and keep accepting
    Continue,
    /// Log and end this connection's loop only
    AbandonConnection,
}

impl ErrorKind {
    /// Policy applied to errors of this kind
    pub fn policy(self) -> ErrorPolicy {
        match self {
            ErrorKind::Config => ErrorPolicy::Exit,
            ErrorKind::Listen => ErrorPolicy::StopListener,
            ErrorKind::Accept => ErrorPolicy::Continue,
            ErrorKind::Connection => ErrorPolicy::AbandonConnection,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Listen => write!(f, "listen"),
            ErrorKind::Accept => write!(f, "accept"),
            ErrorKind::Connection => write!(f, "connection"),
        }
    }
}

/// Socket operation in progress when a connection failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    Dial,
    Read,
    Write,
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoStage::Dial => write!(f, "dial"),
            IoStage::Read => write!(f, "read"),
            IoStage::Write => write!(f, "write"),
        }
    }
}

/// Main error type for txload
#[derive(Debug, Error)]
pub enum TxLoadError {
    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Binding a listening port failed
    #[error("Failed to listen on port {port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a connection failed
    #[error("Failed to accept connection on port {port}: {source}")]
    Accept {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on a connection
    #[error("Connection error on port {port} during {stage}: {source}")]
    Connection {
        port: u16,
        stage: IoStage,
        #[source]
        source: std::io::Error,
    },

    /// Peer closed the connection
    #[error("Connection on port {port} closed by peer")]
    ConnectionClosed { port: u16 },

    /// Deadline elapsed on a connection
    #[error("Connection on port {port} timed out during {stage}")]
    Timeout { port: u16, stage: IoStage },
}

impl TxLoadError {
    /// Create a connection error for the given stage
    pub fn connection(port: u16, stage: IoStage, source: std::io::Error) -> Self {
        TxLoadError::Connection {
            port,
            stage,
            source,
        }
    }

    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TxLoadError::Config(_) => ErrorKind::Config,
            TxLoadError::Listen { .. } => ErrorKind::Listen,
            TxLoadError::Accept { .. } => ErrorKind::Accept,
            TxLoadError::Connection { .. }
            | TxLoadError::ConnectionClosed { .. }
            | TxLoadError::Timeout { .. } => ErrorKind::Connection,
        }
    }

    /// Policy the owner applies to this error
    pub fn policy(&self) -> ErrorPolicy {
        self.kind().policy()
    }

    /// Whether this error ends the process
    pub fn is_fatal(&self) -> bool {
        self.policy() == ErrorPolicy::Exit
    }

    /// Whether the error is an orderly end of stream rather than a fault.
    ///
    /// Covers a zero-length read and the reset/abort family of socket errors.
    pub fn is_peer_close(&self) -> bool {
        match self {
            TxLoadError::ConnectionClosed { .. } => true,
            TxLoadError::Connection { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_kind_policies() {
        assert_eq!(ErrorKind::Config.policy(), ErrorPolicy::Exit);
        assert_eq!(ErrorKind::Listen.policy(), ErrorPolicy::StopListener);
        assert_eq!(ErrorKind::Accept.policy(), ErrorPolicy::Continue);
        assert_eq!(ErrorKind::Connection.policy(), ErrorPolicy::AbandonConnection);
    }

    #[test]
    fn test_error_kinds() {
        let listen = TxLoadError::Listen {
            port: 8001,
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(listen.kind(), ErrorKind::Listen);
        assert!(!listen.is_fatal());

        let timeout = TxLoadError::Timeout {
            port: 8001,
            stage: IoStage::Read,
        };
        assert_eq!(timeout.kind(), ErrorKind::Connection);
        assert_eq!(timeout.policy(), ErrorPolicy::AbandonConnection);

        assert!(TxLoadError::Config("bad".to_string()).is_fatal());
    }

    #[test]
    fn test_peer_close_detection() {
        assert!(TxLoadError::ConnectionClosed { port: 1 }.is_peer_close());

        let reset = TxLoadError::connection(
            1,
            IoStage::Read,
            io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        );
        assert!(reset.is_peer_close());

        let refused = TxLoadError::connection(
            1,
            IoStage::Dial,
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert!(!refused.is_peer_close());
    }

    #[test]
    fn test_error_display() {
        let err = TxLoadError::connection(
            8003,
            IoStage::Write,
            io::Error::new(io::ErrorKind::BrokenPipe, "pipe"),
        );
        assert_eq!(
            err.to_string(),
            "Connection error on port 8003 during write: pipe"
        );
    }
}
