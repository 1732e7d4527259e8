use alloc::sync::Arc;
use std::io;

use log::debug;
use rustls::crypto::CryptoProvider;
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use rustls::{ServerConfig, ServerConnection};

use crate::buffer::MemBuffer;
use crate::error::Error;

/// A long-lived factory for sessions and their buffers.
///
/// One context is shared, read-only, by every worker thread.
pub trait SessionContext: Send + Sync {
    /// The duplex byte buffer type bound into sessions.
    type Buffer;

    /// The session type this context creates.
    type Session: Session<Buffer = Self::Buffer>;

    /// Creates a fresh, unbound session.
    fn new_session(&self) -> Result<Self::Session, Error>;

    /// Creates an empty buffer.
    fn new_buffer(&self) -> Result<Self::Buffer, Error>;
}

/// One endpoint's in-memory protocol state.
///
/// Dropping a session releases it, and with it any buffers it was given.
pub trait Session {
    type Buffer;

    /// Hands `rbuf` (bytes from the peer) and `wbuf` (bytes to the peer) to
    /// the session, which owns them from now on.
    fn bind(&mut self, rbuf: Self::Buffer, wbuf: Self::Buffer);
}

/// Which crypto provider backs the server context.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Provider {
    #[cfg(feature = "aws-lc-rs")]
    AwsLcRs,
    #[cfg(feature = "ring")]
    Ring,
}

impl Provider {
    pub fn build(self) -> CryptoProvider {
        match self {
            #[cfg(feature = "aws-lc-rs")]
            Self::AwsLcRs => rustls::crypto::aws_lc_rs::default_provider(),
            #[cfg(feature = "ring")]
            Self::Ring => rustls::crypto::ring::default_provider(),
        }
    }

    /// Every provider enabled in this build, most preferred first.
    pub fn available() -> Vec<Self> {
        #[allow(unused_mut)]
        let mut available: Vec<Self> = vec![];

        #[cfg(feature = "aws-lc-rs")]
        available.push(Self::AwsLcRs);

        #[cfg(feature = "ring")]
        available.push(Self::Ring);

        available
    }

    /// The provider enabled in this build, preferring aws-lc-rs when several are.
    pub fn choose_default() -> Option<Self> {
        Self::available().first().copied()
    }
}

/// The shared server-side context: an `Arc<ServerConfig>` from which every
/// session is made.
///
/// No certificate is configured: handshakes with these sessions fail.
#[derive(Debug)]
pub struct ServerContext {
    config: Arc<ServerConfig>,
}

impl ServerContext {
    pub fn new(provider: Provider) -> Result<Self, Error> {
        debug!("creating server context with {provider:?}");
        let config = ServerConfig::builder_with_provider(Arc::new(provider.build()))
            .with_safe_default_protocol_versions()
            .map_err(Error::Context)?
            .with_no_client_auth()
            .with_cert_resolver(Arc::new(NoServerCertificate));

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Creates a context with [`Provider::choose_default`].
    pub fn with_default_provider() -> Result<Self, Error> {
        Self::new(Provider::choose_default().ok_or(Error::NoProvider)?)
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }
}

impl SessionContext for ServerContext {
    type Buffer = MemBuffer;
    type Session = TlsSession;

    fn new_session(&self) -> Result<TlsSession, Error> {
        ServerConnection::new(self.config.clone())
            .map(TlsSession::new)
            .map_err(Error::Session)
    }

    fn new_buffer(&self) -> Result<MemBuffer, Error> {
        Ok(MemBuffer::new())
    }
}

#[derive(Debug)]
struct NoServerCertificate;

impl ResolvesServerCert for NoServerCertificate {
    fn resolve(&self, _client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        None
    }
}

/// A rustls server connection plus the buffers it reads from and writes to.
#[derive(Debug)]
pub struct TlsSession {
    conn: ServerConnection,
    rbuf: Option<MemBuffer>,
    wbuf: Option<MemBuffer>,
}

impl TlsSession {
    fn new(conn: ServerConnection) -> Self {
        Self {
            conn,
            rbuf: None,
            wbuf: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.rbuf.is_some() && self.wbuf.is_some()
    }

    pub fn connection(&self) -> &ServerConnection {
        &self.conn
    }

    /// The buffer the peer's bytes are placed in.
    pub fn rbuf_mut(&mut self) -> Option<&mut MemBuffer> {
        self.rbuf.as_mut()
    }

    /// The buffer the session's output lands in.
    pub fn wbuf_mut(&mut self) -> Option<&mut MemBuffer> {
        self.wbuf.as_mut()
    }

    /// Moves everything waiting in the read buffer into the connection, then
    /// processes it.  Returns how many bytes were consumed.
    pub fn read_tls(&mut self) -> Result<usize, Error> {
        let rbuf = self.rbuf.as_mut().ok_or(Error::Unbound)?;

        let mut consumed = 0;
        loop {
            match self.conn.read_tls(rbuf) {
                Ok(0) => break,
                Ok(n) => consumed += n,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => return Err(err.into()),
            }
        }

        self.conn.process_new_packets().map_err(Error::Tls)?;
        Ok(consumed)
    }

    /// Moves all pending TLS output into the write buffer.  Returns how many
    /// bytes were written.
    pub fn write_tls(&mut self) -> Result<usize, Error> {
        let wbuf = self.wbuf.as_mut().ok_or(Error::Unbound)?;

        let mut written = 0;
        while self.conn.wants_write() {
            match self.conn.write_tls(wbuf) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(written)
    }
}

impl Session for TlsSession {
    type Buffer = MemBuffer;

    fn bind(&mut self, rbuf: MemBuffer, wbuf: MemBuffer) {
        self.rbuf = Some(rbuf);
        self.wbuf = Some(wbuf);
    }
}
