//! Remote console (RCON) sessions with the game server.

pub mod packet;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use packet::Packet;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("RCON connection failed")]
    Io(#[from] std::io::Error),
    #[error("cannot resolve RCON address {0}")]
    AddressUnresolved(String),
    #[error("RCON session is not connected")]
    NotConnected,
    #[error("RCON password was rejected")]
    AuthenticationRejected,
    #[error("malformed RCON packet: {0}")]
    MalformedPacket(String),
    #[error("RCON command of {len} bytes exceeds the packet body limit")]
    CommandTooLong { len: usize },
}

/// Raw response to a console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Body that is not valid UTF-8.
    Binary(Vec<u8>),
}

impl From<Vec<u8>> for Reply {
    fn from(body: Vec<u8>) -> Self {
        return match String::from_utf8(body) {
            Ok(n) => Reply::Text(n),
            Err(err) => Reply::Binary(err.into_bytes()),
        };
    }
}

/// An authenticated text command channel to the game server.
pub trait Console {
    /// Open the session, if not yet open, and log in.
    fn authenticate(&mut self, password: &str) -> Result<(), Error>;

    fn execute(&mut self, command: &str) -> Result<Reply, Error>;

    /// Close the session. Closing a session that is not open does nothing.
    fn disconnect(&mut self) -> Result<(), Error>;
}

/// Where an RCON server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}:{}", self.host, self.port);
    }
}

/// Source RCON client over TCP, as spoken by Factorio.
pub struct RconClient {
    endpoint: Endpoint,
    timeout: std::time::Duration,
    stream: Option<TcpStream>,
    last_id: i32,
}

impl RconClient {
    pub fn new(endpoint: Endpoint, timeout: std::time::Duration) -> Self {
        return Self {
            endpoint,
            timeout,
            stream: None,
            last_id: 0,
        };
    }

    pub fn is_connected(&self) -> bool {
        return self.stream.is_some();
    }

    fn next_id(&mut self) -> i32 {
        // Keep clear of the -1 used for rejected logins.
        self.last_id = if self.last_id == i32::MAX { 1 } else { self.last_id + 1 };
        return self.last_id;
    }

    fn connect(&mut self) -> Result<&mut TcpStream, Error> {
        if self.stream.is_none() {
            let addr: SocketAddr = (self.endpoint.host.as_str(), self.endpoint.port)
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| Error::AddressUnresolved(self.endpoint.to_string()))?;
            let stream: TcpStream = TcpStream::connect_timeout(&addr, self.timeout)?;
            stream.set_read_timeout(Some(self.timeout))?;
            stream.set_write_timeout(Some(self.timeout))?;
            log::debug!("Connected to RCON at {}", self.endpoint);
            self.stream = Some(stream);
        }
        return self.stream.as_mut().ok_or(Error::NotConnected);
    }
}

impl Console for RconClient {
    fn authenticate(&mut self, password: &str) -> Result<(), Error> {
        let id: i32 = self.next_id();
        let stream: &mut TcpStream = self.connect()?;
        packet::write(stream, &Packet::new(id, packet::TYPE_AUTH, password))?;

        loop {
            let response: Packet = packet::read(stream)?;
            match response.kind {
                packet::TYPE_AUTH_RESPONSE if response.id == packet::ID_AUTH_REJECTED => {
                    return Err(Error::AuthenticationRejected);
                }
                packet::TYPE_AUTH_RESPONSE if response.id == id => {
                    log::debug!("Authenticated to RCON");
                    return Ok(());
                }
                // Servers send an empty response value ahead of the auth response.
                _ => log::trace!(
                    "Skipping RCON packet id {} type {} while authenticating",
                    response.id,
                    response.kind
                ),
            }
        }
    }

    fn execute(&mut self, command: &str) -> Result<Reply, Error> {
        let id: i32 = self.next_id();
        let stream: &mut TcpStream = match self.stream.as_mut() {
            Some(n) => n,
            None => return Err(Error::NotConnected),
        };
        packet::write(stream, &Packet::new(id, packet::TYPE_EXEC_COMMAND, command))?;
        log::debug!("Sent RCON command '{command}' -- Waiting for response...");

        loop {
            let response: Packet = packet::read(stream)?;
            if response.id == id && response.kind == packet::TYPE_RESPONSE_VALUE {
                log::trace!("RCON response of {} bytes", response.body.len());
                return Ok(Reply::from(response.body));
            }
            log::trace!(
                "Skipping RCON packet id {} type {} while waiting for id {id}",
                response.id,
                response.kind
            );
        }
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        if let Some(stream) = self.stream.take() {
            match stream.shutdown(std::net::Shutdown::Both) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {}
                Err(err) => return Err(Error::Io(err)),
            }
            log::debug!("Disconnected from RCON at {}", self.endpoint);
        }
        return Ok(());
    }
}

impl Drop for RconClient {
    fn drop(&mut self) {
        _ = self.disconnect();
    }
}
