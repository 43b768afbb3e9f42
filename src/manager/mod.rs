//! Single entry point for managing a Factorio server: its lifecycle through a
//! [`Server`], and its players through an optional RCON [`Console`].

use std::sync::LazyLock;

use crate::constants::RCON_COMMAND_PLAYERS_ONLINE;
use crate::rcon::{Console, Reply};
use crate::server::Server;
use crate::state::ServerState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("RCON client not provided")]
    MissingConsole,
    #[error("RCON password not provided")]
    MissingPassword,
    #[error("cannot list players over RCON")]
    Console(#[from] crate::rcon::Error),
    #[error(transparent)]
    Server(#[from] crate::server::Error),
}

pub struct ServerManager<S: Server> {
    server: S,
    console: Option<Box<dyn Console>>,
    password: Option<String>,
}

impl<S: Server> ServerManager<S> {
    /// Manager without a console: [`ServerManager::players`] fails until one
    /// is set.
    pub fn new(server: S) -> Self {
        return Self {
            server,
            console: None,
            password: None,
        };
    }

    pub fn with_console(mut self, console: Box<dyn Console>, password: impl Into<String>) -> Self {
        self.set_console_configuration(console, password);
        return self;
    }

    pub fn set_console_configuration(&mut self, console: Box<dyn Console>, password: impl Into<String>) {
        self.console = Some(console);
        self.password = Some(password.into());
    }

    pub fn server(&self) -> &S {
        return &self.server;
    }

    pub fn state(&self) -> ServerState {
        return self.server.state();
    }

    pub fn start(&self) -> Result<(), Error> {
        self.server.start()?;
        return Ok(());
    }

    pub fn stop(&self) -> Result<(), Error> {
        self.server.stop()?;
        return Ok(());
    }

    /// Usernames of the players online, queried over RCON.
    ///
    /// The console session is closed before returning, whether the query
    /// succeeded or not.
    pub fn players(&mut self) -> Result<Vec<String>, Error> {
        let console: &mut Box<dyn Console> = self.console.as_mut().ok_or(Error::MissingConsole)?;
        let password: &str = match self.password.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => return Err(Error::MissingPassword),
        };

        let mut session: Session = Session::new(&mut **console);
        let queried: Result<Vec<String>, crate::rcon::Error> = session.list_players(password);
        let closed: Result<(), crate::rcon::Error> = session.close();

        match (queried, closed) {
            (Ok(players), Ok(())) => return Ok(players),
            (Ok(_), Err(err)) => return Err(Error::Console(err)),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    log::warn!("Cannot disconnect RCON session after failed query: {close_err}");
                }
                return Err(Error::Console(err));
            }
        }
    }
}

/// Console session that is disconnected exactly once: by [`Session::close`],
/// or on drop if that was never reached.
struct Session<'c> {
    console: &'c mut dyn Console,
    open: bool,
}

impl<'c> Session<'c> {
    fn new(console: &'c mut dyn Console) -> Self {
        return Self {
            console,
            open: true,
        };
    }

    fn list_players(&mut self, password: &str) -> Result<Vec<String>, crate::rcon::Error> {
        self.console.authenticate(password)?;
        let reply: Reply = self.console.execute(RCON_COMMAND_PLAYERS_ONLINE)?;
        return match reply {
            Reply::Text(text) => Ok(parse_players(&text)),
            Reply::Binary(bytes) => {
                log::debug!("Ignoring non-text RCON reply of {} bytes", bytes.len());
                Ok(Vec::new())
            }
        };
    }

    fn close(mut self) -> Result<(), crate::rcon::Error> {
        self.open = false;
        return self.console.disconnect();
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(err) = self.console.disconnect() {
                log::warn!("Cannot disconnect RCON session: {err}");
            }
        }
    }
}

static PLAYERS_ONLINE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"Online players \(\d+\):\n((?:\s+[^\n]+\n?)+)").expect("regex should be valid")
});

/// Parse the usernames out of the response to the `/players o` command.
///
/// A response not in the expected shape yields no players.
///
/// ```rust
/// use factorioctl::manager::parse_players;
///
/// assert_eq!(
///     parse_players("Online players (2):\n  alice (online)\n  bob (online)\n"),
///     vec!["alice", "bob"]
/// );
/// assert!(parse_players("Online players (0):\n").is_empty());
/// ```
pub fn parse_players(text: &str) -> Vec<String> {
    let listing: &str = match PLAYERS_ONLINE.captures(text).and_then(|c| c.get(1)) {
        Some(n) => n.as_str(),
        None => return Vec::new(),
    };
    return listing
        .replace(" (online)", "")
        .split_whitespace()
        .map(str::to_owned)
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// In-memory server switched on and off instantly.
    struct MockServer {
        state: Cell<ServerState>,
    }

    impl MockServer {
        fn new() -> Self {
            return Self {
                state: Cell::new(ServerState::Stopped),
            };
        }
    }

    impl Server for MockServer {
        fn state(&self) -> ServerState {
            return self.state.get();
        }

        fn start(&self) -> Result<(), crate::server::Error> {
            self.state.set(ServerState::Running);
            return Ok(());
        }

        fn stop(&self) -> Result<(), crate::server::Error> {
            self.state.set(ServerState::Stopped);
            return Ok(());
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Authenticate(String),
        Execute(String),
        Disconnect,
    }

    enum Outcome {
        Reply(Reply),
        FailAuthenticate,
        FailExecute,
    }

    struct MockConsole {
        outcome: Outcome,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl MockConsole {
        fn boxed(outcome: Outcome) -> (Box<dyn Console>, Rc<RefCell<Vec<Call>>>) {
            let calls: Rc<RefCell<Vec<Call>>> = Rc::new(RefCell::new(Vec::new()));
            let console = MockConsole {
                outcome,
                calls: Rc::clone(&calls),
            };
            return (Box::new(console), calls);
        }

        fn text(text: &str) -> (Box<dyn Console>, Rc<RefCell<Vec<Call>>>) {
            return Self::boxed(Outcome::Reply(Reply::Text(text.into())));
        }
    }

    impl Console for MockConsole {
        fn authenticate(&mut self, password: &str) -> Result<(), crate::rcon::Error> {
            self.calls.borrow_mut().push(Call::Authenticate(password.into()));
            return match self.outcome {
                Outcome::FailAuthenticate => Err(crate::rcon::Error::AuthenticationRejected),
                _ => Ok(()),
            };
        }

        fn execute(&mut self, command: &str) -> Result<Reply, crate::rcon::Error> {
            self.calls.borrow_mut().push(Call::Execute(command.into()));
            return match &self.outcome {
                Outcome::Reply(reply) => Ok(reply.clone()),
                _ => Err(crate::rcon::Error::Io(std::io::ErrorKind::ConnectionReset.into())),
            };
        }

        fn disconnect(&mut self) -> Result<(), crate::rcon::Error> {
            self.calls.borrow_mut().push(Call::Disconnect);
            return Ok(());
        }
    }

    fn disconnects(calls: &Rc<RefCell<Vec<Call>>>) -> usize {
        return calls.borrow().iter().filter(|c| **c == Call::Disconnect).count();
    }

    #[test]
    fn test_lifecycle_delegates_to_server() {
        let manager = ServerManager::new(MockServer::new());
        assert_eq!(manager.state(), ServerState::Stopped);

        manager.start().unwrap();
        assert_eq!(manager.state(), ServerState::Running);

        manager.stop().unwrap();
        assert_eq!(manager.state(), ServerState::Stopped);
    }

    #[test]
    fn test_players_without_console() {
        let mut manager = ServerManager::new(MockServer::new());
        let err: Error = manager.players().unwrap_err();
        assert!(matches!(err, Error::MissingConsole));
        assert_eq!(err.to_string(), "RCON client not provided");
    }

    #[test]
    fn test_players_with_empty_password_does_not_touch_console() {
        let (console, calls) = MockConsole::text("Online players (0):\n");
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "");

        let err: Error = manager.players().unwrap_err();
        assert!(matches!(err, Error::MissingPassword));
        assert_eq!(err.to_string(), "RCON password not provided");
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_players_sends_command_and_disconnects_once() {
        let (console, calls) = MockConsole::text("Online players (1):\n player-username-1 (online)\n");
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");

        assert_eq!(manager.players().unwrap(), vec!["player-username-1"]);
        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Authenticate("password".into()),
                Call::Execute("/players o".into()),
                Call::Disconnect,
            ]
        );
    }

    #[test]
    fn test_players_two_online() {
        let (console, _) = MockConsole::text(
            "Online players (2):\n player-username-1 (online)\n player-username-2 (online)\n",
        );
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");
        assert_eq!(
            manager.players().unwrap(),
            vec!["player-username-1", "player-username-2"]
        );
    }

    #[test]
    fn test_players_none_online() {
        let (console, calls) = MockConsole::text("Online players (0):\n");
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");
        assert!(manager.players().unwrap().is_empty());
        assert_eq!(disconnects(&calls), 1);
    }

    #[test]
    fn test_players_non_text_reply() {
        let (console, calls) = MockConsole::boxed(Outcome::Reply(Reply::Binary(vec![0xff])));
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");
        assert!(manager.players().unwrap().is_empty());
        assert_eq!(disconnects(&calls), 1);
    }

    #[test]
    fn test_players_disconnects_when_execute_fails() {
        let (console, calls) = MockConsole::boxed(Outcome::FailExecute);
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");
        assert!(matches!(manager.players(), Err(Error::Console(crate::rcon::Error::Io(_)))));
        assert_eq!(disconnects(&calls), 1);
    }

    #[test]
    fn test_players_disconnects_when_authentication_fails() {
        let (console, calls) = MockConsole::boxed(Outcome::FailAuthenticate);
        let mut manager = ServerManager::new(MockServer::new()).with_console(console, "password");
        assert!(matches!(
            manager.players(),
            Err(Error::Console(crate::rcon::Error::AuthenticationRejected))
        ));
        assert_eq!(*calls.borrow(), vec![Call::Authenticate("password".into()), Call::Disconnect]);
    }

    #[test]
    fn test_set_console_configuration_later() {
        let mut manager = ServerManager::new(MockServer::new());
        let (console, calls) = MockConsole::text("");
        manager.set_console_configuration(console, "password");
        assert!(manager.players().unwrap().is_empty());
        assert_eq!(disconnects(&calls), 1);
    }

    #[test]
    fn test_session_drop_disconnects_when_not_closed() {
        let (mut console, calls) = MockConsole::text("");
        {
            let _session = Session::new(&mut *console);
        }
        assert_eq!(disconnects(&calls), 1);
    }

    #[test]
    fn test_parse_players_unexpected_text() {
        assert!(parse_players("Unknown command \"players\".").is_empty());
        assert!(parse_players("").is_empty());
    }

    #[test]
    fn test_parse_players_without_online_suffix() {
        assert_eq!(
            parse_players("Online players (1):\n  someone\n"),
            vec!["someone"]
        );
    }
}
