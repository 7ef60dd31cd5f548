use std::{
    env,
    net::{IpAddr, SocketAddr, ToSocketAddrs as _},
    path::PathBuf,
};

use async_ssh2_lite::SessionConfiguration;

use crate::{error::Error, framing::DEFAULT_MAX_MESSAGE_SIZE, hello::default_client_capabilities};

//
pub const DEFAULT_PORT: u16 = 830;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

pub const ENV_ADDR: &str = "NETCONF_ADDR";
pub const ENV_USERNAME: &str = "NETCONF_USERNAME";
pub const ENV_PASSWORD: &str = "NETCONF_PASSWORD";
pub const ENV_TIMEOUT_MS: &str = "NETCONF_TIMEOUT_MS";

const DEFAULT_ADDR: &str = "127.0.0.1:830";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

//
#[derive(Debug, Clone)]
pub enum Userauth {
    Password {
        password: String,
    },
    Agent,
    PubkeyFile {
        pubkey: Option<PathBuf>,
        privatekey: PathBuf,
        passphrase: Option<String>,
    },
}

//
#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    addr: SocketAddr,
    username: String,
    userauth: Userauth,
    session_configuration: Option<SessionConfiguration>,
    capabilities: Vec<String>,
    read_buffer_size: usize,
    max_message_size: usize,
}

impl ClientConfiguration {
    pub fn new(addr: SocketAddr, username: impl AsRef<str>, userauth: Userauth) -> Self {
        Self {
            addr,
            username: username.as_ref().into(),
            userauth,
            session_configuration: None,
            capabilities: default_client_capabilities(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Reads `NETCONF_ADDR`, `NETCONF_USERNAME`, `NETCONF_PASSWORD` and `NETCONF_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let addr = parse_addr(lookup(ENV_ADDR).as_deref().unwrap_or(DEFAULT_ADDR))?;
        let username = lookup(ENV_USERNAME).unwrap_or_else(|| DEFAULT_USERNAME.to_owned());
        let password = lookup(ENV_PASSWORD).unwrap_or_else(|| DEFAULT_PASSWORD.to_owned());

        let mut configuration = Self::new(addr, username, Userauth::Password { password });

        if let Some(timeout_ms) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = timeout_ms
                .parse::<u32>()
                .map_err(|err| Error::Config(format!("invalid {ENV_TIMEOUT_MS}: {err}")))?;
            configuration.set_timeout(timeout_ms);
        }

        Ok(configuration)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn userauth(&self) -> &Userauth {
        &self.userauth
    }

    pub fn session_configuration(&self) -> Option<&SessionConfiguration> {
        self.session_configuration.as_ref()
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    //
    pub fn set_userauth(&mut self, userauth: Userauth) {
        self.userauth = userauth;
    }

    pub fn set_session_configuration(&mut self, session_configuration: SessionConfiguration) {
        self.session_configuration = Some(session_configuration);
    }

    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.session_configuration
            .get_or_insert_with(SessionConfiguration::new)
            .set_timeout(timeout_ms);
    }

    pub fn set_keepalive(&mut self, want_reply: bool, interval: u32) {
        self.session_configuration
            .get_or_insert_with(SessionConfiguration::new)
            .set_keepalive(want_reply, interval);
    }

    pub fn set_capabilities(&mut self, capabilities: impl IntoIterator<Item = impl Into<String>>) {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
    }

    pub fn add_capability(&mut self, capability: impl Into<String>) {
        let capability = capability.into();
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
    }

    pub fn set_read_buffer_size(&mut self, read_buffer_size: usize) {
        self.read_buffer_size = read_buffer_size.max(2);
    }

    pub fn set_max_message_size(&mut self, max_message_size: usize) {
        self.max_message_size = max_message_size;
    }
}

/// Accepts `ip:port`, `[ipv6]:port`, a bare ip, `host:port` or a bare host.
/// Port defaults to 830.
pub fn parse_addr(s: &str) -> Result<SocketAddr, Error> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok(SocketAddr::from((ip, DEFAULT_PORT)));
    }

    let addrs = if s.contains(':') {
        s.to_socket_addrs()
    } else {
        (s, DEFAULT_PORT).to_socket_addrs()
    };

    addrs
        .map_err(|err| Error::Config(format!("invalid address {s}: {err}")))?
        .next()
        .ok_or_else(|| Error::Config(format!("address {s} resolved to nothing")))
}
