pub use async_netconf_lite;
pub use bb8;

#[cfg(feature = "tokio")]
mod impl_tokio;
#[cfg(feature = "tokio")]
pub use impl_tokio::AsyncNetconfSessionManagerWithTokioTcpStream;

//
#[derive(Debug)]
pub enum AsyncNetconfSessionManagerError {
    ConnectError(async_netconf_lite::Error),
    HandshakeError(async_netconf_lite::Error),
    UserauthError(async_netconf_lite::Error),
    NotAuthenticated,
    HelloError(async_netconf_lite::Error),
}

impl AsyncNetconfSessionManagerError {
    /// Userauth that completed but left the session unauthenticated is not an ssh failure.
    pub(crate) fn from_userauth(err: async_netconf_lite::Error) -> Self {
        match err {
            async_netconf_lite::Error::NotAuthenticated => Self::NotAuthenticated,
            err => Self::UserauthError(err),
        }
    }
}
impl core::fmt::Display for AsyncNetconfSessionManagerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for AsyncNetconfSessionManagerError {}
