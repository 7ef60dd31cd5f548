use async_netconf_lite::{
    async_ssh2_lite::{AsyncSession, TokioTcpStream},
    session::userauth,
    AsyncNetconfSession, ClientConfiguration,
};
use async_trait::async_trait;
use log::debug;

use crate::AsyncNetconfSessionManagerError;

//
#[derive(Debug, Clone)]
pub struct AsyncNetconfSessionManagerWithTokioTcpStream {
    configuration: ClientConfiguration,
}

impl AsyncNetconfSessionManagerWithTokioTcpStream {
    pub fn new(configuration: ClientConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }
}

#[async_trait]
impl bb8::ManageConnection for AsyncNetconfSessionManagerWithTokioTcpStream {
    type Connection = AsyncNetconfSession<TokioTcpStream>;

    type Error = AsyncNetconfSessionManagerError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let mut session = AsyncSession::<TokioTcpStream>::connect(
            self.configuration.addr(),
            self.configuration.session_configuration().cloned(),
        )
        .await
        .map_err(|err| AsyncNetconfSessionManagerError::ConnectError(err.into()))?;

        session
            .handshake()
            .await
            .map_err(|err| AsyncNetconfSessionManagerError::HandshakeError(err.into()))?;

        userauth(
            &session,
            self.configuration.username(),
            self.configuration.userauth(),
        )
        .await
        .map_err(AsyncNetconfSessionManagerError::from_userauth)?;

        let session = AsyncNetconfSession::from_session(session, &self.configuration)
            .await
            .map_err(AsyncNetconfSessionManagerError::HelloError)?;
        debug!("pool connection ready, session_id:{:?}", session.session_id());

        Ok(session)
    }

    async fn is_valid(&self, _conn: &mut Self::Connection) -> Result<(), Self::Error> {
        Ok(())
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_closed()
    }
}
