use async_ssh2_lite::{AsyncChannel, AsyncSession, AsyncSessionStream};
use log::{debug, info, warn};

use crate::{
    config::{ClientConfiguration, Userauth},
    error::Error,
    framing::Framing,
    hello::Hello,
    rpc::{Datastore, Filter, Rpc, RpcReply},
    stream::NetconfStream,
};

//
pub const NETCONF_SUBSYSTEM: &str = "netconf";

//
pub struct AsyncNetconfSession<S> {
    session: AsyncSession<S>,
    stream: NetconfStream<AsyncChannel<S>>,
    server_hello: Hello,
}

#[cfg(feature = "tokio")]
impl AsyncNetconfSession<async_ssh2_lite::TokioTcpStream> {
    pub async fn connect(configuration: &ClientConfiguration) -> Result<Self, Error> {
        let session = Self::connect_ssh(configuration).await?;
        Self::from_session(session, configuration).await
    }

    /// TCP connect, ssh handshake and userauth, without touching the netconf subsystem.
    pub async fn connect_ssh(
        configuration: &ClientConfiguration,
    ) -> Result<AsyncSession<async_ssh2_lite::TokioTcpStream>, Error> {
        let mut session = AsyncSession::<async_ssh2_lite::TokioTcpStream>::connect(
            configuration.addr(),
            configuration.session_configuration().cloned(),
        )
        .await?;
        session.handshake().await?;
        userauth(&session, configuration.username(), configuration.userauth()).await?;
        Ok(session)
    }
}

#[cfg(feature = "async-io")]
impl AsyncNetconfSession<async_ssh2_lite::AsyncIoTcpStream> {
    pub async fn connect(configuration: &ClientConfiguration) -> Result<Self, Error> {
        let session = Self::connect_ssh(configuration).await?;
        Self::from_session(session, configuration).await
    }

    /// TCP connect, ssh handshake and userauth, without touching the netconf subsystem.
    pub async fn connect_ssh(
        configuration: &ClientConfiguration,
    ) -> Result<AsyncSession<async_ssh2_lite::AsyncIoTcpStream>, Error> {
        let mut session = AsyncSession::<async_ssh2_lite::AsyncIoTcpStream>::connect(
            configuration.addr(),
            configuration.session_configuration().cloned(),
        )
        .await?;
        session.handshake().await?;
        userauth(&session, configuration.username(), configuration.userauth()).await?;
        Ok(session)
    }
}

impl<S> AsyncNetconfSession<S>
where
    S: AsyncSessionStream + Send + Sync + 'static,
{
    /// Opens the netconf subsystem on an authenticated session and exchanges hellos.
    pub async fn from_session(
        session: AsyncSession<S>,
        configuration: &ClientConfiguration,
    ) -> Result<Self, Error> {
        if !session.authenticated() {
            return Err(Error::NotAuthenticated);
        }

        let channel = open_channel(&session).await?;

        let mut stream =
            NetconfStream::with_read_buffer_size(channel, configuration.read_buffer_size());
        stream.set_max_message_size(configuration.max_message_size());

        let client_hello = Hello::client(configuration.capabilities().iter().cloned());
        let server_hello = stream.establish(&client_hello).await?;

        info!(
            "netconf session established, addr:{} session_id:{:?} framing:{:?}",
            configuration.addr(),
            server_hello.session_id(),
            stream.framing()
        );

        Ok(Self {
            session,
            stream,
            server_hello,
        })
    }

    pub fn session(&self) -> &AsyncSession<S> {
        &self.session
    }

    pub fn server_hello(&self) -> &Hello {
        &self.server_hello
    }

    pub fn session_id(&self) -> Option<u32> {
        self.server_hello.session_id()
    }

    pub fn server_capabilities(&self) -> &[String] {
        self.server_hello.capabilities()
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.server_hello.supports(capability)
    }

    pub fn framing(&self) -> Framing {
        self.stream.framing()
    }

    pub fn is_closed(&self) -> bool {
        self.stream.get_ref().eof()
    }

    /// Sends `rpc` and returns the matching reply, `rpc-error`s included.
    pub async fn rpc(&mut self, rpc: Rpc) -> Result<RpcReply, Error> {
        self.stream.request(&rpc).await
    }

    //
    pub async fn get_config(
        &mut self,
        source: Datastore,
        filter: Option<&Filter>,
    ) -> Result<String, Error> {
        let reply = self
            .rpc(Rpc::get_config(source, filter))
            .await?
            .into_result()?;
        Ok(reply.data().unwrap_or_default().to_owned())
    }

    pub async fn get(&mut self, filter: Option<&Filter>) -> Result<String, Error> {
        let reply = self.rpc(Rpc::get(filter)).await?.into_result()?;
        Ok(reply.data().unwrap_or_default().to_owned())
    }

    pub async fn edit_config(
        &mut self,
        target: Datastore,
        config: &str,
    ) -> Result<RpcReply, Error> {
        self.rpc(Rpc::edit_config(target, config))
            .await?
            .into_result()
    }

    pub async fn lock(&mut self, target: Datastore) -> Result<RpcReply, Error> {
        self.rpc(Rpc::lock(target)).await?.into_result()
    }

    pub async fn unlock(&mut self, target: Datastore) -> Result<RpcReply, Error> {
        self.rpc(Rpc::unlock(target)).await?.into_result()
    }

    pub async fn commit(&mut self) -> Result<RpcReply, Error> {
        self.rpc(Rpc::commit()).await?.into_result()
    }

    pub async fn discard_changes(&mut self) -> Result<RpcReply, Error> {
        self.rpc(Rpc::discard_changes()).await?.into_result()
    }

    pub async fn kill_session(&mut self, session_id: u32) -> Result<RpcReply, Error> {
        self.rpc(Rpc::kill_session(session_id))
            .await?
            .into_result()
    }

    /// `close-session`, then channel close and ssh disconnect.
    pub async fn close(mut self) -> Result<(), Error> {
        if !self.is_closed() {
            match self.rpc(Rpc::close_session()).await {
                Ok(reply) if !reply.is_ok() => {
                    warn!("close-session not acknowledged, errors:{:?}", reply.errors())
                }
                Ok(_) => {}
                Err(err) => debug!("close-session failed, err:{err:?}"),
            }
        }

        let channel = self.stream.get_mut();
        if let Err(err) = channel.send_eof().await {
            debug!("send_eof failed, err:{err:?}");
        }
        channel.close().await?;

        self.session
            .disconnect(None, "close-session", None)
            .await?;

        Ok(())
    }
}

/// Opens a session channel and requests the `netconf` subsystem on it.
pub async fn open_channel<S>(session: &AsyncSession<S>) -> Result<AsyncChannel<S>, Error>
where
    S: AsyncSessionStream + Send + Sync + 'static,
{
    let mut channel = session.channel_session().await?;
    channel.subsystem(NETCONF_SUBSYSTEM).await?;
    Ok(channel)
}

pub async fn userauth<S>(
    session: &AsyncSession<S>,
    username: &str,
    userauth: &Userauth,
) -> Result<(), Error>
where
    S: AsyncSessionStream + Send + Sync + 'static,
{
    match userauth {
        Userauth::Password { password } => {
            session.userauth_password(username, password).await?;
        }
        Userauth::Agent => {
            session.userauth_agent_with_try_next(username).await?;
        }
        Userauth::PubkeyFile {
            pubkey,
            privatekey,
            passphrase,
        } => {
            session
                .userauth_pubkey_file(
                    username,
                    pubkey.as_deref(),
                    privatekey,
                    passphrase.as_deref(),
                )
                .await?;
        }
    }

    if !session.authenticated() {
        return Err(Error::NotAuthenticated);
    }

    Ok(())
}
