#![cfg(any(feature = "async-io", feature = "tokio"))]

use std::error;

use async_netconf_lite::{
    async_ssh2_lite::AsyncSessionStream,
    hello::{BASE_1_0, BASE_1_1},
    AsyncNetconfSession, Framing,
};

use super::helpers::{get_configuration, init_logger};

//
#[cfg(feature = "tokio")]
#[tokio::test]
async fn simple_with_tokio() -> Result<(), Box<dyn error::Error>> {
    init_logger();

    let session = AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::TokioTcpStream>::connect(
        &get_configuration()?,
    )
    .await?;
    __run__session__hello(session).await?;

    Ok(())
}

#[cfg(feature = "async-io")]
#[test]
fn simple_with_async_io() -> Result<(), Box<dyn error::Error>> {
    futures_lite::future::block_on(async {
        init_logger();

        let session =
            AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::AsyncIoTcpStream>::connect(
                &get_configuration()?,
            )
            .await?;
        __run__session__hello(session).await?;

        Ok(())
    })
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn base_1_0_only_with_tokio() -> Result<(), Box<dyn error::Error>> {
    init_logger();

    let mut configuration = get_configuration()?;
    configuration.set_capabilities([BASE_1_0]);

    let session = AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::TokioTcpStream>::connect(
        &configuration,
    )
    .await?;
    assert_eq!(session.framing(), Framing::EndOfMessage);
    session.close().await?;

    Ok(())
}

async fn __run__session__hello<S: AsyncSessionStream + Send + Sync + 'static>(
    session: AsyncNetconfSession<S>,
) -> Result<(), Box<dyn error::Error>> {
    assert!(session.session_id().is_some());
    assert!(session.supports(BASE_1_0));
    println!("server capabilities: {:?}", session.server_capabilities());

    if session.supports(BASE_1_1) {
        assert_eq!(session.framing(), Framing::Chunked);
    } else {
        assert_eq!(session.framing(), Framing::EndOfMessage);
    }

    session.close().await?;

    Ok(())
}
