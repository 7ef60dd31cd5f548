#![cfg(any(feature = "async-io", feature = "tokio"))]

use std::error;

use async_netconf_lite::{
    async_ssh2_lite::AsyncSessionStream, AsyncNetconfSession, Datastore, Filter,
};

use super::helpers::{get_configuration, init_logger};

//
#[cfg(feature = "tokio")]
#[tokio::test]
async fn simple_with_tokio() -> Result<(), Box<dyn error::Error>> {
    init_logger();

    let mut session =
        AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::TokioTcpStream>::connect(
            &get_configuration()?,
        )
        .await?;
    __run__session__get_config(&mut session).await?;
    session.close().await?;

    Ok(())
}

#[cfg(feature = "async-io")]
#[test]
fn simple_with_async_io() -> Result<(), Box<dyn error::Error>> {
    futures_lite::future::block_on(async {
        init_logger();

        let mut session =
            AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::AsyncIoTcpStream>::connect(
                &get_configuration()?,
            )
            .await?;
        __run__session__get_config(&mut session).await?;
        session.close().await?;

        Ok(())
    })
}

async fn __run__session__get_config<S: AsyncSessionStream + Send + Sync + 'static>(
    session: &mut AsyncNetconfSession<S>,
) -> Result<(), Box<dyn error::Error>> {
    let data = session.get_config(Datastore::Running, None).await?;
    println!("running: {data}");

    let data = session
        .get_config(
            Datastore::Running,
            Some(&Filter::Subtree(
                r#"<netconf-state xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring"><sessions/></netconf-state>"#.into(),
            )),
        )
        .await?;
    println!("running filtered: {data}");

    // message-ids keep advancing across calls
    let reply = session
        .rpc(async_netconf_lite::Rpc::get(None))
        .await?;
    assert_eq!(reply.message_id(), Some("103"));

    Ok(())
}
