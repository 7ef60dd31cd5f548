#![cfg(feature = "tokio")]

use std::error;

use async_netconf_lite::{AsyncNetconfSession, Error, Rpc};

use super::helpers::{get_configuration, init_logger};

//
#[tokio::test]
async fn unknown_operation_with_tokio() -> Result<(), Box<dyn error::Error>> {
    init_logger();

    let mut session =
        AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::TokioTcpStream>::connect(
            &get_configuration()?,
        )
        .await?;

    let reply = session
        .rpc(Rpc::new("<no-such-operation xmlns=\"urn:example:none\"/>"))
        .await?;
    assert!(!reply.is_ok());
    assert!(!reply.errors().is_empty());
    println!("errors: {:?}", reply.errors());

    match reply.into_result() {
        Err(Error::Rpc(errors)) => assert!(errors.iter().any(|x| x.is_error())),
        x => panic!("{x:?}"),
    }

    session.close().await?;

    Ok(())
}
