#![cfg(feature = "tokio")]

use std::error;

use async_netconf_lite::{
    hello::Hello, session::open_channel, AsyncNetconfSession, NetconfStream,
};

use super::helpers::{get_configuration, init_logger};

//
#[tokio::test]
async fn raw_hello_with_tokio() -> Result<(), Box<dyn error::Error>> {
    init_logger();

    let configuration = get_configuration()?;
    let session =
        AsyncNetconfSession::<async_netconf_lite::async_ssh2_lite::TokioTcpStream>::connect_ssh(
            &configuration,
        )
        .await?;

    let channel = open_channel(&session).await?;
    let mut stream = NetconfStream::new(channel);
    stream.send_hello(&Hello::default()).await?;

    let bytes = stream.read_once().await?;
    assert!(!bytes.is_empty());
    assert!(bytes.len() < configuration.read_buffer_size());
    let s = String::from_utf8_lossy(&bytes);
    assert!(s.contains("hello"));

    Ok(())
}
