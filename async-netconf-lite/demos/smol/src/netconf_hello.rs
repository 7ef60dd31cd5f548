/*
cargo run -p async-netconf-lite-demo-smol --bin netconf_hello 10.147.40.55:2022 admin admin
*/

use std::env;
use std::fmt::Display;
use std::net::TcpStream;
use std::process;

use async_io::Async;
use futures::executor::block_on;
use log::debug;

use async_netconf_lite::{
    async_ssh2_lite::AsyncSession,
    config::{parse_addr, ENV_ADDR, ENV_PASSWORD, ENV_USERNAME},
    hello::{Hello, BASE_1_0},
    session::{userauth, NETCONF_SUBSYSTEM},
    NetconfStream, Userauth,
};

fn main() {
    env_logger::init();

    if let Err(msg) = block_on(run()) {
        eprintln!("{msg}");
        process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| env::var(ENV_ADDR).unwrap_or_else(|_| "127.0.0.1:830".to_owned()));
    let username = env::args()
        .nth(2)
        .unwrap_or_else(|| env::var(ENV_USERNAME).unwrap_or_else(|_| "admin".to_owned()));
    let password = env::args()
        .nth(3)
        .unwrap_or_else(|| env::var(ENV_PASSWORD).unwrap_or_else(|_| "admin".to_owned()));

    let addr = parse_addr(&addr).map_err(step("Invalid server address"))?;
    debug!("connecting to {addr}");

    let stream = Async::<TcpStream>::connect(addr)
        .await
        .map_err(step("Error connecting to server"))?;

    let mut session = AsyncSession::new(stream, None).map_err(step("Error creating session"))?;
    session
        .handshake()
        .await
        .map_err(step("Error connecting to server"))?;

    userauth(&session, &username, &Userauth::Password { password })
        .await
        .map_err(step("Authentication failed"))?;

    let mut channel = session
        .channel_session()
        .await
        .map_err(step("Failed to open channel session"))?;
    channel
        .subsystem(NETCONF_SUBSYSTEM)
        .await
        .map_err(step("Failed to start NETCONF subsystem"))?;

    let mut stream = NetconfStream::new(channel);
    stream
        .send_hello(&Hello::client([BASE_1_0]))
        .await
        .map_err(step("Failed to send NETCONF HELLO message"))?;

    let response = stream
        .read_once()
        .await
        .map_err(step("Failed to read response from server"))?;

    println!(
        "NETCONF Server Response:\n{}",
        String::from_utf8_lossy(&response)
    );

    let channel = stream.get_mut();
    channel.close().await.map_err(step("Failed to close channel"))?;
    session
        .disconnect(None, "", None)
        .await
        .map_err(step("Failed to disconnect"))?;

    Ok(())
}

fn step<E: Display>(msg: &'static str) -> impl FnOnce(E) -> String {
    move |err| format!("{msg}: {err}")
}
