/*
NETCONF_ADDR=127.0.0.1:830 NETCONF_USERNAME=admin NETCONF_PASSWORD=admin cargo run -p async-netconf-lite-demo-smol --bin get_config -- running '<users/>'
*/

use std::env;
use std::error;

use futures::executor::block_on;

use async_netconf_lite::{
    async_ssh2_lite::AsyncIoTcpStream, AsyncNetconfSession, ClientConfiguration, Datastore,
    Filter,
};

fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::init();

    block_on(run())
}

async fn run() -> Result<(), Box<dyn error::Error>> {
    let datastore = match env::args().nth(1).as_deref() {
        None | Some("running") => Datastore::Running,
        Some("candidate") => Datastore::Candidate,
        Some("startup") => Datastore::Startup,
        Some(x) => return Err(format!("unknown datastore {x}").into()),
    };
    let filter = env::args().nth(2).map(Filter::Subtree);

    let configuration = ClientConfiguration::from_env()?;

    let mut session = AsyncNetconfSession::<AsyncIoTcpStream>::connect(&configuration).await?;
    println!(
        "session_id:{:?} framing:{:?}",
        session.session_id(),
        session.framing()
    );
    for capability in session.server_capabilities() {
        println!("capability: {capability}");
    }

    let data = session.get_config(datastore, filter.as_ref()).await?;
    println!("{data}");

    session.close().await?;

    Ok(())
}
