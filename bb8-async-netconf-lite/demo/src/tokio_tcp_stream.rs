/*
RUST_BACKTRACE=1 RUST_LOG=trace cargo run -p bb8-async-netconf-lite-demo --bin bb8_anl_demo_tokio_tcp_stream -- 127.0.0.1:830 admin admin
*/

use std::env;

use bb8_async_netconf_lite::{
    async_netconf_lite::{config::parse_addr, ClientConfiguration, Datastore, Userauth},
    bb8, AsyncNetconfSessionManagerWithTokioTcpStream,
};
use futures_util::future::join_all;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let addr = parse_addr(&env::args().nth(1).ok_or("addr missing")?)?;
    let username = env::args().nth(2).ok_or("username missing")?;
    let password = env::args().nth(3).ok_or("password missing")?;

    let mut configuration =
        ClientConfiguration::new(addr, username, Userauth::Password { password });
    configuration.set_timeout(10_000);

    let mgr = AsyncNetconfSessionManagerWithTokioTcpStream::new(configuration);

    let pool = bb8::Pool::builder().max_size(4).build(mgr).await?;

    let mut handles = vec![];
    for i in 0..10 {
        let pool = pool.clone();
        let handle = tokio::spawn(async move {
            let mut session = pool.get().await?;

            let data = session.get_config(Datastore::Running, None).await?;
            println!(
                "get-config running session_id:{:?} len:{} i:{i}",
                session.session_id(),
                data.len()
            );

            Result::<(), Box<dyn std::error::Error + Send + Sync>>::Ok(())
        });
        handles.push(handle);
    }

    let rets = join_all(handles).await;
    println!("rets:{rets:?}");
    assert!(rets.iter().all(|x| matches!(x, Ok(Ok(())))));

    Ok(())
}
