use std::{
    env, error,
    net::{IpAddr, SocketAddr},
};

use async_netconf_lite::{ClientConfiguration, Userauth};

//
const USERNAME: &str = "admin";
const PASSWORD: &str = "admin";

//
pub(super) fn get_connect_addr() -> Result<SocketAddr, Box<dyn error::Error>> {
    let host = env::var("NETCONF_SERVER_HOST")
        .ok()
        .as_deref()
        .unwrap_or("127.0.0.1")
        .parse::<IpAddr>()?;

    let port = env::var("NETCONF_SERVER_PORT")?;
    let port = port.parse::<u16>()?;

    Ok(SocketAddr::from((host, port)))
}

pub(super) fn get_username() -> Box<str> {
    env::var("NETCONF_USERNAME")
        .ok()
        .as_deref()
        .unwrap_or(USERNAME)
        .into()
}

pub(super) fn get_password() -> Box<str> {
    env::var("NETCONF_PASSWORD")
        .ok()
        .as_deref()
        .unwrap_or(PASSWORD)
        .into()
}

pub(super) fn get_configuration() -> Result<ClientConfiguration, Box<dyn error::Error>> {
    let mut configuration = ClientConfiguration::new(
        get_connect_addr()?,
        get_username(),
        Userauth::Password {
            password: get_password().into(),
        },
    );
    configuration.set_timeout(10_000);
    Ok(configuration)
}

//
pub(super) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
