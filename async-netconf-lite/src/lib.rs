//! Asynchronous NETCONF over [async-ssh2-lite](https://docs.rs/async-ssh2-lite)

pub use async_ssh2_lite;
pub use quick_xml;

//
pub mod config;
pub mod framing;
pub mod hello;
pub mod rpc;

pub use config::{ClientConfiguration, Userauth};
pub use framing::{Framing, FramingCodec};
pub use hello::Hello;
pub use rpc::{Datastore, Filter, Rpc, RpcError, RpcReply};

//
pub mod error;

pub use error::Error;

//
pub mod session;
pub mod stream;

pub use session::AsyncNetconfSession;
pub use stream::NetconfStream;
