use core::fmt;
use std::io::Error as IoError;

use async_ssh2_lite::Error as Ssh2Error;
use quick_xml::Error as XmlError;

use crate::{framing::FramingError, hello::HelloError, rpc::RpcError};

//
#[derive(Debug)]
pub enum Error {
    Ssh2(Ssh2Error),
    Io(IoError),
    Xml(XmlError),
    Framing(FramingError),
    Hello(HelloError),
    Rpc(Vec<RpcError>),
    UnexpectedMessage(String),
    Config(String),
    NotAuthenticated,
    Closed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for Error {}

//
impl From<Ssh2Error> for Error {
    fn from(err: Ssh2Error) -> Self {
        Self::Ssh2(err)
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Self::Xml(err)
    }
}

impl From<FramingError> for Error {
    fn from(err: FramingError) -> Self {
        Self::Framing(err)
    }
}

impl From<HelloError> for Error {
    fn from(err: HelloError) -> Self {
        Self::Hello(err)
    }
}

//
impl Error {
    /// Errors from a `rpc-reply` with severity `error`.
    pub fn rpc_errors(&self) -> Option<&[RpcError]> {
        match self {
            Self::Rpc(errors) => Some(errors.as_slice()),
            _ => None,
        }
    }
}
