use futures_util::io::{AsyncRead, AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _};
use log::{debug, trace, warn};

use crate::{
    config::DEFAULT_READ_BUFFER_SIZE,
    error::Error,
    framing::{Framing, FramingCodec},
    hello::{Hello, BASE_1_1},
    rpc::{Rpc, RpcReply, INITIAL_MESSAGE_ID},
};

//
pub struct NetconfStream<T> {
    inner: T,
    codec: FramingCodec,
    read_buf: Vec<u8>,
    read_buffer_size: usize,
    next_message_id: u64,
}

impl<T> NetconfStream<T> {
    pub fn new(inner: T) -> Self {
        Self::with_read_buffer_size(inner, DEFAULT_READ_BUFFER_SIZE)
    }

    pub fn with_read_buffer_size(inner: T, read_buffer_size: usize) -> Self {
        Self {
            inner,
            codec: FramingCodec::default(),
            read_buf: Vec::new(),
            read_buffer_size: read_buffer_size.max(2),
            next_message_id: INITIAL_MESSAGE_ID,
        }
    }

    pub fn framing(&self) -> Framing {
        self.codec.framing()
    }

    pub fn set_framing(&mut self, framing: Framing) {
        self.codec.set_framing(framing);
    }

    pub fn set_max_message_size(&mut self, max_message_size: usize) {
        self.codec.set_max_message_size(max_message_size);
    }

    /// The message-id the next [`NetconfStream::request`] will carry.
    pub fn next_message_id(&self) -> u64 {
        self.next_message_id
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> NetconfStream<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn send(&mut self, msg: &str) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(msg.len() + 16);
        self.codec.encode(msg.as_bytes(), &mut buf);
        trace!("send framing:{:?} msg:{msg}", self.codec.framing());

        self.inner.write_all(&buf).await?;
        self.inner.flush().await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<String, Error> {
        let mut buf = vec![0; self.read_buffer_size];
        loop {
            if let Some(msg) = self.codec.decode(&mut self.read_buf)? {
                trace!("recv framing:{:?} msg:{msg}", self.codec.framing());
                return Ok(msg);
            }

            let n = self.inner.read(&mut buf).await?;
            if n == 0 {
                if !self.read_buf.is_empty() {
                    debug!("eof with {} undecoded bytes", self.read_buf.len());
                }
                return Err(Error::Closed);
            }
            self.read_buf.extend_from_slice(&buf[..n]);
        }
    }

    /// A single read of at most `read_buffer_size - 1` bytes, without any framing.
    ///
    /// Bytes already buffered by [`NetconfStream::recv`] are returned first.
    pub async fn read_once(&mut self) -> Result<Vec<u8>, Error> {
        let max = self.read_buffer_size - 1;

        if !self.read_buf.is_empty() {
            let n = self.read_buf.len().min(max);
            self.codec.reset_scan();
            return Ok(self.read_buf.drain(..n).collect());
        }

        let mut buf = vec![0; max];
        let n = self.inner.read(&mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    //
    pub async fn send_hello(&mut self, hello: &Hello) -> Result<(), Error> {
        if self.framing() != Framing::EndOfMessage {
            warn!("hello sent with {:?} framing", self.framing());
        }
        self.send(&hello.to_xml()).await
    }

    pub async fn read_hello(&mut self) -> Result<Hello, Error> {
        let msg = self.recv().await?;
        Hello::parse_server(&msg)
    }

    /// Exchanges hellos and switches to chunked framing when both sides speak base:1.1.
    ///
    /// Returns the server hello.
    pub async fn establish(&mut self, client_hello: &Hello) -> Result<Hello, Error> {
        self.set_framing(Framing::EndOfMessage);

        self.send_hello(client_hello).await?;
        let server_hello = self.read_hello().await?;

        if client_hello.supports(BASE_1_1) && server_hello.supports(BASE_1_1) {
            self.set_framing(Framing::Chunked);
        }
        debug!(
            "established session_id:{:?} framing:{:?}",
            server_hello.session_id(),
            self.framing()
        );

        Ok(server_hello)
    }

    /// Sends `rpc` under the next message-id and waits for its reply.
    pub async fn request(&mut self, rpc: &Rpc) -> Result<RpcReply, Error> {
        let message_id = self.next_message_id;
        self.next_message_id += 1;

        debug!("rpc message_id:{message_id}");
        self.rpc(message_id, rpc).await
    }

    /// Sends `rpc` and waits for the `rpc-reply` carrying the same message-id.
    ///
    /// Replies with a different message-id are dropped. A reply without a
    /// message-id is accepted, some servers omit it on errors.
    pub async fn rpc(&mut self, message_id: u64, rpc: &Rpc) -> Result<RpcReply, Error> {
        self.send(&rpc.to_xml(message_id)).await?;

        let expected = message_id.to_string();
        loop {
            let msg = self.recv().await?;
            let reply = RpcReply::parse(&msg)?;
            match reply.message_id() {
                Some(id) if id == expected => return Ok(reply),
                None => return Ok(reply),
                Some(id) => {
                    warn!("drop rpc-reply message_id:{id}, expected:{expected}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::{
        pin::Pin,
        task::{Context, Poll},
    };
    use std::io::Error as IoError;

    use futures_lite::future::block_on;
    use futures_util::io::Cursor;

    use super::*;
    use crate::{hello::BASE_1_0, rpc::Datastore};

    //
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(input: impl Into<Vec<u8>>) -> Self {
            Self {
                input: Cursor::new(input.into()),
                output: vec![],
            }
        }
    }

    impl AsyncRead for MockStream {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<Result<usize, IoError>> {
            Pin::new(&mut self.get_mut().input).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for MockStream {
        fn poll_write(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<Result<usize, IoError>> {
            Pin::new(&mut self.get_mut().output).poll_write(cx, buf)
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), IoError>> {
            Pin::new(&mut self.get_mut().output).poll_flush(cx)
        }

        fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), IoError>> {
            Pin::new(&mut self.get_mut().output).poll_close(cx)
        }
    }

    fn server_hello(capabilities: &[&str], session_id: u32) -> String {
        let capabilities = capabilities
            .iter()
            .map(|x| format!("<capability>{x}</capability>"))
            .collect::<String>();
        format!(
            r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities>{capabilities}</capabilities><session-id>{session_id}</session-id></hello>]]>]]>"#
        )
    }

    #[test]
    fn test_establish_chunked() {
        block_on(async {
            let mut input = server_hello(&[BASE_1_0, BASE_1_1], 4);
            input.push_str("\n#45\n<rpc-reply message-id=\"101\"><ok/></rpc-reply>\n##\n");
            let mut stream = NetconfStream::new(MockStream::new(input));

            let server_hello = stream.establish(&Hello::default()).await.unwrap();
            assert_eq!(server_hello.session_id(), Some(4));
            assert_eq!(stream.framing(), Framing::Chunked);

            let output = String::from_utf8(stream.get_ref().output.clone()).unwrap();
            assert!(output.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
            assert!(output.contains("<capability>urn:ietf:params:netconf:base:1.1</capability>"));
            assert!(output.ends_with("</hello>\n]]>]]>"));

            let reply = stream.rpc(101, &Rpc::commit()).await.unwrap();
            assert!(reply.is_ok());

            let output = String::from_utf8(stream.get_ref().output.clone()).unwrap();
            assert!(output.contains("\n#"));
            assert!(output.ends_with("<commit/></rpc>\n##\n"));
        })
    }

    #[test]
    fn test_establish_end_of_message() {
        block_on(async {
            let mut input = server_hello(&[BASE_1_0, BASE_1_1], 9);
            input.push_str("<rpc-reply message-id=\"101\"><ok/></rpc-reply>]]>]]>");
            let mut stream = NetconfStream::new(MockStream::new(input));

            stream
                .establish(&Hello::client([BASE_1_0]))
                .await
                .unwrap();
            assert_eq!(stream.framing(), Framing::EndOfMessage);

            let reply = stream.rpc(101, &Rpc::commit()).await.unwrap();
            assert!(reply.is_ok());
        })
    }

    #[test]
    fn test_rpc_drops_mismatched_replies() {
        block_on(async {
            let input = concat!(
                r#"<rpc-reply message-id="100"><ok/></rpc-reply>]]>]]>"#,
                r#"<rpc-reply message-id="102"><data><x/></data></rpc-reply>]]>]]>"#,
            );
            let mut stream = NetconfStream::new(MockStream::new(input));

            let reply = stream.rpc(102, &Rpc::get(None)).await.unwrap();
            assert_eq!(reply.message_id(), Some("102"));
            assert_eq!(reply.data(), Some("<x/>"));
        })
    }

    #[test]
    fn test_rpc_accepts_reply_without_message_id() {
        block_on(async {
            let input = r#"<rpc-reply><rpc-error><error-type>rpc</error-type><error-tag>missing-attribute</error-tag><error-severity>error</error-severity></rpc-error></rpc-reply>]]>]]>"#;
            let mut stream = NetconfStream::new(MockStream::new(input));

            let reply = stream.rpc(105, &Rpc::commit()).await.unwrap();
            assert_eq!(reply.message_id(), None);
            assert_eq!(reply.errors().len(), 1);
            assert!(matches!(reply.into_result(), Err(Error::Rpc(_))));
        })
    }

    #[test]
    fn test_request_message_ids() {
        block_on(async {
            let input = concat!(
                r#"<rpc-reply message-id="101"><ok/></rpc-reply>]]>]]>"#,
                r#"<rpc-reply message-id="102"><ok/></rpc-reply>]]>]]>"#,
            );
            let mut stream = NetconfStream::new(MockStream::new(input));
            assert_eq!(stream.next_message_id(), 101);

            let reply = stream.request(&Rpc::lock(Datastore::Candidate)).await.unwrap();
            assert_eq!(reply.message_id(), Some("101"));
            let reply = stream.request(&Rpc::commit()).await.unwrap();
            assert_eq!(reply.message_id(), Some("102"));
            assert_eq!(stream.next_message_id(), 103);

            let output = String::from_utf8(stream.get_ref().output.clone()).unwrap();
            let first = output.find(r#"<rpc message-id="101""#).unwrap();
            let second = output.find(r#"<rpc message-id="102""#).unwrap();
            assert!(first < second);
        })
    }

    #[test]
    fn test_recv_closed() {
        block_on(async {
            let mut stream = NetconfStream::new(MockStream::new("<hello>"));
            assert!(matches!(stream.recv().await, Err(Error::Closed)));
        })
    }

    #[test]
    fn test_read_hello_requires_session_id() {
        block_on(async {
            let input = r#"<hello><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>]]>]]>"#;
            let mut stream = NetconfStream::new(MockStream::new(input));
            assert!(matches!(stream.read_hello().await, Err(Error::Hello(_))));
        })
    }

    #[test]
    fn test_read_once() {
        block_on(async {
            let mut stream =
                NetconfStream::with_read_buffer_size(MockStream::new(vec![b'x'; 10]), 4);
            assert_eq!(stream.read_once().await.unwrap(), b"xxx");
            assert_eq!(stream.read_once().await.unwrap(), b"xxx");
            assert_eq!(stream.read_once().await.unwrap(), b"xxx");
            assert_eq!(stream.read_once().await.unwrap(), b"x");
            assert!(stream.read_once().await.unwrap().is_empty());
        })
    }
}
