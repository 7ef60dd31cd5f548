use core::fmt;

use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    error::Error,
    hello::{NETCONF_NS, XML_DECLARATION},
};

//
pub const INITIAL_MESSAGE_ID: u64 = 101;

//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datastore {
    Running,
    Candidate,
    Startup,
}

impl Datastore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Candidate => "candidate",
            Self::Startup => "startup",
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}/>", self.as_str())
    }
}

//
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Raw subtree filter content.
    Subtree(String),
    /// XPath expression, requires the `:xpath` capability on the server.
    XPath(String),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtree(content) => write!(f, r#"<filter type="subtree">{content}</filter>"#),
            Self::XPath(select) => write!(
                f,
                r#"<filter type="xpath" select="{}"/>"#,
                escape(select.as_str())
            ),
        }
    }
}

//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpc {
    body: String,
}

impl Rpc {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn to_xml(&self, message_id: u64) -> String {
        format!(
            r#"{XML_DECLARATION}
<rpc message-id="{message_id}" xmlns="{NETCONF_NS}">{}</rpc>"#,
            self.body
        )
    }

    //
    pub fn get_config(source: Datastore, filter: Option<&Filter>) -> Self {
        let filter = filter.map(ToString::to_string).unwrap_or_default();
        Self::new(format!(
            "<get-config><source>{source}</source>{filter}</get-config>"
        ))
    }

    pub fn get(filter: Option<&Filter>) -> Self {
        match filter {
            Some(filter) => Self::new(format!("<get>{filter}</get>")),
            None => Self::new("<get/>"),
        }
    }

    pub fn edit_config(target: Datastore, config: &str) -> Self {
        Self::new(format!(
            "<edit-config><target>{target}</target><config>{config}</config></edit-config>"
        ))
    }

    pub fn lock(target: Datastore) -> Self {
        Self::new(format!("<lock><target>{target}</target></lock>"))
    }

    pub fn unlock(target: Datastore) -> Self {
        Self::new(format!("<unlock><target>{target}</target></unlock>"))
    }

    pub fn commit() -> Self {
        Self::new("<commit/>")
    }

    pub fn discard_changes() -> Self {
        Self::new("<discard-changes/>")
    }

    pub fn close_session() -> Self {
        Self::new("<close-session/>")
    }

    pub fn kill_session(session_id: u32) -> Self {
        Self::new(format!(
            "<kill-session><session-id>{session_id}</session-id></kill-session>"
        ))
    }
}

//
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcError {
    pub error_type: String,
    pub error_tag: String,
    pub error_severity: String,
    pub error_message: Option<String>,
}

impl RpcError {
    pub fn is_error(&self) -> bool {
        self.error_severity != "warning"
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.error_severity, self.error_type, self.error_tag
        )?;
        if let Some(message) = &self.error_message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    message_id: Option<String>,
    ok: bool,
    errors: Vec<RpcError>,
    data: Option<String>,
    raw: String,
}

impl RpcReply {
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn errors(&self) -> &[RpcError] {
        &self.errors
    }

    /// Inner XML of the `<data>` element.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_result(self) -> Result<Self, Error> {
        if self.errors.iter().any(RpcError::is_error) {
            return Err(Error::Rpc(self.errors));
        }
        Ok(self)
    }

    pub fn parse(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut path: Vec<Vec<u8>> = vec![];
        let mut message_id = None;
        let mut ok = false;
        let mut errors = vec![];
        let mut current_error: Option<RpcError> = None;
        let mut data_start = None;
        let mut data = None;

        loop {
            let before = reader.buffer_position();
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    match path.len() {
                        0 => message_id = parse_root(&e)?,
                        1 => match name.as_slice() {
                            b"ok" => ok = true,
                            b"rpc-error" => current_error = Some(RpcError::default()),
                            b"data" => data_start = Some(reader.buffer_position()),
                            _ => {}
                        },
                        _ => {}
                    }
                    path.push(name);
                }
                Event::Empty(e) => match path.len() {
                    0 => {
                        message_id = parse_root(&e)?;
                        break;
                    }
                    1 => match e.local_name().as_ref() {
                        b"ok" => ok = true,
                        b"data" => data = Some(String::new()),
                        b"rpc-error" => errors.push(RpcError::default()),
                        _ => {}
                    },
                    _ => {}
                },
                Event::End(_) => {
                    let name = path.pop();
                    if path.len() == 1 {
                        match name.as_deref() {
                            Some(b"rpc-error") => errors.extend(current_error.take()),
                            Some(b"data") => {
                                if let Some(start) = data_start.take() {
                                    data = Some(xml[start..before].trim().to_owned());
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::Text(e) => {
                    if path.len() == 3 && path[1] == b"rpc-error" {
                        if let Some(error) = current_error.as_mut() {
                            let text = e.unescape()?.trim().to_owned();
                            match path[2].as_slice() {
                                b"error-type" => error.error_type = text,
                                b"error-tag" => error.error_tag = text,
                                b"error-severity" => error.error_severity = text,
                                b"error-message" => error.error_message = Some(text),
                                _ => {}
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self {
            message_id,
            ok,
            errors,
            data,
            raw: xml.to_owned(),
        })
    }
}

fn parse_root(e: &BytesStart<'_>) -> Result<Option<String>, Error> {
    let name = e.local_name();
    if name.as_ref() != b"rpc-reply" {
        return Err(Error::UnexpectedMessage(
            String::from_utf8_lossy(name.as_ref()).into_owned(),
        ));
    }

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"message-id" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
