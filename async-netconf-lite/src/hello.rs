use core::fmt;

use quick_xml::{escape::escape, events::Event, Reader};

use crate::error::Error;

//
pub const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";
pub const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

//
#[derive(Debug)]
pub enum HelloError {
    NotHello(String),
    NoCapabilities,
    MissingSessionId,
    InvalidSessionId(String),
}

impl fmt::Display for HelloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for HelloError {}

//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    capabilities: Vec<String>,
    session_id: Option<u32>,
}

impl Default for Hello {
    fn default() -> Self {
        Self::client(default_client_capabilities())
    }
}

pub fn default_client_capabilities() -> Vec<String> {
    vec![BASE_1_0.to_owned(), BASE_1_1.to_owned()]
}

impl Hello {
    pub fn client(capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            session_id: None,
        }
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn session_id(&self) -> Option<u32> {
        self.session_id
    }

    /// Whether `capability` is advertised, ignoring any `?` parameters.
    pub fn supports(&self, capability: &str) -> bool {
        let capability = strip_query(capability);
        self.capabilities
            .iter()
            .any(|x| strip_query(x) == capability)
    }

    pub fn to_xml(&self) -> String {
        let mut s = String::with_capacity(256);
        s.push_str(XML_DECLARATION);
        s.push('\n');
        s.push_str(&format!(r#"<hello xmlns="{NETCONF_NS}">"#));
        s.push_str("\n  <capabilities>\n");
        for capability in &self.capabilities {
            s.push_str(&format!(
                "    <capability>{}</capability>\n",
                escape(capability.as_str())
            ));
        }
        s.push_str("  </capabilities>\n");
        if let Some(session_id) = self.session_id {
            s.push_str(&format!("  <session-id>{session_id}</session-id>\n"));
        }
        s.push_str("</hello>\n");
        s
    }

    pub fn parse(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut path: Vec<Vec<u8>> = vec![];
        let mut seen_root = false;
        let mut capabilities = vec![];
        let mut session_id = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if path.is_empty() {
                        check_root(&name, seen_root)?;
                        seen_root = true;
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    if path.is_empty() {
                        check_root(e.local_name().as_ref(), seen_root)?;
                        seen_root = true;
                    }
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    let text = text.trim();
                    match path.last().map(Vec::as_slice) {
                        Some(b"capability") => capabilities.push(text.to_owned()),
                        Some(b"session-id") => {
                            let id = text
                                .parse::<u32>()
                                .map_err(|_| HelloError::InvalidSessionId(text.to_owned()))?;
                            session_id = Some(id);
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(HelloError::NotHello(String::new()).into());
        }
        if capabilities.is_empty() {
            return Err(HelloError::NoCapabilities.into());
        }

        Ok(Self {
            capabilities,
            session_id,
        })
    }

    /// Like [`Hello::parse`], additionally requiring the `session-id` a server must send.
    pub fn parse_server(xml: &str) -> Result<Self, Error> {
        let hello = Self::parse(xml)?;
        match hello.session_id {
            Some(0) => Err(HelloError::InvalidSessionId("0".to_owned()).into()),
            Some(_) => Ok(hello),
            None => Err(HelloError::MissingSessionId.into()),
        }
    }
}

fn check_root(name: &[u8], seen_root: bool) -> Result<(), HelloError> {
    if seen_root || name != b"hello" {
        return Err(HelloError::NotHello(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    Ok(())
}

fn strip_query(capability: &str) -> &str {
    capability
        .split_once('?')
        .map(|(uri, _)| uri)
        .unwrap_or(capability)
}
