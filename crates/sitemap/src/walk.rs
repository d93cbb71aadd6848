//! Namespace-aware `loc` collector shared by both document kinds.

use crate::SITEMAP_NS;
use crate::error::{ErrorKind, Result};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use std::io::BufRead;

/// Element whose `loc` children are collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Container {
    /// `<sitemap>` inside a sitemap index.
    Sitemap,
    /// `<url>` inside a url-set.
    Url,
}

impl Container {
    fn local_name(self) -> &'static [u8] {
        match self {
            Self::Sitemap => b"sitemap",
            Self::Url => b"url",
        }
    }
}

/// What an open element means to the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Container,
    /// A `loc` directly inside the container.
    Loc,
    Other,
}

fn in_sitemap_ns(resolved: &ResolveResult<'_>) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == SITEMAP_NS.as_bytes())
}

fn malformed<E>(err: E) -> crate::error::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    exn::Exn::from(err).raise(ErrorKind::Malformed)
}

pub(crate) fn collect_locs(reader: impl BufRead, container: Container) -> Result<Vec<String>> {
    let mut reader = NsReader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;
    let mut text = String::new();
    let mut locs = Vec::new();

    loop {
        let (resolved, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(pair) => pair,
            Err(err @ quick_xml::Error::Io(_)) => return Err(exn::Exn::from(err).raise(ErrorKind::Io)),
            Err(err) => {
                tracing::debug!(error = %err, "Malformed sitemap");
                return Err(malformed(err));
            },
        };
        let in_ns = in_sitemap_ns(&resolved);
        match event {
            Event::Start(element) => {
                seen_root = true;
                let name = element.local_name();
                let frame = if in_ns && name.as_ref() == container.local_name() {
                    Frame::Container
                } else if in_ns && name.as_ref() == b"loc" && stack.last() == Some(&Frame::Container) {
                    text.clear();
                    Frame::Loc
                } else {
                    Frame::Other
                };
                stack.push(frame);
            },
            Event::Empty(_) => seen_root = true,
            Event::Text(content) if stack.last() == Some(&Frame::Loc) => {
                text.push_str(&content.unescape().map_err(malformed)?);
            },
            Event::CData(content) if stack.last() == Some(&Frame::Loc) => {
                text.push_str(&String::from_utf8_lossy(&content));
            },
            Event::End(_) => {
                if stack.pop() == Some(Frame::Loc) {
                    let loc = text.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !seen_root || !stack.is_empty() {
        tracing::debug!(open_elements = stack.len(), seen_root, "Sitemap ended unexpectedly");
        exn::bail!(ErrorKind::Malformed);
    }
    Ok(locs)
}
