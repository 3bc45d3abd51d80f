use std::borrow::Cow;

use crate::error::{Error, Result};

pub const TEXT_PLAIN: &str = "text/plain";

/// Data placed on, or read from, the system clipboard.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClipboardData {
    mime_type: Cow<'static, str>,
    data: Vec<u8>,
}

impl ClipboardData {
    /// Fails with [`Error::UnsupportedType`] unless `mime_type` is one every
    /// clipboard implementation can exchange.
    pub fn new(mime_type: impl Into<Cow<'static, str>>, data: impl Into<Vec<u8>>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !is_supported_type(&mime_type) {
            return Err(Error::UnsupportedType);
        }
        Ok(Self {
            mime_type,
            data: data.into(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mime_type: Cow::Borrowed(TEXT_PLAIN),
            data: text.into().into_bytes(),
        }
    }

    #[inline]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Accepts `text/plain`, optionally qualified with a UTF-8 charset.
pub fn is_supported_type(mime_type: &str) -> bool {
    let mut parts = mime_type.split(';').map(str::trim);
    let essence = parts.next().unwrap_or_default();
    if !essence.eq_ignore_ascii_case(TEXT_PLAIN) {
        return false;
    }
    parts.all(|parameter| {
        let mut pair = parameter.splitn(2, '=').map(str::trim);
        match (pair.next(), pair.next()) {
            (Some(name), Some(value)) if name.eq_ignore_ascii_case("charset") => {
                let value = value.trim_matches('"');
                value.eq_ignore_ascii_case("utf-8") || value.eq_ignore_ascii_case("utf8")
            }
            _ => false,
        }
    })
}
