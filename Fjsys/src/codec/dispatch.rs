//! Ordered codec dispatch rules

use super::{CodecError, ImageCodec, MgdCodec, MsdCodec, ScriptCodec};

/// Predicate half of a dispatch rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Data starts with the given bytes.
    Signature(&'static [u8]),
    /// Name ends in `.{ext}`, compared ASCII case-insensitively.
    Extension(&'static str),
}

impl Matcher {
    /// Check whether an entry matches this predicate.
    pub fn matches(&self, name: &[u8], data: &[u8]) -> bool {
        match self {
            Matcher::Signature(signature) => data.starts_with(signature),
            Matcher::Extension(ext) => has_extension(name, ext),
        }
    }
}

/// Codec half of a dispatch rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Image,
    Script,
}

/// One `(predicate, codec)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub handler: Handler,
}

/// The image and script codecs plus the rule lists that choose between them.
///
/// Rules are evaluated top to bottom; the first match wins and an entry with
/// no match passes through unchanged.
pub struct CodecRegistry {
    image: Box<dyn ImageCodec>,
    script: Box<dyn ScriptCodec>,
    decode_rules: Vec<Rule>,
    encode_rules: Vec<Rule>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new(Box::new(MgdCodec), Box::new(MsdCodec))
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("decode_rules", &self.decode_rules)
            .field("encode_rules", &self.encode_rules)
            .finish_non_exhaustive()
    }
}

impl CodecRegistry {
    /// Build a registry around the given codecs.
    ///
    /// Decoding checks the image signature before the script extension, so
    /// image content is always routed to the image codec whatever its name.
    /// Encoding has no content to sniff and goes by extension alone.
    pub fn new(image: Box<dyn ImageCodec>, script: Box<dyn ScriptCodec>) -> Self {
        let decode_rules = vec![
            Rule {
                matcher: Matcher::Signature(image.signature()),
                handler: Handler::Image,
            },
            Rule {
                matcher: Matcher::Extension(script.extension()),
                handler: Handler::Script,
            },
        ];
        let encode_rules = vec![
            Rule {
                matcher: Matcher::Extension(image.extension()),
                handler: Handler::Image,
            },
            Rule {
                matcher: Matcher::Extension(script.extension()),
                handler: Handler::Script,
            },
        ];

        Self {
            image,
            script,
            decode_rules,
            encode_rules,
        }
    }

    /// Rules consulted on unpack, in priority order.
    pub fn decode_rules(&self) -> &[Rule] {
        &self.decode_rules
    }

    /// Rules consulted on pack, in priority order.
    pub fn encode_rules(&self) -> &[Rule] {
        &self.encode_rules
    }

    /// Which handler, if any, decodes this entry.
    pub fn decode_handler(&self, name: &[u8], data: &[u8]) -> Option<Handler> {
        first_match(&self.decode_rules, name, data)
    }

    /// Which handler, if any, encodes this entry.
    pub fn encode_handler(&self, name: &[u8], data: &[u8]) -> Option<Handler> {
        first_match(&self.encode_rules, name, data)
    }

    /// Decode an archived entry.
    pub fn decode(
        &self,
        name: &[u8],
        data: Vec<u8>,
        key: Option<&[u8]>,
    ) -> Result<Vec<u8>, CodecError> {
        match self.decode_handler(name, &data) {
            Some(Handler::Image) => self.image.decode(&data),
            Some(Handler::Script) => self.script.decode(&data, key),
            None => Ok(data),
        }
    }

    /// Encode an entry for archiving.
    pub fn encode(&self, name: &[u8], data: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        match self.encode_handler(name, &data) {
            Some(Handler::Image) => self.image.encode(&data),
            Some(Handler::Script) => self.script.encode(&data),
            None => Ok(data),
        }
    }
}

fn first_match(rules: &[Rule], name: &[u8], data: &[u8]) -> Option<Handler> {
    rules
        .iter()
        .find(|rule| rule.matcher.matches(name, data))
        .map(|rule| rule.handler)
}

/// Case-insensitive `.{ext}` suffix check on a raw name.
pub(crate) fn has_extension(name: &[u8], ext: &str) -> bool {
    let ext = ext.as_bytes();
    if name.len() <= ext.len() {
        return false;
    }
    let (stem, suffix) = name.split_at(name.len() - ext.len());
    stem.last() == Some(&b'.') && suffix.eq_ignore_ascii_case(ext)
}
