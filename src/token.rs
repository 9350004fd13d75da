use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;

use crate::Error;

/// Tokens are issued without padding, but padded segments are accepted as well.
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Untrusted JOSE header of a token. Nothing in here may be relied upon before [`crate::key_resolver`] checked it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub typ: Option<String>,
    pub alg: Option<String>,
    pub kid: Option<String>,
    pub x5t: Option<String>,
}

/// A token split into its three segments, with only the header decoded.
#[derive(Debug)]
pub struct ParsedToken<'a> {
    pub header: Header,
    pub payload: &'a str,
    pub signature: &'a str,
}

/// Splits `token` into header, payload and signature and decodes the header.
///
/// The payload stays encoded: its contents are not looked at before the signature covering it has been verified.
pub fn parse(token: &str) -> Result<ParsedToken<'_>, Error> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::MalformedToken);
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(Error::MalformedToken);
    }

    let header_json = BASE64_URL
        .decode(header)
        .map_err(|_| Error::MalformedToken)?;
    let header = serde_json::from_slice(&header_json).map_err(|_| Error::MalformedToken)?;

    Ok(ParsedToken {
        header,
        payload,
        signature,
    })
}
