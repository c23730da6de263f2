//! Query encoding and request authentication.
//!
//! Requests carry either an API key (`key=`) or, for enterprise customers, a
//! client id plus an HMAC-SHA1 signature over `path?query` keyed with the
//! base64url-decoded client secret. Query strings are form-encoded and then
//! have RFC 3986 unreserved characters (`A-Za-z0-9-._~`) restored to their
//! literal form so signatures match what the service computes.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;
use url::form_urlencoded::Serializer;
use waymark_core::ArgumentError;

use crate::MapsError;

type HmacSha1 = Hmac<Sha1>;

/// URL-safe alphabet accepting secrets with or without padding.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const REDACTED: &str = "REDACTED";

/// Errors raised while computing a request signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The client secret is not valid base64url.
    #[error("client secret is not valid base64url: {0}")]
    InvalidSecret(#[from] base64::DecodeError),
    /// The decoded secret could not key the MAC.
    #[error("client secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// Query parameters in the order they will be encoded.
///
/// Built either from an unordered mapping, in which case keys are sorted so
/// the resulting URL is deterministic, or from an already-ordered list,
/// which may repeat keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// An empty parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build parameters from a mapping, sorted by key.
    ///
    /// Later duplicates of a key replace earlier ones.
    #[must_use]
    pub fn sorted<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            pairs: map.into_iter().collect(),
        }
    }

    /// Build parameters that keep the caller's order, duplicates included.
    #[must_use]
    pub fn ordered<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Append a pair after the existing ones.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// The pairs in encoding order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Form-encode the pairs in order.
    #[must_use]
    pub fn encode(&self) -> String {
        urlencode_params(self.pairs.iter().map(|(key, value)| (key, value)))
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self {
            pairs: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::sorted(iter)
    }
}

/// Form-encode `pairs`, leaving unreserved characters literal.
///
/// ```
/// use waymark_client::signing::urlencode_params;
///
/// assert_eq!(urlencode_params([("address", "=Sydney ~")]), "address=%3DSydney+~");
/// ```
#[must_use]
pub fn urlencode_params<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    unquote_unreserved(&serializer.finish())
}

/// Replace `%XX` escapes of unreserved characters with the character itself.
///
/// Every other escape, including malformed ones, is left untouched.
#[must_use]
pub fn unquote_unreserved(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(pos) = rest.find('%') {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let decoded = tail
            .get(1..3)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match decoded {
            Some(byte) if is_unreserved(byte) => {
                out.push(char::from(byte));
                rest = tail.get(3..).unwrap_or_default();
            }
            _ => {
                out.push('%');
                rest = tail.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    out
}

const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Decode a base64url client secret, padded or not.
///
/// # Errors
///
/// Returns [`SigningError::InvalidSecret`] when the input is not base64url.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, SigningError> {
    Ok(LENIENT_URL_SAFE.decode(secret)?)
}

/// HMAC-SHA1 `payload` with a base64url secret, returning base64url output.
///
/// # Errors
///
/// Returns [`SigningError`] when the secret cannot be decoded.
pub fn sign_hmac(secret: &str, payload: &str) -> Result<String, SigningError> {
    sign_with_key(&decode_secret(secret)?, payload)
}

fn sign_with_key(key: &[u8], payload: &str) -> Result<String, SigningError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Replace the values of `key` and `signature` query parameters.
#[must_use]
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_owned();
    };
    let redacted = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name @ ("key" | "signature"), _)) => format!("{name}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{redacted}")
}

#[derive(Clone)]
struct Enterprise {
    client_id: String,
    signing_key: Vec<u8>,
}

/// Credentials used to authenticate every request a client issues.
#[derive(Clone, Default)]
pub struct Credentials {
    key: Option<String>,
    enterprise: Option<Enterprise>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key.as_ref().map(|_| REDACTED))
            .field(
                "client_id",
                &self.enterprise.as_ref().map(|e| e.client_id.as_str()),
            )
            .field("client_secret", &self.enterprise.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl Credentials {
    /// Assemble credentials.
    ///
    /// Enterprise signing is enabled only when both `client_id` and
    /// `client_secret` are present.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidSecret`] when the secret is not
    /// base64url.
    pub fn new(
        key: Option<String>,
        client_id: Option<String>,
        client_secret: Option<&str>,
    ) -> Result<Self, SigningError> {
        let enterprise = match (client_id, client_secret) {
            (Some(id), Some(secret)) => Some(Enterprise {
                client_id: id,
                signing_key: decode_secret(secret)?,
            }),
            _ => None,
        };
        Ok(Self { key, enterprise })
    }

    /// Whether no credential of either kind is configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.key.is_none() && self.enterprise.is_none()
    }

    /// Build the authenticated `path?query` for a request.
    ///
    /// Enterprise signing wins when the endpoint accepts it; otherwise the
    /// API key is appended.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MissingCredentials`] when no usable
    /// credential exists, or a signing failure.
    pub fn generate_auth_url(
        &self,
        path: &str,
        params: &Params,
        accepts_client_id: bool,
    ) -> Result<String, MapsError> {
        let mut authed = params.clone();
        match (&self.enterprise, &self.key) {
            (Some(enterprise), _) if accepts_client_id => {
                authed.push("client", enterprise.client_id.as_str());
                let signed_part = format!("{path}?{}", authed.encode());
                let signature = sign_with_key(&enterprise.signing_key, &signed_part)?;
                Ok(format!("{signed_part}&signature={signature}"))
            }
            (_, Some(key)) => {
                authed.push("key", key.as_str());
                Ok(format!("{path}?{}", authed.encode()))
            }
            _ => Err(ArgumentError::MissingCredentials.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn enterprise() -> Credentials {
        Credentials::new(None, Some("foo".to_owned()), Some("a2V5")).expect("valid secret")
    }

    #[rstest]
    fn signs_reference_payload() {
        let signature = sign_hmac("a2V5", "The quick brown fox jumps over the lazy dog")
            .expect("valid secret");
        assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
    }

    #[rstest]
    #[case("a2V5cw")]
    #[case("a2V5cw==")]
    fn secrets_decode_with_or_without_padding(#[case] secret: &str) {
        assert_eq!(decode_secret(secret).expect("valid secret"), b"keys");
    }

    #[rstest]
    fn rejects_invalid_secret() {
        assert!(matches!(
            sign_hmac("not base64!", "payload"),
            Err(SigningError::InvalidSecret(_))
        ));
    }

    #[rstest]
    #[case(&[("address", "=Sydney ~")], "address=%3DSydney+~")]
    #[case(&[("a", "b"), ("c", "d|e")], "a=b&c=d%7Ce")]
    #[case(&[("path", "-33.8,151.2|-33.9,151.3")], "path=-33.8%2C151.2%7C-33.9%2C151.3")]
    fn encodes_params(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        assert_eq!(urlencode_params(pairs.iter().copied()), expected);
    }

    #[rstest]
    #[case("%7E%41%2D", "~A-")]
    #[case("%2C%7C", "%2C%7C")]
    #[case("%7", "%7")]
    #[case("%zz%", "%zz%")]
    #[case("100%", "100%")]
    fn unquotes_only_unreserved_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unquote_unreserved(input), expected);
    }

    #[rstest]
    fn sorted_params_order_by_key() {
        let params = Params::sorted([("b", "2"), ("a", "1")]);
        assert_eq!(
            params.pairs(),
            &[("a".to_owned(), "1".to_owned()), ("b".to_owned(), "2".to_owned())]
        );
    }

    #[rstest]
    fn ordered_params_keep_duplicates() {
        let params = Params::ordered([("placeId", "x"), ("placeId", "y")]);
        assert_eq!(params.pairs().len(), 2);
    }

    #[rstest]
    fn owned_params_encode_in_order() {
        let params = Params::ordered([
            ("placeId".to_owned(), "ChIJ b".to_owned()),
            ("placeId".to_owned(), "ChIJ~a".to_owned()),
        ]);
        assert_eq!(params.encode(), "placeId=ChIJ+b&placeId=ChIJ~a");
    }

    #[rstest]
    fn ordered_params_are_signed_without_reordering(enterprise: Credentials) {
        let params = Params::ordered([("path", "1,2|3,4"), ("interpolate", "true")]);
        let url = enterprise
            .generate_auth_url("/v1/snapToRoads", &params, true)
            .expect("signed url");
        let (signed_part, signature) = url.split_once("&signature=").expect("signature suffix");
        assert_eq!(
            signed_part,
            "/v1/snapToRoads?path=1%2C2%7C3%2C4&interpolate=true&client=foo"
        );
        assert_eq!(
            sign_hmac("a2V5", signed_part).expect("valid secret"),
            signature
        );
    }

    #[rstest]
    fn enterprise_urls_are_signed(enterprise: Credentials) {
        let params = Params::sorted([("address", "Sesame St.")]);
        let url = enterprise
            .generate_auth_url("/maps/api/geocode/json", &params, true)
            .expect("signed url");
        assert_eq!(
            url,
            "/maps/api/geocode/json?address=Sesame+St.&client=foo&signature=fxbWUIcNPZSekVOhp2ul9LW5TpY="
        );
    }

    #[rstest]
    fn key_is_appended_when_enterprise_is_refused() {
        let credentials = Credentials::new(
            Some("AIzaKey".to_owned()),
            Some("foo".to_owned()),
            Some("a2V5"),
        )
        .expect("valid secret");
        let params = Params::sorted([("latlng", "1,2")]);
        let url = credentials
            .generate_auth_url("/v1/nearestRoads", &params, false)
            .expect("key url");
        assert_eq!(url, "/v1/nearestRoads?latlng=1%2C2&key=AIzaKey");
    }

    #[rstest]
    fn enterprise_only_credentials_fail_without_client_id_support(enterprise: Credentials) {
        let result = enterprise.generate_auth_url("/v1/snapToRoads", &Params::new(), false);
        assert!(matches!(
            result,
            Err(MapsError::Argument(ArgumentError::MissingCredentials))
        ));
    }

    #[rstest]
    fn client_id_without_secret_is_ignored() {
        let credentials =
            Credentials::new(None, Some("foo".to_owned()), None).expect("no secret to decode");
        assert!(credentials.is_empty());
    }

    #[rstest]
    #[case("/maps/api/geocode/json?address=x&key=secret", "/maps/api/geocode/json?address=x&key=REDACTED")]
    #[case("/p?client=foo&signature=abc=", "/p?client=foo&signature=REDACTED")]
    #[case("/p", "/p")]
    fn redacts_credentials(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(redact(input), expected);
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let credentials = Credentials::new(
            Some("AIzaKey".to_owned()),
            Some("foo".to_owned()),
            Some("a2V5"),
        )
        .expect("valid secret");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("AIzaKey"));
        assert!(rendered.contains("foo"));
    }
}
