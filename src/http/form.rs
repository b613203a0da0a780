//! Form decoding
//!
//! Decodes `application/x-www-form-urlencoded` payloads, query strings and
//! `multipart/form-data` bodies. Values are kept as raw bytes so a submitted
//! page body round-trips exactly, even when it is not valid UTF-8.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;

/// Decoded form fields in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, Vec<u8>)>,
}

impl FormData {
    /// Parse `key=value&key2=value2` data
    ///
    /// A pair without `=` is a key with an empty value. Empty pairs are skipped.
    pub fn parse(input: &[u8]) -> Self {
        let fields = input
            .split(|&b| b == b'&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = match pair.iter().position(|&b| b == b'=') {
                    Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                    None => (pair, &[][..]),
                };
                let key = String::from_utf8_lossy(&percent_decode(key)).into_owned();
                (key, percent_decode(value))
            })
            .collect();
        Self { fields }
    }

    /// First value submitted for `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Parse a buffered `multipart/form-data` body
    ///
    /// File parts are skipped; only plain values become fields.
    pub async fn parse_multipart(body: Bytes, boundary: String) -> Result<Self, multer::Error> {
        let mut multipart = multer::Multipart::new(Full::new(body).into_data_stream(), boundary);
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };
            let value = field.bytes().await?;
            fields.push((name, value.to_vec()));
        }
        Ok(Self { fields })
    }

    /// Append every field of `other` after this form's fields
    pub fn extend(&mut self, other: Self) {
        self.fields.extend(other.fields);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decode `%XX` escapes in a URL path; `None` if the result is not UTF-8
pub fn decode_path(path: &str) -> Option<String> {
    String::from_utf8(unescape(path.as_bytes(), false)).ok()
}

/// Decode `+` as space and `%XX` escapes; malformed escapes pass through
fn percent_decode(input: &[u8]) -> Vec<u8> {
    unescape(input, true)
}

fn unescape(input: &[u8], plus_as_space: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (input.get(i + 1), input.get(i + 2)) {
                (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push((hex_value(hi) << 4) | hex_value(lo));
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_field() {
        let form = FormData::parse(b"body=Hello%2C+world%21");
        assert_eq!(form.get("body"), Some(&b"Hello, world!"[..]));
    }

    #[test]
    fn test_parse_multiple_fields_first_wins() {
        let form = FormData::parse(b"a=1&body=first&body=second");
        assert_eq!(form.get("a"), Some(&b"1"[..]));
        assert_eq!(form.get("body"), Some(&b"first"[..]));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_parse_key_without_value() {
        let form = FormData::parse(b"body&other=x");
        assert_eq!(form.get("body"), Some(&b""[..]));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(FormData::parse(b"").is_empty());
        assert!(FormData::parse(b"&&").is_empty());
    }

    #[test]
    fn test_decode_newlines_and_utf8() {
        let form = FormData::parse(b"body=line1%0D%0Aline2+%C3%A9");
        assert_eq!(form.get("body"), Some("line1\r\nline2 é".as_bytes()));
    }

    #[test]
    fn test_decode_keeps_raw_bytes() {
        let form = FormData::parse(b"body=%FF%00");
        assert_eq!(form.get("body"), Some(&[0xff, 0x00][..]));
    }

    #[test]
    fn test_decode_malformed_escape_passes_through() {
        let form = FormData::parse(b"body=100%+sure%2");
        assert_eq!(form.get("body"), Some(&b"100% sure%2"[..]));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/view/Foo%31").as_deref(), Some("/view/Foo1"));
        assert_eq!(decode_path("/edit/a+b").as_deref(), Some("/edit/a+b"));
        assert_eq!(decode_path("/edit/bad%20title!").as_deref(), Some("/edit/bad title!"));
        assert_eq!(decode_path("/view/%FF"), None);
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str("--XB\r\nContent-Disposition: form-data; name=\"");
            body.push_str(name);
            body.push('"');
            if let Some(file_name) = file_name {
                body.push_str("; filename=\"");
                body.push_str(file_name);
                body.push('"');
            }
            body.push_str("\r\n\r\n");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("--XB--\r\n");
        Bytes::from(body)
    }

    #[tokio::test]
    async fn test_parse_multipart_fields() {
        let body = multipart_body(&[("title", None, "ignored"), ("body", None, "line1\r\nline2")]);
        let form = FormData::parse_multipart(body, "XB".to_string()).await.unwrap();
        assert_eq!(form.get("body"), Some(&b"line1\r\nline2"[..]));
        assert_eq!(form.get("title"), Some(&b"ignored"[..]));
    }

    #[tokio::test]
    async fn test_parse_multipart_skips_file_parts() {
        let body = multipart_body(&[("body", Some("page.txt"), "uploaded")]);
        let form = FormData::parse_multipart(body, "XB".to_string()).await.unwrap();
        assert_eq!(form.get("body"), None);
        assert!(form.is_empty());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut form = FormData::parse(b"body=first");
        form.extend(FormData::parse(b"body=second&other=1"));
        assert_eq!(form.get("body"), Some(&b"first"[..]));
        assert_eq!(form.get("other"), Some(&b"1"[..]));
    }

    #[test]
    fn test_encoded_equals_in_value() {
        let form = FormData::parse(b"body=a%3Db=c");
        assert_eq!(form.get("body"), Some(&b"a=b=c"[..]));
    }
}
