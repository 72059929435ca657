use crate::errors::ScrapeResult;

/// A successfully fetched resource (2xx only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body decoded with the charset from `content_type`, UTF-8 otherwise.
    pub body: String,
    /// Undecoded response body; XML parsers read the encoding from the prolog.
    pub bytes: Vec<u8>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            url: url.into(),
            status: 200,
            content_type: None,
            bytes: body.clone().into_bytes(),
            body,
        }
    }

    pub fn from_bytes(
        url: impl Into<String>,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Self {
        let body = decode_body(&bytes, content_type.as_deref());
        Self {
            url: url.into(),
            status: 200,
            content_type,
            body,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Decode with the `charset` parameter of `content_type` when it names a
/// known encoding; UTF-8 (with BOM sniffing) otherwise.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);

    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher: Send + Sync {
    /// GET `url`. Transport failures and non-2xx statuses are errors.
    fn fetch(&self, url: &str) -> ScrapeResult<FetchedPage>;
}
