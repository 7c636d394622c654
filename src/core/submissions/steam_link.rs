// Steam link parsing.
//
// A submission link is only accepted when it points at a Steam store or
// community page for an app: `https://store.steampowered.com/app/<digits>/...`.
// The app id is the leading digit run of the path segment after `app`.

use thiserror::Error;
use url::Url;

const APP_PATH_MARKER: &str = "app";

const STEAM_HOSTS: [&str; 2] = ["store.steampowered.com", "steamcommunity.com"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Not a valid URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Not a Steam link: {0}")]
    UnrecognizedHost(String),

    #[error("No app id found in link")]
    MissingAppId,
}

/// Extract the Steam app id from a submission link.
pub fn parse_app_id(link: &str) -> Result<u64, LinkError> {
    let url = Url::parse(link.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(LinkError::UnsupportedScheme(other.to_string())),
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let bare_host = host.strip_prefix("www.").unwrap_or(&host);
    if !STEAM_HOSTS.contains(&bare_host) {
        return Err(LinkError::UnrecognizedHost(host));
    }

    let mut segments = url.path_segments().ok_or(LinkError::MissingAppId)?;
    segments
        .find(|segment| segment.eq_ignore_ascii_case(APP_PATH_MARKER))
        .and_then(|_| segments.next())
        .and_then(leading_digits)
        .ok_or(LinkError::MissingAppId)
}

fn leading_digits(segment: &str) -> Option<u64> {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());

    match segment[..end].parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(id) => Some(id),
    }
}
