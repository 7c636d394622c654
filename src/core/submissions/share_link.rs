// Aggregated share links.
//
// The spin-the-games site takes a list of Steam app ids in its query string:
// `https://james.spinthe.games/?share={list-title:[441620,570]}`.

pub const DEFAULT_LIST_TITLE: &str = "list-title";

/// Setting key holding the list title used in share links.
pub const LIST_TITLE_SETTING: &str = "share_list_title";

pub const MAX_TITLE_LEN: usize = 64;

const RESERVED_TITLE_CHARS: [char; 5] = ['{', '}', '[', ']', ':'];

/// Build a share link for the given app ids, in order.
pub fn build_share_link(base_url: &str, title: &str, appids: &[u64]) -> String {
    let ids = appids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    format!("{}?share={{{}:[{}]}}", base_url, title, ids)
}

/// Check a list title before it's stored. Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<&str, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title can't be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("Title can be at most {} characters", MAX_TITLE_LEN));
    }
    if title.contains(RESERVED_TITLE_CHARS) {
        return Err("Title can't contain { } [ ] or :".to_string());
    }
    Ok(title)
}
