//! Notification text for a scraped entry, in Telegram's legacy Markdown.

use feedrelay_core::TELEGRAM_MAX_MESSAGE_LEN;
use url::Url;

/// Titles longer than this are cut so the header never crowds out the links.
const MAX_TITLE_CHARS: usize = 512;

/// Backslash-escapes the characters legacy Markdown treats as entity markers.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '[' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the download notification for an entry:
///
/// ```text
/// *Title*: <title>
///
/// *Download*:
///
/// [<host>](<link>)
/// ```
///
/// One line per link, labelled with the link's host (the link itself when it
/// has none). Links that would push the message past Telegram's length limit
/// are replaced by a `... and N more` line.
#[must_use]
pub fn format_download_message(title: &str, links: &[String]) -> String {
    let title: String = title.chars().take(MAX_TITLE_CHARS).collect();
    let mut message = format!("*Title*: {}\n\n*Download*:\n\n", escape_markdown(&title));
    let mut used = utf16_len(&message);

    let lines: Vec<String> = links.iter().map(|link| link_line(link)).collect();
    let mut kept = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let separator = usize::from(i > 0);
        let remaining = lines.len().saturating_sub(i + 1);
        let tail = if remaining > 0 { utf16_len(&more_line(remaining)) + 1 } else { 0 };
        let line_len = utf16_len(line);
        if used + separator + line_len + tail > TELEGRAM_MAX_MESSAGE_LEN {
            break;
        }
        if separator == 1 {
            message.push('\n');
        }
        message.push_str(line);
        used += separator + line_len;
        kept += 1;
    }

    let dropped = lines.len().saturating_sub(kept);
    if dropped > 0 {
        if kept > 0 {
            message.push('\n');
        }
        message.push_str(&more_line(dropped));
    }
    message
}

fn link_line(link: &str) -> String {
    let host = Url::parse(link).ok().and_then(|u| u.host_str().map(str::to_owned));
    let label = host.as_deref().unwrap_or(link);
    format!("[{}]({link})", escape_markdown(label))
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn more_line(count: usize) -> String {
    format!("... and {count} more")
}
