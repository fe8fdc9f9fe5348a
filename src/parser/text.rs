use super::patterns::{BLOCK_END, BREAK, TAG};

/// Plain-text rendering of an HTML fragment, the way a browser's
/// `innerText` would show it. Breaks and block ends become newlines.
pub fn to_plain(html: &str) -> String {
    let broken = BREAK.replace_all(html, "\n");
    let broken = BLOCK_END.replace_all(&broken, "\n");
    let stripped = TAG.replace_all(&broken, "");
    decode_entities(&stripped)
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn strip_tags(html: &str) -> String {
    decode_entities(&TAG.replace_all(html, ""))
}

/// Collapse ASCII and full-width whitespace runs into single spaces.
pub fn normalize_ws(s: &str) -> String {
    s.split(char::is_whitespace)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_become_lines() {
        let html = r#"<img src="mail.gif">博多 9:00<br><a href="d?id=1">山田&nbsp;太郎様</a>"#;
        assert_eq!(to_plain(html), "博多 9:00\n山田 太郎様");
    }

    #[test]
    fn block_ends_become_lines() {
        let html = "<p>連絡可能時間：夕方</p><div>備考：<b>特になし</b></div><ul><li>a</li><li>b</li></ul>";
        assert_eq!(to_plain(html), "連絡可能時間：夕方\n備考：特になし\na\nb");
    }

    #[test]
    fn normalize_fullwidth() {
        assert_eq!(normalize_ws("  田中　 花子 "), "田中 花子");
    }

    #[test]
    fn amp_decoded_last() {
        assert_eq!(strip_tags("<b>&amp;lt;</b>"), "&lt;");
    }
}
