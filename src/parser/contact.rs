use tracing::{debug, info, warn};

use super::patterns::{CALL_CONTENT_CELL, CONTACT_TIME, RESPONDER_CELL, SLOT_KEYWORDS};
use super::text::{normalize_ws, to_plain};
use crate::model::ContactTime;

/// Resolve the contact time from a detail page.
///
/// The search is scoped to the `受電内容` cell when the page has one and runs
/// on its rendered text, so the value ends at the first line. A value that
/// contains no canonical slot is kept verbatim.
pub fn resolve_contact_time(detail: &str) -> ContactTime {
    let scope = match CALL_CONTENT_CELL.captures(detail) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => {
            debug!("No 受電内容 cell, searching whole page");
            detail
        }
    };

    let text = to_plain(scope);
    let Some(caps) = CONTACT_TIME.captures(&text) else {
        warn!("連絡可能時間 not found");
        return ContactTime::unspecified();
    };
    let value = caps[1].trim().to_string();
    info!("連絡可能時間: {}", value);
    match_slot(&value)
}

/// First canonical keyword contained in `value`, else the text itself.
pub fn match_slot(value: &str) -> ContactTime {
    if value.is_empty() {
        return ContactTime::unspecified();
    }
    SLOT_KEYWORDS
        .iter()
        .find(|(keyword, _)| value.contains(keyword.as_str()))
        .map(|(_, slot)| ContactTime::Fixed(*slot))
        .unwrap_or_else(|| ContactTime::Other(value.to_string()))
}

/// Staff name from the `対応者` cell, which reads `date time name...`.
pub fn resolve_responder(detail: &str) -> String {
    let Some(caps) = RESPONDER_CELL.captures(detail) else {
        warn!("対応者 cell not found");
        return String::new();
    };
    let text = normalize_ws(&to_plain(&caps[1]));
    let parts: Vec<&str> = text.split(' ').collect();
    if parts.len() > 2 {
        parts[2..].join(" ")
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FixedSlot;

    fn page(content: &str) -> String {
        format!(
            "<table><tr><th>予約日</th><td>2025/04/01</td></tr>\
             <tr><th>受電内容</th><td>{}</td></tr></table>",
            content
        )
    }

    #[test]
    fn canonical_slot() {
        let ct = resolve_contact_time(&page("ご用件：予約<br>連絡可能時間：14時から15時<br>以上"));
        assert_eq!(ct, ContactTime::Fixed(FixedSlot::Hour(14)));
        assert_eq!(ct.label(), "14時から15時");
    }

    #[test]
    fn bare_content_without_cell() {
        let ct = resolve_contact_time("連絡可能時間：14時から15時<br>");
        assert_eq!(ct.label(), "14時から15時");
    }

    #[test]
    fn anytime_wins_by_order() {
        let ct = match_slot("いつでも可能（10時から11時が希望）");
        assert_eq!(ct, ContactTime::Fixed(FixedSlot::Anytime));
    }

    #[test]
    fn unmatched_value_kept_verbatim() {
        let ct = resolve_contact_time(&page("連絡可能時間：平日の夕方以降<br>"));
        assert_eq!(ct, ContactTime::Other("平日の夕方以降".into()));
    }

    #[test]
    fn paragraph_fields_end_the_value() {
        let ct = resolve_contact_time(&page("<p>連絡可能時間：夕方</p><p>備考：特になし</p>"));
        assert_eq!(ct, ContactTime::Other("夕方".into()));

        // The next field's hour must not leak into the slot match.
        let ct = resolve_contact_time(&page(
            "<div>連絡可能時間：平日のみ</div><div>来院予定：14時から15時</div>",
        ));
        assert_eq!(ct, ContactTime::Other("平日のみ".into()));

        let ct = resolve_contact_time(&page("<p>連絡可能時間：<span>10時から11時</span></p><p>以上</p>"));
        assert_eq!(ct, ContactTime::Fixed(FixedSlot::Hour(10)));
    }

    #[test]
    fn missing_label_is_unspecified() {
        let ct = resolve_contact_time(&page("特になし"));
        assert_eq!(ct, ContactTime::unspecified());
        assert_eq!(resolve_contact_time(""), ContactTime::unspecified());
    }

    #[test]
    fn empty_value_is_unspecified() {
        let ct = resolve_contact_time(&page("連絡可能時間：<br>"));
        assert_eq!(ct, ContactTime::unspecified());
    }

    #[test]
    fn responder_after_date_and_time() {
        let html = "<tr><th>対応者</th><td>2025/04/01 10:15 山田 太郎</td></tr>";
        assert_eq!(resolve_responder(html), "山田 太郎");
    }

    #[test]
    fn responder_in_paragraphs() {
        let html = "<tr><th>対応者</th><td><p>2025/04/01 10:15</p><p>山田 太郎</p></td></tr>";
        assert_eq!(resolve_responder(html), "山田 太郎");
    }

    #[test]
    fn responder_missing_or_short() {
        assert_eq!(resolve_responder("<tr><th>対応者</th><td>2025/04/01</td></tr>"), "");
        assert_eq!(resolve_responder("<p>nothing</p>"), "");
    }
}
