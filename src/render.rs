use std::fmt::Write as _;
use std::path::Path;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::Grouped;
use crate::error::Result;
use crate::model::{reservation_id, FixedSlot, ReservationRecord};
use crate::period::Period;

pub const NUMERIC_LABEL: &str = "数字付き";
pub const FLAGGED_LABEL: &str = "追M";
pub const OTHER_LABEL: &str = "その他";
pub const ZERO_ONLY_LABEL: &str = "対応不要";

const MAX_RESPONDERS: usize = 10;
const HIGHLIGHT_DAYS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Numeric,
    Slot,
    Flagged,
    Other,
    ZeroOnly,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub url: String,
    pub facility: String,
    pub name: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `N月` written in the notice itself.
    pub notice_month: u32,
    pub contact_time: String,
    pub reservation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_number: Option<u32>,
    pub highlighted: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportGroup {
    pub kind: GroupKind,
    pub label: String,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub title: String,
    pub generated_at: String,
    pub start: Period,
    pub end: Period,
    pub responders: Vec<String>,
    pub groups: Vec<ReportGroup>,
}

/// Project the grouping into report order: numbered, each fixed slot,
/// follow-up, verbatim others, no-action.
pub fn build_report(grouped: Grouped, start: Period, today: NaiveDate, generated_at: String) -> Report {
    let Grouped {
        numeric,
        flagged,
        zero_only,
        mut slots,
        others,
    } = grouped;

    let responders = collect_responders(&numeric);
    let mut groups = Vec::with_capacity(FixedSlot::all().len() + 4);

    groups.push(ReportGroup {
        kind: GroupKind::Numeric,
        label: NUMERIC_LABEL.to_string(),
        entries: numeric.iter().map(|r| numeric_entry(r, today)).collect(),
    });

    for slot in FixedSlot::all() {
        let records = slots.remove(&slot).unwrap_or_default();
        groups.push(ReportGroup {
            kind: GroupKind::Slot,
            label: slot.label(),
            entries: records.iter().map(entry).collect(),
        });
    }

    groups.push(ReportGroup {
        kind: GroupKind::Flagged,
        label: FLAGGED_LABEL.to_string(),
        entries: flagged.iter().map(entry).collect(),
    });

    groups.push(ReportGroup {
        kind: GroupKind::Other,
        label: OTHER_LABEL.to_string(),
        entries: others.iter().map(entry).collect(),
    });

    groups.push(ReportGroup {
        kind: GroupKind::ZeroOnly,
        label: ZERO_ONLY_LABEL.to_string(),
        entries: zero_only.iter().map(entry).collect(),
    });

    let end = start.end_of_window();
    Report {
        title: format!("{}～{}", start, end),
        generated_at,
        start,
        end,
        responders,
        groups,
    }
}

fn entry(r: &ReservationRecord) -> ReportEntry {
    ReportEntry {
        url: r.url.clone(),
        facility: r.facility.clone(),
        name: r.name.clone(),
        year: r.period.map(|p| p.year),
        month: r.period.map(|p| p.month),
        notice_month: r.notice_month,
        contact_time: r.contact_time.label(),
        reservation_id: reservation_id(&r.url).to_string(),
        responder: None,
        extracted_number: None,
        highlighted: false,
    }
}

fn numeric_entry(r: &ReservationRecord, today: NaiveDate) -> ReportEntry {
    let day = r.extracted_number();
    let highlighted = day.is_some_and(|d| is_recent_day(d, today));
    if highlighted {
        debug!("Highlighting {} (day {:?})", r.name, day);
    }
    ReportEntry {
        responder: Some(r.responder.clone()),
        extracted_number: day,
        highlighted,
        ..entry(r)
    }
}

fn collect_responders(numeric: &[ReservationRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in numeric {
        if !r.responder.is_empty() && !seen.contains(&r.responder) {
            seen.push(r.responder.clone());
        }
    }
    seen.truncate(MAX_RESPONDERS);
    seen
}

/// Whether call-back day `day` falls in the five days up to `today`. Late
/// days seen early in a month belong to the previous month.
pub fn is_recent_day(day: u32, today: NaiveDate) -> bool {
    let (mut year, mut month) = (today.year(), today.month());
    if day > 25 && today.day() < 5 {
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return false;
    };
    let Some(from) = today.checked_sub_days(Days::new(HIGHLIGHT_DAYS)) else {
        return false;
    };
    from <= date && date <= today
}

/// Element id fragment for a group label.
pub fn slot_id(label: &str) -> String {
    label.replace(' ', "_").replace("から", "_to_")
}

pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("JSON saved to {}", path.display());
    Ok(())
}

pub fn write_html(report: &Report, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, render_html(report))?;
    info!("HTML report saved to {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            info!("Created output directory {}", dir.display());
        }
    }
    Ok(())
}

pub fn render_html(report: &Report) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>連絡可能時間リスト - {}</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>連絡可能時間リスト - {}</h1>\n<p class=\"generated\">生成日時: {}</p>\n",
        escape(&report.title),
        STYLE,
        escape(&report.title),
        escape(&report.generated_at)
    );

    for group in &report.groups {
        let id = slot_id(&group.label);
        let _ = write!(
            out,
            "<div class=\"time-slot\" id=\"slot-{}\">\n<h2>「{}」</h2>\n",
            escape(&id),
            escape(&group.label)
        );
        if group.kind == GroupKind::Numeric && !report.responders.is_empty() {
            out.push_str("<p class=\"responders\">対応者: ");
            let names: Vec<String> = report.responders.iter().map(|r| escape(r)).collect();
            out.push_str(&names.join(" / "));
            out.push_str("</p>\n");
        }
        out.push_str("<div class=\"slot-items\">\n");
        if group.entries.is_empty() {
            out.push_str("<p class=\"no-data\">該当なし</p>\n");
        }
        for (i, e) in group.entries.iter().enumerate() {
            write_entry(&mut out, &id, i, e);
        }
        out.push_str("</div>\n</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn write_entry(out: &mut String, slot: &str, i: usize, e: &ReportEntry) {
    let item_id = format!("{}_{}", slot, i);
    let month = e.month.map(|m| format!("{}月", m)).unwrap_or_default();
    let responder = match e.responder.as_deref() {
        Some(r) if !r.is_empty() => format!(" 対応者：{}", escape(r)),
        _ => String::new(),
    };
    let class = if e.highlighted { " class=\"flashy-blink\"" } else { "" };
    let responder_attr = e
        .responder
        .as_deref()
        .map(|r| if r.is_empty() { "none" } else { r })
        .map(|r| format!(" data-responder=\"{}\"", escape(r)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "<div class=\"person-item\" id=\"item-{id}\" data-reservation-id=\"{rid}\"{resp_attr}>\
         <input type=\"checkbox\" class=\"checkbox\" id=\"check-{id}\">\
         <a href=\"{url}\" target=\"_blank\"{class}>{facility} {name} ({month}){responder}</a></div>",
        id = escape(&item_id),
        rid = escape(&e.reservation_id),
        resp_attr = responder_attr,
        url = escape(&e.url),
        class = class,
        facility = escape(&e.facility),
        name = escape(&e.name),
        month = month,
        responder = responder,
    );
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#f5f5f5}\
.time-slot{background:#fff;border-radius:6px;padding:1em;margin-bottom:1.5em}\
.person-item{padding:.4em 0;border-bottom:1px solid #eee}\
.no-data{color:#999}\
.flashy-blink{color:#d00;font-weight:bold}";

// ── Tests ──
