use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{reservation_id, RawNotice};
use crate::period::Period;
use crate::settings::Settings;

const LISTING_PATH: &str = "CAL/monthly_m.php";

/// Where listing and detail pages come from.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn monthly_notices(&mut self, period: Period) -> Result<Vec<RawNotice>>;
    async fn detail_page(&mut self, url: &str) -> Result<String>;
}

/// Split a monthly listing into `p.res_mail` fragments. Relative links are
/// resolved against `base` when given.
pub fn parse_listing(html: &str, base: Option<&Url>) -> Vec<RawNotice> {
    let notice_sel = Selector::parse("p.res_mail").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();
    let doc = Html::parse_document(html);

    doc.select(&notice_sel)
        .enumerate()
        .filter_map(|(i, el)| {
            let Some(href) = el
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                debug!("Notice {} has no link, skipping", i + 1);
                return None;
            };
            let href = match base {
                Some(b) => b
                    .join(href)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            };
            Some(RawNotice {
                html: el.inner_html(),
                href,
            })
        })
        .collect()
}

// ── HTTP ──

/// Live session against the calendar site. The session cookie comes from
/// configuration; logging in is done outside this tool.
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let base = settings
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("base_url is not set (MAILCHECK_BASE_URL)".into()))?;
        let mut base_url = Url::parse(base)
            .map_err(|e| Error::Config(format!("invalid base_url {}: {}", base, e)))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &settings.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| Error::Config(format!("invalid session_cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let session_err = |reason: String| Error::Session {
            url: base_url.to_string(),
            reason,
        };
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| session_err(e.to_string()))?;

        let resp = client
            .get(base_url.clone())
            .send()
            .await
            .map_err(|e| session_err(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(session_err(format!("HTTP {}", resp.status())));
        }

        info!("Session established: {}", base_url);
        Ok(HttpSource { client, base_url })
    }

    pub fn listing_url(&self, period: Period) -> String {
        format!(
            "{}{}?s=ma&c=mail&y={}&m={:02}#cal",
            self.base_url, LISTING_PATH, period.year, period.month
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let fetch_err = |source| Error::Fetch {
            url: url.to_string(),
            source,
        };
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)
    }
}

impl PageSource for HttpSource {
    async fn monthly_notices(&mut self, period: Period) -> Result<Vec<RawNotice>> {
        let url = self.listing_url(period);
        info!("Fetching listing: {}", url);
        let html = self.get_text(&url).await?;
        let notices = parse_listing(&html, Some(&self.base_url));
        info!("Found {} notices", notices.len());
        Ok(notices)
    }

    async fn detail_page(&mut self, url: &str) -> Result<String> {
        debug!("Fetching detail: {}", url);
        self.get_text(url).await
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        info!("Session released: {}", self.base_url);
    }
}

// ── Snapshot ──

/// Saved pages on disk: `{dir}/YYYY-MM.html` listings and
/// `{dir}/detail/{key}.html` detail pages.
pub struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        SnapshotSource {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn listing_path(&self, period: Period) -> PathBuf {
        self.dir
            .join(format!("{:04}-{:02}.html", period.year, period.month))
    }

    pub fn detail_path(&self, url: &str) -> PathBuf {
        self.dir.join("detail").join(format!("{}.html", detail_key(url)))
    }
}

/// File stem for a detail url: its reservation id, else the sanitised url.
pub fn detail_key(url: &str) -> String {
    let id = reservation_id(url);
    let key = if id.is_empty() { url } else { id };
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl PageSource for SnapshotSource {
    async fn monthly_notices(&mut self, period: Period) -> Result<Vec<RawNotice>> {
        let path = self.listing_path(period);
        if !path.exists() {
            warn!("No saved listing for {} at {}", period, path.display());
            return Ok(Vec::new());
        }
        let html = tokio::fs::read_to_string(&path).await?;
        Ok(parse_listing(&html, None))
    }

    async fn detail_page(&mut self, url: &str) -> Result<String> {
        let path = self.detail_path(url);
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

// ── Tests ──
