use crate::error::{Error, Result};
use crate::{HarvestDate, ListingItem};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const VIEWSTATE: &str = "__VIEWSTATE";
const EVENTVALIDATION: &str = "__EVENTVALIDATION";
const VIEWSTATEGENERATOR: &str = "__VIEWSTATEGENERATOR";

/// Hidden anti-forgery fields the listing form expects to be echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTokens {
    pub viewstate: String,
    pub event_validation: String,
    pub viewstate_generator: String,
}

/// Scrapes release links from the listing page for one day or one whole month.
pub struct Harvester {
    listing_url: Url,
    origin: Url,
    timeout: Duration,
}

impl Harvester {
    pub fn new(listing_url: &str, timeout: Duration) -> Result<Self> {
        let listing_url = Url::parse(listing_url)?;
        let origin = Url::parse(&listing_url.origin().ascii_serialization())?;
        Ok(Self {
            listing_url,
            origin,
            timeout,
        })
    }

    /// Every harvest gets its own cookie jar, like a fresh browser session.
    fn session(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        let origin = self.origin.as_str().trim_end_matches('/');
        if let Ok(value) = HeaderValue::from_str(origin) {
            headers.insert(ORIGIN, value);
        }
        if let Ok(value) = HeaderValue::from_str(self.listing_url.as_str()) {
            headers.insert(REFERER, value);
        }

        Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .timeout(self.timeout)
            .build()
            .map_err(Error::ClientBuild)
    }

    pub async fn harvest(&self, date: HarvestDate) -> Result<Vec<ListingItem>> {
        let client = self.session()?;

        debug!(url = %self.listing_url, "fetching listing form");
        let body = client
            .get(self.listing_url.clone())
            .send()
            .await?
            .text()
            .await?;
        let tokens = extract_form_tokens(&body)?;

        let form = build_form(&tokens, date);
        let body = client
            .post(self.listing_url.clone())
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        let items = parse_listing(&body, &self.origin, &date.label());
        info!(label = %date.label(), count = items.len(), "harvested listing");
        Ok(items)
    }
}

fn input_value(doc: &Html, id: &'static str) -> Result<String> {
    let selector = Selector::parse(&format!("input#{id}")).map_err(|_| Error::MissingFormField(id))?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::to_string)
        .ok_or(Error::MissingFormField(id))
}

pub fn extract_form_tokens(html: &str) -> Result<FormTokens> {
    let doc = Html::parse_document(html);
    Ok(FormTokens {
        viewstate: input_value(&doc, VIEWSTATE)?,
        event_validation: input_value(&doc, EVENTVALIDATION)?,
        viewstate_generator: input_value(&doc, VIEWSTATEGENERATOR)?,
    })
}

/// Form body for the postback that switches the listing to `date`.
pub fn build_form(tokens: &FormTokens, date: HarvestDate) -> Vec<(&'static str, String)> {
    vec![
        ("__EVENTTARGET", "ctl00$ContentPlaceHolder1$ddlday".to_string()),
        ("__EVENTARGUMENT", String::new()),
        ("__LASTFOCUS", String::new()),
        (VIEWSTATE, tokens.viewstate.clone()),
        (VIEWSTATEGENERATOR, tokens.viewstate_generator.clone()),
        ("__VIEWSTATEENCRYPTED", String::new()),
        (EVENTVALIDATION, tokens.event_validation.clone()),
        ("ctl00$Bar1$ddlregion", "3".to_string()),
        ("ctl00$Bar1$ddlLang", "1".to_string()),
        ("ctl00$ContentPlaceHolder1$hydregionid", "3".to_string()),
        ("ctl00$ContentPlaceHolder1$hydLangid", "1".to_string()),
        ("ctl00$ContentPlaceHolder1$ddlMinistry", "0".to_string()),
        ("ctl00$ContentPlaceHolder1$ddlday", date.day.to_string()),
        ("ctl00$ContentPlaceHolder1$ddlMonth", date.month.to_string()),
        ("ctl00$ContentPlaceHolder1$ddlYear", date.year.to_string()),
    ]
}

fn is_release_link(href: &str) -> bool {
    href.contains("PressReleasePage.aspx") || href.to_lowercase().contains("relid=")
}

/// Pulls release links out of the `content-area` container. A page without the container
/// simply has no items.
pub fn parse_listing(html: &str, origin: &Url, date_label: &str) -> Vec<ListingItem> {
    let doc = Html::parse_document(html);
    let area_selector = Selector::parse("div.content-area").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let Some(area) = doc.select(&area_selector).next() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for el in area.select(&link_selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !is_release_link(href) {
            continue;
        }

        let title = match el.value().attr("title").map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => el.text().collect::<String>().trim().to_string(),
        };
        if title.is_empty() {
            continue;
        }

        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            match origin.join(href) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            }
        };
        items.push(ListingItem::new(title, url, date_label));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_PAGE: &str = r#"
        <html><body><form>
          <input type="hidden" id="__VIEWSTATE" value="vs123" />
          <input type="hidden" id="__VIEWSTATEGENERATOR" value="gen456" />
          <input type="hidden" id="__EVENTVALIDATION" value="ev789" />
        </form></body></html>"#;

    fn origin() -> Url {
        Url::parse("https://www.pib.gov.in").unwrap()
    }

    #[test]
    fn extracts_all_three_tokens() {
        let tokens = extract_form_tokens(FORM_PAGE).unwrap();
        assert_eq!(tokens.viewstate, "vs123");
        assert_eq!(tokens.viewstate_generator, "gen456");
        assert_eq!(tokens.event_validation, "ev789");
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let html = r#"<input id="__VIEWSTATE" value="x"/><input id="__VIEWSTATEGENERATOR" value="y"/>"#;
        let err = extract_form_tokens(html).unwrap_err();
        assert!(matches!(err, Error::MissingFormField("__EVENTVALIDATION")));
    }

    #[test]
    fn form_carries_date_selectors_and_tokens() {
        let tokens = extract_form_tokens(FORM_PAGE).unwrap();
        let form = build_form(&tokens, HarvestDate { day: 0, month: 7, year: 2024 });
        let get = |k: &str| form.iter().find(|(name, _)| *name == k).map(|(_, v)| v.as_str());
        assert_eq!(get("__VIEWSTATE"), Some("vs123"));
        assert_eq!(get("ctl00$ContentPlaceHolder1$ddlday"), Some("0"));
        assert_eq!(get("ctl00$ContentPlaceHolder1$ddlMonth"), Some("7"));
        assert_eq!(get("ctl00$ContentPlaceHolder1$ddlYear"), Some("2024"));
        assert_eq!(get("ctl00$Bar1$ddlregion"), Some("3"));
    }

    #[test]
    fn parses_matching_links_and_resolves_relative_urls() {
        let html = r#"
          <div class="nav"><a href="/PressReleasePage.aspx?PRID=1" title="Outside">x</a></div>
          <div class="content-area">
            <a href="/PressReleasePage.aspx?PRID=2001" title="  Digital India milestone ">ignored</a>
            <a href="https://www.pib.gov.in/PressReleseDetail.aspx?RelID=99">  Rail budget  </a>
            <a href="/about.aspx">About</a>
            <a href="/PressReleasePage.aspx?PRID=3"></a>
          </div>"#;
        let items = parse_listing(html, &origin(), "9-12-2024");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Digital India milestone");
        assert_eq!(items[0].url, "https://www.pib.gov.in/PressReleasePage.aspx?PRID=2001");
        assert_eq!(items[1].title, "Rail budget");
        assert_eq!(items[1].url, "https://www.pib.gov.in/PressReleseDetail.aspx?RelID=99");
        assert!(items.iter().all(|i| i.date_label == "9-12-2024"));
        assert!(items.iter().all(|i| Url::parse(&i.url).is_ok()));
    }

    #[test]
    fn missing_container_yields_nothing() {
        let html = r#"<a href="/PressReleasePage.aspx?PRID=1" title="t">t</a>"#;
        assert!(parse_listing(html, &origin(), "Month-1-2024").is_empty());
    }
}
