// src/sources/ipullupull.rs

//! I-Pull-U-Pull inventory scraper.
//!
//! Location pages render vehicles as a card grid. Each card carries a
//! "<year> <make> <model>" title plus labelled stock and arrival lines.

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::filter::ListingFilter;
use crate::models::{Config, Listing, SearchConfig};
use crate::sources::Source;
use crate::sources::extract::{find_vin, find_year, matches_model, parse_selector, squash_whitespace};

const CARD_SELECTOR: &str = "div.inventory-grid div.vehicle-card";
const TITLE_SELECTOR: &str = "h3.vehicle-title";
const STOCK_SELECTOR: &str = "span.stock-number";
const ARRIVAL_SELECTOR: &str = "span.arrival-date";
const LINK_SELECTOR: &str = "a[href]";

struct Target {
    location: String,
    url: Url,
}

/// Scraper for I-Pull-U-Pull yards.
pub struct IPullUPull {
    fetcher: Fetcher,
    filter: ListingFilter,
    search: SearchConfig,
    targets: Vec<Target>,
}

impl IPullUPull {
    /// Create the adapter with its own HTTP session.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoints = [
            ("Calgary", "https://ipullupull.com/locations/calgary/inventory/"),
            ("Edmonton", "https://ipullupull.com/locations/edmonton/inventory/"),
        ];

        let mut targets = Vec::new();
        for (location, url) in endpoints {
            targets.push(Target {
                location: location.to_string(),
                url: Url::parse(url)?,
            });
        }

        Ok(Self {
            fetcher: Fetcher::new(&config.http)?,
            filter: ListingFilter::new(&config.search),
            search: config.search.clone(),
            targets,
        })
    }

    /// Parse one location page into filter-validated listings.
    fn parse_page(&self, html: &str, location: &str, base: &Url) -> Result<Vec<Listing>> {
        let document = Html::parse_document(html);
        let card_sel = parse_selector(CARD_SELECTOR)?;

        let mut listings = Vec::new();
        for card in document.select(&card_sel) {
            match self.parse_card(&card, location, base) {
                Some(listing) if self.filter.matches(&listing) => listings.push(listing),
                Some(_) => {}
                None => log::debug!("I-Pull-U-Pull {}: skipping unparsable card", location),
            }
        }
        Ok(listings)
    }

    fn parse_card(&self, card: &scraper::ElementRef, location: &str, base: &Url) -> Option<Listing> {
        let title_sel = parse_selector(TITLE_SELECTOR).ok()?;
        let stock_sel = parse_selector(STOCK_SELECTOR).ok()?;
        let arrival_sel = parse_selector(ARRIVAL_SELECTOR).ok()?;
        let link_sel = parse_selector(LINK_SELECTOR).ok()?;

        let title_elem = card.select(&title_sel).next()?;
        let title = squash_whitespace(&title_elem.text().collect::<String>());

        let year = find_year(&title, self.search.year_min, self.search.year_max)?;
        let (make, model) = split_title(&title, year)?;

        if !matches_model(&model, &self.search.model_tokens, &self.search.model_exclusions) {
            return None;
        }

        let stock_number = card
            .select(&stock_sel)
            .next()
            .map(|e| labelled_value(&e.text().collect::<String>()))
            .filter(|s| !s.is_empty());

        let arrival_date = card
            .select(&arrival_sel)
            .next()
            .map(|e| labelled_value(&e.text().collect::<String>()))
            .filter(|s| !s.is_empty());

        let url = card
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.join(href).ok())
            .map(|u| u.to_string());

        let card_text: String = card.text().collect();

        Some(Listing {
            source: self.name().to_string(),
            location: location.to_string(),
            year: Some(year),
            make,
            model,
            stock_number,
            vin: find_vin(&card_text),
            arrival_date,
            url,
            notes: None,
        })
    }
}

/// Split a "<year> <make> <model...>" title around the year token.
fn split_title(title: &str, year: i32) -> Option<(String, String)> {
    let year_token = year.to_string();
    let mut words = title
        .split_whitespace()
        .filter(|w| *w != year_token)
        .map(str::to_string);

    let make = words.next()?;
    let model = words.collect::<Vec<_>>().join(" ");
    if model.is_empty() {
        return None;
    }
    Some((make, model))
}

/// Strip a "Label:" prefix from a card line, keeping the value.
fn labelled_value(text: &str) -> String {
    let squashed = squash_whitespace(text);
    match squashed.split_once(':') {
        Some((_, value)) => value.trim().to_string(),
        None => squashed,
    }
}

#[async_trait]
impl Source for IPullUPull {
    async fn scrape(&self) -> Result<Vec<Listing>> {
        let mut listings = Vec::new();

        for target in &self.targets {
            log::info!("Scraping {} {}", self.name(), target.location);

            let html = match self.fetcher.fetch(target.url.as_str()).await {
                Ok(html) => html,
                Err(error) => {
                    log::warn!(
                        "Skipping {} {}: {}",
                        self.name(),
                        target.location,
                        error
                    );
                    continue;
                }
            };

            match self.parse_page(&html, &target.location, &target.url) {
                Ok(found) => {
                    log::info!(
                        "Found {} matching listings at {} {}",
                        found.len(),
                        self.name(),
                        target.location
                    );
                    listings.extend(found);
                }
                Err(error) => {
                    log::warn!("Parse failed for {} {}: {}", self.name(), target.location, error);
                }
            }
        }

        Ok(listings)
    }

    fn name(&self) -> &'static str {
        "I-Pull-U-Pull"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> IPullUPull {
        let mut config = Config::default();
        config.http.request_delay_secs = 0;
        IPullUPull::new(&config).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://ipullupull.com/locations/calgary/inventory/").unwrap()
    }

    const PAGE: &str = r#"
        <div class="inventory-grid">
          <div class="vehicle-card">
            <h3 class="vehicle-title">2003 DODGE RAM 2500</h3>
            <span class="stock-number">Stock #: C-4471</span>
            <span class="arrival-date">Arrived: Aug 3, 2026</span>
            <span class="vin">VIN 3D7KA28C93G812345</span>
            <a href="/vehicle/c-4471">Details</a>
          </div>
          <div class="vehicle-card">
            <h3 class="vehicle-title">2019 DODGE DURANGO</h3>
            <span class="stock-number">Stock #: C-4472</span>
            <a href="/vehicle/c-4472">Details</a>
          </div>
          <div class="vehicle-card">
            <h3 class="vehicle-title">No year here</h3>
          </div>
        </div>
    "#;

    #[test]
    fn test_parse_page_extracts_cards() {
        let listings = adapter().parse_page(PAGE, "Calgary", &base()).unwrap();

        // Durango excluded, the year-less card skipped.
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.year, Some(2003));
        assert_eq!(listing.make, "DODGE");
        assert_eq!(listing.model, "RAM 2500");
        assert_eq!(listing.stock_number.as_deref(), Some("C-4471"));
        assert_eq!(listing.arrival_date.as_deref(), Some("Aug 3, 2026"));
        assert_eq!(listing.vin.as_deref(), Some("3D7KA28C93G812345"));
        assert_eq!(
            listing.url.as_deref(),
            Some("https://ipullupull.com/vehicle/c-4471")
        );
    }

    #[test]
    fn test_split_title() {
        assert_eq!(
            split_title("2003 DODGE RAM 2500", 2003),
            Some(("DODGE".to_string(), "RAM 2500".to_string()))
        );
        assert_eq!(split_title("2003 DODGE", 2003), None);
    }

    #[test]
    fn test_labelled_value() {
        assert_eq!(labelled_value("Stock #: C-4471"), "C-4471");
        assert_eq!(labelled_value("  Aug 3,   2026 "), "Aug 3, 2026");
    }
}
