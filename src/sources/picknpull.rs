// src/sources/picknpull.rs

//! Pick-n-Pull inventory scraper.
//!
//! The vehicle finder renders search results as a table, one vehicle per
//! row: year, make, model, yard row, date set. Listing detail links hang
//! off the model cell.

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::filter::ListingFilter;
use crate::models::{Config, Listing, SearchConfig};
use crate::sources::Source;
use crate::sources::extract::{find_vin, find_year, matches_model, parse_selector, squash_whitespace};

const ROW_SELECTOR: &str = "table.search-results tbody tr";
const CELL_SELECTOR: &str = "td";
const LINK_SELECTOR: &str = "a[href]";

struct Target {
    location: String,
    url: Url,
}

/// Scraper for Pick-n-Pull yards.
pub struct PickNPull {
    fetcher: Fetcher,
    filter: ListingFilter,
    search: SearchConfig,
    targets: Vec<Target>,
}

impl PickNPull {
    /// Create the adapter with its own HTTP session.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoints = [
            (
                "Calgary",
                "https://www.picknpull.com/check-inventory/vehicle-finder?location=calgary&make=dodge",
            ),
            (
                "Edmonton",
                "https://www.picknpull.com/check-inventory/vehicle-finder?location=edmonton&make=dodge",
            ),
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

    /// Parse one result page into filter-validated listings.
    fn parse_page(&self, html: &str, location: &str, base: &Url) -> Result<Vec<Listing>> {
        let document = Html::parse_document(html);
        let row_sel = parse_selector(ROW_SELECTOR)?;

        let mut listings = Vec::new();
        for row in document.select(&row_sel) {
            match self.parse_row(&row, location, base) {
                Some(listing) if self.filter.matches(&listing) => listings.push(listing),
                Some(_) => {}
                None => log::debug!("Pick-n-Pull {}: skipping unparsable row", location),
            }
        }
        Ok(listings)
    }

    fn parse_row(&self, row: &scraper::ElementRef, location: &str, base: &Url) -> Option<Listing> {
        let cell_sel = parse_selector(CELL_SELECTOR).ok()?;
        let link_sel = parse_selector(LINK_SELECTOR).ok()?;

        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| squash_whitespace(&cell.text().collect::<String>()))
            .collect();

        // Year | Make | Model | Row | Date set
        if cells.len() < 3 {
            return None;
        }

        let year = find_year(&cells[0], self.search.year_min, self.search.year_max)?;
        let make = cells[1].clone();
        let model = cells[2].clone();

        if make.is_empty() || model.is_empty() {
            return None;
        }
        if !matches_model(&model, &self.search.model_tokens, &self.search.model_exclusions) {
            return None;
        }

        let url = row
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.join(href).ok())
            .map(|u| u.to_string());

        let row_text: String = row.text().collect();

        Some(Listing {
            source: self.name().to_string(),
            location: location.to_string(),
            year: Some(year),
            make,
            model,
            stock_number: None,
            vin: find_vin(&row_text),
            arrival_date: cells.get(4).filter(|s| !s.is_empty()).cloned(),
            url,
            notes: None,
        })
    }
}

#[async_trait]
impl Source for PickNPull {
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
        "Pick-n-Pull"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> PickNPull {
        let mut config = Config::default();
        config.http.request_delay_secs = 0;
        PickNPull::new(&config).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://www.picknpull.com/check-inventory/vehicle-finder").unwrap()
    }

    const PAGE: &str = r#"
        <table class="search-results">
          <tbody>
            <tr>
              <td>2015</td><td>Dodge</td><td><a href="/inventory/8812">Ram 1500</a></td>
              <td>Row 14</td><td>2026-08-01</td>
            </tr>
            <tr>
              <td>2008</td><td>Dodge</td><td><a href="/inventory/8813">Dakota</a></td>
              <td>Row 2</td><td>2026-08-02</td>
            </tr>
            <tr>
              <td>1989</td><td>Dodge</td><td><a href="/inventory/8814">Ram 2500</a></td>
              <td>Row 7</td><td>2026-08-02</td>
            </tr>
            <tr><td>garbage row</td></tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn test_parse_page_extracts_matching_rows() {
        let listings = adapter().parse_page(PAGE, "Calgary", &base()).unwrap();

        // Dakota excluded by sibling-model rule, 1989 excluded by year range,
        // the short row skipped without aborting the rest.
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.source, "Pick-n-Pull");
        assert_eq!(listing.location, "Calgary");
        assert_eq!(listing.year, Some(2015));
        assert_eq!(listing.model, "Ram 1500");
        assert_eq!(
            listing.url.as_deref(),
            Some("https://www.picknpull.com/inventory/8812")
        );
        assert_eq!(listing.arrival_date.as_deref(), Some("2026-08-01"));
    }

    #[test]
    fn test_parse_page_empty_document() {
        let listings = adapter().parse_page("<html></html>", "Calgary", &base()).unwrap();
        assert!(listings.is_empty());
    }
}
