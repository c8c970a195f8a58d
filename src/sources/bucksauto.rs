// src/sources/bucksauto.rs

//! Buck's Auto Parts inventory scraper.
//!
//! Location inventory pages render a plain table: stock number, year,
//! make, model, VIN and arrival date columns.

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::filter::ListingFilter;
use crate::models::{Config, Listing, SearchConfig};
use crate::sources::Source;
use crate::sources::extract::{find_vin, find_year, matches_model, parse_selector, squash_whitespace};

const ROW_SELECTOR: &str = "table.inventory-list tbody tr";
const CELL_SELECTOR: &str = "td";
const LINK_SELECTOR: &str = "a[href]";

struct Target {
    location: String,
    url: Url,
}

/// Scraper for Buck's Auto Parts yards.
pub struct BucksAuto {
    fetcher: Fetcher,
    filter: ListingFilter,
    search: SearchConfig,
    targets: Vec<Target>,
}

impl BucksAuto {
    /// Create the adapter with its own HTTP session.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoints = [
            ("Calgary", "https://www.bucksauto.ca/location/calgary/inventory"),
            ("Edmonton", "https://www.bucksauto.ca/location/edmonton/inventory"),
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

    /// Parse one inventory page into filter-validated listings.
    fn parse_page(&self, html: &str, location: &str, base: &Url) -> Result<Vec<Listing>> {
        let document = Html::parse_document(html);
        let row_sel = parse_selector(ROW_SELECTOR)?;

        let mut listings = Vec::new();
        for row in document.select(&row_sel) {
            match self.parse_row(&row, location, base) {
                Some(listing) if self.filter.matches(&listing) => listings.push(listing),
                Some(_) => {}
                None => log::debug!("Buck's Auto {}: skipping unparsable row", location),
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

        // Stock | Year | Make | Model | VIN | Arrived
        if cells.len() < 4 {
            return None;
        }

        let year = find_year(&cells[1], self.search.year_min, self.search.year_max)?;
        let make = cells[2].clone();
        let model = cells[3].clone();

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

        Some(Listing {
            source: self.name().to_string(),
            location: location.to_string(),
            year: Some(year),
            make,
            model,
            stock_number: cells.first().filter(|s| !s.is_empty()).cloned(),
            vin: cells.get(4).and_then(|text| find_vin(text)),
            arrival_date: cells.get(5).filter(|s| !s.is_empty()).cloned(),
            url,
            notes: None,
        })
    }
}

#[async_trait]
impl Source for BucksAuto {
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
        "Buck's Auto"
    }
}
