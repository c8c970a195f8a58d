//! Listing data structure.

use serde::{Deserialize, Serialize};

/// A vehicle listing discovered at a salvage yard.
///
/// Partial records (e.g. missing year) are valid internally; the filter
/// rejects them before they reach persistence or notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Listing {
    /// Yard chain name (e.g. "Pick-n-Pull")
    pub source: String,

    /// Yard location (e.g. "Calgary")
    pub location: String,

    /// Model year, when the row exposed one
    pub year: Option<i32>,

    /// Vehicle make
    pub make: String,

    /// Vehicle model as shown by the source
    pub model: String,

    /// Yard stock number, when exposed
    pub stock_number: Option<String>,

    /// VIN, when exposed
    pub vin: Option<String>,

    /// Arrival date exactly as the source formats it
    pub arrival_date: Option<String>,

    /// Full URL to the listing
    pub url: Option<String>,

    /// Free-text notes
    pub notes: Option<String>,
}

impl Listing {
    /// Render the notification message body for this listing.
    ///
    /// Optional fields produce no line when absent.
    pub fn render_message(&self) -> String {
        let mut message = String::from("🚨 **New salvage yard listing!**\n\n");

        if let Some(year) = self.year {
            message.push_str(&format!("📅 **Year:** {year}\n"));
        }

        if !self.make.is_empty() || !self.model.is_empty() {
            message.push_str(&format!(
                "🚗 **Make/Model:** {} {}\n",
                self.make, self.model
            ));
        }

        if !self.source.is_empty() {
            let mut yard = self.source.clone();
            if !self.location.is_empty() {
                yard.push_str(&format!(" - {}", self.location));
            }
            message.push_str(&format!("🏢 **Yard:** {yard}\n"));
        }

        if let Some(url) = &self.url {
            message.push_str(&format!("🔗 **Link:** {url}\n"));
        }

        if let Some(stock) = &self.stock_number {
            message.push_str(&format!("📦 **Stock #:** {stock}\n"));
        }

        if let Some(vin) = &self.vin {
            message.push_str(&format!("🔖 **VIN:** {vin}\n"));
        }

        if let Some(arrived) = &self.arrival_date {
            message.push_str(&format!("📍 **Arrived:** {arrived}\n"));
        }

        if let Some(notes) = &self.notes {
            message.push_str(&format!("\n💬 {notes}\n"));
        }

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Listing {
        Listing {
            source: "Pick-n-Pull".to_string(),
            location: "Calgary".to_string(),
            year: Some(2015),
            make: "Dodge".to_string(),
            model: "Ram 1500".to_string(),
            stock_number: Some("12345".to_string()),
            vin: None,
            arrival_date: Some("2026-08-01".to_string()),
            url: Some("https://example.com/inventory/12345".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_render_message_full() {
        let message = sample_listing().render_message();
        assert!(message.contains("**Year:** 2015"));
        assert!(message.contains("Dodge Ram 1500"));
        assert!(message.contains("Pick-n-Pull - Calgary"));
        assert!(message.contains("https://example.com/inventory/12345"));
        assert!(message.contains("**Stock #:** 12345"));
        assert!(message.contains("**Arrived:** 2026-08-01"));
    }

    #[test]
    fn test_render_message_skips_missing_fields() {
        let listing = Listing {
            year: None,
            stock_number: None,
            arrival_date: None,
            url: None,
            ..sample_listing()
        };
        let message = listing.render_message();
        assert!(!message.contains("**Year:**"));
        assert!(!message.contains("**Stock #:**"));
        assert!(!message.contains("**Link:**"));
        assert!(message.contains("Dodge Ram 1500"));
    }
}
