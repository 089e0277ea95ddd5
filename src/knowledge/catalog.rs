//! Pricing catalog defaults, validation and section segmentation
//!
//! The catalog is split into topic sections (packages, add-ons, policies,
//! recommendations). Each section is rendered to text and run through the
//! chunker, so a document never exceeds the chunk budget and always carries
//! its section tag.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use sha2::Digest;
use sha2::Sha256;

use super::chunker::TextChunker;
use crate::errors::BikeHeroError;
use crate::errors::Result;
use crate::models::DocumentSection;
use crate::models::PackagePricing;
use crate::models::PricingCatalog;
use crate::models::PricingDocument;
use crate::models::ServiceInfo;

/// Catalog served when no catalog has been supplied
pub fn default_catalog() -> PricingCatalog {
    let mut packages = BTreeMap::new();
    packages.insert(
        "Essential".to_string(),
        PackagePricing {
            one_time: Decimal::from(59),
            annual: Decimal::from(94),
            includes: "Tune brakes, gearing, tires, headset, saddle".to_string(),
        },
    );
    packages.insert(
        "Advanced".to_string(),
        PackagePricing {
            one_time: Decimal::from(89),
            annual: Decimal::from(142),
            includes: "All Essential + cassette/chain/derailleurs/chainring cleaning (excl. BB & hubs)"
                .to_string(),
        },
    );
    packages.insert(
        "Premium".to_string(),
        PackagePricing {
            one_time: Decimal::from(129),
            annual: Decimal::from(206),
            includes:
                "All Advanced + full wash (frame, wheels, bars, saddle, brakes) (excl. BB & hubs)"
                    .to_string(),
        },
    );

    PricingCatalog {
        packages,
        info: ServiceInfo {
            turnaround: "~2-day turnaround".to_string(),
            annual_savings: "20% versus two one-times".to_string(),
        },
        addons: BTreeMap::new(),
        policies: Vec::new(),
        recommendations: Vec::new(),
    }
}

/// Reject catalogs that would index misleading or empty content
pub fn validate_catalog(catalog: &PricingCatalog) -> Result<()> {
    if catalog.packages.is_empty() {
        return Err(BikeHeroError::InvalidCatalog(
            "catalog must contain at least one package".to_string(),
        ));
    }

    for (name, package) in &catalog.packages {
        if name.trim().is_empty() {
            return Err(BikeHeroError::InvalidCatalog(
                "package names must not be blank".to_string(),
            ));
        }
        if package.one_time.is_sign_negative() || package.annual.is_sign_negative() {
            return Err(BikeHeroError::InvalidCatalog(format!(
                "package '{name}' has a negative price"
            )));
        }
        if package.includes.trim().is_empty() {
            return Err(BikeHeroError::InvalidCatalog(format!(
                "package '{name}' must list included services"
            )));
        }
    }

    for (name, addon) in &catalog.addons {
        if name.trim().is_empty() {
            return Err(BikeHeroError::InvalidCatalog(
                "add-on names must not be blank".to_string(),
            ));
        }
        if addon.price.is_sign_negative() {
            return Err(BikeHeroError::InvalidCatalog(format!(
                "add-on '{name}' has a negative price"
            )));
        }
    }

    if catalog.info.turnaround.trim().is_empty() {
        return Err(BikeHeroError::InvalidCatalog(
            "info.turnaround must not be blank".to_string(),
        ));
    }

    Ok(())
}

/// Read a catalog file; `.toml` files are parsed as TOML, anything else as JSON
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<PricingCatalog> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let catalog: PricingCatalog = if is_toml {
        toml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };

    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// SHA-256 over the canonical JSON form of the catalog
pub fn catalog_fingerprint(catalog: &PricingCatalog) -> Result<String> {
    let canonical = serde_json::to_vec(catalog)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Turns a catalog into section-tagged, chunked documents
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    chunker: TextChunker,
    booking_url: String,
}

impl DocumentBuilder {
    pub fn new(chunker: TextChunker, booking_url: impl Into<String>) -> Self {
        Self {
            chunker,
            booking_url: booking_url.into(),
        }
    }

    /// Build every document for one indexing generation, in section order
    pub fn build(&self, catalog: &PricingCatalog) -> Vec<PricingDocument> {
        let mut documents = Vec::new();

        for section in DocumentSection::ALL {
            let Some(body) = self.render_section(catalog, section) else {
                continue;
            };
            let title = section_title(section);

            for (index, chunk) in self.chunker.split(&body).into_iter().enumerate() {
                let title = if index == 0 {
                    title.to_string()
                } else {
                    format!("{title} (part {})", index + 1)
                };
                documents.push(PricingDocument {
                    section,
                    index,
                    title,
                    content: chunk.content,
                });
            }
        }

        documents
    }

    /// Text body for one section, or `None` when the catalog has nothing for it
    fn render_section(&self, catalog: &PricingCatalog, section: DocumentSection) -> Option<String> {
        match section {
            DocumentSection::Packages => Some(render_packages(catalog)),
            DocumentSection::Addons => {
                if catalog.addons.is_empty() {
                    return None;
                }
                let mut text = String::from("BikeHero Add-on Services Pricing:\n");
                for (name, addon) in &catalog.addons {
                    text.push_str(&format!("- {name}: SGD {}", addon.price));
                    if !addon.description.trim().is_empty() {
                        text.push_str(&format!(" ({})", addon.description.trim()));
                    }
                    text.push('\n');
                }
                Some(text)
            }
            DocumentSection::Policies => {
                let mut text = String::from("BikeHero Service Information:\n");
                text.push_str(&format!(
                    "- One-time services: {}\n",
                    catalog.info.turnaround
                ));
                text.push_str(&format!(
                    "- Annual package savings: {}\n",
                    catalog.info.annual_savings
                ));
                for policy in &catalog.policies {
                    text.push_str(&format!("- {policy}\n"));
                }
                text.push_str(&format!(
                    "\nIf there are any other questions, please ask the user to provide their contact information or book directly through our website at {}\n",
                    self.booking_url
                ));
                Some(text)
            }
            DocumentSection::Recommendations => {
                if catalog.recommendations.is_empty() {
                    return None;
                }
                let mut text = String::from("BikeHero Package Recommendations:\n");
                for recommendation in &catalog.recommendations {
                    text.push_str(&format!("- {recommendation}\n"));
                }
                Some(text)
            }
        }
    }
}

fn render_packages(catalog: &PricingCatalog) -> String {
    let mut text = String::from("BikeHero Maintenance Packages Pricing Information:\n");
    for (name, package) in &catalog.packages {
        text.push_str(&format!(
            "\n{name} Package:\n\
             - One-time service: SGD {}\n\
             - Annual package (2 services): SGD {}\n\
             - Includes: {}\n",
            package.one_time, package.annual, package.includes
        ));
    }
    text
}

fn section_title(section: DocumentSection) -> &'static str {
    match section {
        DocumentSection::Packages => "Maintenance Packages",
        DocumentSection::Addons => "Add-on Services",
        DocumentSection::Policies => "Service Policies",
        DocumentSection::Recommendations => "Package Recommendations",
    }
}
