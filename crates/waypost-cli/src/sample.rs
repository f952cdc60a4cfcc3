//! Bundled sample catalog for first-run seeding.
//!
//! Realistic travel-center stock across the key categories so the
//! assistant answers something sensible before the first real sync
//! arrives.

use waypost_types::{CatalogItem, Promotion};

fn item(
    sku: &str,
    name: &str,
    category: &str,
    location: &str,
    price: f64,
    description: &str,
) -> CatalogItem {
    CatalogItem {
        sku: sku.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        location: location.to_string(),
        price,
        description: description.to_string(),
        relevance: None,
    }
}

/// The bundled sample catalog.
pub fn sample_catalog() -> Vec<CatalogItem> {
    vec![
        // Fuel & fluids
        item(
            "FUEL-DIESEL-001",
            "Premium Diesel Fuel",
            "Fuel & Fluids",
            "Fuel Island 1",
            3.89,
            "Ultra-low sulfur diesel fuel for commercial trucks and RVs",
        ),
        item(
            "FUEL-DEF-001",
            "BlueDEF Diesel Exhaust Fluid",
            "Fuel & Fluids",
            "Fuel Island 2",
            12.99,
            "Premium DEF fluid meets ISO 22241 standards for SCR systems",
        ),
        item(
            "FUEL-OIL-015",
            "Rotella T6 15W-40 Motor Oil",
            "Fuel & Fluids",
            "Aisle 1",
            89.99,
            "Synthetic heavy-duty diesel engine oil, 5-gallon jug",
        ),
        // Trucker supplies
        item(
            "TRUCK-LOG-101",
            "Simplified Driver Logbook",
            "Trucker Supplies",
            "Aisle 2",
            8.99,
            "Daily log book with duplicate carbonless pages",
        ),
        item(
            "TRUCK-STRAP-204",
            "Heavy Duty Ratchet Strap Set",
            "Trucker Supplies",
            "Aisle 2",
            34.99,
            "Four 27-foot ratchet straps with flat hooks, 10,000 lb capacity",
        ),
        // Electronics
        item(
            "ELECT-CB-105",
            "Cobra 29 LX CB Radio",
            "Electronics",
            "Aisle 4",
            129.99,
            "40-channel CB radio with weather alerts and backlit display",
        ),
        item(
            "ELECT-GPS-310",
            "Truck Route GPS Navigator",
            "Electronics",
            "Aisle 4",
            249.99,
            "7-inch GPS with truck-specific routing and live traffic",
        ),
        item(
            "ELECT-HEAD-221",
            "Wireless Trucker Headset",
            "Electronics",
            "Aisle 4",
            79.99,
            "Noise-cancelling Bluetooth headset with 20-hour battery",
        ),
        // Energy & snacks
        item(
            "SNACK-JERKY-410",
            "Peppered Beef Jerky",
            "Energy & Snacks",
            "Aisle 3",
            9.49,
            "Slow-smoked peppered beef jerky, 10 oz bag",
        ),
        item(
            "SNACK-NUTS-415",
            "Roasted Mixed Nuts",
            "Energy & Snacks",
            "Aisle 3",
            7.99,
            "Salted cashews, almonds, and peanuts, 16 oz can",
        ),
        // Hot food & beverages
        item(
            "FOOD-PIZZA-501",
            "Hot Pizza Slice",
            "Hot Food",
            "Deli Counter",
            3.49,
            "Fresh pepperoni or cheese pizza slice, made hourly",
        ),
        item(
            "FOOD-COFFEE-505",
            "Fresh Ground Coffee",
            "Hot Food",
            "Beverage Bar",
            2.29,
            "24-hour fresh ground coffee, any size",
        ),
        // Services
        item(
            "SERV-SHOWER-001",
            "Shower Credit",
            "Services",
            "Service Desk",
            15.00,
            "Clean private shower for longhaul drivers, towels included",
        ),
        item(
            "SERV-PARK-002",
            "Reserved Parking Spot",
            "Services",
            "Service Desk",
            18.00,
            "Guaranteed overnight truck parking with security patrol",
        ),
        // Safety
        item(
            "SAFE-VEST-601",
            "Hi-Vis Safety Vest",
            "Safety & Lighting",
            "Aisle 5",
            12.99,
            "ANSI class 2 reflective safety vest, sizes M-3XL",
        ),
        item(
            "SAFE-FLASH-605",
            "LED Flashlight",
            "Safety & Lighting",
            "Aisle 5",
            19.99,
            "Rechargeable 1000-lumen LED flashlight with magnetic base",
        ),
    ]
}

/// Promotions bundled alongside the sample catalog.
pub fn sample_promotions() -> Vec<Promotion> {
    vec![
        Promotion {
            id: "PROMO-SHOWER-COFFEE".to_string(),
            description: "Free coffee with any shower credit".to_string(),
            sku: Some("SERV-SHOWER-001".to_string()),
            category: None,
            discount_percent: None,
            expires_at: None,
            priority: 10,
        },
        Promotion {
            id: "PROMO-JERKY-BOGO".to_string(),
            description: "Buy one beef jerky, get one half off".to_string(),
            sku: Some("SNACK-JERKY-410".to_string()),
            category: None,
            discount_percent: Some(50.0),
            expires_at: None,
            priority: 5,
        },
        Promotion {
            id: "PROMO-ELECTRONICS".to_string(),
            description: "10% off all electronics this week".to_string(),
            sku: None,
            category: Some("Electronics".to_string()),
            discount_percent: Some(10.0),
            expires_at: None,
            priority: 3,
        },
    ]
}

/// Queries run after seeding to show the index is answering.
pub const VERIFY_QUERIES: &[&str] = &["diesel", "cb radio", "shower", "pizza", "safety vest"];
