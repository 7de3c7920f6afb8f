//! Store reference data: sections, traffic levels and shopper markers.
//!
//! Sections are immutable and statically defined. The navigation core only
//! reads them; the map renderer filters them by floor for display.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Crowd level of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    Low,
    Medium,
    High,
}

impl Traffic {
    pub fn label(&self) -> &'static str {
        match self {
            Traffic::Low => "low",
            Traffic::Medium => "medium",
            Traffic::High => "high",
        }
    }

    /// Traffic line for the navigation prompt. Accessible mode spells out
    /// what the level means.
    pub fn describe(&self, accessibility: bool) -> String {
        if !accessibility {
            return format!("Traffic level: {}", self.label());
        }
        let meaning = match self {
            Traffic::High => "many people are in this area",
            Traffic::Medium => "moderate crowd levels",
            Traffic::Low => "few people in this area",
        };
        format!("Traffic level is {}. This means {}.", self.label(), meaning)
    }
}

/// Theme role a section is painted with. The renderer maps roles to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Success,
    Error,
    Info,
    Warning,
    PrimaryDark,
    TextSecondary,
    Black,
    Secondary,
    Accent,
}

/// A named rectangular region on one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    pub id: String,
    pub name: String,
    pub aisles: Vec<String>,
    pub color: ColorRole,
    pub rect: Rect,
    pub traffic: Traffic,
    /// Minutes to reach the section from the entrance.
    pub estimated_time: u32,
    pub items: Vec<String>,
    pub floor: i32,
}

impl StoreSection {
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Case-insensitive substring match of `query` against the section items.
    pub fn stocks(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.items
            .iter()
            .any(|item| item.to_lowercase().contains(&query))
    }
}

/// Another shopper on the map, shown as a dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopperMarker {
    pub id: String,
    pub position: Point,
    pub floor: i32,
}

/// Quick navigation shortcut: a label and the section it jumps to.
#[derive(Debug, Clone, Copy)]
pub struct QuickDestination {
    pub label: &'static str,
    pub section_id: &'static str,
}

#[rustfmt::skip]
pub const QUICK_DESTINATIONS: &[QuickDestination] = &[
    QuickDestination { label: "Produce", section_id: "1" },
    QuickDestination { label: "Dairy", section_id: "3" },
    QuickDestination { label: "Meat & Seafood", section_id: "2" },
    QuickDestination { label: "Checkout", section_id: "9" },
    QuickDestination { label: "Apparel", section_id: "10" },
    QuickDestination { label: "Home Goods", section_id: "11" },
    QuickDestination { label: "Food Court", section_id: "16" },
    QuickDestination { label: "Cinema", section_id: "18" },
    QuickDestination { label: "Customer Service", section_id: "19" },
];

/// The full set of sections and shopper markers for one store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreCatalog {
    sections: Vec<StoreSection>,
    people: Vec<ShopperMarker>,
}

impl StoreCatalog {
    pub fn new(sections: Vec<StoreSection>, people: Vec<ShopperMarker>) -> Self {
        Self { sections, people }
    }

    /// The demo store: groceries on floor 1, apparel and home on floor 2,
    /// food court and entertainment on floor 3, services on floor 4.
    pub fn sample() -> Self {
        use ColorRole::*;
        use Traffic::*;

        #[rustfmt::skip]
        let sections = vec![
            // Floor 1
            section("1", "Produce", &["A15", "A16"], Success, (10.0, 15.0, 25.0, 20.0), Medium, 5, &["Apples", "Bananas", "Spinach"], 1),
            section("2", "Meat & Seafood", &["A6", "A7"], Error, (40.0, 15.0, 25.0, 20.0), High, 7, &["Chicken", "Salmon"], 1),
            section("3", "Dairy", &["A12", "A13"], Info, (70.0, 15.0, 25.0, 20.0), Low, 3, &["Milk", "Cheese"], 1),
            section("4", "Bakery", &["A8", "A9"], Warning, (10.0, 40.0, 25.0, 20.0), Medium, 4, &["Bread", "Cakes"], 1),
            section("5", "Frozen Foods", &["A10", "A11"], PrimaryDark, (40.0, 40.0, 25.0, 20.0), Low, 4, &["Ice Cream", "Pizza"], 1),
            section("6", "Pantry & Canned", &["A1-A5"], TextSecondary, (70.0, 40.0, 25.0, 20.0), High, 10, &["Pasta", "Rice"], 1),
            section("7", "Pharmacy", &["PH1"], Error, (10.0, 70.0, 20.0, 15.0), Low, 2, &["Medicine"], 1),
            section("8", "Electronics", &["E1", "E2"], Black, (35.0, 70.0, 25.0, 15.0), Medium, 6, &["Headphones"], 1),
            section("9", "Checkout", &["CH1-CH8"], Secondary, (65.0, 70.0, 30.0, 15.0), High, 15, &[], 1),
            // Floor 2
            section("10", "Apparel", &["CL1-CL5"], Info, (10.0, 15.0, 25.0, 20.0), Medium, 8, &["Shirts", "Pants", "Dresses"], 2),
            section("11", "Home Goods", &["HG1-HG4"], Warning, (40.0, 15.0, 25.0, 20.0), Low, 12, &["Cookware", "Bedding"], 2),
            section("12", "Books & Media", &["BM1-BM3"], Success, (70.0, 15.0, 25.0, 20.0), Low, 6, &["Novels", "DVDs"], 2),
            section("13", "Toys", &["TY1-TY2"], Error, (10.0, 40.0, 25.0, 20.0), High, 9, &["Action Figures", "Board Games", "toy car"], 2),
            section("14", "Sporting Goods", &["SP1-SP3"], PrimaryDark, (40.0, 40.0, 25.0, 20.0), Medium, 7, &["Bikes", "Weights"], 2),
            section("15", "Pet Supplies", &["PT1-PT2"], TextSecondary, (70.0, 40.0, 25.0, 20.0), Low, 5, &["Dog Food", "Cat Toys"], 2),
            // Floor 3
            section("16", "Food Court", &["FC1-FC5"], Accent, (10.0, 15.0, 80.0, 30.0), High, 15, &["Pizza", "Burgers", "Sushi"], 3),
            section("17", "Arcade", &["AR1-AR3"], Info, (10.0, 50.0, 40.0, 25.0), Medium, 20, &["Games", "Prizes"], 3),
            section("18", "Cinema", &["CM1-CM2"], Error, (55.0, 50.0, 35.0, 25.0), High, 30, &["Movies", "Popcorn"], 3),
            // Floor 4
            section("19", "Customer Service", &["CS1"], Success, (10.0, 15.0, 30.0, 20.0), Low, 5, &[], 4),
            section("20", "Mall Management", &["MM1"], Warning, (50.0, 15.0, 30.0, 20.0), Low, 5, &[], 4),
            section("21", "Restrooms", &["RS1"], TextSecondary, (10.0, 40.0, 20.0, 15.0), Medium, 2, &[], 4),
        ];

        let people = [
            ("p1", 20.0, 25.0, 1),
            ("p2", 55.0, 30.0, 1),
            ("p3", 80.0, 60.0, 1),
            ("p4", 15.0, 50.0, 2),
            ("p5", 45.0, 20.0, 2),
            ("p6", 70.0, 40.0, 3),
            ("p7", 30.0, 25.0, 4),
        ]
        .into_iter()
        .map(|(id, x, y, floor)| ShopperMarker {
            id: id.to_string(),
            position: Point::new(x, y),
            floor,
        })
        .collect();

        Self { sections, people }
    }

    pub fn sections(&self) -> &[StoreSection] {
        &self.sections
    }

    pub fn sections_on_floor(&self, floor: i32) -> impl Iterator<Item = &StoreSection> {
        self.sections.iter().filter(move |s| s.floor == floor)
    }

    /// Floors that have at least one section, ascending.
    pub fn available_floors(&self) -> Vec<i32> {
        let mut floors: Vec<i32> = self.sections.iter().map(|s| s.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors
    }

    pub fn find_by_id(&self, id: &str) -> Option<&StoreSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&StoreSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn people_on_floor(&self, floor: i32) -> impl Iterator<Item = &ShopperMarker> {
        self.people.iter().filter(move |p| p.floor == floor)
    }

    /// Sections stocking at least one of the cart items.
    pub fn sections_matching_cart<'a>(
        &'a self,
        cart: &'a [&'a str],
    ) -> impl Iterator<Item = &'a StoreSection> + 'a {
        self.sections
            .iter()
            .filter(move |s| cart.iter().any(|item| s.stocks(item)))
    }

    /// Quick navigation shortcuts resolved against this catalog.
    /// Shortcuts pointing at unknown sections are skipped.
    pub fn quick_destinations(&self) -> Vec<(&'static str, &StoreSection)> {
        QUICK_DESTINATIONS
            .iter()
            .filter_map(|q| self.find_by_id(q.section_id).map(|s| (q.label, s)))
            .collect()
    }
}

/// Confirmation text shown before navigation to `section` starts.
pub fn navigation_prompt(section: &StoreSection, accessibility: bool) -> String {
    format!(
        "Start smart navigation to {} on Floor {}?\n\nEstimated time: {} minutes\n{}\nAisles: {}",
        section.name,
        section.floor,
        section.estimated_time,
        section.traffic.describe(accessibility),
        section.aisles.join(", ")
    )
}

#[allow(clippy::too_many_arguments)]
fn section(
    id: &str,
    name: &str,
    aisles: &[&str],
    color: ColorRole,
    (x, y, width, height): (f32, f32, f32, f32),
    traffic: Traffic,
    estimated_time: u32,
    items: &[&str],
    floor: i32,
) -> StoreSection {
    StoreSection {
        id: id.to_string(),
        name: name.to_string(),
        aisles: aisles.iter().map(|a| a.to_string()).collect(),
        color,
        rect: Rect::new(x, y, width, height),
        traffic,
        estimated_time,
        items: items.iter().map(|i| i.to_string()).collect(),
        floor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_four_floors() {
        let catalog = StoreCatalog::sample();
        assert_eq!(catalog.sections().len(), 21);
        assert_eq!(catalog.available_floors(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_sections_on_floor() {
        let catalog = StoreCatalog::sample();
        assert_eq!(catalog.sections_on_floor(1).count(), 9);
        assert_eq!(catalog.sections_on_floor(3).count(), 3);
        assert!(catalog.sections_on_floor(3).all(|s| s.floor == 3));
        assert_eq!(catalog.sections_on_floor(9).count(), 0);
    }

    #[test]
    fn test_find_by_id_and_name() {
        let catalog = StoreCatalog::sample();
        let meat = catalog.find_by_id("2").unwrap();
        assert_eq!(meat.name, "Meat & Seafood");
        assert_eq!(meat.center(), Point::new(52.5, 25.0));
        assert_eq!(catalog.find_by_name("Cinema").unwrap().id, "18");
        assert!(catalog.find_by_id("99").is_none());
        assert!(catalog.find_by_name("Garden Center").is_none());
    }

    #[test]
    fn test_cart_matching_is_case_insensitive() {
        let catalog = StoreCatalog::sample();
        let cart = ["milk", "salmon", "toy car"];
        let names: Vec<&str> = catalog
            .sections_matching_cart(&cart)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Meat & Seafood", "Dairy", "Toys"]);
    }

    #[test]
    fn test_people_filtered_by_floor() {
        let catalog = StoreCatalog::sample();
        assert_eq!(catalog.people_on_floor(1).count(), 3);
        assert_eq!(catalog.people_on_floor(4).count(), 1);
    }

    #[test]
    fn test_quick_destinations_resolve() {
        let catalog = StoreCatalog::sample();
        let quick = catalog.quick_destinations();
        assert_eq!(quick.len(), QUICK_DESTINATIONS.len());
        assert_eq!(quick[3].0, "Checkout");
        assert_eq!(quick[3].1.id, "9");

        let empty = StoreCatalog::default();
        assert!(empty.quick_destinations().is_empty());
    }

    #[test]
    fn test_traffic_descriptions() {
        assert_eq!(Traffic::High.describe(false), "Traffic level: high");
        assert_eq!(
            Traffic::Low.describe(true),
            "Traffic level is low. This means few people in this area."
        );
    }

    #[test]
    fn test_navigation_prompt() {
        let catalog = StoreCatalog::sample();
        let produce = catalog.find_by_id("1").unwrap();
        let prompt = navigation_prompt(produce, false);
        assert_eq!(
            prompt,
            "Start smart navigation to Produce on Floor 1?\n\nEstimated time: 5 minutes\nTraffic level: medium\nAisles: A15, A16"
        );
        assert!(navigation_prompt(produce, true).contains("moderate crowd levels"));
    }
}
