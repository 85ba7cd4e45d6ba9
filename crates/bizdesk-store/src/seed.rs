//! # Default Datasets
//!
//! What a fresh install (or a corrupt snapshot) starts from: a small demo
//! catalog, matching categories, and a roster with one member per role.
//!
//! | Member  | Role    | PIN  |
//! |---------|---------|------|
//! | Admin   | admin   | 1234 |
//! | Manager | manager | 2222 |
//! | Cashier | cashier | 4242 |

use chrono::Utc;
use uuid::Uuid;

use bizdesk_core::{BusinessSegment, CatalogItem, Category, Money, Role, TeamMember};

/// (name, category, price in cents, stock, segment)
const DEMO_ITEMS: &[(&str, &str, i64, Option<i64>, BusinessSegment)] = &[
    ("X-Burger", "Burgers", 2500, Some(40), BusinessSegment::Restaurant),
    ("X-Bacon", "Burgers", 2990, Some(25), BusinessSegment::Restaurant),
    ("Margherita Pizza", "Pizzas", 4500, Some(15), BusinessSegment::Restaurant),
    ("French Fries", "Sides", 1200, Some(60), BusinessSegment::Restaurant),
    ("Soda Can", "Drinks", 600, Some(120), BusinessSegment::Restaurant),
    ("Fresh Orange Juice", "Drinks", 900, Some(8), BusinessSegment::Restaurant),
    ("Delivery Fee", "Fees", 700, None, BusinessSegment::Delivery),
    ("Acai Bowl 500ml", "Desserts", 2200, Some(30), BusinessSegment::Delivery),
    ("Double Room (night)", "Rooms", 32000, None, BusinessSegment::Hotel),
    ("Concert Ticket", "Tickets", 15000, Some(200), BusinessSegment::Ticketing),
    ("Haircut", "Services", 6000, None, BusinessSegment::Scheduling),
    ("T-Shirt", "Apparel", 7990, Some(12), BusinessSegment::Ecommerce),
];

const DEMO_TEAM: &[(&str, Role, &str)] = &[
    ("Admin", Role::Admin, "1234"),
    ("Manager", Role::Manager, "2222"),
    ("Cashier", Role::Cashier, "4242"),
];

pub fn default_catalog() -> Vec<CatalogItem> {
    let now = Utc::now();
    DEMO_ITEMS
        .iter()
        .map(|(name, category, price, stock, segment)| CatalogItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            price: Money::from_cents(*price),
            category: category.to_string(),
            stock: *stock,
            low_stock_threshold: None,
            segment: *segment,
            is_available: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// One category per distinct (name, segment) of the demo catalog.
pub fn default_categories() -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    for (_, category, _, _, segment) in DEMO_ITEMS {
        if !categories
            .iter()
            .any(|c| c.name == *category && c.segment == *segment)
        {
            categories.push(Category {
                id: Uuid::new_v4().to_string(),
                name: category.to_string(),
                segment: *segment,
            });
        }
    }
    categories
}

pub fn default_team() -> Vec<TeamMember> {
    let now = Utc::now();
    DEMO_TEAM
        .iter()
        .map(|(name, role, pin)| TeamMember {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            role: *role,
            pin: pin.to_string(),
            is_active: true,
            created_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdesk_core::Roster;

    #[test]
    fn test_default_team_pins_are_unique() {
        let roster = Roster::new(default_team());
        for (name, _, pin) in DEMO_TEAM {
            assert_eq!(roster.verify(pin).map(|m| m.name.as_str()), Some(*name));
        }
    }

    #[test]
    fn test_categories_cover_catalog() {
        let categories = default_categories();
        for item in default_catalog() {
            assert!(categories.iter().any(|c| c.name == item.category));
        }
    }
}
