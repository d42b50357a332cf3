//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog entry served by `GET /menu-items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Unit price in currency unit (the API sends either a number or a decimal string)
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl MenuItem {
    pub fn kind(&self) -> MenuCategory {
        MenuCategory::from_name(&self.category)
    }
}

/// Menu section an item is listed under
///
/// The API only knows `main`, `starter` and `dessert`; everything else is
/// shown with the drinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MenuCategory {
    Starter,
    Main,
    Dessert,
    Drink,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 4] = [Self::Starter, Self::Main, Self::Dessert, Self::Drink];

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "starter" => Self::Starter,
            "main" => Self::Main,
            "dessert" => Self::Dessert,
            _ => Self::Drink,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Starter => "Starters",
            Self::Main => "Mains",
            Self::Dessert => "Desserts",
            Self::Drink => "Drinks",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Starter => "🥗",
            Self::Main => "🍕",
            Self::Dessert => "🍰",
            Self::Drink => "🍹",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_number_or_string() {
        let from_number: MenuItem =
            serde_json::from_str(r#"{"id":7,"name":"Pizza","price":12.99,"category":"main"}"#)
                .unwrap();
        let from_string: MenuItem =
            serde_json::from_str(r#"{"id":7,"name":"Pizza","price":"12.99","category":"main"}"#)
                .unwrap();

        assert_eq!(from_number.price, Decimal::new(1299, 2));
        assert_eq!(from_number.price, from_string.price);
        assert!(from_number.description.is_none());
    }

    #[test]
    fn test_unknown_category_falls_back_to_drinks() {
        assert_eq!(MenuCategory::from_name("Main"), MenuCategory::Main);
        assert_eq!(MenuCategory::from_name("starter"), MenuCategory::Starter);
        assert_eq!(MenuCategory::from_name("beverage"), MenuCategory::Drink);
        assert_eq!(MenuCategory::from_name(""), MenuCategory::Drink);
    }
}
