//! Ingredient identities and their measurement units.
//!
//! Prices are always expressed per **base unit** (kilogram for solids, liter
//! for liquids) while people enter and read quantities in **display units**
//! (grams, milliliters). The factor between the two is fixed at 1000.

use serde::{Deserialize, Serialize};

/// Display units per base unit (g per kg, ml per L).
pub const DISPLAY_UNITS_PER_BASE_UNIT: f64 = 1000.0;

/// How an ingredient is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Liquid,
    Solid,
}

impl UnitClass {
    #[must_use]
    pub const fn display_unit(self) -> &'static str {
        match self {
            Self::Liquid => "ml",
            Self::Solid => "g",
        }
    }

    #[must_use]
    pub const fn base_unit(self) -> &'static str {
        match self {
            Self::Liquid => "L",
            Self::Solid => "kg",
        }
    }
}

/// The closed set of bulk ingredients a machine can be stocked with.
///
/// The unit class of each ingredient is fixed here and is not user-editable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ingredient {
    CoffeeBeans,
    Milk,
    ChocolatePowder,
    Sugar,
    Water,
    VanillaSyrup,
}

impl Ingredient {
    pub const ALL: [Ingredient; 6] = [
        Self::CoffeeBeans,
        Self::Milk,
        Self::ChocolatePowder,
        Self::Sugar,
        Self::Water,
        Self::VanillaSyrup,
    ];

    /// Canonical identifier used in price maps and recipes.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::CoffeeBeans => "coffee_beans",
            Self::Milk => "milk",
            Self::ChocolatePowder => "chocolate_powder",
            Self::Sugar => "sugar",
            Self::Water => "water",
            Self::VanillaSyrup => "vanilla_syrup",
        }
    }

    #[must_use]
    pub const fn unit_class(self) -> UnitClass {
        match self {
            Self::Milk | Self::Water | Self::VanillaSyrup => UnitClass::Liquid,
            Self::CoffeeBeans | Self::ChocolatePowder | Self::Sugar => UnitClass::Solid,
        }
    }

    /// Looks up an identifier; unknown identifiers yield `None`.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ingredient| ingredient.id() == id)
    }
}

/// Unit class for any identifier. Only the known liquids are liquid.
#[must_use]
pub fn unit_class_of(id: &str) -> UnitClass {
    Ingredient::parse(id).map_or(UnitClass::Solid, Ingredient::unit_class)
}

#[must_use]
pub fn to_base_units(display_amount: f64) -> f64 {
    display_amount / DISPLAY_UNITS_PER_BASE_UNIT
}

#[must_use]
pub fn to_display_units(base_amount: f64) -> f64 {
    base_amount * DISPLAY_UNITS_PER_BASE_UNIT
}

/// `"coffee_beans"` → `"Coffee Beans"`.
#[must_use]
pub fn display_name(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Base-unit quantity rendered in display units with one decimal, e.g.
/// `0.007` coffee beans → `"7.0 g"`.
#[must_use]
pub fn format_display_amount(id: &str, base_amount: f64) -> String {
    format!(
        "{:.1} {}",
        to_display_units(base_amount),
        unit_class_of(id).display_unit()
    )
}

/// Price per base unit, e.g. `"€20.00/kg"`.
#[must_use]
pub fn format_unit_price(id: &str, price: f64) -> String {
    format!("€{price:.2}/{}", unit_class_of(id).base_unit())
}
