use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;

/// The unique key of an [`Item`] within a collection.
///
/// Keys are trimmed, non-empty strings. Numeric keys are kept as their
/// decimal text, so `1` and `"1"` name the same item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ItemId(NonEmptyString);

impl ItemId {
    /// Creates a key from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if the trimmed string is empty.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_id(id.as_ref())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        // decimal text always has at least one digit
        Self(NonEmptyString::new(n.to_string()).unwrap_or_else(|_| unreachable!()))
    }
}

/// A field value outside its domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The key was empty or only whitespace.
    #[error("the id must not be empty")]
    EmptyId,

    /// The name was empty or only whitespace.
    #[error("the name must not be empty")]
    EmptyName,

    /// The quantity was below zero.
    #[error("the quantity cannot be negative (got {0})")]
    NegativeQuantity(i64),

    /// The price was below zero.
    #[error("the price cannot be negative (got {0})")]
    NegativePrice(f64),

    /// The price was NaN or infinite.
    #[error("the price must be a finite number")]
    NonFinitePrice,
}

/// Validates and trims an item key.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyId`] for an empty or blank key.
pub fn validate_id(id: &str) -> Result<ItemId, ValidationError> {
    NonEmptyString::new(id.trim().to_string())
        .map(ItemId)
        .map_err(|_| ValidationError::EmptyId)
}

/// Validates and trims an item name.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] for an empty or blank name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Validates a quantity.
///
/// # Errors
///
/// Returns [`ValidationError::NegativeQuantity`] if `quantity < 0`.
pub fn validate_quantity(quantity: i64) -> Result<u64, ValidationError> {
    u64::try_from(quantity).map_err(|_| ValidationError::NegativeQuantity(quantity))
}

/// Validates a price, rounding it to whole cents.
///
/// # Errors
///
/// Returns an error if the price is negative, or if it or its value in
/// cents is not finite.
pub fn validate_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::NonFinitePrice);
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice(price));
    }
    let rounded = round_cents(price);
    if !rounded.is_finite() {
        return Err(ValidationError::NonFinitePrice);
    }
    Ok(rounded)
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A stock record: a unique key, a display name, a quantity and a unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u64,
    price: f64,
}

impl Item {
    /// Builds an item, validating every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn new(
        id: impl AsRef<str>,
        name: &str,
        quantity: i64,
        price: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: validate_id(id.as_ref())?,
            name: validate_name(name)?,
            quantity: validate_quantity(quantity)?,
            price: validate_price(price)?,
        })
    }

    /// The item's unique key.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units in stock.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Unit price, rounded to cents.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// `quantity * price`, rounded to cents.
    #[must_use]
    pub fn value(&self) -> f64 {
        round_cents(self.quantity as f64 * self.price)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | qty: {} | $ {:.2}",
            self.id, self.name, self.quantity, self.price
        )
    }
}

/// A partial change to an [`Item`]. Fields left as `None` are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement quantity.
    pub quantity: Option<i64>,
    /// Replacement price.
    pub price: Option<f64>,
}

impl ItemPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.price.is_none()
    }

    /// Produces the patched copy of `item`.
    ///
    /// Every field is validated before the copy is returned, so a failing
    /// patch never yields a half-applied item.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn apply(&self, item: &Item) -> Result<Item, ValidationError> {
        let name = match &self.name {
            Some(name) => validate_name(name)?,
            None => item.name.clone(),
        };
        let quantity = match self.quantity {
            Some(quantity) => validate_quantity(quantity)?,
            None => item.quantity,
        };
        let price = match self.price {
            Some(price) => validate_price(price)?,
            None => item.price,
        };

        Ok(Item {
            id: item.id.clone(),
            name,
            quantity,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn new_trims_text_fields() {
        let item = Item::new("  7 ", "  Té verde ", 3, 1.5).unwrap();
        assert_eq!(item.id().as_str(), "7");
        assert_eq!(item.name(), "Té verde");
    }

    #[test_case("", "name", 0, 0.0, &ValidationError::EmptyId; "empty id")]
    #[test_case("1", "  ", 0, 0.0, &ValidationError::EmptyName; "blank name")]
    #[test_case("1", "name", -1, 0.0, &ValidationError::NegativeQuantity(-1); "negative quantity")]
    #[test_case("1", "name", 0, -0.5, &ValidationError::NegativePrice(-0.5); "negative price")]
    #[test_case("1", "name", 0, f64::NAN, &ValidationError::NonFinitePrice; "nan price")]
    #[test_case("1", "name", 1, 1e307, &ValidationError::NonFinitePrice; "price overflowing cents")]
    fn new_rejects(id: &str, name: &str, quantity: i64, price: f64, expected: &ValidationError) {
        assert_eq!(&Item::new(id, name, quantity, price).unwrap_err(), expected);
    }

    #[test]
    fn price_is_rounded_to_cents() {
        let item = Item::new("1", "x", 1, 2.499_9).unwrap();
        assert!((item.price() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_ids_use_decimal_text() {
        assert_eq!(ItemId::from(1_600_713_778), ItemId::new("1600713778").unwrap());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let item = Item::new("1", "Café", 10, 2.5).unwrap();
        let patch = ItemPatch {
            price: Some(3.0),
            ..ItemPatch::default()
        };

        let patched = patch.apply(&item).unwrap();

        assert_eq!(patched.name(), "Café");
        assert_eq!(patched.quantity(), 10);
        assert!((patched.price() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_patch_yields_no_item() {
        let item = Item::new("1", "Café", 10, 2.5).unwrap();
        let patch = ItemPatch {
            quantity: Some(4),
            price: Some(-1.0),
            ..ItemPatch::default()
        };

        assert_eq!(
            patch.apply(&item).unwrap_err(),
            ValidationError::NegativePrice(-1.0)
        );
    }

    #[test]
    fn display_shows_price_with_two_decimals() {
        let item = Item::new("1", "Café", 10, 2.5).unwrap();
        assert_eq!(item.to_string(), "[1] Café | qty: 10 | $ 2.50");
    }
}
