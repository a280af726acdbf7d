//! Product catalog types and variant price resolution.
//!
//! A product carries up to three variant dimensions, each with its own price
//! delta: print size, frame, and frame finish (only meaningful for frames
//! that declare finishes). The catalog is read-only to everything in this
//! crate; repositories in the storefront load it from Postgres.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Label used for the size dimension when a product declares no sizes.
pub const DEFAULT_SIZE: &str = "STANDARD";

/// Label used for the frame dimension when a product declares no frames.
pub const DEFAULT_FRAME: &str = "NONE";

/// A size choice and its price delta relative to the base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeOption {
    /// Display label, e.g. "30x40" or "60x90".
    pub label: String,
    /// Added to the base price when this size is selected.
    pub price_delta: Decimal,
}

/// A frame choice, its price delta, and any finishes it comes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOption {
    /// Display label, e.g. "Wood" or "Aluminium".
    pub label: String,
    /// Added to the base price when this frame is selected.
    pub price_delta: Decimal,
    /// Finishes available for this frame. Empty for frames sold as-is.
    pub finishes: Vec<FrameFinish>,
}

/// A finish for a specific frame, e.g. "Natural oak" or "Matte black".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFinish {
    /// Display label.
    pub label: String,
    /// Added to the base price when this finish is selected.
    pub price_delta: Decimal,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// URL slug, unique across the catalog.
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Base price before any variant deltas.
    pub price: Decimal,
    /// Primary image URL.
    pub image: String,
    /// Units on hand. Informational; there is no reservation.
    pub stock: i32,
    /// Sizes in display order. Empty means the product has one size.
    pub sizes: Vec<SizeOption>,
    /// Frames in display order. Empty means the product ships unframed.
    pub frames: Vec<FrameOption>,
}

impl Product {
    /// The size selected when the product page first renders.
    #[must_use]
    pub fn initial_size(&self) -> &str {
        self.sizes.first().map_or(DEFAULT_SIZE, |s| &s.label)
    }

    /// The frame selected when the product page first renders.
    #[must_use]
    pub fn initial_frame(&self) -> &str {
        self.frames.first().map_or(DEFAULT_FRAME, |f| &f.label)
    }

    /// Find a declared frame by label.
    #[must_use]
    pub fn frame(&self, label: &str) -> Option<&FrameOption> {
        self.frames.iter().find(|f| f.label == label)
    }

    /// Resolve the unit price for a variant selection.
    ///
    /// Returns the base price plus the deltas of the matched size, frame,
    /// and finish. A selection that matches nothing contributes zero, so a
    /// stale label (the catalog changed between page load and submit) still
    /// resolves to a sensible price instead of failing. Pure and cheap;
    /// called on every option toggle on the product page.
    #[must_use]
    pub fn resolve_price(&self, size: &str, frame: &str, finish: Option<&str>) -> Decimal {
        let mut price = self.price;

        if let Some(s) = self.sizes.iter().find(|s| s.label == size) {
            price += s.price_delta;
        }

        if let Some(f) = self.frame(frame) {
            price += f.price_delta;
            // A finish only counts within the frame that declares it.
            if let Some(finish) = finish {
                if let Some(opt) = f.finishes.iter().find(|o| o.label == finish) {
                    price += opt.price_delta;
                }
            }
        }

        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn framed_print() -> Product {
        Product {
            id: ProductId::new(1),
            slug: "sahara-dunes".to_string(),
            name: "Sahara Dunes".to_string(),
            description: "Panoramic canvas print".to_string(),
            price: dec(3000),
            image: "/static/products/sahara-dunes.jpg".to_string(),
            stock: 12,
            sizes: vec![
                SizeOption {
                    label: "30x40".to_string(),
                    price_delta: dec(0),
                },
                SizeOption {
                    label: "60x90".to_string(),
                    price_delta: dec(1500),
                },
            ],
            frames: vec![
                FrameOption {
                    label: "NONE".to_string(),
                    price_delta: dec(0),
                    finishes: vec![],
                },
                FrameOption {
                    label: "Wood".to_string(),
                    price_delta: dec(800),
                    finishes: vec![
                        FrameFinish {
                            label: "Natural oak".to_string(),
                            price_delta: dec(0),
                        },
                        FrameFinish {
                            label: "Walnut".to_string(),
                            price_delta: dec(200),
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_resolve_sums_all_deltas() {
        let product = framed_print();
        assert_eq!(
            product.resolve_price("60x90", "Wood", Some("Walnut")),
            dec(3000 + 1500 + 800 + 200)
        );
    }

    #[test]
    fn test_resolve_without_finish() {
        let product = framed_print();
        assert_eq!(product.resolve_price("30x40", "Wood", None), dec(3800));
    }

    #[test]
    fn test_unknown_selection_contributes_zero() {
        let product = framed_print();
        assert_eq!(
            product.resolve_price("90x120", "Gold", Some("Glitter")),
            dec(3000)
        );
    }

    #[test]
    fn test_finish_ignored_outside_its_frame() {
        let product = framed_print();
        // "Walnut" belongs to the Wood frame, not to NONE.
        assert_eq!(
            product.resolve_price("30x40", "NONE", Some("Walnut")),
            dec(3000)
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let product = framed_print();
        let first = product.resolve_price("60x90", "Wood", Some("Natural oak"));
        let second = product.resolve_price("60x90", "Wood", Some("Natural oak"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_initial_labels_fall_back() {
        let mut product = framed_print();
        product.sizes.clear();
        product.frames.clear();
        assert_eq!(product.initial_size(), DEFAULT_SIZE);
        assert_eq!(product.initial_frame(), DEFAULT_FRAME);
    }
}
