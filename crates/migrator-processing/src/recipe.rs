//! Derivative recipes.
//!
//! Each photo type maps to exactly one recipe. Recipes are plain data built
//! once from configuration; adding a derivative means adding a row in
//! `RecipeTable::new`.

use migrator_core::{DirectoryLayout, PhotoType, RecordPathField, VariantSizes};
use std::collections::HashMap;

/// Border colour of product cards (#D5D9D9).
pub const CARD_BORDER_COLOR: [u8; 4] = [0xD5, 0xD9, 0xD9, 0xFF];
pub const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Circle,
    RoundedCard,
    Representative,
}

/// How the normalized image is resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Scale to cover `size`×`size`, cropping the overflow around the centre.
    CoverSquare { size: u32 },
    /// Scale to fit inside `size`×`size`, centred on an opaque background.
    ContainSquare { size: u32, background: [u8; 4] },
    /// Scale so the shorter side becomes `target`; no cropping.
    ScaleShortestSide { target: u32 },
}

/// Alpha mask composited with destination-in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mask {
    None,
    /// Circle inscribed in the square output.
    Circle,
    /// Rounded rectangle covering the whole output.
    RoundedRect { radius: f32 },
}

/// Stroke drawn over the masked image along a rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Distance of the stroke centre line from the output edge.
    pub inset: f32,
    pub radius: f32,
    pub width: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecipe {
    pub kind: VariantKind,
    pub geometry: Geometry,
    pub mask: Mask,
    pub border: Option<Border>,
    /// Directory the derivative is written under.
    pub directory: String,
    /// Record field that receives the derivative's path.
    pub record_field: RecordPathField,
}

impl VariantRecipe {
    /// Cover-fit circle of diameter `size`.
    pub fn circle(size: u32, directory: impl Into<String>) -> Self {
        Self {
            kind: VariantKind::Circle,
            geometry: Geometry::CoverSquare { size },
            mask: Mask::Circle,
            border: None,
            directory: directory.into(),
            record_field: RecordPathField::ConvertedFileName,
        }
    }

    /// Contain-fit card on white with rounded corners and a thin grey border.
    ///
    /// Corner radius r = floor(size/12), stroke width w = floor(r/4). The mask
    /// uses radius r + w/2 so its edge runs along the outside of the stroke.
    pub fn rounded_card(size: u32, directory: impl Into<String>) -> Self {
        let radius = (size / 12) as f32;
        let width = ((size / 12) / 4) as f32;
        Self {
            kind: VariantKind::RoundedCard,
            geometry: Geometry::ContainSquare {
                size,
                background: WHITE,
            },
            mask: Mask::RoundedRect {
                radius: radius + width / 2.0,
            },
            border: Some(Border {
                inset: width / 2.0,
                radius,
                width,
                color: CARD_BORDER_COLOR,
            }),
            directory: directory.into(),
            record_field: RecordPathField::ConvertedFileName,
        }
    }

    /// Shorter side scaled to `target`.
    pub fn representative(target: u32, directory: impl Into<String>) -> Self {
        Self {
            kind: VariantKind::Representative,
            geometry: Geometry::ScaleShortestSide { target },
            mask: Mask::None,
            border: None,
            directory: directory.into(),
            record_field: RecordPathField::CompressedFileName,
        }
    }
}

/// Photo type to recipe lookup.
#[derive(Debug, Clone)]
pub struct RecipeTable {
    recipes: HashMap<PhotoType, VariantRecipe>,
}

impl RecipeTable {
    pub fn new(layout: &DirectoryLayout, sizes: VariantSizes) -> Self {
        let circle = VariantRecipe::circle(sizes.circle, layout.circle_dir.clone());
        let rows = [
            (PhotoType::ProfileDistributor, circle.clone()),
            (PhotoType::ProfileRepresentative, circle),
            (
                PhotoType::Product,
                VariantRecipe::rounded_card(sizes.product, layout.rounded_dir.clone()),
            ),
            (
                PhotoType::Representative,
                VariantRecipe::representative(
                    sizes.representative,
                    layout.representative_dir.clone(),
                ),
            ),
        ];
        Self {
            recipes: rows.into_iter().collect(),
        }
    }

    pub fn recipe_for(&self, photo_type: PhotoType) -> Option<&VariantRecipe> {
        self.recipes.get(&photo_type)
    }

    /// Every derivative directory with the record field its outputs populate.
    pub fn derivative_dirs(&self) -> Vec<(&str, RecordPathField)> {
        let mut dirs: Vec<(&str, RecordPathField)> = self
            .recipes
            .values()
            .map(|recipe| (recipe.directory.as_str(), recipe.record_field))
            .collect();
        dirs.sort_by(|a, b| a.0.cmp(b.0));
        dirs.dedup();
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_photo_type_has_a_recipe() {
        let table = RecipeTable::new(&DirectoryLayout::default(), VariantSizes::default());
        for photo_type in PhotoType::ALL {
            assert!(table.recipe_for(photo_type).is_some(), "{}", photo_type);
        }
        assert_eq!(
            table.recipe_for(PhotoType::ProfileRepresentative).unwrap().kind,
            VariantKind::Circle
        );
        assert_eq!(
            table.recipe_for(PhotoType::Product).unwrap().kind,
            VariantKind::RoundedCard
        );
    }

    #[test]
    fn test_rounded_card_parameters() {
        let recipe = VariantRecipe::rounded_card(600, "rounded-corners");
        // r = floor(600/12) = 50, w = floor(50/4) = 12
        assert_eq!(recipe.mask, Mask::RoundedRect { radius: 56.0 });
        let border = recipe.border.unwrap();
        assert_eq!(border.radius, 50.0);
        assert_eq!(border.width, 12.0);
        assert_eq!(border.inset, 6.0);
        assert_eq!(border.color, CARD_BORDER_COLOR);

        let small = VariantRecipe::rounded_card(100, "rounded-corners");
        // r = 8, w = 2
        assert_eq!(small.mask, Mask::RoundedRect { radius: 9.0 });
        assert_eq!(small.border.unwrap().width, 2.0);
    }

    #[test]
    fn test_derivative_dirs_map_to_record_fields() {
        let table = RecipeTable::new(&DirectoryLayout::default(), VariantSizes::default());
        assert_eq!(
            table.derivative_dirs(),
            vec![
                ("circle", RecordPathField::ConvertedFileName),
                ("representative", RecordPathField::CompressedFileName),
                ("rounded-corners", RecordPathField::ConvertedFileName),
            ]
        );
    }
}
