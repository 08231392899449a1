use crate::types::Category;

/// Ordered substring rules; the first rule with a matching needle wins.
/// "Architectural Design Studio" is an architect, not a designer.
const RULES: &[(&[&str], Category)] = &[
    (&["architect"], Category::Architect),
    (&["design"], Category::Designer),
    (&["photo"], Category::Photographer),
    (&["influencer"], Category::Influencer),
    (&["furnish", "decor"], Category::Furnishing),
];

/// Map a free-text category label onto one of the canonical categories.
///
/// Matching is case-insensitive. Labels that match no rule, including the
/// empty string, classify as [`Category::Other`]. Classifying a category's
/// own name returns that category, so the function can be applied again to
/// already-normalized data.
pub fn classify(label: &str) -> Category {
    let label = label.to_lowercase();
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| label.contains(needle)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rules() {
        assert_eq!(classify("Architect"), Category::Architect);
        assert_eq!(classify("Interior Design"), Category::Designer);
        assert_eq!(classify("Wedding photographer"), Category::Photographer);
        assert_eq!(classify("PHOTO STUDIO"), Category::Photographer);
        assert_eq!(classify("Instagram influencer"), Category::Influencer);
        assert_eq!(classify("Furniture store"), Category::Other);
        assert_eq!(classify("Home furnishings"), Category::Furnishing);
        assert_eq!(classify("Home Decor"), Category::Furnishing);
        assert_eq!(classify("Plumber"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_classify_first_rule_wins() {
        assert_eq!(classify("Architectural design firm"), Category::Architect);
        assert_eq!(classify("Designer photo booth"), Category::Designer);
        assert_eq!(classify("Photo decor rentals"), Category::Photographer);
    }

    #[test]
    fn test_classify_is_idempotent_on_category_names() {
        for category in Category::ALL {
            assert_eq!(classify(category.as_str()), category);
            assert_eq!(classify(&category.as_str().to_uppercase()), category);
        }
    }
}
