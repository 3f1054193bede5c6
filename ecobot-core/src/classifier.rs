//! Keyword-based mapping from object labels to disposal categories.

use crate::model::{Category, Classification};

struct Rule {
    keywords: &'static [&'static str],
    category: Category,
    note: &'static str,
}

// Evaluated top to bottom; the first rule with a matching keyword wins.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["banana", "apple", "egg", "fruit"],
        category: Category::Compost,
        note: "fruit peels decompose naturally and enrich soil.",
    },
    Rule {
        keywords: &["can", "aluminum"],
        category: Category::Cans,
        note: "recycling a can saves ~95% of the energy needed to make a new one.",
    },
    Rule {
        keywords: &["bottle", "plastic", "container"],
        category: Category::Plastic,
        note: "clean plastic can be recycled into new products.",
    },
    Rule {
        keywords: &["paper", "newspaper", "book"],
        category: Category::Paper,
        note: "recycling paper reduces deforestation and saves water and energy.",
    },
    Rule {
        keywords: &["napkin", "dirty", "food", "scraps"],
        category: Category::Trash,
        note: "soiled or contaminated waste cannot be recycled and must go to general trash.",
    },
];

const FALLBACK: Classification = Classification {
    category: Category::Trash,
    note: "remember: if waste is dirty or contaminated, it belongs in general trash.",
};

/// Suggest a disposal category for a detected or user-typed label.
///
/// Matching is a case-insensitive substring test against fixed keyword
/// groups. Labels matching several groups resolve to the first group, so
/// `"dirty can"` is [`Category::Cans`]. Labels matching nothing, including the
/// empty string, fall back to [`Category::Trash`].
#[must_use]
pub fn classify(label: &str) -> Classification {
    let normalized = label.to_lowercase();

    RULES
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| normalized.contains(keyword))
        })
        .map_or(FALLBACK, |rule| Classification {
            category: rule.category,
            note: rule.note,
        })
}
