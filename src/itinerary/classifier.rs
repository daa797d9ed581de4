//! Keyword classification of extracted places

use crate::models::Category;

const ATTRACTION_NAME_KEYWORDS: [&str; 5] = ["museum", "tower", "cathedral", "palace", "monument"];
const RESTAURANT_CONTEXT_KEYWORDS: [&str; 5] = ["lunch", "dinner", "restaurant", "café", "cafe"];
const HOTEL_NAME_KEYWORDS: [&str; 3] = ["hotel", "inn", "resort"];
const HOTEL_CONTEXT_KEYWORD: &str = "stay";

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

/// Category for a place name seen on `context_line`.
///
/// Rules are checked in order and the first hit wins; anything unmatched is an
/// [`Category::Activity`].
#[must_use]
pub fn classify(name: &str, context_line: &str) -> Category {
    let name = name.to_lowercase();
    let context = context_line.to_lowercase();

    if contains_any(&name, &ATTRACTION_NAME_KEYWORDS) {
        Category::Attraction
    } else if contains_any(&context, &RESTAURANT_CONTEXT_KEYWORDS) {
        Category::Restaurant
    } else if contains_any(&name, &HOTEL_NAME_KEYWORDS) || context.contains(HOTEL_CONTEXT_KEYWORD) {
        Category::Hotel
    } else {
        Category::Activity
    }
}
