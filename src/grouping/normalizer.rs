use crate::models::BaseItemKey;

/// Known produce terms, vegetables then fruits. Order matters: the first term
/// found inside a name wins, so "sweet potato" groups under "Potato".
const DEFAULT_TERMS: &[&str] = &[
    "cauliflower", "carrot", "potato", "tomato", "onion", "cabbage",
    "brinjal", "eggplant", "capsicum", "bell pepper", "cucumber",
    "bottle gourd", "ridge gourd", "bitter gourd", "pumpkin", "beans",
    "okra", "ladyfinger", "spinach", "coriander", "mint", "curry leaves",
    "ginger", "garlic", "beetroot", "radish", "turnip", "green chilli",
    "red chilli", "drumstick", "cluster beans", "french beans",
    "peas", "sweet corn", "baby corn", "mushroom", "lettuce",
    "broccoli", "zucchini", "celery", "leek", "spring onion",
    "green onion", "fenugreek", "methi", "palak", "dhaniya",
    "pudina", "bhindi", "karela", "lauki", "tinda", "parwal",
    "arbi", "colocasia", "yam", "sweet potato", "tapioca",
    "apple", "banana", "orange", "mango", "grapes", "watermelon",
    "papaya", "pineapple", "pomegranate", "guava", "lemon", "lime",
    "kiwi", "strawberry", "blueberry", "cherry", "peach", "plum",
    "apricot", "pear", "dragon fruit", "passion fruit", "avocado",
    "coconut", "jackfruit", "melon", "muskmelon", "cantaloupe",
    "litchi", "lychee", "custard apple", "sapota", "chikoo",
    "fig", "date", "raisin", "blackberry", "raspberry",
    "mosambi", "sweet lime", "grapefruit",
];

/// Words that describe a product rather than name it.
const DESCRIPTORS: &[&str] = &[
    "fresh", "organic", "premium", "frozen", "combo", "pack", "big", "small", "medium", "large",
];

/// Ordered, immutable lookup table mapping product names to base items.
#[derive(Debug, Clone)]
pub struct BaseItemDictionary {
    terms: Vec<String>,
}

impl Default for BaseItemDictionary {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS.iter().copied())
    }
}

impl BaseItemDictionary {
    /// Terms are matched lower-cased, in the order given.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms.into_iter().map(|t| t.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Dictionary term first, then the first meaningful word, else
    /// "Ungrouped". Never fails.
    pub fn normalize(&self, name: &str) -> BaseItemKey {
        let lower = name.to_lowercase();
        if let Some(term) = self.terms.iter().find(|t| lower.contains(t.as_str())) {
            return BaseItemKey::new(title_case(term));
        }

        name.split_whitespace()
            .map(|word| word.trim_matches(|c: char| matches!(c, '(' | ')' | ',')))
            .find(|word| {
                let lower = word.to_lowercase();
                !DESCRIPTORS.contains(&lower.as_str()) && lower.chars().count() > 3
            })
            .map(|word| BaseItemKey::new(title_case(word)))
            .unwrap_or_else(BaseItemKey::ungrouped)
    }
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
/// "bell pepper" → "Bell Pepper", "ooty-carrot" → "Ooty-Carrot".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}
