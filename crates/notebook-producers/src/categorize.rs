//! Keyword categorizer: routes a question to a notebook label by topic words.
//!
//! Deterministic for a given question. Returns `None` when nothing matches so the
//! service's fallback label applies.

/// (category, keywords). First category with a matching word wins.
const TOPICS: &[(&str, &[&str])] = &[
    (
        "science",
        &[
            "quantum", "physics", "chemistry", "biology", "atom", "molecule", "gene", "dna",
            "entanglement", "evolution", "energy", "particle", "cell", "climate", "planet",
            "space", "galaxy", "universe", "science",
        ],
    ),
    (
        "technology",
        &[
            "software", "computer", "programming", "rust", "algorithm", "ai", "machine",
            "network", "internet", "database", "cloud", "robot", "technology", "code",
        ],
    ),
    (
        "health",
        &[
            "health", "disease", "medicine", "vaccine", "diet", "nutrition", "sleep",
            "exercise", "virus", "cancer", "mental",
        ],
    ),
    (
        "history",
        &[
            "history", "war", "empire", "ancient", "century", "revolution", "dynasty",
            "medieval", "civilization",
        ],
    ),
    (
        "art",
        &[
            "art", "painting", "music", "poetry", "literature", "sculpture", "film", "novel",
            "artist",
        ],
    ),
    (
        "business",
        &[
            "business", "economy", "market", "finance", "stock", "startup", "investment",
            "inflation", "company",
        ],
    ),
];

/// Returns the topic label for `question`, or `None` if no keyword matches.
pub fn categorize_question(question: &str) -> Option<&'static str> {
    let words: Vec<String> = question
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    TOPICS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(category, _)| *category)
}
