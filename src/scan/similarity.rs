//! Similarity Scorer
//!
//! String distance primitives and the composite score between a spine's OCR
//! text and a candidate book's title and authors.
//!
//! Lengths are measured in Unicode scalar values, matching how
//! `strsim::levenshtein` walks its inputs.

/// Weight of the title similarity in the composite score
pub const TITLE_WEIGHT: f64 = 0.7;
/// Weight of the author detection signal in the composite score
pub const AUTHOR_WEIGHT: f64 = 0.3;

/// Author name parts shorter than this are ignored
const MIN_AUTHOR_PART_LEN: usize = 3;
/// Cheap pre-filter an author part must clear before it is checked
const AUTHOR_PREFILTER_SIMILARITY: f64 = 0.3;
/// Similarity above which an author part counts as detected
const AUTHOR_MATCH_SIMILARITY: f64 = 0.8;

/// Levenshtein distance with unit costs, case-sensitive
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `1 - distance / max_len`, or 1.0 when both strings are empty
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Lowercase, keep only `[a-z0-9]` and whitespace, trim
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Composite confidence that `cluster_text` shows the given book, rounded to 3 decimals
pub fn score_match<S: AsRef<str>>(cluster_text: &str, book_title: &str, book_authors: &[S]) -> f64 {
    let cluster = normalize_text(cluster_text);
    let title = normalize_text(book_title);

    let title_score = normalized_similarity(&cluster, &title);
    let author_score = if book_authors
        .iter()
        .any(|author| author_detected(&cluster, author.as_ref()))
    {
        1.0
    } else {
        0.0
    };

    let score = title_score * TITLE_WEIGHT + author_score * AUTHOR_WEIGHT;
    round3(score * length_penalty(cluster.chars().count()))
}

/// Binary author signal: any name part found in the cluster text
fn author_detected(cluster: &str, author: &str) -> bool {
    let author = normalize_text(author);
    author
        .split_whitespace()
        .filter(|part| part.chars().count() >= MIN_AUTHOR_PART_LEN)
        .filter(|part| normalized_similarity(cluster, part) > AUTHOR_PREFILTER_SIMILARITY)
        .any(|part| {
            cluster.contains(part) || normalized_similarity(cluster, part) > AUTHOR_MATCH_SIMILARITY
        })
}

/// Penalty for near-empty OCR clusters
fn length_penalty(cluster_len: usize) -> f64 {
    if cluster_len < 4 {
        0.5
    } else if cluster_len < 8 {
        0.8
    } else {
        1.0
    }
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_AUTHORS: [&str; 0] = [];

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("Dune", "dune"), 1);
    }

    #[test]
    fn test_normalized_similarity_bounds() {
        assert_eq!(normalized_similarity("", ""), 1.0);
        assert_eq!(normalized_similarity("abc", "abc"), 1.0);
        assert_eq!(normalized_similarity("abc", "xyz"), 0.0);
        assert_eq!(normalized_similarity("", "abc"), 0.0);
    }

    #[test]
    fn test_normalized_similarity_symmetric() {
        let pairs = [
            ("kitten", "sitting"),
            ("dune frank herbert", "dune"),
            ("the hobbit", "hobbit the"),
            ("a", ""),
        ];
        for (a, b) in pairs {
            let forward = normalized_similarity(a, b);
            assert_eq!(forward, normalized_similarity(b, a));
            assert!((0.0..=1.0).contains(&forward));
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  The Great-Gatsby! "), "the greatgatsby");
        assert_eq!(normalize_text("Café 451"), "caf 451");
        assert_eq!(normalize_text("..."), "");
    }

    #[test]
    fn test_exact_title_without_authors() {
        let score = score_match("the great gatsby", "The Great Gatsby", &NO_AUTHORS);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_short_cluster_penalties() {
        let score = score_match("dog", "dog", &NO_AUTHORS);
        assert!((score - 0.35).abs() < 1e-9);

        // 5 chars falls in the 0.8 band
        let score = score_match("hobit", "hobit", &NO_AUTHORS);
        assert!((score - 0.56).abs() < 1e-9);
    }

    #[test]
    fn test_title_and_author() {
        let score = score_match("The Great Gatsby Fitzgerald", "The Great Gatsby", &["F. Scott Fitzgerald"]);
        // title: 1 - 11/27, author detected
        assert!((score - 0.715).abs() < 1e-9);
    }

    #[test]
    fn test_author_part_in_longer_cluster() {
        // "herbert" vs the whole cluster: 1 - 11/18 clears the gate
        let score = score_match("Dune Frank Herbert", "Dune", &["Frank Herbert"]);
        assert!((score - 0.456).abs() < 1e-9);
    }

    #[test]
    fn test_author_gate_uses_whole_cluster() {
        // "tolkien" is a cluster word, but only 7/29 similar to the whole text
        let score = score_match(
            "The Lord of the Rings Tolkien",
            "The Lord of the Rings",
            &["J. R. R. Tolkien"],
        );
        assert!((score - 0.507).abs() < 1e-9);
    }

    #[test]
    fn test_author_fuzzy_match() {
        // "herbrt" vs "herbert": similarity 6/7 > 0.8, no substring hit
        let score = score_match("herbrt", "Dune", &["Frank Herbert"]);
        assert!((score - 0.24).abs() < 1e-9);
    }

    #[test]
    fn test_short_author_parts_ignored() {
        let with_initials = score_match("jk the casual vacancy", "The Casual Vacancy", &["J K"]);
        let without = score_match("jk the casual vacancy", "The Casual Vacancy", &NO_AUTHORS);
        assert_eq!(with_initials, without);
    }

    #[test]
    fn test_author_signal_is_binary() {
        let one = score_match("dune frank herbert", "Dune", &["Frank Herbert"]);
        let two = score_match("dune frank herbert", "Dune", &["Frank Herbert", "Brian Herbert"]);
        assert_eq!(one, two);
    }

    #[test]
    fn test_score_rounded_to_three_decimals() {
        let score = score_match("dune messiah", "Dune", &NO_AUTHORS);
        assert_eq!(score, round3(score));
        assert!((0.0..=1.0).contains(&score));
    }
}
