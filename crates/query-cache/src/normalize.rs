use md5::{Digest, Md5};

/// Lowercase, trim, split on whitespace, sort tokens, rejoin with single
/// spaces. `"Planted Chicken Berlin"` and `"berlin PLANTED  chicken"`
/// normalize to the same string by design.
pub fn normalize(query: &str) -> String {
    let mut tokens: Vec<&str> = query.split_whitespace().collect();
    let lowered: Vec<String> = tokens.drain(..).map(|t| t.to_lowercase()).collect();
    let mut lowered = lowered;
    lowered.sort();
    lowered.join(" ")
}

/// Hash the normalized query into a stable 128-bit hex key.
pub fn query_hash(query: &str) -> String {
    let normalized = normalize(query);
    let digest = Md5::digest(normalized.as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_order_insensitive() {
        assert_eq!(
            normalize("Planted Chicken Berlin"),
            normalize("berlin PLANTED  chicken")
        );
    }

    #[test]
    fn idempotent() {
        let q = "  Planted   Berlin ";
        assert_eq!(normalize(&normalize(q)), normalize(q));
    }

    #[test]
    fn hash_collides_for_permutations() {
        assert_eq!(query_hash("A B"), query_hash("b a"));
    }
}
