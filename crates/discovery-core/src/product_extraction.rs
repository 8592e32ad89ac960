/// Extract `planted.*` SKU tokens from text. Only text containing the exact
/// substring `planted` (case-insensitive) is considered; generic
/// "plant-based"/"vegan" mentions never qualify.
///
/// Priority within the chicken family: `chicken_tenders` beats
/// `chicken_burger` beats bare `chicken`. `burger` only resolves to
/// `planted.burger` if it didn't already resolve via `chicken_burger`.
pub fn extract_products(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    if !lower.contains("planted") {
        return Vec::new();
    }

    let mut skus = Vec::new();
    let mut chicken_burger_matched = false;

    if lower.contains("chicken_tenders") || lower.contains("chicken tenders") {
        skus.push("planted.chicken_tenders".to_string());
    }
    if lower.contains("chicken_burger") || lower.contains("chicken burger") {
        skus.push("planted.chicken_burger".to_string());
        chicken_burger_matched = true;
    }
    if !skus.iter().any(|s| s.starts_with("planted.chicken")) && lower.contains("chicken") {
        skus.push("planted.chicken".to_string());
    }

    for (needle, sku) in [
        ("kebab", "planted.kebab"),
        ("schnitzel", "planted.schnitzel"),
        ("pulled", "planted.pulled"),
        ("steak", "planted.steak"),
        ("pastrami", "planted.pastrami"),
        ("duck", "planted.duck"),
    ] {
        if lower.contains(needle) {
            skus.push(sku.to_string());
        }
    }

    if !chicken_burger_matched && lower.contains("burger") {
        skus.push("planted.burger".to_string());
    }

    skus.sort();
    skus.dedup();
    skus
}
