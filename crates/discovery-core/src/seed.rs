use discovery_common::{Strategy, StrategyOrigin};

/// Built-in seed strategies, loaded by `Orchestrator::initialize` when the
/// strategy store is empty.
pub fn seed_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(
            "site:{platform} planted.chicken {city}".to_string(),
            "lieferando.de".to_string(),
            "DE".to_string(),
            StrategyOrigin::Seed,
        ),
        Strategy::new(
            "site:{platform} \"planted\" vegan {city}".to_string(),
            "lieferando.de".to_string(),
            "DE".to_string(),
            StrategyOrigin::Seed,
        ),
        Strategy::new(
            "site:{platform} planted.chicken {city}".to_string(),
            "wolt.com".to_string(),
            "DE".to_string(),
            StrategyOrigin::Seed,
        ),
    ]
}

/// Default candidate cities per country, ordered by population/market size.
/// `explore` mode takes the first N (default 5).
pub fn default_cities(country: &str) -> Vec<String> {
    match country {
        "DE" => ["Berlin", "München", "Hamburg", "Köln", "Frankfurt"],
        "AT" => ["Wien", "Graz", "Linz", "Salzburg", "Innsbruck"],
        "CH" => ["Zürich", "Genf", "Basel", "Bern", "Lausanne"],
        _ => return Vec::new(),
    }
    .into_iter()
    .map(str::to_string)
    .collect()
}
