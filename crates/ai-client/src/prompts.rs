//! System prompt and per-operation user-prompt templates, shared across
//! providers. Templates use `{name}` placeholders filled by simple
//! substitution — see `fill`.

pub const MAX_PAGE_CONTENT_CHARS: usize = 10_000;

/// Shared system prompt. The brand-name-not-generic-label rule and the
/// JSON-only requirement are contracts every operation's output depends on.
pub const SYSTEM_PROMPT: &str = "\
You are part of a discovery pipeline that finds restaurants serving a \
specific plant-based meat BRAND called \"planted\". This is a brand name, \
not a generic category label: generic \"plant-based\" or \"vegan\" mentions \
that do not contain the literal substring \"planted\" do NOT count as \
evidence of the brand. Reject them.

Respond with JSON only. Do not include prose, explanations, or markdown \
formatting outside of the JSON object itself.";

pub const GENERATE_QUERIES_TEMPLATE: &str = "\
Generate search queries to find restaurants serving the \"planted\" brand \
on {platform} in {country}. Candidate cities: {cities}.

Return JSON: {{\"queries\": [{{\"query\": str, \"reasoning\": str, \
\"expected_results\": str, \"confidence\": 0-100}}]}}.";

pub const PARSE_SEARCH_RESULTS_TEMPLATE: &str = "\
Query: {query}\nPlatform: {platform}\n\nSearch results:\n{results}\n\n\
Extract venues that genuinely serve the \"planted\" brand (not generic \
plant-based/vegan food). For each venue capture its name, delivery \
platform links, city/country if determinable, and any text snippets that \
mention \"planted\" verbatim (planted_mentions). Also flag any detected \
restaurant chains that warrant further enumeration (should_enumerate).

Return JSON: {{\"venues\": [...], \"chains_detected\": [{{\"name\": str, \
\"should_enumerate\": bool}}], \"quality_assessment\": str}}.";

pub const ANALYZE_VENUE_TEMPLATE: &str = "\
Venue: {name}\nURL: {url}\nPlatform: {platform}\n\nPage content (truncated \
to {max_chars} characters):\n{page_content}\n\n\
Extract every dish that contains the \"planted\" brand. For each dish \
capture name, description, price, currency (ISO code), the specific \
planted.* product it uses, whether it is vegan, and your confidence \
(0-100).

Return JSON: {{\"dishes\": [{{\"name\": str, \"description\": str, \
\"price\": number|null, \"currency\": str, \"planted_product\": str|null, \
\"is_vegan\": bool, \"confidence\": 0-100}}]}}.";

pub const DETECT_CHAIN_TEMPLATE: &str = "\
Name: {name}\nPlatform: {platform}\n\nSearch results:\n{results}\n\n\
Determine whether this venue is part of a restaurant chain group.

Return JSON: {{\"is_chain\": bool, \"confidence\": 0-100, \"reasoning\": \
str}}.";

pub const LEARN_FROM_FEEDBACK_TEMPLATE: &str = "\
Recent search feedback:\n{feedback}\n\nCurrent strategies:\n{strategies}\n\n\
Propose which strategies to deprecate (and why) or boost, and propose new \
high-precision query strategies based on what has been working.

Return JSON: {{\"strategy_updates\": [{{\"strategy_id\": str, \"action\": \
\"deprecate\"|\"boost\", \"reason\": str}}], \"new_strategies\": \
[{{\"template\": str, \"platform\": str, \"country\": str}}], \"insights\": \
[str]}}.";

pub const SCORE_CONFIDENCE_TEMPLATE: &str = "\
Venue: {venue}\nDiscovery query: {query}\nStrategy success rate so far: \
{strategy_rate}%.

Score how confident you are that this venue genuinely serves the \
\"planted\" brand, 0-100, and list the factors behind the score.

Return JSON: {{\"overall_score\": 0-100, \"factors\": [{{\"factor\": str, \
\"score\": 0-100, \"reason\": str}}], \"recommendation\": str}}.";

/// Fill `{name}` placeholders in `template` from `pairs`. Unmatched
/// placeholders are left untouched.
pub fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in pairs {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders() {
        let filled = fill("hello {name}, you are {age}", &[("name", "ada"), ("age", "36")]);
        assert_eq!(filled, "hello ada, you are 36");
    }

    #[test]
    fn leaves_unmatched_placeholders() {
        let filled = fill("hello {name}", &[("other", "x")]);
        assert_eq!(filled, "hello {name}");
    }
}
