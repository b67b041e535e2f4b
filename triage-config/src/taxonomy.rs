// triage-config/src/taxonomy.rs
// Keyword sets shared by the fallback classifier and urgency scorer

/// Billing-category keywords, matched as case-insensitive substrings
pub const BILLING_KEYWORDS: &[&str] = &[
    "invoice",
    "payment",
    "charge",
    "refund",
    "billing",
    "subscription",
    "receipt",
    "overcharged",
    "price",
    "transaction",
    "credit card",
    "debit",
];

/// Technical-category keywords
pub const TECHNICAL_KEYWORDS: &[&str] = &[
    "bug",
    "error",
    "crash",
    "broken",
    "not working",
    "login",
    "500",
    "timeout",
    "slow",
    "outage",
    "down",
    "failed",
    "integration",
    "api",
    "server",
    "null",
    "exception",
];

/// Legal-category keywords
pub const LEGAL_KEYWORDS: &[&str] = &[
    "lawsuit",
    "legal",
    "compliance",
    "gdpr",
    "terms of service",
    "privacy",
    "attorney",
    "court",
    "contract",
    "violation",
    "copyright",
    "liability",
    "breach",
];

/// Phrases that raise the keyword urgency score
pub const URGENCY_FLAGS: &[&str] = &[
    "asap",
    "urgent",
    "immediately",
    "critical",
    "emergency",
    "broken",
    "down",
    "not working",
    "losing money",
    "production",
    "outage",
    "right now",
    "as soon as possible",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_sets_are_lowercase() {
        for set in [
            BILLING_KEYWORDS,
            TECHNICAL_KEYWORDS,
            LEGAL_KEYWORDS,
            URGENCY_FLAGS,
        ] {
            for kw in set {
                assert_eq!(*kw, kw.to_lowercase(), "matcher assumes lowercase: {kw}");
            }
        }
    }
}
