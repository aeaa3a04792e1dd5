//! WHOIS response parsing.
//!
//! Registry output is free text whose layout depends on the registry. Each
//! supported layout is a `ParseStrategy` made of field rules; the strategy is
//! picked from `STRATEGY_TABLE` by an exact, case-sensitive suffix match on the
//! domain. Adding a registry format means adding a variant, its rules, and a
//! table row.

use strum_macros::EnumIter;

use super::types::RegistrantRecord;

/// Registrant field a rule fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Organization,
    Country,
}

/// Lines containing `label` set `field` to the text after the first
/// `separator`, trimmed.
#[derive(Debug)]
struct FieldRule {
    label: &'static str,
    field: Field,
    separator: char,
}

const GENERIC_RULES: &[FieldRule] = &[
    FieldRule {
        label: "Registrant Name",
        field: Field::Name,
        separator: ':',
    },
    FieldRule {
        label: "Registrant Organization",
        field: Field::Organization,
        separator: ':',
    },
    FieldRule {
        label: "Registrant Country",
        field: Field::Country,
        separator: ':',
    },
];

// Traficom's fixed-width layout; it has no organization field
const FI_RULES: &[FieldRule] = &[
    FieldRule {
        label: "name...............:",
        field: Field::Name,
        separator: ':',
    },
    FieldRule {
        label: "country............:",
        field: Field::Country,
        separator: ':',
    },
];

// JPRS bracketed layout; it has no country field
const JP_RULES: &[FieldRule] = &[
    FieldRule {
        label: "[Registrant]",
        field: Field::Organization,
        separator: ']',
    },
    FieldRule {
        label: "[Name]",
        field: Field::Name,
        separator: ']',
    },
];

/// A registry output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ParseStrategy {
    /// `Registrant Name: ...` style (ICANN gTLDs and most ccTLDs)
    Generic,
    /// `.fi` fixed-width dotted labels
    Fi,
    /// `.jp` bracketed labels
    Jp,
}

/// Domain suffix to strategy. Anything unmatched is `Generic`.
const STRATEGY_TABLE: &[(&str, ParseStrategy)] =
    &[(".fi", ParseStrategy::Fi), (".jp", ParseStrategy::Jp)];

impl ParseStrategy {
    /// Picks the strategy for `domain` by exact suffix match.
    pub fn for_domain(domain: &str) -> Self {
        STRATEGY_TABLE
            .iter()
            .find(|(suffix, _)| domain.ends_with(suffix))
            .map(|(_, strategy)| *strategy)
            .unwrap_or(ParseStrategy::Generic)
    }

    fn rules(&self) -> &'static [FieldRule] {
        match self {
            ParseStrategy::Generic => GENERIC_RULES,
            ParseStrategy::Fi => FI_RULES,
            ParseStrategy::Jp => JP_RULES,
        }
    }

    /// Scrapes `raw` with this strategy's rules.
    ///
    /// The first rule whose label occurs on a line decides that line. When a
    /// label occurs on several lines (referral output repeats blocks), the
    /// last occurrence wins.
    pub fn parse(&self, raw: &str, domain: &str) -> RegistrantRecord {
        let mut record = RegistrantRecord::blank(domain);
        let rules = self.rules();

        for line in raw.lines() {
            let Some(rule) = rules.iter().find(|rule| line.contains(rule.label)) else {
                continue;
            };
            let value = line
                .split_once(rule.separator)
                .map(|(_, rest)| rest)
                .unwrap_or(line)
                .trim()
                .to_string();

            match rule.field {
                Field::Name => record.registrant_name = value,
                Field::Organization => record.registrant_organization = value,
                Field::Country => record.registrant_country = value,
            }
        }

        record
    }
}

/// Parses raw registry output for `domain` using the strategy its suffix selects.
///
/// Never fails: unrecognized or empty output yields a blank record.
pub fn parse(raw: &str, domain: &str) -> RegistrantRecord {
    ParseStrategy::for_domain(domain).parse(raw, domain)
}
