// 🌍 Country Code Resolver
// Static country name → ISO 3166-1 alpha-2 mapping for GDN spend exports

use std::collections::HashMap;

/// Name → code pairs as they appear in GDN geographic reports.
///
/// Exact display names, not aliases: "Czechia" maps, "Czech Republic"
/// does not. Unmapped names resolve to None downstream, never an error.
const BUILTIN_COUNTRIES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("United Kingdom", "GB"),
    ("South Korea", "KR"),
    ("Taiwan", "TW"),
    ("Russia", "RU"),
    ("Turkey", "TR"),
    ("Iran", "IR"),
    ("Vietnam", "VN"),
    ("Syria", "SY"),
    ("Czechia", "CZ"),
    ("Caribbean Netherlands", "BQ"),
    ("French Polynesia", "PF"),
    ("Saint Kitts and Nevis", "KN"),
    ("Saint Lucia", "LC"),
    ("Saint Vincent and the Grenadines", "VC"),
    ("U.S. Virgin Islands", "VI"),
    ("Sao Tome and Principe", "ST"),
    ("Puerto Rico", "PR"),
    ("Guam", "GU"),
    ("Micronesia", "FM"),
    ("Eritrea", "ER"),
    ("Fiji", "FJ"),
    ("Comoros", "KM"),
    ("Mauritius", "MU"),
    ("Seychelles", "SC"),
    ("Sudan", "SD"),
    ("Vanuatu", "VU"),
    ("Argentina", "AR"),
    ("Australia", "AU"),
    ("Austria", "AT"),
    ("Belgium", "BE"),
    ("Brazil", "BR"),
    ("Bulgaria", "BG"),
    ("Canada", "CA"),
    ("China", "CN"),
    ("Colombia", "CO"),
    ("Denmark", "DK"),
    ("Ecuador", "EC"),
    ("Egypt", "EG"),
    ("Estonia", "EE"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Greece", "GR"),
    ("Hong Kong", "HK"),
    ("Hungary", "HU"),
    ("Iceland", "IS"),
    ("India", "IN"),
    ("Indonesia", "ID"),
    ("Ireland", "IE"),
    ("Israel", "IL"),
    ("Italy", "IT"),
    ("Japan", "JP"),
    ("Jordan", "JO"),
    ("Latvia", "LV"),
    ("Lithuania", "LT"),
    ("Malaysia", "MY"),
    ("Mexico", "MX"),
    ("Netherlands", "NL"),
    ("New Zealand", "NZ"),
    ("Norway", "NO"),
    ("Philippines", "PH"),
    ("Poland", "PL"),
    ("Portugal", "PT"),
    ("Romania", "RO"),
    ("Saudi Arabia", "SA"),
    ("Singapore", "SG"),
    ("Slovakia", "SK"),
    ("Slovenia", "SI"),
    ("South Africa", "ZA"),
    ("Spain", "ES"),
    ("Sweden", "SE"),
    ("Switzerland", "CH"),
    ("Thailand", "TH"),
    ("United Arab Emirates", "AE"),
    ("Uruguay", "UY"),
];

/// CountryResolver - Immutable country name → code lookup
///
/// Built once and injected into the spend normalizer, so tests can
/// substitute a smaller table without touching process-wide state.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    mapping: HashMap<String, String>,
}

impl CountryResolver {
    /// Resolver over the built-in GDN country table (~80 countries)
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_COUNTRIES.iter().copied())
    }

    /// Resolver over an arbitrary set of (name, code) pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mapping = pairs
            .into_iter()
            .map(|(name, code)| (name.to_string(), code.to_string()))
            .collect();
        CountryResolver { mapping }
    }

    /// Resolve a country name to its two-letter code
    ///
    /// Case-sensitive exact match. Returns None for unmapped names —
    /// the caller keeps the row and carries the missing code forward.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.mapping.get(name).map(|code| code.as_str())
    }

    /// Number of mapped countries
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
