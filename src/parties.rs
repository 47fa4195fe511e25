use std::collections::HashMap;

/// Label used when a party code or roster matricule has no entry.
pub const FALLBACK_LABEL: &str = "reference not found";

// Political group organe codes of the 16th legislature, as they appear in
// the amendment documents' `groupePolitiqueRef` field.
const PARTY_GROUPS: &[(&str, &str)] = &[
    ("PO800484", "Rassemblement National"),
    ("PO800490", "La France insoumise - NUPES"),
    ("PO800496", "Socialistes et apparentés"),
    ("PO800502", "Écologiste - NUPES"),
    ("PO800508", "Gauche démocrate et républicaine - NUPES"),
    ("PO800514", "Renaissance"),
    ("PO800520", "Démocrate (MoDem et Indépendants)"),
    ("PO800526", "Horizons et apparentés"),
    ("PO800532", "Les Républicains"),
    ("PO800538", "Libertés, Indépendants, Outre-mer et Territoires"),
    ("PO793087", "Députés non inscrits"),
];

/// Build the party lookup once at startup; read-only thereafter.
pub fn party_table() -> HashMap<&'static str, &'static str> {
    PARTY_GROUPS.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        let table = party_table();
        assert_eq!(table.get("PO800514"), Some(&"Renaissance"));
        assert_eq!(table.len(), PARTY_GROUPS.len());
    }
}
