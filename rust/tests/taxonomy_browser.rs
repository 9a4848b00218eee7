//! Faceted search over the built-in taxonomy

use intervention_taxonomy::taxonomy::citation_for;
use intervention_taxonomy::{Facet, TaxonomyCatalog, TaxonomyQuery};

fn catalog() -> TaxonomyCatalog {
    TaxonomyCatalog::builtin().expect("built-in taxonomy parses")
}

#[test]
fn test_search_matches_exactly_the_containing_entries() {
    let catalog = catalog();
    for term in ["label", "COMMENT", "misinformation", "report", "zzz-not-there"] {
        let needle = term.to_lowercase();
        let expected: Vec<&str> = catalog
            .entries()
            .iter()
            .filter(|e| {
                [&e.intervention_type, &e.description, &e.considerations, &e.tradeoffs]
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
            })
            .map(|e| e.intervention_type.as_str())
            .collect();

        let actual: Vec<&str> = catalog
            .filter(&TaxonomyQuery::new().with_search(term))
            .iter()
            .map(|e| e.intervention_type.as_str())
            .collect();
        assert_eq!(actual, expected, "search {term:?}");
    }
}

#[test]
fn test_search_combines_with_facets() {
    let catalog = catalog();
    let query = TaxonomyQuery::new()
        .with_search("label")
        .with_filter(Facet::Scope, "Systemic");

    let types: Vec<&str> = catalog
        .filter(&query)
        .iter()
        .map(|e| e.intervention_type.as_str())
        .collect();
    assert_eq!(types, vec!["Sponsor Labels", "Keyword Flagging"]);
}

#[test]
fn test_entries_without_platform_drop_out_under_platform_filter() {
    let catalog = catalog();
    let no_platform: Vec<&str> = catalog
        .entries()
        .iter()
        .filter(|e| e.platforms().next().is_none())
        .map(|e| e.intervention_type.as_str())
        .collect();
    assert_eq!(no_platform.len(), 4);

    let mut query = TaxonomyQuery::new();
    for platform in &catalog.facet_options()[&Facet::Platform] {
        query.toggle(Facet::Platform, platform.clone(), true);
    }
    let hits = catalog.filter(&query);

    assert_eq!(hits.len(), catalog.len() - no_platform.len());
    assert!(hits
        .iter()
        .all(|e| !no_platform.contains(&e.intervention_type.as_str())));
}

#[test]
fn test_every_reference_gets_a_citation() {
    let catalog = catalog();
    let mut total = 0;
    for entry in catalog.entries() {
        for reference in entry.reference_list() {
            assert!(reference.url.starts_with("http"), "{}", reference.url);
            assert_eq!(reference.citation, citation_for(&reference.url));
            total += 1;
        }
    }
    assert!(total > 0);
}
