// src/services/extractor.rs

//! Vacancy extraction.
//!
//! Segments the listing page into district sections and keeps the lines
//! relevant to the configured age band. This is a heuristic over the page's
//! text, not a structural parse:
//!
//! 1. A district's section starts at the first text node containing
//!    "<prefix> <name>" (falling back to the bare name).
//! 2. Every element after that anchor, in document order, belongs to the
//!    section until one whose text contains any district's full anchor
//!    phrase.
//! 3. Lines inside the section are trimmed and kept if they contain an
//!    age marker.

use std::collections::BTreeSet;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::Result;
use crate::models::{ExtractionRules, Snapshot};
use crate::utils::{any_phrase_regex, contains_ci, phrase_regex};

/// Matchers for a single district.
#[derive(Debug, Clone)]
struct DistrictMatcher {
    name: String,
    anchor: Regex,
    bare: Regex,
}

/// Turns raw listing markup into a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SpotExtractor {
    districts: Vec<DistrictMatcher>,
    boundary: Regex,
    age_markers: Vec<String>,
}

/// Element text in document order, paired with the element's position.
struct ElementTexts<'a> {
    elements: Vec<ElementRef<'a>>,
    texts: Vec<String>,
}

impl<'a> ElementTexts<'a> {
    fn from_html(html: &'a Html) -> Self {
        let elements: Vec<ElementRef<'a>> = html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect();
        let texts = elements.iter().map(|e| e.text().collect()).collect();
        Self { elements, texts }
    }

    fn position(&self, element: &ElementRef<'a>) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == element.id())
    }
}

impl SpotExtractor {
    /// Build an extractor from a rule table.
    pub fn new(rules: &ExtractionRules) -> Result<Self> {
        let districts = rules
            .districts
            .iter()
            .map(|name| -> Result<DistrictMatcher> {
                Ok(DistrictMatcher {
                    name: name.clone(),
                    anchor: phrase_regex(&rules.anchor_phrase(name))?,
                    bare: phrase_regex(name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let phrases: Vec<String> = rules
            .districts
            .iter()
            .map(|name| rules.anchor_phrase(name))
            .collect();
        let boundary = any_phrase_regex(phrases.iter().map(String::as_str))?;

        let age_markers = rules
            .age_markers
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        Ok(Self {
            districts,
            boundary,
            age_markers,
        })
    }

    /// Extract the per-district snapshot from a document.
    ///
    /// Never fails: markup without recognizable anchors yields an empty
    /// snapshot.
    pub fn extract(&self, document: &str) -> Snapshot {
        let html = Html::parse_document(document);
        let page = ElementTexts::from_html(&html);
        let mut snapshot = Snapshot::new();

        for district in &self.districts {
            let Some(anchor) = Self::find_anchor(&html, district) else {
                log::debug!("No anchor found for {}", district.name);
                continue;
            };
            let Some(start) = page.position(&anchor) else {
                continue;
            };

            let spots = self.collect_section(&page.texts[start + 1..]);
            log::debug!("{}: {} matching line(s)", district.name, spots.len());
            snapshot.insert(district.name.clone(), spots);
        }

        snapshot
    }

    /// Whether a line is relevant to the target age band.
    pub fn is_relevant(&self, line: &str) -> bool {
        self.age_markers.iter().any(|marker| contains_ci(line, marker))
    }

    /// Parent element of the first text node naming the district.
    fn find_anchor<'a>(html: &'a Html, district: &DistrictMatcher) -> Option<ElementRef<'a>> {
        Self::first_text_match(html, &district.anchor)
            .or_else(|| Self::first_text_match(html, &district.bare))
    }

    fn first_text_match<'a>(html: &'a Html, pattern: &Regex) -> Option<ElementRef<'a>> {
        html.tree
            .root()
            .descendants()
            .filter(|node| {
                node.value()
                    .as_text()
                    .is_some_and(|text| pattern.is_match(text))
            })
            .find_map(|node| node.parent().and_then(ElementRef::wrap))
    }

    /// Walk element texts until the next district heading.
    fn collect_section(&self, texts: &[String]) -> BTreeSet<String> {
        let mut spots = BTreeSet::new();
        for text in texts {
            if self.boundary.is_match(text) {
                break;
            }
            for line in text.lines().map(str::trim) {
                if !line.is_empty() && self.is_relevant(line) {
                    spots.insert(line.to_string());
                }
            }
        }
        spots
    }
}

/// Extract a snapshot using the given rules.
pub fn extract(document: &str, rules: &ExtractionRules) -> Result<Snapshot> {
    Ok(SpotExtractor::new(rules)?.extract(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(districts: &[&str]) -> ExtractionRules {
        ExtractionRules {
            districts: districts.iter().map(|d| d.to_string()).collect(),
            ..ExtractionRules::default()
        }
    }

    fn extractor() -> SpotExtractor {
        SpotExtractor::new(&ExtractionRules::default()).unwrap()
    }

    const PAGE: &str = r#"
        <html><body>
          <h1>Ledige barnehageplasser</h1>
          <h2>Bydel Frogner</h2>
          <p>0-3 år: Eventyrskogen, 2 plasser</p>
          <p>3-6 år: Solsikken, 1 plass</p>
          <h2>Bydel Grünerløkka</h2>
          <p>1-3 år: Birkelunden, 1 plass</p>
          <h2>Bydel Sagene</h2>
          <p>Ingen ledige plasser</p>
        </body></html>
    "#;

    #[test]
    fn test_assigns_lines_to_their_district() {
        let snapshot = extractor().extract(PAGE);

        assert_eq!(
            snapshot.get("Frogner").unwrap().available_spots,
            vec!["0-3 år: Eventyrskogen, 2 plasser"]
        );
        assert_eq!(
            snapshot.get("Grünerløkka").unwrap().available_spots,
            vec!["1-3 år: Birkelunden, 1 plass"]
        );
    }

    #[test]
    fn test_omits_district_without_matching_lines() {
        let snapshot = extractor().extract(PAGE);
        assert!(!snapshot.contains("Sagene"));
        assert!(!snapshot.contains("Alna"));
        assert_eq!(snapshot.district_count(), 2);
    }

    #[test]
    fn test_is_deterministic() {
        let extractor = extractor();
        let first = extractor.extract(PAGE);
        let second = extractor.extract(PAGE);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_dedups_and_sorts_lines() {
        let page = r#"
            <h2>Bydel Alna</h2>
            <ul>
              <li>Småbarn: Trollskogen, 1 plass</li>
              <li>0-3 år: Bjørnehiet, 3 plasser</li>
            </ul>
            <div>0-3 år: Bjørnehiet, 3 plasser</div>
        "#;
        let snapshot = extractor().extract(page);
        assert_eq!(
            snapshot.get("Alna").unwrap().available_spots,
            vec![
                "0-3 år: Bjørnehiet, 3 plasser",
                "Småbarn: Trollskogen, 1 plass",
            ]
        );
    }

    #[test]
    fn test_splits_multiline_text_and_filters_each_line() {
        let page = "<h2>Bydel Ullern</h2><pre>0-3 år: Lia, 1 plass\n3-6 år: Haugen, 2 plasser\n  Under 3 år: Bakken  \n</pre>";
        let snapshot = extractor().extract(page);
        assert_eq!(
            snapshot.get("Ullern").unwrap().available_spots,
            vec!["0-3 år: Lia, 1 plass", "Under 3 år: Bakken"]
        );
    }

    #[test]
    fn test_anchor_match_is_case_insensitive() {
        let page = "<h3>BYDEL STOVNER</h3><p>0-3 år: Rommen, 1 plass</p>";
        let snapshot = extractor().extract(page);
        assert!(snapshot.contains("Stovner"));
    }

    #[test]
    fn test_falls_back_to_bare_district_name() {
        let page = "<h3>Stovner</h3><p>0-3 år: Rommen, 1 plass</p><h3>Bydel Alna</h3><p>0-3 år: Furuset</p>";
        let snapshot = extractor().extract(page);
        assert_eq!(
            snapshot.get("Stovner").unwrap().available_spots,
            vec!["0-3 år: Rommen, 1 plass"]
        );
    }

    #[test]
    fn test_substring_district_names_do_not_cut_sections() {
        // "Nordstrand" is a substring of "Søndre Nordstrand", but only the
        // full "Bydel Nordstrand" phrase starts its section.
        let page = r#"
            <h2>Bydel Søndre Nordstrand</h2>
            <p>0-3 år: Mortensrud, 1 plass</p>
            <p>Nær Nordstrand: 0-3 år: Holmlia, 2 plasser</p>
            <h2>Bydel Nordstrand</h2>
            <p>0-3 år: Ljan, 1 plass</p>
        "#;
        let snapshot = extractor().extract(page);
        assert_eq!(
            snapshot.get("Søndre Nordstrand").unwrap().available_spots,
            vec![
                "0-3 år: Mortensrud, 1 plass",
                "Nær Nordstrand: 0-3 år: Holmlia, 2 plasser",
            ]
        );
        assert_eq!(
            snapshot.get("Nordstrand").unwrap().available_spots,
            vec!["0-3 år: Ljan, 1 plass"]
        );
    }

    #[test]
    fn test_only_first_anchor_is_used() {
        let page = r#"
            <h2>Bydel Bjerke</h2>
            <p>0-3 år: Veitvet, 1 plass</p>
            <h2>Bydel Grorud</h2>
            <p>Se også Bydel Bjerke</p>
            <p>0-3 år: Ammerud, 1 plass</p>
        "#;
        let snapshot = extractor().extract(page);
        assert_eq!(
            snapshot.get("Bjerke").unwrap().available_spots,
            vec!["0-3 år: Veitvet, 1 plass"]
        );
    }

    #[test]
    fn test_empty_and_unrelated_documents_yield_empty_snapshot() {
        let extractor = extractor();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("<p>Ingen bydeler her</p>").is_empty());
        assert!(extractor.extract("<<<not html").is_empty());
    }

    #[test]
    fn test_every_spot_contains_an_age_marker() {
        let extractor = extractor();
        let snapshot = extractor.extract(PAGE);
        for (_, spots) in snapshot.iter() {
            for spot in &spots.available_spots {
                assert!(extractor.is_relevant(spot), "unexpected spot: {spot}");
            }
        }
    }

    #[test]
    fn test_age_markers_match_any_case() {
        let extractor = extractor();
        assert!(extractor.is_relevant("SMÅBARN: Tåsen, 1 plass"));
        assert!(extractor.is_relevant("Barn Under 3 år"));
        assert!(!extractor.is_relevant("3-6 år: Haugen"));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExtractionRules {
            district_marker_prefix: "District".to_string(),
            age_markers: vec!["toddler".to_string()],
            districts: vec!["North".to_string(), "South".to_string()],
        };
        let page = "<h2>District North</h2><p>Toddler room, 1 spot</p><p>0-3 spots</p><h2>District South</h2><p>toddler: Oak, 2</p>";
        let snapshot = extract(page, &rules).unwrap();
        assert_eq!(
            snapshot.get("North").unwrap().available_spots,
            vec!["Toddler room, 1 spot"]
        );
        assert_eq!(
            snapshot.get("South").unwrap().available_spots,
            vec!["toddler: Oak, 2"]
        );
    }

    #[test]
    fn test_district_order_does_not_change_result() {
        let forward = extract(PAGE, &rules(&["Frogner", "Grünerløkka", "Sagene"])).unwrap();
        let reverse = extract(PAGE, &rules(&["Sagene", "Grünerløkka", "Frogner"])).unwrap();
        assert_eq!(forward, reverse);
    }
}
