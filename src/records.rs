//! Loading item records exported by the data store (JSON or JSON5).

use crate::ir::{Annotation, Domain, DomainSet, Item};
use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Records {
    /// Domain set embedded in the file, if any.
    pub domains: Option<DomainSet>,
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecords {
    Items(Vec<RawItem>),
    Document {
        #[serde(default)]
        domains: Option<Vec<Domain>>,
        items: Vec<RawItem>,
    },
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: String,
    #[serde(default)]
    values: Option<RawValues>,
    #[serde(default, alias = "comments")]
    annotation: Option<RawAnnotation>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValues {
    Map(BTreeMap<String, String>),
    /// Tokens aligned with domain order.
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAnnotation {
    Text(String),
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

/// Parses a records file. List-shaped `values`/`comments` are matched to the file's
/// own domains when present, otherwise to `default_domains`.
pub fn parse_records(input: &str, default_domains: &DomainSet) -> Result<Records> {
    parse_with(input, default_domains, false)
}

/// Like [`parse_records`], but list-shaped values always follow `domains`, even
/// when the file embeds its own set. The embedded set is still returned.
pub fn parse_records_for(input: &str, domains: &DomainSet) -> Result<Records> {
    parse_with(input, domains, true)
}

fn parse_with(input: &str, default_domains: &DomainSet, forced: bool) -> Result<Records> {
    let raw: RawRecords = json5::from_str(input).map_err(|err| anyhow!("invalid records: {err}"))?;
    let (domains, raw_items) = match raw {
        RawRecords::Items(items) => (None, items),
        RawRecords::Document { domains, items } => {
            (domains.map(DomainSet::new).transpose()?, items)
        }
    };
    let active = match &domains {
        Some(embedded) if !forced => embedded,
        _ => default_domains,
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (idx, raw) in raw_items.into_iter().enumerate() {
        if raw.name.trim().is_empty() {
            bail!("record {idx} has an empty name");
        }
        let values = match raw.values {
            None => BTreeMap::new(),
            Some(RawValues::Map(map)) => map,
            Some(RawValues::List(list)) => zip_domains(idx, "values", list, active)?,
        };
        let annotation = match raw.annotation {
            None => None,
            Some(RawAnnotation::Text(text)) if text.trim().is_empty() => None,
            Some(RawAnnotation::Text(text)) => Some(Annotation::Shared(text)),
            Some(RawAnnotation::Map(map)) => Some(Annotation::PerDomain(map)),
            Some(RawAnnotation::List(list)) => Some(Annotation::PerDomain(zip_domains(
                idx, "comments", list, active,
            )?)),
        };
        items.push(Item {
            name: raw.name,
            values,
            annotation,
        });
    }

    Ok(Records { domains, items })
}

fn zip_domains(
    idx: usize,
    field: &str,
    list: Vec<String>,
    domains: &DomainSet,
) -> Result<BTreeMap<String, String>> {
    if list.len() > domains.len() {
        bail!(
            "record {idx}: {} {field} given for {} domains",
            list.len(),
            domains.len()
        );
    }
    Ok(domains
        .iter()
        .zip(list)
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(domain, value)| (domain.id.clone(), value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_with_value_maps() {
        let records = parse_records(
            r#"[{ "name": "Trial A", "values": { "D1": "low", "D2": "high" }, "comments": "ok" }]"#,
            &DomainSet::rob2(),
        )
        .unwrap();
        assert!(records.domains.is_none());
        let item = &records.items[0];
        assert_eq!(item.value_for("D2"), Some("high"));
        assert_eq!(item.annotation, Some(Annotation::Shared("ok".into())));
    }

    #[test]
    fn list_values_follow_domain_order() {
        let records = parse_records(
            r#"// exported from the project list
            [{ name: 'Trial B', values: ['low', 'some', '', 'high'], comments: ['', 'late'] }]"#,
            &DomainSet::rob2(),
        )
        .unwrap();
        let item = &records.items[0];
        assert_eq!(item.value_for("D1"), Some("low"));
        assert_eq!(item.value_for("D2"), Some("some"));
        assert_eq!(item.value_for("D3"), None);
        assert_eq!(item.value_for("D4"), Some("high"));
        match &item.annotation {
            Some(Annotation::PerDomain(map)) => {
                assert_eq!(map.get("D2").map(String::as_str), Some("late"));
                assert_eq!(map.len(), 1);
            }
            other => panic!("unexpected annotation {other:?}"),
        }
    }

    #[test]
    fn embedded_domains_take_precedence() {
        let records = parse_records(
            r#"{
                "domains": [
                    { "id": "conf", "code": "C", "label": "Confounding" },
                    { "id": "sel", "code": "S", "label": "Selection" }
                ],
                "items": [{ "name": "Cohort", "values": ["serious", "low"] }]
            }"#,
            &DomainSet::rob2(),
        )
        .unwrap();
        assert_eq!(records.domains.as_ref().map(DomainSet::len), Some(2));
        assert_eq!(records.items[0].value_for("sel"), Some("low"));
    }

    #[test]
    fn too_many_list_values_is_rejected() {
        let err = parse_records(
            r#"[{ "name": "T", "values": ["low", "low", "low"] }]"#,
            &DomainSet::numbered(2),
        )
        .unwrap_err();
        assert!(err.to_string().contains("3 values given for 2 domains"));
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(parse_records(r#"[{ "name": "  " }]"#, &DomainSet::rob2()).is_err());
    }

    #[test]
    fn empty_list_is_valid() {
        let records = parse_records("[]", &DomainSet::rob2()).unwrap();
        assert!(records.items.is_empty());
    }

    #[test]
    fn forced_domains_override_embedded_ones() {
        let input = r#"{
            "domains": [
                { "id": "conf", "code": "C", "label": "Confounding" },
                { "id": "sel", "code": "S", "label": "Selection" }
            ],
            "items": [{ "name": "Cohort", "values": ["serious", "low", "moderate"] }]
        }"#;
        assert!(parse_records(input, &DomainSet::numbered(3)).is_err());

        let records = parse_records_for(input, &DomainSet::numbered(3)).unwrap();
        assert_eq!(records.domains.as_ref().map(DomainSet::len), Some(2));
        assert_eq!(records.items[0].value_for("D1"), Some("serious"));
        assert_eq!(records.items[0].value_for("D3"), Some("moderate"));
        assert_eq!(records.items[0].value_for("conf"), None);
    }
}
