use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One assessed entity; a row of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Domain id -> risk token. Ordered so nothing downstream depends on hash order.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            annotation: None,
        }
    }

    pub fn with_value(mut self, domain: impl Into<String>, token: impl Into<String>) -> Self {
        self.values.insert(domain.into(), token.into());
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn value_for(&self, domain_id: &str) -> Option<&str> {
        self.values.get(domain_id).map(String::as_str)
    }

    /// Comment to show next to `domain_id`, read according to the declared shape.
    /// Returns `None` when there is no annotation or its shape disagrees with `shape`.
    pub fn comment_for(&self, shape: AnnotationShape, domain_id: &str) -> Option<&str> {
        match (shape, self.annotation.as_ref()?) {
            (AnnotationShape::PerDomain, Annotation::PerDomain(map)) => {
                map.get(domain_id).map(String::as_str)
            }
            _ => None,
        }
    }

    pub fn shared_comment(&self, shape: AnnotationShape) -> Option<&str> {
        match (shape, self.annotation.as_ref()?) {
            (AnnotationShape::Shared, Annotation::Shared(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn annotation_matches(&self, shape: AnnotationShape) -> bool {
        match &self.annotation {
            None => true,
            Some(annotation) => annotation.shape() == shape,
        }
    }
}

/// Free-text commentary attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Annotation {
    Shared(String),
    PerDomain(BTreeMap<String, String>),
}

impl Annotation {
    pub fn shape(&self) -> AnnotationShape {
        match self {
            Annotation::Shared(_) => AnnotationShape::Shared,
            Annotation::PerDomain(_) => AnnotationShape::PerDomain,
        }
    }
}

/// Which annotation shape the caller promises to supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationShape {
    #[default]
    Shared,
    PerDomain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl Domain {
    pub fn new(id: impl Into<String>, code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            label: label.into(),
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainSetError {
    #[error("domain id must not be empty")]
    EmptyId,
    #[error("duplicate domain id `{0}`")]
    DuplicateId(String),
}

/// Ordered set of assessment domains. Order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Domain>", into = "Vec<Domain>")]
pub struct DomainSet {
    domains: Vec<Domain>,
}

impl DomainSet {
    pub fn new(domains: Vec<Domain>) -> Result<Self, DomainSetError> {
        let mut seen = BTreeSet::new();
        for domain in &domains {
            if domain.id.trim().is_empty() {
                return Err(DomainSetError::EmptyId);
            }
            if !seen.insert(domain.id.as_str()) {
                return Err(DomainSetError::DuplicateId(domain.id.clone()));
            }
        }
        Ok(Self { domains })
    }

    /// The five RoB 2 domains, keyed `D1`..`D5`.
    pub fn rob2() -> Self {
        let domains = [
            ("Randomization process", "Bias arising from the randomization process"),
            (
                "Deviations from intended interventions",
                "Bias due to deviations from intended interventions",
            ),
            ("Missing outcome data", "Bias due to missing outcome data"),
            ("Measurement of the outcome", "Bias in measurement of the outcome"),
            (
                "Selection of the reported result",
                "Bias in selection of the reported result",
            ),
        ]
        .iter()
        .enumerate()
        .map(|(idx, (label, question))| {
            let code = format!("D{}", idx + 1);
            Domain::new(code.clone(), code, *label).with_question(*question)
        })
        .collect();
        Self { domains }
    }

    /// Generic `D1`..`Dn` domains labelled "Domain n".
    pub fn numbered(count: usize) -> Self {
        let domains = (1..=count)
            .map(|n| {
                let code = format!("D{n}");
                Domain::new(code.clone(), code, format!("Domain {n}"))
            })
            .collect();
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Domain> {
        self.domains.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a Domain;
    type IntoIter = std::slice::Iter<'a, Domain>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}

impl TryFrom<Vec<Domain>> for DomainSet {
    type Error = DomainSetError;

    fn try_from(domains: Vec<Domain>) -> Result<Self, Self::Error> {
        Self::new(domains)
    }
}

impl From<DomainSet> for Vec<Domain> {
    fn from(set: DomainSet) -> Self {
        set.domains
    }
}
