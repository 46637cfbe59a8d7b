use {
    crate::MassError,
    std::collections::BTreeSet,
    std::fmt,
};

/// A single named proposition within a [`FrameOfDiscernment`].
///
/// Hypotheses are compared, hashed, and ordered by name and are immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hypothesis(String);

impl Hypothesis {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Hypothesis {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Hypothesis {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// The fixed universe of mutually exclusive hypotheses under consideration.
///
/// A frame is created once per problem configuration and is read-only
/// afterwards. It defines the universal element, the subset containing every
/// hypothesis, which represents total ignorance. Distributions may only be
/// combined when their sources share the same frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOfDiscernment {
    hypotheses: Vec<Hypothesis>,
}

impl FrameOfDiscernment {
    /// Builds a frame from hypothesis names, dropping duplicates while keeping
    /// first-occurrence order.
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut seen: BTreeSet<Hypothesis> = BTreeSet::new();
        let mut hypotheses = Vec::new();
        for name in names {
            let hypothesis = Hypothesis::new(name);
            if seen.insert(hypothesis.clone()) {
                hypotheses.push(hypothesis);
            }
        }
        Self { hypotheses }
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    pub fn contains(&self, hypothesis: &Hypothesis) -> bool {
        self.hypotheses.contains(hypothesis)
    }

    /// The element containing every hypothesis in the frame.
    pub fn universal_element(&self) -> Element {
        Element::new(self.hypotheses.iter().cloned())
    }

    /// Builds a frame-checked [`Element`] from hypothesis names.
    ///
    /// Returns [`MassError::MalformedFrame`] if any name does not belong to the
    /// frame, or [`MassError::EmptyElement`] if no names are supplied.
    pub fn element<I, N>(&self, names: I) -> Result<Element, MassError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let element = Element::new(names.into_iter().map(Hypothesis::new));
        if element.is_empty() {
            return Err(MassError::EmptyElement);
        }
        for hypothesis in element.hypotheses() {
            if !self.contains(hypothesis) {
                return Err(MassError::MalformedFrame(hypothesis.name().to_string()));
            }
        }
        Ok(element)
    }
}

/// A member of the power set of a [`FrameOfDiscernment`]: a duplicate-free
/// subset of its hypotheses. An element with mass assigned to it is a focal
/// element.
///
/// Hypotheses are held in canonical order derived from their names, so set
/// equality, hashing, and the total [`Ord`] are all content-derived and
/// independent of insertion order. This is what makes deduplication and
/// iteration over unions of supports deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element {
    hypotheses: BTreeSet<Hypothesis>,
}

impl Element {
    pub fn new<I: IntoIterator<Item = Hypothesis>>(hypotheses: I) -> Self {
        Self {
            hypotheses: hypotheses.into_iter().collect(),
        }
    }

    pub fn singleton(hypothesis: Hypothesis) -> Self {
        Self::new([hypothesis])
    }

    pub fn hypotheses(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hypotheses.iter()
    }

    /// The number of hypotheses in the element.
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    /// `true` if and only if the element has exactly one hypothesis.
    pub fn is_singleton(&self) -> bool {
        self.hypotheses.len() == 1
    }

    pub fn contains(&self, hypothesis: &Hypothesis) -> bool {
        self.hypotheses.contains(hypothesis)
    }

    /// The hypotheses common to both elements, or `None` when the elements are
    /// disjoint.
    ///
    /// The `None` case is meaningful rather than exceptional: conflict
    /// detection in the combination rules keys on it.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let common: BTreeSet<Hypothesis> = self
            .hypotheses
            .intersection(&other.hypotheses)
            .cloned()
            .collect();
        if common.is_empty() {
            None
        } else {
            Some(Self { hypotheses: common })
        }
    }

    /// The deduplicated hypotheses present in either element.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            hypotheses: self.hypotheses.union(&other.hypotheses).cloned().collect(),
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.hypotheses
            .intersection(&other.hypotheses)
            .next()
            .is_some()
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.hypotheses.is_subset(&other.hypotheses)
    }
}

impl FromIterator<Hypothesis> for Element {
    fn from_iter<I: IntoIterator<Item = Hypothesis>>(hypotheses: I) -> Self {
        Self::new(hypotheses)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for hypothesis in &self.hypotheses {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", hypothesis)?;
            first = false;
        }
        Ok(())
    }
}
