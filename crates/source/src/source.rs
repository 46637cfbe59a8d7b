use {
    crate::SourceError,
    discern_evidence::{
        Element, FocalElement, FrameOfDiscernment, Hypothesis, MassDistribution,
    },
};

/// A producer of evidence over a frame of discernment.
///
/// Each call yields one normalized [`MassDistribution`]; sources whose
/// distributions will be combined must share the same frame. Implementations
/// hold no combination state — every invocation stands alone.
pub trait EvidenceSource {
    fn name(&self) -> &str;

    /// Produces one normalized mass distribution for the given frame.
    fn mass_distribution(
        &self,
        frame: &FrameOfDiscernment,
    ) -> Result<MassDistribution, SourceError>;
}

/// One attribute reading taken from a source.
#[derive(Debug, Clone)]
pub struct Measurement {
    attribute: String,
    value: f64,
}

impl Measurement {
    pub fn new<N: Into<String>>(attribute: N, value: f64) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A half-open value range `[min, max)` that maps a measured value onto a
/// hypothesis.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// The classification rules for one measured attribute: which value ranges
/// point at which hypotheses, and how much evidential weight a reading of this
/// attribute carries.
#[derive(Debug, Clone)]
pub struct ClassificationAttribute {
    attribute: String,
    weight: f64,
    ranges: Vec<(Hypothesis, Range)>,
}

impl ClassificationAttribute {
    pub fn new<N: Into<String>>(
        attribute: N,
        weight: f64,
        ranges: Vec<(Hypothesis, Range)>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            weight,
            ranges,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The element supported by a measured value: every hypothesis with a
    /// range containing the value. `None` when no range matches, meaning the
    /// reading contributes nothing but ignorance.
    fn element_for(&self, value: f64) -> Option<Element> {
        let hypotheses: Vec<Hypothesis> = self
            .ranges
            .iter()
            .filter(|(_, range)| range.contains(value))
            .map(|(hypothesis, _)| hypothesis.clone())
            .collect();
        if hypotheses.is_empty() {
            None
        } else {
            Some(Element::new(hypotheses))
        }
    }
}

/// Maps raw measurements onto focal evidence through per-attribute range
/// tables and assembles a normalized mass distribution.
///
/// Duplicate elements arising from different attributes are merged by summing
/// their weights, and any unassigned mass becomes ignorance on the universal
/// element.
#[derive(Debug, Clone)]
pub struct RangeClassifier {
    attributes: Vec<ClassificationAttribute>,
}

impl RangeClassifier {
    pub fn new(attributes: Vec<ClassificationAttribute>) -> Self {
        Self { attributes }
    }

    pub fn classify(
        &self,
        frame: &FrameOfDiscernment,
        measurements: &[Measurement],
    ) -> Result<MassDistribution, SourceError> {
        let mut focal = Vec::new();
        for measurement in measurements {
            let attribute = self
                .attributes
                .iter()
                .find(|attribute| attribute.attribute() == measurement.attribute())
                .ok_or_else(|| {
                    SourceError::UnknownAttribute(measurement.attribute().to_string())
                })?;
            if let Some(element) = attribute.element_for(measurement.value()) {
                focal.push(FocalElement::new(element, attribute.weight())?);
            }
        }
        Ok(MassDistribution::normalized(frame.clone(), focal)?)
    }
}

/// An evidence source that replays a recorded set of measurements through a
/// [`RangeClassifier`].
#[derive(Debug, Clone)]
pub struct RecordedSource {
    name: String,
    classifier: RangeClassifier,
    measurements: Vec<Measurement>,
}

impl RecordedSource {
    pub fn new<N: Into<String>>(
        name: N,
        classifier: RangeClassifier,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            name: name.into(),
            classifier,
            measurements,
        }
    }
}

impl EvidenceSource for RecordedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn mass_distribution(
        &self,
        frame: &FrameOfDiscernment,
    ) -> Result<MassDistribution, SourceError> {
        self.classifier.classify(frame, &self.measurements)
    }
}
