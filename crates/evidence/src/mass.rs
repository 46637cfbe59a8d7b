use {
    crate::{CombinationRule, Element, FrameOfDiscernment, MassError},
    std::fmt,
    std::ops::Deref,
    validator::{Validate, ValidationError},
};

/// The number of significant digits retained by bpa values.
///
/// Values are rounded at assignment time so that repeated combination does
/// not accumulate floating-point drift.
const BPA_SIGNIFICANT_DIGITS: i32 = 5;

/// The tolerance for the mass-sum invariant, sized to absorb the rounding
/// introduced by repeated truncation to [`BPA_SIGNIFICANT_DIGITS`].
pub const MASS_SUM_EPSILON: f64 = 1e-4;

/// Rounds a value to [`BPA_SIGNIFICANT_DIGITS`] significant digits.
pub(crate) fn round_bpa(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(BPA_SIGNIFICANT_DIGITS - 1 - magnitude);
    // Subnormal values push the exponent past f64 range; keep them as-is
    // rather than rounding through an infinite factor.
    if !factor.is_finite() {
        return value;
    }
    (value * factor).round() / factor
}

/// An [`Element`] paired with the basic probability assignment (bpa) that one
/// source gives it; the unit a [`MassDistribution`] is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalElement {
    element: Element,
    bpa: f64,
}

impl FocalElement {
    /// Pairs an element with a bpa, rounding the bpa to five significant
    /// digits.
    ///
    /// Returns [`MassError::OutOfRange`] if the bpa falls outside the 0.0 to
    /// 1.0 range and [`MassError::EmptyElement`] if the element has no
    /// hypotheses.
    pub fn new(element: Element, bpa: f64) -> Result<Self, MassError> {
        if element.is_empty() {
            return Err(MassError::EmptyElement);
        }
        if !(0.0..=1.0).contains(&bpa) {
            return Err(MassError::OutOfRange(bpa));
        }
        Ok(Self {
            element,
            bpa: round_bpa(bpa),
        })
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn bpa(&self) -> f64 {
        self.bpa
    }
}

impl fmt::Display for FocalElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.element, self.bpa)
    }
}

/// The body of evidence one source assigns over a frame: an ordered,
/// duplicate-free collection of focal elements whose bpa values sum to one
/// within [`MASS_SUM_EPSILON`].
///
/// Distributions are immutable after construction; combination produces new
/// instances and never mutates its inputs.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_mass_sum", skip_on_field_errors = false))]
pub struct MassDistribution {
    frame: FrameOfDiscernment,
    focal: Vec<FocalElement>,
}

/// Validates that a distribution's bpa values sum to one.
///
/// The sum is checked within tolerance rather than for exact floating-point
/// equality, since focal elements are rounded to a fixed precision.
fn validate_mass_sum(mass: &MassDistribution) -> Result<(), ValidationError> {
    let sum = mass.total_bpa();
    if (sum - 1.0).abs() > MASS_SUM_EPSILON {
        return Err(ValidationError::new("bpa values should sum to one"));
    }
    Ok(())
}

impl MassDistribution {
    /// Builds a distribution from focal evidence whose mass already sums to
    /// one.
    ///
    /// Duplicate elements are merged by summing their bpa values. Use
    /// [`normalized`](Self::normalized) instead when assembling raw evidence
    /// that may not account for all of its mass.
    pub fn new(frame: FrameOfDiscernment, focal: Vec<FocalElement>) -> Result<Self, MassError> {
        let mass = Self::from_parts(frame, focal)?;
        if !mass.is_valid() {
            return Err(MassError::InvalidMass(mass.total_bpa()));
        }
        Ok(mass)
    }

    /// Builds a distribution from raw evidence, assigning any missing mass to
    /// the universal element.
    ///
    /// The residual `1 - sum` represents total ignorance. Evidence whose mass
    /// already exceeds one cannot be repaired this way and is rejected with
    /// [`MassError::InvalidMass`].
    pub fn normalized(
        frame: FrameOfDiscernment,
        focal: Vec<FocalElement>,
    ) -> Result<Self, MassError> {
        let mass = Self::from_parts(frame, focal)?;
        if mass.is_valid() {
            return Ok(mass);
        }
        let residual = 1.0 - mass.total_bpa();
        if residual < 0.0 {
            return Err(MassError::InvalidMass(mass.total_bpa()));
        }
        let universal = FocalElement::new(mass.frame.universal_element(), residual)?;
        let mut focal = mass.focal;
        focal.push(universal);
        Self::new(mass.frame, focal)
    }

    /// Merges duplicate elements, checks every hypothesis against the frame,
    /// and sorts focal elements into canonical order. Does not enforce the
    /// mass-sum invariant; intermediate combination steps are allowed to carry
    /// unnormalized mass.
    pub(crate) fn from_parts(
        frame: FrameOfDiscernment,
        focal: Vec<FocalElement>,
    ) -> Result<Self, MassError> {
        let mut merged: Vec<FocalElement> = Vec::with_capacity(focal.len());
        for focal_element in focal {
            for hypothesis in focal_element.element().hypotheses() {
                if !frame.contains(hypothesis) {
                    return Err(MassError::MalformedFrame(hypothesis.name().to_string()));
                }
            }
            match merged
                .iter_mut()
                .find(|existing| existing.element() == focal_element.element())
            {
                Some(existing) => {
                    *existing = FocalElement::new(
                        existing.element().clone(),
                        existing.bpa() + focal_element.bpa(),
                    )?;
                }
                None => merged.push(focal_element),
            }
        }
        merged.sort_by(|a, b| a.element().cmp(b.element()));
        Ok(Self {
            frame,
            focal: merged,
        })
    }

    pub fn frame(&self) -> &FrameOfDiscernment {
        &self.frame
    }

    pub fn focal_elements(&self) -> &[FocalElement] {
        &self.focal
    }

    pub fn len(&self) -> usize {
        self.focal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.focal.is_empty()
    }

    /// The bpa assigned to an element, or `None` if the element is not part of
    /// this body of evidence.
    pub fn bpa(&self, element: &Element) -> Option<f64> {
        self.focal
            .iter()
            .find(|focal_element| focal_element.element() == element)
            .map(FocalElement::bpa)
    }

    pub fn total_bpa(&self) -> f64 {
        self.focal.iter().map(FocalElement::bpa).sum()
    }

    /// `true` if the mass-sum invariant holds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The belief in an element: the total mass of every focal element that is
    /// a subset of it. A lower probability bound for downstream use.
    pub fn belief(&self, element: &Element) -> f64 {
        self.focal
            .iter()
            .filter(|focal_element| focal_element.element().is_subset_of(element))
            .map(FocalElement::bpa)
            .sum()
    }

    /// The plausibility of an element: the total mass of every focal element
    /// that intersects it. An upper probability bound for downstream use.
    pub fn plausibility(&self, element: &Element) -> f64 {
        self.focal
            .iter()
            .filter(|focal_element| focal_element.element().intersects(element))
            .map(FocalElement::bpa)
            .sum()
    }

    /// Compares two distributions bpa-for-bpa within `epsilon`, treating
    /// elements absent from one side as carrying zero mass.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        if self.frame != other.frame {
            return false;
        }
        let mut supports: Vec<&Element> =
            self.focal.iter().map(FocalElement::element).collect();
        supports.extend(other.focal.iter().map(FocalElement::element));
        supports.sort();
        supports.dedup();
        supports.into_iter().all(|element| {
            let left = self.bpa(element).unwrap_or(0.0);
            let right = other.bpa(element).unwrap_or(0.0);
            (left - right).abs() <= epsilon
        })
    }
}

impl fmt::Display for MassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, focal_element) in self.focal.iter().enumerate() {
            if index > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", focal_element)?;
        }
        write!(f, "}}")
    }
}

/// A [`MassDistribution`] produced by the combination engine, tagged with the
/// rule that produced it.
///
/// Only the engine constructs these; downstream decision logic consumes them.
#[derive(Debug, Clone)]
pub struct JointMassDistribution {
    mass: MassDistribution,
    rule: CombinationRule,
}

impl JointMassDistribution {
    pub(crate) fn new(mass: MassDistribution, rule: CombinationRule) -> Self {
        Self { mass, rule }
    }

    pub fn rule(&self) -> CombinationRule {
        self.rule
    }

    pub fn mass(&self) -> &MassDistribution {
        &self.mass
    }
}

impl Deref for JointMassDistribution {
    type Target = MassDistribution;

    fn deref(&self) -> &Self::Target {
        &self.mass
    }
}

impl fmt::Display for JointMassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hypothesis;

    fn frame() -> FrameOfDiscernment {
        FrameOfDiscernment::new(["A", "B", "C"])
    }

    fn focal(frame: &FrameOfDiscernment, names: &[&str], bpa: f64) -> FocalElement {
        FocalElement::new(frame.element(names.iter().copied()).unwrap(), bpa).unwrap()
    }

    #[test]
    fn bpa_rounds_to_five_significant_digits() {
        let focal_element = FocalElement::new(
            Element::singleton(Hypothesis::new("A")),
            0.123456789,
        )
        .unwrap();
        assert_relative_eq!(focal_element.bpa(), 0.12346);

        let focal_element =
            FocalElement::new(Element::singleton(Hypothesis::new("A")), 0.000123456).unwrap();
        assert_relative_eq!(focal_element.bpa(), 0.00012346);
    }

    #[test]
    fn subnormal_bpa_survives_rounding() {
        let focal_element =
            FocalElement::new(Element::singleton(Hypothesis::new("A")), 5e-324).unwrap();
        assert!(focal_element.bpa().is_finite());
        assert_eq!(focal_element.bpa(), 5e-324);
    }

    #[test]
    fn bpa_out_of_range_is_rejected() {
        let element = Element::singleton(Hypothesis::new("A"));
        assert!(matches!(
            FocalElement::new(element.clone(), 1.5),
            Err(MassError::OutOfRange(_))
        ));
        assert!(matches!(
            FocalElement::new(element, -0.1),
            Err(MassError::OutOfRange(_))
        ));
    }

    #[test]
    fn empty_element_is_rejected() {
        assert!(matches!(
            FocalElement::new(Element::new(Vec::<Hypothesis>::new()), 0.5),
            Err(MassError::EmptyElement)
        ));
    }

    #[test]
    fn validity_uses_tolerance_not_exact_equality() {
        let frame = frame();
        let mass = MassDistribution::new(
            frame.clone(),
            vec![
                focal(&frame, &["A"], 0.33333),
                focal(&frame, &["B"], 0.33333),
                focal(&frame, &["C"], 0.33333),
            ],
        )
        .unwrap();
        assert!(mass.is_valid());
    }

    #[test]
    fn invalid_sum_is_rejected() {
        let frame = frame();
        let result = MassDistribution::new(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.5), focal(&frame, &["B"], 0.3)],
        );
        assert!(matches!(result, Err(MassError::InvalidMass(_))));
    }

    #[test]
    fn normalized_assigns_residual_to_universal_element() {
        let frame = frame();
        let mass = MassDistribution::normalized(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.5), focal(&frame, &["A", "B"], 0.2)],
        )
        .unwrap();
        assert!(mass.is_valid());
        let ignorance = mass.bpa(&frame.universal_element()).unwrap();
        assert_relative_eq!(ignorance, 0.3, epsilon = MASS_SUM_EPSILON);
    }

    #[test]
    fn normalized_merges_with_existing_universal_element() {
        let frame = frame();
        let mass = MassDistribution::normalized(
            frame.clone(),
            vec![
                focal(&frame, &["A"], 0.5),
                focal(&frame, &["A", "B", "C"], 0.2),
            ],
        )
        .unwrap();
        assert_eq!(mass.len(), 2);
        let ignorance = mass.bpa(&frame.universal_element()).unwrap();
        assert_relative_eq!(ignorance, 0.5, epsilon = MASS_SUM_EPSILON);
    }

    #[test]
    fn normalized_rejects_excess_mass() {
        let frame = frame();
        let result = MassDistribution::normalized(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.8), focal(&frame, &["B"], 0.4)],
        );
        assert!(matches!(result, Err(MassError::InvalidMass(_))));
    }

    #[test]
    fn duplicate_elements_are_merged() {
        let frame = frame();
        let mass = MassDistribution::new(
            frame.clone(),
            vec![
                focal(&frame, &["A"], 0.3),
                focal(&frame, &["B", "A"], 0.4),
                focal(&frame, &["A", "B"], 0.3),
            ],
        )
        .unwrap();
        assert_eq!(mass.len(), 2);
        let merged = mass.bpa(&frame.element(["A", "B"]).unwrap()).unwrap();
        assert_relative_eq!(merged, 0.7);
    }

    #[test]
    fn foreign_hypothesis_is_rejected() {
        let frame = frame();
        let stranger = FocalElement::new(Element::singleton(Hypothesis::new("D")), 1.0).unwrap();
        let result = MassDistribution::new(frame, vec![stranger]);
        assert!(matches!(result, Err(MassError::MalformedFrame(_))));
    }

    #[test]
    fn belief_and_plausibility_bound_an_element() {
        let frame = frame();
        let mass = MassDistribution::new(
            frame.clone(),
            vec![
                focal(&frame, &["A"], 0.5),
                focal(&frame, &["A", "B"], 0.3),
                focal(&frame, &["A", "B", "C"], 0.2),
            ],
        )
        .unwrap();
        let a = frame.element(["A"]).unwrap();
        assert_relative_eq!(mass.belief(&a), 0.5);
        assert_relative_eq!(mass.plausibility(&a), 1.0);
        let b = frame.element(["B"]).unwrap();
        assert_relative_eq!(mass.belief(&b), 0.0);
        assert_relative_eq!(mass.plausibility(&b), 0.5);
        assert!(mass.belief(&b) <= mass.plausibility(&b));
    }

    #[test]
    fn approx_eq_treats_missing_elements_as_zero_mass() {
        let frame = frame();
        let left = MassDistribution::new(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.5), focal(&frame, &["B"], 0.5)],
        )
        .unwrap();
        let right = MassDistribution::new(
            frame.clone(),
            vec![
                focal(&frame, &["A"], 0.5),
                focal(&frame, &["B"], 0.5),
                focal(&frame, &["C"], 0.0),
            ],
        )
        .unwrap();
        assert!(left.approx_eq(&right, MASS_SUM_EPSILON));

        let different = MassDistribution::new(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.6), focal(&frame, &["B"], 0.4)],
        )
        .unwrap();
        assert!(!left.approx_eq(&different, MASS_SUM_EPSILON));
    }

    #[test]
    fn display_matches_fixture_notation() {
        let frame = frame();
        let mass = MassDistribution::new(
            frame.clone(),
            vec![focal(&frame, &["A"], 0.6), focal(&frame, &["B", "A"], 0.4)],
        )
        .unwrap();
        assert_eq!(mass.to_string(), "{A-0.6;A,B-0.4}");
    }
}
