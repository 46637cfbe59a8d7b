//! The combination engine: stateless operators that fuse two or more mass
//! distributions sharing a frame of discernment into one joint distribution.
//!
//! All four operators are pure functions. They borrow their inputs, never
//! retain them, and allocate fresh output values.

use {
    crate::{
        CombinationError, Element, FocalElement, FrameOfDiscernment, JointMassDistribution,
        MassDistribution,
    },
    std::collections::BTreeSet,
    strum_macros::{Display, EnumString},
};

/// Identifies which operator produced a [`JointMassDistribution`].
///
/// The serialized form is the uppercase tag used by the fixture format, e.g.
/// `DEMPSTER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CombinationRule {
    Dempster,
    Yager,
    Average,
    Distance,
}

/// Combines the distributions under Dempster's rule: pairwise conflict
/// redistribution by normalization, folded left-to-right over the input list.
///
/// Each pairwise step measures the conflict mass `K` assigned to disjoint
/// element pairs and divides the accumulated intersection mass by `1 - K`.
/// Returns [`CombinationError::TotalConflict`] when `K` reaches one, rather
/// than dividing by zero.
pub fn dempster(masses: &[MassDistribution]) -> Result<JointMassDistribution, CombinationError> {
    let frame = check_inputs(masses)?;
    let mut joint = pairwise_dempster(masses[0].focal_elements(), masses[1].focal_elements())?;
    for next in &masses[2..] {
        joint = pairwise_dempster(&joint, next.focal_elements())?;
    }
    assemble(frame, joint, CombinationRule::Dempster)
}

/// Combines the distributions under Yager's rule: conflict mass is carried
/// forward unnormalized and reassigned to the universal element only at the
/// final step.
///
/// Intermediate results of the fold are deliberately not valid distributions;
/// the running conflict is measured between the unnormalized running joint and
/// each next input and transferred once, after the fold. Each discarded
/// product is therefore tallied exactly once, so input orderings differ only
/// by fixed-precision rounding.
pub fn yager(masses: &[MassDistribution]) -> Result<JointMassDistribution, CombinationError> {
    let frame = check_inputs(masses)?;
    let mut running_conflict = conflict(masses[0].focal_elements(), masses[1].focal_elements());
    let mut joint = pairwise_yager(masses[0].focal_elements(), masses[1].focal_elements())?;
    for next in &masses[2..] {
        running_conflict += conflict(&joint, next.focal_elements());
        joint = pairwise_yager(&joint, next.focal_elements())?;
    }
    // Rounding can push the accumulated conflict a hair past one.
    let running_conflict = running_conflict.clamp(0.0, 1.0);
    if running_conflict > 0.0 {
        joint.push(FocalElement::new(
            frame.universal_element(),
            running_conflict,
        )?);
    }
    assemble(frame, joint, CombinationRule::Yager)
}

/// Combines the distributions by taking, for every element in the union of
/// supports, the arithmetic mean of the bpa each source assigns it.
///
/// Sources without mass on an element contribute zero, so the result is
/// invariant under any permutation of the input list.
pub fn average(masses: &[MassDistribution]) -> Result<JointMassDistribution, CombinationError> {
    let frame = check_inputs(masses)?;
    let supports = checked_union_of_supports(masses)?;
    let count = masses.len() as f64;
    let mut joint = Vec::with_capacity(supports.len());
    for element in supports {
        let sum: f64 = masses
            .iter()
            .map(|mass| mass.bpa(&element).unwrap_or(0.0))
            .sum();
        joint.push(FocalElement::new(element, sum / count)?);
    }
    assemble(frame, joint, CombinationRule::Average)
}

/// Combines the distributions under the Chen-Shi distance-weighted rule.
///
/// Pairwise similarities derived from an evidence distance yield a credibility
/// weight per source; the credibility-weighted average distribution is then
/// Dempster-combined with itself `N - 1` times, simulating `N` independent
/// observations of the credibility consensus before classical fusion.
pub fn distance_weighted(
    masses: &[MassDistribution],
) -> Result<JointMassDistribution, CombinationError> {
    let frame = check_inputs(masses)?;
    let credibility = credibilities(masses)?;
    let supports = checked_union_of_supports(masses)?;

    let mut weighted = Vec::with_capacity(supports.len());
    for element in supports {
        let bpa: f64 = masses
            .iter()
            .zip(credibility.iter())
            .map(|(mass, weight)| weight * mass.bpa(&element).unwrap_or(0.0))
            .sum();
        weighted.push(FocalElement::new(element, bpa)?);
    }

    let mut joint = pairwise_dempster(&weighted, &weighted)?;
    for _ in 0..masses.len().saturating_sub(2) {
        joint = pairwise_dempster(&joint, &weighted)?;
    }
    assemble(frame, joint, CombinationRule::Distance)
}

/// The credibility weight of each source: its share of the total pairwise
/// support, where support is the sum of a source's similarities to every other
/// source.
///
/// When every off-diagonal similarity is zero there is no basis for weighting
/// and all sources receive equal credibility.
pub fn credibilities(masses: &[MassDistribution]) -> Result<Vec<f64>, CombinationError> {
    check_inputs(masses)?;
    let matrix = similarity_matrix(masses)?;
    let support: Vec<f64> = (0..masses.len())
        .map(|i| {
            (0..masses.len())
                .filter(|j| *j != i)
                .map(|j| matrix[i][j])
                .sum()
        })
        .collect();
    let summation: f64 = support.iter().sum();
    if summation <= 0.0 {
        return Ok(vec![1.0 / masses.len() as f64; masses.len()]);
    }
    Ok(support.iter().map(|s| s / summation).collect())
}

/// The deduplicated union, across all input distributions, of every element
/// that appears as a focal-element subset.
///
/// Canonical element ordering makes this the deterministic iteration domain of
/// every combination rule.
pub fn union_of_supports(masses: &[MassDistribution]) -> Vec<Element> {
    let mut supports: BTreeSet<Element> = BTreeSet::new();
    for mass in masses {
        for focal_element in mass.focal_elements() {
            supports.insert(focal_element.element().clone());
        }
    }
    supports.into_iter().collect()
}

fn checked_union_of_supports(
    masses: &[MassDistribution],
) -> Result<Vec<Element>, CombinationError> {
    let supports = union_of_supports(masses);
    if supports.is_empty() {
        return Err(CombinationError::MalformedFrame(
            "empty union of supports".to_string(),
        ));
    }
    Ok(supports)
}

/// Rejects input lists that are too short to combine and frames that do not
/// match across inputs.
fn check_inputs(masses: &[MassDistribution]) -> Result<&FrameOfDiscernment, CombinationError> {
    if masses.len() < 2 {
        return Err(CombinationError::CombinationNotPossible(masses.len()));
    }
    let frame = masses[0].frame();
    for mass in &masses[1..] {
        if mass.frame() != frame {
            return Err(CombinationError::MalformedFrame(
                "mass distributions do not share a frame of discernment".to_string(),
            ));
        }
    }
    Ok(frame)
}

fn assemble(
    frame: &FrameOfDiscernment,
    joint: Vec<FocalElement>,
    rule: CombinationRule,
) -> Result<JointMassDistribution, CombinationError> {
    let mass = MassDistribution::from_parts(frame.clone(), joint)?;
    if !mass.is_valid() {
        return Err(CombinationError::InvalidResult(mass.total_bpa()));
    }
    Ok(JointMassDistribution::new(mass, rule))
}

/// The conflict mass between two bodies of evidence: the total mass assigned
/// to pairs of elements with no common hypothesis.
fn conflict(left: &[FocalElement], right: &[FocalElement]) -> f64 {
    let mut conflict = 0.0;
    for el1 in left {
        for el2 in right {
            if el1.element().intersection(el2.element()).is_none() {
                conflict += el1.bpa() * el2.bpa();
            }
        }
    }
    conflict
}

/// The mass both bodies of evidence assign to pairs whose intersection equals
/// `target`.
fn intersection_mass(target: &Element, left: &[FocalElement], right: &[FocalElement]) -> f64 {
    let mut mass = 0.0;
    for el1 in left {
        for el2 in right {
            if let Some(intersection) = el1.element().intersection(el2.element()) {
                if intersection == *target {
                    mass += el1.bpa() * el2.bpa();
                }
            }
        }
    }
    mass
}

fn support_union(left: &[FocalElement], right: &[FocalElement]) -> Vec<Element> {
    let mut supports: BTreeSet<Element> = BTreeSet::new();
    for focal_element in left.iter().chain(right) {
        supports.insert(focal_element.element().clone());
    }
    supports.into_iter().collect()
}

fn pairwise_dempster(
    left: &[FocalElement],
    right: &[FocalElement],
) -> Result<Vec<FocalElement>, CombinationError> {
    let conflict = conflict(left, right);
    if conflict >= 1.0 - f64::EPSILON {
        return Err(CombinationError::TotalConflict);
    }
    let mut joint = Vec::new();
    for element in support_union(left, right) {
        let bpa = intersection_mass(&element, left, right) / (1.0 - conflict);
        joint.push(FocalElement::new(element, bpa)?);
    }
    Ok(joint)
}

fn pairwise_yager(
    left: &[FocalElement],
    right: &[FocalElement],
) -> Result<Vec<FocalElement>, CombinationError> {
    let mut joint = Vec::new();
    for element in support_union(left, right) {
        let bpa = intersection_mass(&element, left, right);
        joint.push(FocalElement::new(element, bpa)?);
    }
    Ok(joint)
}

/// The scalar product of two bodies of evidence: every pairwise bpa product
/// weighted by `|intersection| / |union|`.
///
/// A pair whose union is empty contributes nothing; an empty body of evidence
/// has no defined scalar product.
fn scalar_product(
    left: &[FocalElement],
    right: &[FocalElement],
) -> Result<f64, CombinationError> {
    if left.is_empty() || right.is_empty() {
        return Err(CombinationError::DegenerateDistance);
    }
    let mut product = 0.0;
    for el1 in left {
        for el2 in right {
            let union_size = el1.element().union(el2.element()).len();
            if union_size == 0 {
                continue;
            }
            let intersection_size = el1
                .element()
                .intersection(el2.element())
                .map_or(0, |intersection| intersection.len());
            product +=
                el1.bpa() * el2.bpa() * (intersection_size as f64 / union_size as f64);
        }
    }
    Ok(product)
}

/// The evidence distance between two distributions, derived from their scalar
/// products.
fn distance(
    left: &MassDistribution,
    right: &MassDistribution,
) -> Result<f64, CombinationError> {
    let norm_left = scalar_product(left.focal_elements(), left.focal_elements())?;
    let norm_right = scalar_product(right.focal_elements(), right.focal_elements())?;
    let product = scalar_product(left.focal_elements(), right.focal_elements())?;
    // Rounding can leave the radicand fractionally below zero.
    Ok(((norm_left + norm_right - 2.0 * product) / 2.0).max(0.0).sqrt())
}

fn similarity(
    left: &MassDistribution,
    right: &MassDistribution,
) -> Result<f64, CombinationError> {
    let distance = distance(left, right)?;
    Ok(((distance * std::f64::consts::PI).cos() + 1.0) / 2.0)
}

/// The symmetric pairwise similarity matrix, with unit diagonal.
fn similarity_matrix(masses: &[MassDistribution]) -> Result<Vec<Vec<f64>>, CombinationError> {
    let n = masses.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let similarity = similarity(&masses[i], &masses[j])?;
            matrix[i][j] = similarity;
            matrix[j][i] = similarity;
        }
    }
    Ok(matrix)
}
