use {
    crate::FixtureError,
    discern_evidence::{
        CombinationRule, FocalElement, FrameOfDiscernment, MassDistribution,
    },
    std::{fs, path::Path, str::FromStr},
};

/// The section header that opens a fixture and declares the frame.
const FRAME_SECTION: &str = "$Frame of Discernment";
/// The section header that declares the input distributions.
const INPUT_SECTION: &str = "$Input";
/// The section header that declares an expected joint distribution.
const OUTPUT_SECTION: &str = "$Output";

/// A parsed combination scenario: the frame of discernment, one mass
/// distribution per input source, and the expected joint distribution for each
/// combination rule the fixture records.
///
/// Input distributions are normalized on load, assigning unaccounted mass to
/// the universal element, so they satisfy the engine's validity invariant.
/// Expected outputs must already sum to one.
#[derive(Debug, Clone)]
pub struct Fixture {
    frame: FrameOfDiscernment,
    inputs: Vec<MassDistribution>,
    expected: Vec<(CombinationRule, MassDistribution)>,
}

impl Fixture {
    /// Reads and parses a fixture file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses fixture text.
    ///
    /// Blank lines are ignored. The frame section must come first, followed by
    /// an `$Input-<n>` section with `n` distribution lines and any number of
    /// `$Output <RULE>` sections.
    pub fn parse(text: &str) -> Result<Self, FixtureError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let header = lines
            .next()
            .ok_or_else(|| FixtureError::MissingSection(FRAME_SECTION.to_string()))?;
        if !header.starts_with(FRAME_SECTION) {
            return Err(FixtureError::MissingSection(FRAME_SECTION.to_string()));
        }
        let frame_line = lines.next().ok_or(FixtureError::UnexpectedEof)?;
        let frame = parse_frame(frame_line);

        let header = lines
            .next()
            .ok_or_else(|| FixtureError::MissingSection(INPUT_SECTION.to_string()))?;
        if !header.starts_with(INPUT_SECTION) {
            return Err(FixtureError::MissingSection(INPUT_SECTION.to_string()));
        }
        let count: usize = header
            .rsplit('-')
            .next()
            .and_then(|count| count.parse().ok())
            .ok_or_else(|| FixtureError::MalformedHeader(header.to_string()))?;

        let mut inputs = Vec::with_capacity(count);
        for _ in 0..count {
            let line = lines.next().ok_or(FixtureError::UnexpectedEof)?;
            let focal = parse_focal_elements(&frame, line)?;
            inputs.push(MassDistribution::normalized(frame.clone(), focal)?);
        }

        let mut expected = Vec::new();
        while let Some(line) = lines.next() {
            let tag = line
                .strip_prefix(OUTPUT_SECTION)
                .ok_or_else(|| FixtureError::MalformedHeader(line.to_string()))?
                .trim();
            let rule = CombinationRule::from_str(tag)
                .map_err(|_| FixtureError::UnknownRule(tag.to_string()))?;
            let distribution_line = lines.next().ok_or(FixtureError::UnexpectedEof)?;
            let focal = parse_focal_elements(&frame, distribution_line)?;
            expected.push((rule, MassDistribution::new(frame.clone(), focal)?));
        }

        Ok(Self {
            frame,
            inputs,
            expected,
        })
    }

    pub fn frame(&self) -> &FrameOfDiscernment {
        &self.frame
    }

    pub fn inputs(&self) -> &[MassDistribution] {
        &self.inputs
    }

    /// Every rule the fixture records an expected output for.
    pub fn expected_rules(&self) -> impl Iterator<Item = CombinationRule> + '_ {
        self.expected.iter().map(|(rule, _)| *rule)
    }

    /// The expected joint distribution for a rule, if the fixture records one.
    pub fn expected(&self, rule: CombinationRule) -> Option<&MassDistribution> {
        self.expected
            .iter()
            .find(|(recorded, _)| *recorded == rule)
            .map(|(_, mass)| mass)
    }
}

/// Parses a frame line such as `{A;B;C}`.
fn parse_frame(line: &str) -> FrameOfDiscernment {
    FrameOfDiscernment::new(
        strip_braces(line)
            .split([';', ','])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    )
}

/// Parses a distribution line such as `{A-0.6;A,B-0.4}` into focal elements.
fn parse_focal_elements(
    frame: &FrameOfDiscernment,
    line: &str,
) -> Result<Vec<FocalElement>, FixtureError> {
    strip_braces(line)
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_focal_element(frame, entry))
        .collect()
}

/// Parses one `H1,H2-0.5` entry: hypothesis names comma-separated, bpa
/// hyphen-separated from the element.
fn parse_focal_element(
    frame: &FrameOfDiscernment,
    entry: &str,
) -> Result<FocalElement, FixtureError> {
    let mut parts = entry.rsplitn(2, '-');
    let bpa_text = parts.next().ok_or_else(|| {
        FixtureError::MalformedElement(entry.to_string())
    })?;
    let names = parts
        .next()
        .ok_or_else(|| FixtureError::MalformedElement(entry.to_string()))?;
    let bpa: f64 = bpa_text
        .trim()
        .parse()
        .map_err(|_| FixtureError::InvalidBpa(bpa_text.to_string()))?;
    let element = frame.element(
        names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    )?;
    Ok(FocalElement::new(element, bpa)?)
}

fn strip_braces(line: &str) -> &str {
    line.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
$Frame of Discernment
{A;B;C}
$Input-2
{A-0.6;A,B-0.4}
{B-0.3;A,B,C-0.7}
$Output DEMPSTER
{A-0.5122;B-0.14634;A,B-0.34146}
$Output AVERAGE
{A-0.3;B-0.15;A,B-0.2;A,B,C-0.35}
";

    #[test]
    fn parses_frame_inputs_and_outputs() {
        let fixture = Fixture::parse(FIXTURE).unwrap();
        assert_eq!(fixture.frame().len(), 3);
        assert_eq!(fixture.inputs().len(), 2);
        assert_eq!(fixture.expected_rules().count(), 2);

        let dempster = fixture.expected(CombinationRule::Dempster).unwrap();
        let a = fixture.frame().element(["A"]).unwrap();
        assert!((dempster.bpa(&a).unwrap() - 0.5122).abs() < 1e-9);
        assert!(fixture.expected(CombinationRule::Yager).is_none());
    }

    #[test]
    fn inputs_are_normalized_on_load() {
        let text = "\
$Frame of Discernment
{A;B;C}
$Input-1
{A-0.5;B-0.2}
";
        let fixture = Fixture::parse(text).unwrap();
        let input = &fixture.inputs()[0];
        assert!(input.is_valid());
        let universal = fixture.frame().universal_element();
        assert!((input.bpa(&universal).unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn missing_frame_section_is_rejected() {
        assert!(matches!(
            Fixture::parse("$Input-1\n{A-1.0}\n"),
            Err(FixtureError::MissingSection(_))
        ));
    }

    #[test]
    fn malformed_input_header_is_rejected() {
        let text = "$Frame of Discernment\n{A;B}\n$Input-x\n";
        assert!(matches!(
            Fixture::parse(text),
            Err(FixtureError::MalformedHeader(_))
        ));
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let text = "\
$Frame of Discernment
{A;B}
$Input-1
{A-1.0}
$Output MAJORITY
{A-1.0}
";
        assert!(matches!(
            Fixture::parse(text),
            Err(FixtureError::UnknownRule(_))
        ));
    }

    #[test]
    fn missing_bpa_is_rejected() {
        let text = "$Frame of Discernment\n{A;B}\n$Input-1\n{A}\n";
        assert!(matches!(
            Fixture::parse(text),
            Err(FixtureError::MalformedElement(_)) | Err(FixtureError::InvalidBpa(_))
        ));
    }

    #[test]
    fn foreign_hypothesis_is_rejected() {
        let text = "$Frame of Discernment\n{A;B}\n$Input-1\n{C-1.0}\n";
        assert!(matches!(Fixture::parse(text), Err(FixtureError::Mass(_))));
    }

    #[test]
    fn truncated_fixture_is_rejected() {
        let text = "$Frame of Discernment\n{A;B}\n$Input-2\n{A-1.0}\n";
        assert!(matches!(
            Fixture::parse(text),
            Err(FixtureError::UnexpectedEof)
        ));
    }
}
