use crate::geo::{GeoPoint, PlaceResolver, ResolveError};
use crate::provider::AncestorFact;

/// Reads `MAP`/`LATI`/`LONG` from the `PLAC` sub-record of the fact's GEDCOM.
#[derive(Debug, Default, Clone, Copy)]
pub struct GedcomPlaceResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GedcomLine<'a> {
    level: u8,
    tag: &'a str,
    value: &'a str,
}

fn parse_line(line: &str) -> Option<GedcomLine<'_>> {
    let line = line.trim();
    let mut parts = line.splitn(3, ' ');
    let level = parts.next()?.parse().ok()?;
    let tag = parts.next()?;
    let value = parts.next().unwrap_or("").trim();
    Some(GedcomLine { level, tag, value })
}

/// Lines nested under the first `2 PLAC`, not including the `PLAC` line itself.
fn place_subrecord(gedcom: &str) -> Option<Vec<GedcomLine<'_>>> {
    let mut lines = gedcom.lines().filter_map(parse_line);
    lines.find(|line| line.level == 2 && line.tag == "PLAC")?;
    Some(lines.take_while(|line| line.level > 2).collect())
}

fn parse_coordinate(
    raw: &str,
    field: &'static str,
    hemispheres: (char, char),
    limit: f64,
) -> Result<f64, ResolveError> {
    let malformed = || ResolveError::Malformed {
        field,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let first = chars.next().ok_or_else(malformed)?.to_ascii_uppercase();
    let (sign, digits) = if first == hemispheres.0 {
        (1.0, chars.as_str())
    } else if first == hemispheres.1 {
        (-1.0, chars.as_str())
    } else {
        (1.0, trimmed)
    };
    let magnitude: f64 = digits.trim().parse().map_err(|_| malformed())?;
    let value = sign * magnitude;
    if !value.is_finite() || value.abs() > limit {
        return Err(malformed());
    }
    Ok(value)
}

impl PlaceResolver for GedcomPlaceResolver {
    fn name(&self) -> &str {
        "gedcom"
    }

    fn resolve(&self, fact: &AncestorFact) -> Result<Option<GeoPoint>, ResolveError> {
        let Some(gedcom) = fact.gedcom.as_deref() else {
            return Ok(None);
        };
        let Some(place) = place_subrecord(gedcom) else {
            return Ok(None);
        };

        let mut in_map = false;
        let mut latitude = None;
        let mut longitude = None;
        for line in place {
            match (line.level, line.tag) {
                (3, "MAP") => in_map = true,
                (3, _) => in_map = false,
                (4, "LATI") if in_map => latitude = Some(line.value),
                (4, "LONG") if in_map => longitude = Some(line.value),
                _ => {}
            }
        }

        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Ok(None);
        };
        let latitude = parse_coordinate(latitude, "LATI", ('N', 'S'), 90.0)?;
        let longitude = parse_coordinate(longitude, "LONG", ('E', 'W'), 180.0)?;
        Ok(Some(GeoPoint::new(latitude, longitude)))
    }
}

#[cfg(test)]
mod tests {
    use super::{GedcomPlaceResolver, parse_coordinate};
    use crate::geo::{GeoPoint, PlaceResolver, ResolveError};
    use crate::provider::AncestorFact;

    fn fact_with(gedcom: &str) -> AncestorFact {
        let mut fact = AncestorFact::new("I1", "BIRT", "Hoboken");
        fact.gedcom = Some(gedcom.to_string());
        fact
    }

    #[test]
    fn reads_hemisphere_prefixed_map_coordinates() {
        let fact = fact_with(
            "1 BIRT\n2 DATE 1 JAN 1900\n2 PLAC Hoboken, Hudson, New Jersey, USA\n3 MAP\n4 LATI N40.7439\n4 LONG W74.0324\n2 SOUR @S1@\n",
        );
        let got = GedcomPlaceResolver.resolve(&fact).expect("resolve");
        assert_eq!(got, Some(GeoPoint::new(40.7439, -74.0324)));
    }

    #[test]
    fn accepts_signed_decimals_and_crlf() {
        let fact = fact_with("1 BIRT\r\n2 PLAC Sydney\r\n3 MAP\r\n4 LATI -33.87\r\n4 LONG 151.21\r\n");
        let got = GedcomPlaceResolver.resolve(&fact).expect("resolve");
        assert_eq!(got, Some(GeoPoint::new(-33.87, 151.21)));
    }

    #[test]
    fn ignores_coordinates_outside_the_place_subrecord() {
        let fact = fact_with(
            "1 BIRT\n2 PLAC Nowhere\n3 FORM City\n2 MAP\n3 LATI N10.0\n3 LONG E10.0\n",
        );
        assert_eq!(GedcomPlaceResolver.resolve(&fact).expect("resolve"), None);
    }

    #[test]
    fn missing_record_or_map_is_not_an_error() {
        let bare = AncestorFact::new("I1", "BIRT", "Hoboken");
        assert_eq!(GedcomPlaceResolver.resolve(&bare).expect("resolve"), None);

        let no_map = fact_with("1 BIRT\n2 PLAC Hoboken\n");
        assert_eq!(GedcomPlaceResolver.resolve(&no_map).expect("resolve"), None);

        let half = fact_with("1 BIRT\n2 PLAC Hoboken\n3 MAP\n4 LATI N40.0\n");
        assert_eq!(GedcomPlaceResolver.resolve(&half).expect("resolve"), None);
    }

    #[test]
    fn malformed_values_are_errors() {
        let fact = fact_with("1 BIRT\n2 PLAC Hoboken\n3 MAP\n4 LATI north\n4 LONG W74.0\n");
        let err = GedcomPlaceResolver.resolve(&fact).expect_err("malformed");
        assert_eq!(
            err,
            ResolveError::Malformed {
                field: "LATI",
                value: "north".to_string()
            }
        );
    }

    #[test]
    fn coordinate_parser_checks_axis_and_range() {
        assert_eq!(parse_coordinate("s12.5", "LATI", ('N', 'S'), 90.0), Ok(-12.5));
        assert_eq!(parse_coordinate("+12.5", "LATI", ('N', 'S'), 90.0), Ok(12.5));
        assert!(parse_coordinate("N91", "LATI", ('N', 'S'), 90.0).is_err());
        assert!(parse_coordinate("E12", "LATI", ('N', 'S'), 90.0).is_err());
        assert!(parse_coordinate("W181", "LONG", ('E', 'W'), 180.0).is_err());
        assert!(parse_coordinate("", "LONG", ('E', 'W'), 180.0).is_err());
    }
}
