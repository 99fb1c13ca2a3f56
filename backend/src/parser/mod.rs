//! XML people extractor with encoding detection.
//!
//! Selects every `/people/person` element and flattens it into a
//! [`RawPerson`]. Only presence is checked; no schema validation here.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::path::Path;

use crate::error::{InputError, ParseError, ParseResult, PipelineResult};
use crate::logs::{log_info, log_success};
use crate::models::RawPerson;

const ROOT_ELEMENT: &str = "people";
const PERSON_ELEMENT: &str = "person";

static XML_DECL_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#)
        .expect("encoding declaration pattern is valid")
});

/// Extracted records with metadata.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// One record per `<person>`, in document order
    pub records: Vec<RawPerson>,
    /// Encoding used to decode the file
    pub encoding: String,
}

/// Check whether the path has an `.xml` extension (case-insensitive).
pub fn is_xml_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

/// Find the encoding from a byte-order mark or the XML declaration.
pub fn detect_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Some(encoding);
    }

    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    XML_DECL_ENCODING
        .captures(&head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_str().as_bytes()))
}

/// Decode raw file bytes, defaulting to UTF-8.
///
/// Invalid sequences are replaced rather than rejected; a BOM is stripped.
pub fn decode_content(bytes: &[u8]) -> (String, &'static Encoding) {
    let encoding = detect_encoding(bytes).unwrap_or(UTF_8);
    let (text, used, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), used)
}

/// Read and extract all people from an XML file.
///
/// # Errors
/// - [`InputError::NotXml`] when the extension is not `.xml`
/// - [`InputError::NotFound`] / [`InputError::Unreadable`] on I/O failure
/// - [`ParseError`] when the document is malformed
pub fn read_people(path: &Path) -> PipelineResult<Extraction> {
    if !is_xml_file(path) {
        return Err(InputError::NotXml(path.to_path_buf()).into());
    }

    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            InputError::NotFound(path.to_path_buf())
        } else {
            InputError::Unreadable { path: path.to_path_buf(), source }
        }
    })?;

    let (content, encoding) = decode_content(&bytes);
    log_info(format!("Decoded {} bytes as {}", bytes.len(), encoding.name()));

    let records = parse_people_str(&content, &path.display().to_string())?;
    log_success(format!("Extracted {} person record(s)", records.len()));

    Ok(Extraction {
        records,
        encoding: encoding.name().to_string(),
    })
}

// =============================================================================
// Field selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Id,
    Dob,
    Street,
    City,
    State,
    Zipcode,
    Country,
}

impl Field {
    /// Field addressed by an element path relative to `<person>`.
    fn at(path: &[String]) -> Option<Self> {
        match path {
            [leaf] => match leaf.as_str() {
                "name" => Some(Field::Name),
                "id" => Some(Field::Id),
                "dob" => Some(Field::Dob),
                _ => None,
            },
            [group, leaf] if group == "address" => match leaf.as_str() {
                "street" => Some(Field::Street),
                "city" => Some(Field::City),
                "state" => Some(Field::State),
                "zipcode" => Some(Field::Zipcode),
                "country" => Some(Field::Country),
                _ => None,
            },
            _ => None,
        }
    }

    fn slot<'a>(&self, person: &'a mut RawPerson) -> &'a mut String {
        match self {
            Field::Name => &mut person.name,
            Field::Id => &mut person.id,
            Field::Dob => &mut person.dob,
            Field::Street => &mut person.street,
            Field::City => &mut person.city,
            Field::State => &mut person.state,
            Field::Zipcode => &mut person.zipcode,
            Field::Country => &mut person.country,
        }
    }
}

/// Person under construction. The first occurrence of each field wins.
#[derive(Default)]
struct PersonBuilder {
    person: RawPerson,
    filled: Vec<Field>,
    capture: Option<Capture>,
}

/// Text of the field element currently open.
struct Capture {
    field: Field,
    depth: usize,
    text: String,
    /// Only text before the first child element counts.
    closed: bool,
}

impl PersonBuilder {
    fn open_field(&mut self, field: Field, depth: usize) {
        if self.capture.is_none() && !self.filled.contains(&field) {
            self.capture = Some(Capture { field, depth, text: String::new(), closed: false });
        }
    }

    fn close_field(&mut self, depth: usize) {
        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                *capture.field.slot(&mut self.person) = capture.text;
                self.filled.push(capture.field);
            }
        }
    }

    fn child_opened(&mut self, depth: usize) {
        if let Some(capture) = self.capture.as_mut() {
            if depth > capture.depth {
                capture.closed = true;
            }
        }
    }

    fn push_text(&mut self, depth: usize, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            if capture.depth == depth && !capture.closed {
                capture.text.push_str(text);
            }
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Extract people from an in-memory XML document.
///
/// `origin` names the source in error messages.
///
/// # Example
/// ```
/// let xml = "<people><person><name>Ada</name></person></people>";
/// let people = census::parse_people_str(xml, "inline").unwrap();
/// assert_eq!(people[0].name, "Ada");
/// assert_eq!(people[0].city, "");
/// ```
pub fn parse_people_str(content: &str, origin: &str) -> ParseResult<Vec<RawPerson>> {
    let mut reader = Reader::from_str(content);
    let malformed = |reader: &Reader<&[u8]>, message: String| ParseError::Malformed {
        origin: origin.to_string(),
        position: reader.error_position() as u64,
        message,
    };

    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<String> = None;
    let mut current: Option<PersonBuilder> = None;
    let mut people = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(malformed(&reader, e.to_string())),
        };

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if stack.is_empty() {
                    if root.is_some() {
                        return Err(malformed(&reader, format!("extra root element <{}>", name)));
                    }
                    root = Some(name.clone());
                }
                stack.push(name);
                let depth = stack.len();

                if let Some(builder) = current.as_mut() {
                    builder.child_opened(depth);
                    if let Some(field) = Field::at(&stack[2..]) {
                        builder.open_field(field, depth);
                    }
                } else if is_person_path(&stack) {
                    current = Some(PersonBuilder::default());
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if stack.is_empty() {
                    if root.is_some() {
                        return Err(malformed(&reader, format!("extra root element <{}>", name)));
                    }
                    root = Some(name.clone());
                }
                stack.push(name);
                let depth = stack.len();

                if let Some(builder) = current.as_mut() {
                    builder.child_opened(depth);
                    if let Some(field) = Field::at(&stack[2..]) {
                        builder.open_field(field, depth);
                        builder.close_field(depth);
                    }
                } else if is_person_path(&stack) {
                    people.push(RawPerson::default());
                }
                stack.pop();
            }
            Event::End(_) => {
                let depth = stack.len();
                if let Some(builder) = current.as_mut() {
                    builder.close_field(depth);
                }
                if is_person_path(&stack) {
                    if let Some(builder) = current.take() {
                        people.push(builder.person);
                    }
                }
                stack.pop();
            }
            Event::Text(t) => {
                if let Some(builder) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| malformed(&reader, e.to_string()))?;
                    builder.push_text(stack.len(), &text);
                }
            }
            Event::CData(c) => {
                if let Some(builder) = current.as_mut() {
                    let bytes = c.into_inner();
                    builder.push_text(stack.len(), &String::from_utf8_lossy(&bytes));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::UnexpectedEof {
            origin: origin.to_string(),
            open: stack.len(),
        });
    }
    if root.is_none() {
        return Err(ParseError::NoRoot { origin: origin.to_string() });
    }

    Ok(people)
}

fn is_person_path(stack: &[String]) -> bool {
    matches!(stack, [root, person] if root == ROOT_ELEMENT && person == PERSON_ELEMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const TWO_PEOPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<people>
  <person>
    <name>Homer Simpson</name>
    <id>1</id>
    <dob>1956-05-12</dob>
    <address>
      <street>742 Evergreen Terrace</street>
      <city>Springfield</city>
      <state>OR</state>
      <zipcode>97403</zipcode>
      <country>USA</country>
    </address>
  </person>
  <person>
    <name>Bart Simpson</name>
    <id>2</id>
    <address>
      <city>Springfield</city>
      <zipcode>97403</zipcode>
    </address>
  </person>
</people>"#;

    #[test]
    fn test_is_xml_file_case_insensitive() {
        assert!(is_xml_file("people.xml"));
        assert!(is_xml_file("PEOPLE.XML"));
        assert!(is_xml_file("dir/people.Xml"));
        assert!(!is_xml_file("people.csv"));
        assert!(!is_xml_file("people"));
        assert!(!is_xml_file("xml"));
    }

    #[test]
    fn test_extracts_all_fields() {
        let people = parse_people_str(TWO_PEOPLE, "test").unwrap();
        assert_eq!(people.len(), 2);

        let homer = &people[0];
        assert_eq!(homer.name, "Homer Simpson");
        assert_eq!(homer.id, "1");
        assert_eq!(homer.dob, "1956-05-12");
        assert_eq!(homer.street, "742 Evergreen Terrace");
        assert_eq!(homer.city, "Springfield");
        assert_eq!(homer.state, "OR");
        assert_eq!(homer.zipcode, "97403");
        assert_eq!(homer.country, "USA");
    }

    #[test]
    fn test_missing_children_are_empty() {
        let people = parse_people_str(TWO_PEOPLE, "test").unwrap();
        let bart = &people[1];
        assert_eq!(bart.dob, "");
        assert_eq!(bart.street, "");
        assert_eq!(bart.state, "");
        assert_eq!(bart.country, "");
        assert_eq!(bart.city, "Springfield");
    }

    #[test]
    fn test_text_is_not_trimmed_and_entities_unescaped() {
        let xml = "<people><person><name> Tom &amp; Jerry </name>\
                   <address><zipcode> 12345</zipcode></address></person></people>";
        let people = parse_people_str(xml, "test").unwrap();
        assert_eq!(people[0].name, " Tom & Jerry ");
        assert_eq!(people[0].zipcode, " 12345");
    }

    #[test]
    fn test_cdata_and_self_closing_elements() {
        let xml = "<people><person><name><![CDATA[<Lisa>]]></name><id/></person><person/></people>";
        let people = parse_people_str(xml, "test").unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "<Lisa>");
        assert_eq!(people[0].id, "");
        assert_eq!(people[1], RawPerson::default());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let xml = "<people><person><name>First</name><name>Second</name>\
                   <address><city>A</city></address><address><city>B</city></address>\
                   </person></people>";
        let people = parse_people_str(xml, "test").unwrap();
        assert_eq!(people[0].name, "First");
        assert_eq!(people[0].city, "A");
    }

    #[test]
    fn test_only_direct_person_children_of_root() {
        let xml = "<people><group><person><name>Nested</name></person></group>\
                   <person><name>Direct</name></person></people>";
        let people = parse_people_str(xml, "test").unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Direct");

        let other_root = "<folks><person><name>X</name></person></folks>";
        assert!(parse_people_str(other_root, "test").unwrap().is_empty());
    }

    #[test]
    fn test_fields_outside_address_are_ignored() {
        let xml = "<people><person><city>Wrong</city><address><city>Right</city></address></person></people>";
        let people = parse_people_str(xml, "test").unwrap();
        assert_eq!(people[0].city, "Right");
    }

    #[test]
    fn test_malformed_xml_names_origin() {
        let err = parse_people_str("<people><person></people>", "broken.xml").unwrap_err();
        assert!(err.to_string().contains("broken.xml"));

        let err = parse_people_str("<people><person>", "truncated.xml").unwrap_err();
        assert!(err.to_string().contains("truncated.xml"));

        let err = parse_people_str("", "empty.xml").unwrap_err();
        assert!(matches!(err, ParseError::NoRoot { .. }));

        let err = parse_people_str("<people/><people/>", "twice.xml").unwrap_err();
        assert!(err.to_string().contains("extra root"));
    }

    #[test]
    fn test_detect_declared_encoding() {
        let bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><people/>"#;
        assert_eq!(detect_encoding(bytes), Some(encoding_rs::WINDOWS_1252));

        let bytes = b"<people/>";
        assert_eq!(detect_encoding(bytes), None);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Jos\xe9" is "José" in ISO-8859-1
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><people><person><name>Jos"#.to_vec();
        bytes.extend_from_slice(&[0xE9]);
        bytes.extend_from_slice(b"</name></person></people>");

        let (content, _) = decode_content(&bytes);
        let people = parse_people_str(&content, "latin1").unwrap();
        assert_eq!(people[0].name, "José");
    }

    #[test]
    fn test_read_people_rejects_non_xml_extension() {
        let err = read_people(Path::new("people.json")).unwrap_err();
        assert_eq!(err.stage(), "input");
    }

    #[test]
    fn test_read_people_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_people(&dir.path().join("absent.xml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::Input(InputError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_people_from_file() {
        let mut file = tempfile::Builder::new().suffix(".XML").tempfile().unwrap();
        file.write_all(TWO_PEOPLE.as_bytes()).unwrap();

        let extraction = read_people(file.path()).unwrap();
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.encoding, "UTF-8");
    }

    #[test]
    fn test_read_people_parse_error_is_parse_stage() {
        let mut file: NamedTempFile = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(b"<people><person>").unwrap();

        let err = read_people(file.path()).unwrap_err();
        assert_eq!(err.stage(), "parse");
    }
}
