use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;
use tracing::debug;

use crate::error::{BdmtError, ParseFailure, Result};

/// Namespace of the `discinfo` block inside a `bdmt_*.xml` descriptor.
pub const DISCINFO_NAMESPACE: &str = "urn:BDA:bdmv;discinfo";

/// Authoring tools leave this in place of a real title.
const PLACEHOLDER_TITLE: &str = "blu-ray";

type ParseResult<T> = std::result::Result<T, ParseFailure>;

/// A parsed Blu-ray `bdmt_*.xml` descriptor.
///
/// Only the disc title is extracted. A descriptor that cannot be read or
/// parsed still produces a value, just without a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataFile {
    path: PathBuf,
    disc_title: Option<String>,
}

impl MetadataFile {
    /// Parse the descriptor at `path`.
    ///
    /// Fails only when `path` does not exist. Read and parse errors leave
    /// [`disc_title`](Self::disc_title) empty.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BdmtError::NotFound(path.to_path_buf()));
        }

        let disc_title = read_disc_title(path)
            .unwrap_or_else(|failure| discard(path, failure));

        Ok(Self {
            path: path.to_path_buf(),
            disc_title,
        })
    }

    /// Build from descriptor text that was already loaded from `path`.
    pub fn from_xml<P: Into<PathBuf>>(path: P, xml: &str) -> Self {
        let path = path.into();
        let disc_title = parse_disc_title(xml)
            .unwrap_or_else(|failure| discard(&path, failure));

        Self { path, disc_title }
    }

    /// Where the descriptor was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Trimmed disc title, if the descriptor carries a real one.
    pub fn disc_title(&self) -> Option<&str> {
        self.disc_title.as_deref()
    }

    /// Consume and return the disc title.
    pub fn into_disc_title(self) -> Option<String> {
        self.disc_title
    }
}

impl fmt::Display for MetadataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.disc_title().unwrap_or("Unknown Title");
        write!(f, "<BDMTMetadata title='{title}'>")
    }
}

fn discard(path: &Path, failure: ParseFailure) -> Option<String> {
    debug!(
        "Ignoring unreadable disc metadata {}: {}",
        path.display(),
        failure
    );
    None
}

fn read_disc_title(path: &Path) -> ParseResult<Option<String>> {
    let bytes = fs::read(path)?;
    parse_disc_title(&decode(bytes)?)
}

/// UTF-8, or UTF-16 when the file starts with a UTF-16 byte order mark.
fn decode(bytes: Vec<u8>) -> ParseResult<String> {
    let big_endian = match bytes.get(..2).map(|bom| [bom[0], bom[1]]) {
        Some([0xff, 0xfe]) => false,
        Some([0xfe, 0xff]) => true,
        _ => return String::from_utf8(bytes).map_err(invalid_data),
    };

    if bytes.len() % 2 != 0 {
        return Err(invalid_data("truncated UTF-16 descriptor"));
    }
    let units: Vec<u16> = bytes[2..]
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(invalid_data)
}

fn invalid_data<E>(err: E) -> ParseFailure
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    ParseFailure::Io(io::Error::new(io::ErrorKind::InvalidData, err))
}

fn parse_disc_title(xml: &str) -> ParseResult<Option<String>> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(xml, options)?;

    Ok(title_name_node(&document)
        .map(leading_text)
        .and_then(|text| normalize_title(&text)))
}

/// First `discinfo/title/name` chain in document order. `discinfo` may sit
/// at any depth, `title` and `name` must be direct children. Every `title`
/// of every `discinfo` is tried until one has a `name`.
fn title_name_node<'a, 'input>(
    document: &'a Document<'input>,
) -> Option<Node<'a, 'input>> {
    document
        .descendants()
        .filter(|node| is_discinfo(node, "discinfo"))
        .flat_map(|discinfo| discinfo_children(discinfo, "title"))
        .find_map(|title| discinfo_children(title, "name").next())
}

fn discinfo_children<'a, 'input>(
    parent: Node<'a, 'input>,
    name: &str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent.children().filter(move |node| is_discinfo(node, name))
}

/// Text before the first child element. Comments and processing
/// instructions in between are skipped.
fn leading_text(node: Node<'_, '_>) -> String {
    node.children()
        .take_while(|child| !child.is_element())
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

fn is_discinfo(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.has_tag_name((DISCINFO_NAMESPACE, name))
}

fn normalize_title(raw: &str) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() || title.to_lowercase() == PLACEHOLDER_TITLE {
        return None;
    }
    Some(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<disclib xmlns="urn:BDA:bdmv;disclib" xmlns:di="urn:BDA:bdmv;discinfo">
  <di:discinfo>
    <di:date>2008-12-09</di:date>
    <di:title>
      <di:name>{name}</di:name>
      <di:numSets>1</di:numSets>
      <di:setNumber>1</di:setNumber>
    </di:title>
    <di:description>
      <di:thumbnail href="MENU_SMALL.JPG" size="416x240" />
    </di:description>
    <di:language>eng</di:language>
  </di:discinfo>
</disclib>
"#
        )
    }

    fn title_of(xml: &str) -> Option<String> {
        parse_disc_title(xml).unwrap()
    }

    #[test]
    fn extracts_title() {
        assert_eq!(title_of(&descriptor("MATRIX")), Some("MATRIX".into()));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            title_of(&descriptor("\n   Inception \t")),
            Some("Inception".into())
        );
    }

    #[test]
    fn drops_placeholder_in_any_case() {
        for placeholder in ["Blu-ray", "BLU-RAY", "blu-ray", "  Blu-Ray  "] {
            assert_eq!(title_of(&descriptor(placeholder)), None, "{placeholder}");
        }
    }

    #[test]
    fn keeps_titles_that_merely_contain_placeholder() {
        assert_eq!(
            title_of(&descriptor("Blu-ray Bonus Disc")),
            Some("Blu-ray Bonus Disc".into())
        );
    }

    #[test]
    fn empty_name_is_absent() {
        assert_eq!(title_of(&descriptor("")), None);
        assert_eq!(title_of(&descriptor("   ")), None);
    }

    #[test]
    fn discinfo_as_document_root() {
        let xml = r#"<discinfo xmlns="urn:BDA:bdmv;discinfo">
  <title><name>Root Level</name></title>
</discinfo>"#;
        assert_eq!(title_of(xml), Some("Root Level".into()));
    }

    #[test]
    fn tolerates_wrapper_elements() {
        let xml = r#"<outer><inner xmlns:di="urn:BDA:bdmv;discinfo">
  <di:discinfo><di:title><di:name>Wrapped</di:name></di:title></di:discinfo>
</inner></outer>"#;
        assert_eq!(title_of(xml), Some("Wrapped".into()));
    }

    #[test]
    fn ignores_wrong_namespace() {
        let xml = r#"<disclib xmlns:x="urn:example:other">
  <x:discinfo><x:title><x:name>Nope</x:name></x:title></x:discinfo>
</disclib>"#;
        assert_eq!(title_of(xml), None);

        let unqualified =
            "<disclib><discinfo><title><name>Nope</name></title></discinfo></disclib>";
        assert_eq!(title_of(unqualified), None);
    }

    #[test]
    fn title_and_name_must_be_direct_children() {
        let xml = r#"<disclib xmlns:di="urn:BDA:bdmv;discinfo">
  <di:discinfo><di:wrap><di:title><di:name>Deep</di:name></di:title></di:wrap></di:discinfo>
</disclib>"#;
        assert_eq!(title_of(xml), None);
    }

    #[test]
    fn skips_discinfo_without_title() {
        let xml = r#"<disclib xmlns:di="urn:BDA:bdmv;discinfo">
  <di:discinfo><di:language>eng</di:language></di:discinfo>
  <di:discinfo><di:title><di:name>Second</di:name></di:title></di:discinfo>
</disclib>"#;
        assert_eq!(title_of(xml), Some("Second".into()));
    }

    #[test]
    fn accepts_bom_and_doctype() {
        let xml = format!(
            "\u{feff}<?xml version=\"1.0\"?>\n<!DOCTYPE disclib>\n{}",
            descriptor("WALL-E").split_once('\n').unwrap().1
        );
        assert_eq!(title_of(&xml), Some("WALL-E".into()));
    }

    #[test]
    fn later_title_supplies_name() {
        let xml = r#"<disclib xmlns:di="urn:BDA:bdmv;discinfo">
  <di:discinfo>
    <di:title><di:numSets>1</di:numSets></di:title>
    <di:title><di:name>Second Title</di:name></di:title>
  </di:discinfo>
</disclib>"#;
        assert_eq!(title_of(xml), Some("Second Title".into()));
    }

    #[test]
    fn comments_inside_name_are_skipped() {
        assert_eq!(
            title_of(&descriptor("<!-- c -->Commented")),
            Some("Commented".into())
        );
        assert_eq!(
            title_of(&descriptor("Dark <!-- x --> City")),
            Some("Dark  City".into())
        );
    }

    #[test]
    fn text_after_child_element_is_not_the_title() {
        assert_eq!(title_of(&descriptor("<di:sub/>Tail")), None);
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let xml = descriptor("Amélie");

        let mut le = vec![0xff, 0xfe];
        le.extend(xml.encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(title_of(&decode(le).unwrap()), Some("Amélie".into()));

        let mut be = vec![0xfe, 0xff];
        be.extend(xml.encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(title_of(&decode(be).unwrap()), Some("Amélie".into()));
    }

    #[test]
    fn rejects_odd_length_utf16_and_bad_utf8() {
        assert!(matches!(
            decode(vec![0xff, 0xfe, 0x3c]),
            Err(ParseFailure::Io(_))
        ));
        assert!(matches!(
            decode(vec![0x3c, 0xc3]),
            Err(ParseFailure::Io(_))
        ));
    }

    #[test]
    fn malformed_xml_is_a_parse_failure() {
        let err = parse_disc_title("<disclib><di:discinfo>").unwrap_err();
        assert!(matches!(err, ParseFailure::Xml(_)));
    }

    #[test]
    fn from_xml_swallows_parse_failure() {
        let metadata = MetadataFile::from_xml("/disc/bdmt_eng.xml", "not xml");
        assert_eq!(metadata.path(), Path::new("/disc/bdmt_eng.xml"));
        assert_eq!(metadata.disc_title(), None);
    }

    #[test]
    fn display_falls_back_to_unknown() {
        let titled =
            MetadataFile::from_xml("bdmt_eng.xml", &descriptor("Alien"));
        assert_eq!(titled.to_string(), "<BDMTMetadata title='Alien'>");

        let untitled = MetadataFile::from_xml("bdmt_eng.xml", "");
        assert_eq!(untitled.to_string(), "<BDMTMetadata title='Unknown Title'>");
    }
}
