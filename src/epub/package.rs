//! Container and package document (OPF) parsing.
//!
//! Elements and attributes are matched by local name so that prefixed
//! (`dc:identifier`, `opf:scheme`) and unprefixed documents read the same.

use roxmltree::{Document, Node, ParsingOptions};

use super::archive::{decode_text, normalize_entry_name, EpubArchive, CONTAINER_PATH};
use super::EpubError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Identifier {
    pub id: Option<String>,
    pub scheme: Option<String>,
    pub value: String,
}

/// A `<meta>` element, covering both the EPUB2 `name`/`content` form and
/// the EPUB3 `property`/`refines` form where the value is the element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MetaEntry {
    pub name: Option<String>,
    pub property: Option<String>,
    pub refines: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: Option<String>,
}

#[derive(Debug, Default)]
pub(super) struct PackageDocument {
    /// Archive path of the package document itself.
    pub path: String,
    pub identifiers: Vec<Identifier>,
    pub metas: Vec<MetaEntry>,
    pub manifest: Vec<ManifestItem>,
    /// Text of every element whose local name ends in "identifier", in
    /// document order. Only consulted when `identifiers` is empty.
    pub loose_identifiers: Vec<String>,
}

impl PackageDocument {
    /// Directory of the package document inside the archive, with a
    /// trailing slash, or empty when it sits at the archive root.
    pub fn base_dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..=idx],
            None => "",
        }
    }

    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }
}

fn parsing_options() -> ParsingOptions {
    let mut options = ParsingOptions::default();
    // Plenty of OPF files in the wild still carry a DOCTYPE.
    options.allow_dtd = true;
    options
}

fn attr<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}

fn non_empty_attr(node: &Node, name: &str) -> Option<String> {
    attr(node, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn has_local_name(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

fn element_text(node: &Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns the archive path of the package document named by the first
/// `rootfile` in the container.
pub(super) fn parse_container(xml: &str) -> Result<String, EpubError> {
    let doc = Document::parse_with_options(xml, parsing_options())
        .map_err(|e| EpubError::MalformedContainer(e.to_string()))?;

    let rootfile = doc
        .descendants()
        .find(|n| has_local_name(n, "rootfile"))
        .ok_or_else(|| EpubError::MalformedContainer("no rootfile entries".to_string()))?;

    attr(&rootfile, "full-path")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(normalize_entry_name)
        .ok_or_else(|| EpubError::MalformedContainer("rootfile has no full-path".to_string()))
}

pub(super) fn parse_package(path: &str, xml: &str) -> Result<PackageDocument, EpubError> {
    let doc = Document::parse_with_options(xml, parsing_options())
        .map_err(|e| EpubError::MalformedPackage(e.to_string()))?;

    let mut package = PackageDocument {
        path: path.to_string(),
        ..Default::default()
    };

    if let Some(metadata) = doc.descendants().find(|n| has_local_name(n, "metadata")) {
        for node in metadata.descendants() {
            if has_local_name(&node, "identifier") {
                package.identifiers.push(Identifier {
                    id: non_empty_attr(&node, "id"),
                    scheme: non_empty_attr(&node, "scheme"),
                    value: element_text(&node),
                });
            }
        }
    }

    for node in doc.descendants().filter(|n| has_local_name(n, "meta")) {
        let text = element_text(&node);
        package.metas.push(MetaEntry {
            name: non_empty_attr(&node, "name"),
            property: non_empty_attr(&node, "property"),
            refines: non_empty_attr(&node, "refines"),
            content: non_empty_attr(&node, "content").or((!text.is_empty()).then_some(text)),
        });
    }

    if let Some(manifest) = doc.descendants().find(|n| has_local_name(n, "manifest")) {
        for node in manifest.children().filter(|n| has_local_name(n, "item")) {
            let (Some(id), Some(href)) = (non_empty_attr(&node, "id"), non_empty_attr(&node, "href"))
            else {
                continue;
            };
            package.manifest.push(ManifestItem {
                id,
                href,
                media_type: non_empty_attr(&node, "media-type"),
            });
        }
    }

    if package.identifiers.is_empty() {
        package.loose_identifiers = doc
            .descendants()
            .filter(|n| {
                n.is_element()
                    && n.tag_name()
                        .name()
                        .to_ascii_lowercase()
                        .ends_with("identifier")
            })
            .map(|n| element_text(&n))
            .filter(|t| !t.is_empty())
            .collect();
    }

    Ok(package)
}

/// Opens the archive, follows the container to the package document and
/// parses it. The archive is handed back so callers can read further
/// entries (the cover image) without reopening it.
pub(super) fn open_package(bytes: &[u8]) -> Result<(EpubArchive<'_>, PackageDocument), EpubError> {
    let mut archive = EpubArchive::open(bytes)?;

    let container = archive
        .read(CONTAINER_PATH)?
        .ok_or(EpubError::ContainerNotFound)?;
    let package_path = parse_container(&decode_text(&container))?;

    let package_xml = archive
        .read(&package_path)?
        .ok_or_else(|| EpubError::PackageNotFound(package_path.clone()))?;
    let package = parse_package(&package_path, &decode_text(&package_xml))?;

    Ok((archive, package))
}
