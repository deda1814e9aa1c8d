use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

use super::html::html_to_text;

const CONTAINER_PATH: &str = "META-INF/container.xml";
const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Extract text from an EPUB: every XHTML manifest item, in manifest order
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("EPUB is not a valid zip archive")?;

    let container = read_entry(&mut archive, CONTAINER_PATH)?;
    let package_path = rootfile_path(&container)?;
    let package = read_entry(&mut archive, &package_path)?;

    // Manifest hrefs are relative to the package document
    let base_dir = match package_path.rfind('/') {
        Some(i) => &package_path[..=i],
        None => "",
    };

    let hrefs = xhtml_manifest_hrefs(&package)?;
    tracing::debug!(package = %package_path, documents = hrefs.len(), "Read EPUB manifest");

    let mut chapters = Vec::with_capacity(hrefs.len());
    for href in hrefs {
        let path = resolve_href(base_dir, &href);
        let markup = read_entry(&mut archive, &path)?;
        chapters.push(html_to_text(&markup));
    }

    Ok(chapters.join("\n"))
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .with_context(|| format!("EPUB entry missing: {}", path))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read EPUB entry as UTF-8: {}", path))?;

    Ok(content)
}

/// Location of the OPF package named by `META-INF/container.xml`
fn rootfile_path(container: &str) -> Result<String> {
    let mut reader = Reader::from_str(container);

    loop {
        match reader.read_event().context("Malformed EPUB container.xml")? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path")? {
                    return Ok(path);
                }
            }
            Event::Eof => bail!("EPUB container.xml does not name a package document"),
            _ => {}
        }
    }
}

/// Hrefs of manifest items whose media type is XHTML
fn xhtml_manifest_hrefs(package: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(package);
    let mut hrefs = Vec::new();

    loop {
        match reader.read_event().context("Malformed EPUB package document")? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"item" => {
                let media_type = attribute(&e, b"media-type")?;
                if media_type.as_deref() == Some(XHTML_MEDIA_TYPE)
                    && let Some(href) = attribute(&e, b"href")?
                {
                    hrefs.push(href);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(hrefs)
}

fn attribute(element: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.context("Malformed XML attribute")?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .context("Malformed XML attribute value")?;
            return Ok(Some(value.into_owned()));
        }
    }

    Ok(None)
}

/// Join a manifest href onto the package directory, resolving `.` and `..`.
/// Hrefs are URL-encoded while zip entry names are not.
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let href = urlencoding::decode(href).unwrap_or(Cow::Borrowed(href));
    let mut segments: Vec<&str> = Vec::new();

    for segment in base_dir.split('/').chain(href.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures;

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("OEBPS/", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("OEBPS/text/", "../ch2.xhtml#top"), "OEBPS/ch2.xhtml");
        assert_eq!(resolve_href("", "./ch3.xhtml"), "ch3.xhtml");
        assert_eq!(resolve_href("OEBPS/", "Chapter%201.xhtml"), "OEBPS/Chapter 1.xhtml");
        assert_eq!(resolve_href("", "caf%C3%A9.xhtml#s1"), "café.xhtml");
    }

    #[test]
    fn test_encoded_href_finds_entry() {
        let container = r#"<container><rootfiles>
            <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
        </rootfiles></container>"#;
        let package = r#"<package><manifest>
            <item id="c1" href="Chapter%201.xhtml" media-type="application/xhtml+xml"/>
        </manifest></package>"#;
        let bytes = fixtures::zip(&[
            ("META-INF/container.xml", container),
            ("OEBPS/content.opf", package),
            ("OEBPS/Chapter 1.xhtml", "<html><body><p>Spaced name</p></body></html>"),
        ]);

        assert_eq!(extract_text(&bytes).unwrap(), "Spaced name");
    }

    #[test]
    fn test_rootfile_path() {
        let container = r#"<container><rootfiles>
            <rootfile full-path="content/book.opf" media-type="application/oebps-package+xml"/>
        </rootfiles></container>"#;
        assert_eq!(rootfile_path(container).unwrap(), "content/book.opf");
    }

    #[test]
    fn test_container_without_rootfile() {
        let err = rootfile_path("<container><rootfiles/></container>").unwrap_err();
        assert!(err.to_string().contains("package document"));
    }

    #[test]
    fn test_only_xhtml_items_in_manifest_order() {
        let package = r#"<package><manifest>
            <item id="b" href="b.xhtml" media-type="application/xhtml+xml"/>
            <item id="img" href="cover.jpg" media-type="image/jpeg"/>
            <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
            <item id="nav" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
        </manifest></package>"#;
        assert_eq!(xhtml_manifest_hrefs(package).unwrap(), vec!["b.xhtml", "a.xhtml"]);
    }

    #[test]
    fn test_extract_chapters() {
        let bytes = fixtures::epub(&["<h1>One</h1><p>First chapter.</p>", "<p>Second.</p>"]);
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "One\nFirst chapter.\nSecond.");
    }

    #[test]
    fn test_missing_container() {
        let bytes = fixtures::zip(&[("mimetype", "application/epub+zip")]);
        let err = extract_text(&bytes).unwrap_err();
        assert!(err.to_string().contains(CONTAINER_PATH));
    }
}
