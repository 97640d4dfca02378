//! Zip packaging of a [`Presentation`] into the OPC parts PowerPoint expects.

use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::xml::{self, escape, XML_DECLARATION};
use super::{DeckResult, Presentation, SlidePage};

/// First `p:sldId`; lower values are reserved.
const FIRST_SLIDE_ID: usize = 256;
/// Presentation rels: rId1 master, rId2 theme, slides from rId3.
const FIRST_SLIDE_REL: usize = 3;
/// Slide rels: rId1 layout, media from rId2.
const FIRST_MEDIA_REL: usize = 2;

pub fn write_package(presentation: &Presentation) -> DeckResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // PNG is already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let slide_count = presentation.slides.len();

    add_part(&mut zip, "[Content_Types].xml", content_types(slide_count).as_bytes(), deflated)?;
    add_part(&mut zip, "_rels/.rels", package_rels().as_bytes(), deflated)?;
    add_part(
        &mut zip,
        "docProps/core.xml",
        core_properties(&presentation.title).as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/presentation.xml",
        presentation_xml(presentation)?.as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(slide_count).as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        xml::slide_master().as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        xml::relationships([
            ("rId1".to_string(), xml::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
            ("rId2".to_string(), xml::REL_THEME, "../theme/theme1.xml".to_string()),
        ])
        .as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/slideLayouts/slideLayout1.xml",
        xml::blank_layout().as_bytes(),
        deflated,
    )?;
    add_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        xml::relationships([(
            "rId1".to_string(),
            xml::REL_SLIDE_MASTER,
            "../slideMasters/slideMaster1.xml".to_string(),
        )])
        .as_bytes(),
        deflated,
    )?;
    add_part(&mut zip, "ppt/theme/theme1.xml", xml::theme().as_bytes(), deflated)?;

    // Media parts are numbered across the whole deck.
    let mut next_media = 1;
    for (index, slide) in presentation.slides.iter().enumerate() {
        let number = index + 1;
        let media_names: Vec<String> = (0..slide.media.len())
            .map(|i| format!("image{}.png", next_media + i))
            .collect();
        next_media += slide.media.len();

        add_part(
            &mut zip,
            &format!("ppt/slides/slide{number}.xml"),
            slide_xml(slide)?.as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            slide_rels(&media_names).as_bytes(),
            deflated,
        )?;
        for (name, png) in media_names.iter().zip(&slide.media) {
            add_part(&mut zip, &format!("ppt/media/{name}"), png, stored)?;
        }
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn add_part(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    body: &[u8],
    options: SimpleFileOptions,
) -> DeckResult<()> {
    zip.start_file(path, options)?;
    zip.write_all(body)?;
    Ok(())
}

fn content_types(slide_count: usize) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(XML_DECLARATION);
    out.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    out.push_str(&format!(
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        xml::CT_RELATIONSHIPS
    ));
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    out.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), xml::CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), xml::CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), xml::CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), xml::CT_THEME),
        ("/docProps/core.xml".to_string(), xml::CT_CORE_PROPERTIES),
    ];
    for number in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{number}.xml"), xml::CT_SLIDE));
    }
    for (part, content_type) in overrides {
        out.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }

    out.push_str("</Types>");
    out
}

fn package_rels() -> String {
    xml::relationships([
        ("rId1".to_string(), xml::REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        ("rId2".to_string(), xml::REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
    ])
}

fn core_properties(title: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>deckgen</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        decl = XML_DECLARATION,
        title = escape(title),
        now = now,
    )
}

fn presentation_xml(presentation: &Presentation) -> DeckResult<String> {
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    write!(
        out,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        xml::NS_A,
        xml::NS_R,
        xml::NS_P
    )?;
    out.push_str(
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
    );
    if !presentation.slides.is_empty() {
        out.push_str("<p:sldIdLst>");
        for index in 0..presentation.slides.len() {
            write!(
                out,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                FIRST_SLIDE_REL + index
            )?;
        }
        out.push_str("</p:sldIdLst>");
    }
    write!(
        out,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/>"#,
        presentation.width, presentation.height, presentation.height, presentation.width
    )?;
    out.push_str("</p:presentation>");
    Ok(out)
}

fn presentation_rels(slide_count: usize) -> String {
    let mut rels = vec![
        (
            "rId1".to_string(),
            xml::REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), xml::REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for index in 0..slide_count {
        rels.push((
            format!("rId{}", FIRST_SLIDE_REL + index),
            xml::REL_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        ));
    }
    xml::relationships(rels)
}

fn slide_rels(media_names: &[String]) -> String {
    let mut rels = vec![(
        "rId1".to_string(),
        xml::REL_SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml".to_string(),
    )];
    for (i, name) in media_names.iter().enumerate() {
        rels.push((
            format!("rId{}", FIRST_MEDIA_REL + i),
            xml::REL_IMAGE,
            format!("../media/{name}"),
        ));
    }
    xml::relationships(rels)
}

pub(crate) fn slide_xml(slide: &SlidePage) -> DeckResult<String> {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    write!(
        out,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
        xml::NS_A,
        xml::NS_R,
        xml::NS_P
    )?;

    if let Some(ref background) = slide.background {
        out.push_str("<p:bg><p:bgPr>");
        background.0.write_xml(&mut out)?;
        out.push_str("<a:effectLst/></p:bgPr></p:bg>");
    }

    out.push_str(concat!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
    ));
    for shape in &slide.shapes {
        shape.write_xml(&mut out, |media| format!("rId{}", FIRST_MEDIA_REL + media))?;
    }
    out.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(out)
}
