//! Shapes placed on a slide and their DrawingML serialization.

use std::fmt::Write as FmtWrite;

use super::geometry::{Emu, Rect, EMU_PER_POINT};
use super::xml::escape;
use super::DeckResult;

/// 24-bit colour, written as `RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    /// Two-stop linear gradient, top to bottom.
    Gradient(Rgb, Rgb),
}

impl Fill {
    pub(crate) fn write_xml(&self, xml: &mut String) -> DeckResult<()> {
        match self {
            Fill::Solid(color) => {
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.hex())?;
            }
            Fill::Gradient(from, to) => {
                xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst>"#);
                write!(xml, r#"<a:gs pos="0"><a:srgbClr val="{}"/></a:gs>"#, from.hex())?;
                write!(xml, r#"<a:gs pos="100000"><a:srgbClr val="{}"/></a:gs>"#, to.hex())?;
                xml.push_str(r#"</a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>"#);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur: Emu,
    pub distance: Emu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
}

impl Geometry {
    fn preset(self) -> &'static str {
        match self {
            Geometry::Rect => "rect",
            Geometry::RoundRect => "roundRect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
    pub typeface: Option<&'static str>,
}

impl Font {
    pub fn sized(size_pt: f64) -> Self {
        Self {
            size_pt,
            bold: false,
            italic: false,
            color: None,
            typeface: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn typeface(mut self, typeface: &'static str) -> Self {
        self.typeface = Some(typeface);
        self
    }
}

/// Bullet character with its hanging indent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub char: char,
    pub margin_left: Emu,
    pub indent: Emu,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub font: Font,
    pub align: Align,
    pub bullet: Option<Bullet>,
    pub space_after_pt: Option<f64>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
            align: Align::Left,
            bullet: None,
            space_after_pt: None,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn bullet(mut self, bullet: Bullet) -> Self {
        self.bullet = Some(bullet);
        self
    }

    pub fn space_after(mut self, points: f64) -> Self {
        self.space_after_pt = Some(points);
        self
    }

    fn write_xml(&self, xml: &mut String) -> DeckResult<()> {
        xml.push_str("<a:p>");

        let mut ppr_attrs = String::new();
        if let Some(ref bullet) = self.bullet {
            write!(ppr_attrs, r#" marL="{}" indent="{}""#, bullet.margin_left, bullet.indent)?;
        }
        if self.align == Align::Center {
            ppr_attrs.push_str(r#" algn="ctr""#);
        }
        if !ppr_attrs.is_empty() || self.space_after_pt.is_some() || self.bullet.is_some() {
            write!(xml, "<a:pPr{ppr_attrs}>")?;
            if let Some(points) = self.space_after_pt {
                write!(
                    xml,
                    r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
                    (points * 100.0).round() as i64
                )?;
            }
            if let Some(ref bullet) = self.bullet {
                write!(xml, r#"<a:buChar char="{}"/>"#, escape(&bullet.char.to_string()))?;
            }
            xml.push_str("</a:pPr>");
        }

        let rpr = self.run_properties()?;
        if self.text.is_empty() {
            write!(xml, "<a:endParaRPr{rpr}")?;
        } else {
            write!(xml, "<a:r><a:rPr{rpr}<a:t>{}</a:t></a:r>", escape(&self.text))?;
        }

        xml.push_str("</a:p>");
        Ok(())
    }

    /// Attributes and children of `a:rPr`/`a:endParaRPr`, closing tag included.
    fn run_properties(&self) -> DeckResult<String> {
        let font = &self.font;
        let mut rpr = String::new();
        write!(
            rpr,
            r#" lang="en-US" sz="{}""#,
            (font.size_pt * 100.0).round() as i64
        )?;
        if font.bold {
            rpr.push_str(r#" b="1""#);
        }
        if font.italic {
            rpr.push_str(r#" i="1""#);
        }
        rpr.push_str(r#" dirty="0""#);

        if font.color.is_none() && font.typeface.is_none() {
            rpr.push_str("/>");
            return Ok(rpr);
        }

        rpr.push('>');
        if let Some(color) = font.color {
            write!(rpr, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.hex())?;
        }
        if let Some(typeface) = font.typeface {
            write!(rpr, r#"<a:latin typeface="{}"/>"#, escape(typeface))?;
        }
        let closing = if self.text.is_empty() { "</a:endParaRPr>" } else { "</a:rPr>" };
        rpr.push_str(closing);
        Ok(rpr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Top,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
    pub fit_shape_to_text: bool,
    pub anchor: Anchor,
}

impl TextBody {
    pub fn texts(&self) -> Vec<&str> {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    fn write_xml(&self, xml: &mut String) -> DeckResult<()> {
        xml.push_str("<p:txBody>");
        let wrap = if self.word_wrap { "square" } else { "none" };
        write!(xml, r#"<a:bodyPr wrap="{wrap}" rtlCol="0""#)?;
        if self.anchor == Anchor::Middle {
            xml.push_str(r#" anchor="ctr""#);
        }
        if self.fit_shape_to_text {
            xml.push_str("><a:spAutoFit/></a:bodyPr>");
        } else {
            xml.push_str("/>");
        }
        xml.push_str("<a:lstStyle/>");

        if self.paragraphs.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(xml)?;
        }
        xml.push_str("</p:txBody>");
        Ok(())
    }
}

/// A text box or preset auto shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub frame: Rect,
    pub geometry: Geometry,
    pub is_text_box: bool,
    pub fill: Option<Fill>,
    pub line: Option<Rgb>,
    pub shadow: Option<Shadow>,
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Rect,
    /// Index into the slide's media list.
    pub media: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Auto(AutoShape),
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn frame(&self) -> Rect {
        match &self.kind {
            ShapeKind::Auto(s) => s.frame,
            ShapeKind::Picture(p) => p.frame,
        }
    }

    pub fn as_auto(&self) -> Option<&AutoShape> {
        match &self.kind {
            ShapeKind::Auto(s) => Some(s),
            ShapeKind::Picture(_) => None,
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ShapeKind::Picture(_))
    }

    /// Write `p:sp`/`p:pic`. `media_rel` maps a media index to its rel id.
    pub(crate) fn write_xml(
        &self,
        xml: &mut String,
        media_rel: impl Fn(usize) -> String,
    ) -> DeckResult<()> {
        match &self.kind {
            ShapeKind::Auto(shape) => self.write_auto(xml, shape),
            ShapeKind::Picture(picture) => {
                xml.push_str("<p:pic><p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="{}" descr="{}"/>"#,
                    self.id,
                    escape(&self.name),
                    escape(&picture.description)
                )?;
                xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                    media_rel(picture.media)
                )?;
                xml.push_str("<p:spPr>");
                write_xfrm(xml, picture.frame)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
                Ok(())
            }
        }
    }

    fn write_auto(&self, xml: &mut String, shape: &AutoShape) -> DeckResult<()> {
        xml.push_str("<p:sp><p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, self.id, escape(&self.name))?;
        xml.push_str(if shape.is_text_box {
            r#"<p:cNvSpPr txBox="1"/>"#
        } else {
            "<p:cNvSpPr/>"
        });
        xml.push_str("<p:nvPr/></p:nvSpPr><p:spPr>");
        write_xfrm(xml, shape.frame)?;
        write!(
            xml,
            r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
            shape.geometry.preset()
        )?;
        match &shape.fill {
            Some(fill) => fill.write_xml(xml)?,
            None if shape.is_text_box => xml.push_str("<a:noFill/>"),
            None => {}
        }
        if let Some(line) = shape.line {
            write!(
                xml,
                r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                EMU_PER_POINT,
                line.hex()
            )?;
        }
        if let Some(shadow) = shape.shadow {
            write!(
                xml,
                concat!(
                    r#"<a:effectLst><a:outerShdw blurRad="{}" dist="{}" dir="5400000" algn="t" rotWithShape="0">"#,
                    r#"<a:srgbClr val="000000"><a:alpha val="35000"/></a:srgbClr></a:outerShdw></a:effectLst>"#
                ),
                shadow.blur, shadow.distance
            )?;
        }
        xml.push_str("</p:spPr>");

        match &shape.text {
            Some(text) => text.write_xml(xml)?,
            // Non-text autoshapes still carry an empty body so they can be edited.
            None => TextBody::default().write_xml(xml)?,
        }
        xml.push_str("</p:sp>");
        Ok(())
    }
}

fn write_xfrm(xml: &mut String, frame: Rect) -> DeckResult<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x,
        frame.y,
        frame.cx.max(0),
        frame.cy.max(0)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shape: &Shape) -> String {
        let mut xml = String::new();
        shape.write_xml(&mut xml, |i| format!("rId{}", i + 2)).unwrap();
        xml
    }

    #[test]
    fn colour_hex_is_upper_case() {
        assert_eq!(Rgb(255, 230, 10).hex(), "FFE60A");
    }

    #[test]
    fn bullet_paragraph_carries_char_and_indent() {
        let paragraph = Paragraph::new("Revenue up 12%", Font::sized(16.0).color(Rgb(60, 60, 60)))
            .bullet(Bullet {
                char: '•',
                margin_left: 342_900,
                indent: -171_450,
            })
            .space_after(6.0);
        let mut xml = String::new();
        paragraph.write_xml(&mut xml).unwrap();

        assert!(xml.starts_with(r#"<a:p><a:pPr marL="342900" indent="-171450">"#));
        assert!(xml.contains(r#"<a:spcAft><a:spcPts val="600"/></a:spcAft><a:buChar char="•"/>"#));
        assert!(xml.contains(r#"sz="1600""#));
        assert!(xml.contains("<a:t>Revenue up 12%</a:t>"));
        assert!(xml.contains(r#"<a:srgbClr val="3C3C3C"/>"#));
    }

    #[test]
    fn empty_paragraph_uses_end_run_properties() {
        let mut xml = String::new();
        Paragraph::new("", Font::sized(14.0).typeface("Segoe UI"))
            .write_xml(&mut xml)
            .unwrap();
        assert!(xml.contains("<a:endParaRPr"));
        assert!(xml.contains("</a:endParaRPr>"));
        assert!(!xml.contains("<a:r>"));
    }

    #[test]
    fn picture_references_media_relationship() {
        let shape = Shape {
            id: 4,
            name: "Picture 4".into(),
            kind: ShapeKind::Picture(Picture {
                frame: Rect::new(1, 2, 3, 4),
                media: 0,
                description: "chart \"growth\"".into(),
            }),
        };
        let xml = render(&shape);
        assert!(xml.contains(r#"r:embed="rId2""#));
        assert!(xml.contains(r#"descr="chart &quot;growth&quot;""#));
        assert!(xml.contains(r#"<a:off x="1" y="2"/><a:ext cx="3" cy="4"/>"#));
    }

    #[test]
    fn container_writes_fill_line_and_shadow_in_order() {
        let shape = Shape {
            id: 2,
            name: "Image Container 2".into(),
            kind: ShapeKind::Auto(AutoShape {
                frame: Rect::new(0, 0, 10, 10),
                geometry: Geometry::RoundRect,
                is_text_box: false,
                fill: Some(Fill::Gradient(Rgb(245, 245, 255), Rgb(225, 225, 240))),
                line: Some(Rgb(180, 180, 200)),
                shadow: Some(Shadow {
                    blur: 101_600,
                    distance: 50_800,
                }),
                text: None,
            }),
        };
        let xml = render(&shape);
        let grad = xml.find("<a:gradFill").unwrap();
        let line = xml.find("<a:ln ").unwrap();
        let shadow = xml.find("<a:outerShdw").unwrap();
        assert!(grad < line && line < shadow);
        assert!(xml.contains(r#"prst="roundRect""#));
        assert!(xml.contains(r#"blurRad="101600" dist="50800""#));
    }
}
