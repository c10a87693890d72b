// SPDX-License-Identifier: Apache-2.0

//! A4 PDF rendering of an exercise set.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rgb,
};
use tracing::debug;

use super::text::{html_to_text, wrap};
use super::{ExerciseSet, Question};
use crate::error::DocumentError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 15.0;
const WRAP_COLUMNS: usize = 90;
const TITLE_COLUMNS: usize = 70;
const LAYER: &str = "Layer 1";

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 0.3528;

const DEJAVU_DIR: &str = "/usr/share/fonts/truetype/dejavu";

/// Where the renderer takes its fonts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// PDF base-14 Helvetica family.
    Builtin,
    /// TrueType regular/bold/italic files.
    External {
        /// Regular face.
        regular: PathBuf,
        /// Bold face.
        bold: PathBuf,
        /// Italic face.
        italic: PathBuf,
    },
}

impl FontSource {
    /// DejaVu Sans when installed, builtin Helvetica otherwise.
    #[must_use]
    pub fn detect() -> Self {
        let dir = Path::new(DEJAVU_DIR);
        let regular = dir.join("DejaVuSans.ttf");
        let bold = dir.join("DejaVuSans-Bold.ttf");
        let italic = dir.join("DejaVuSans-Oblique.ttf");
        if regular.exists() && bold.exists() && italic.exists() {
            Self::External {
                regular,
                bold,
                italic,
            }
        } else {
            Self::Builtin
        }
    }
}

fn pdf_error(err: impl std::fmt::Debug) -> DocumentError {
    DocumentError::Pdf(format!("{err:?}"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    unicode: bool,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference, source: &FontSource) -> Result<Self, DocumentError> {
        match source {
            FontSource::Builtin => Ok(Self {
                regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
                bold: doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(pdf_error)?,
                italic: doc
                    .add_builtin_font(BuiltinFont::HelveticaOblique)
                    .map_err(pdf_error)?,
                unicode: false,
            }),
            FontSource::External {
                regular,
                bold,
                italic,
            } => {
                let open = |path: &PathBuf| {
                    let file = File::open(path).map_err(|source| DocumentError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    doc.add_external_font(file).map_err(pdf_error)
                };
                Ok(Self {
                    regular: open(regular)?,
                    bold: open(bold)?,
                    italic: open(italic)?,
                    unicode: true,
                })
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Style {
    Regular,
    Bold,
    Italic,
}

/// Cursor over the pages of one document.
struct Writer<'a> {
    doc: &'a PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    title: String,
    page: usize,
    y: f32,
}

impl<'a> Writer<'a> {
    fn new(doc: &'a PdfDocumentReference, fonts: Fonts, layer: PdfLayerReference, title: &str) -> Self {
        let mut writer = Self {
            doc,
            fonts,
            layer,
            title: title.to_string(),
            page: 1,
            y: PAGE_HEIGHT,
        };
        writer.header();
        writer
    }

    fn font(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Regular => &self.fonts.regular,
            Style::Bold => &self.fonts.bold,
            Style::Italic => &self.fonts.italic,
        }
    }

    fn color(&self, r: u8, g: u8, b: u8) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        )));
    }

    /// Approximate rendered width of `text`.
    #[allow(clippy::cast_precision_loss)]
    fn text_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5 * MM_PER_PT
    }

    fn put(&self, text: &str, size: f32, x: f32, y: f32, style: Style) {
        self.layer.use_text(text, size, Mm(x), Mm(y), self.font(style));
    }

    fn put_centered(&self, text: &str, size: f32, y: f32, style: Style) {
        let x = ((PAGE_WIDTH - Self::text_width(text, size)) / 2.0).max(MARGIN);
        self.put(text, size, x, y, style);
    }

    fn header(&mut self) {
        self.color(50, 60, 100);
        self.y = PAGE_HEIGHT - 14.0;
        for line in wrap(&self.title, TITLE_COLUMNS) {
            self.put_centered(&line, 11.0, self.y, Style::Bold);
            self.y -= 6.0;
        }
        self.y -= 5.0;
    }

    fn footer(&self) {
        self.color(128, 128, 128);
        self.put_centered(&format!("Página {}", self.page), 10.0, 8.0, Style::Regular);
    }

    fn new_page(&mut self) {
        self.footer();
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page += 1;
        self.header();
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < BOTTOM_MARGIN {
            self.new_page();
        }
    }

    /// Writes wrapped lines, breaking pages as needed.
    fn paragraph(&mut self, text: &str, size: f32, line_height: f32, style: Style, rgb: (u8, u8, u8)) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.ensure_room(line_height);
            self.color(rgb.0, rgb.1, rgb.2);
            self.y -= line_height;
            self.put(&line, size, MARGIN, self.y, style);
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn separator(&mut self) {
        self.ensure_room(4.0);
        self.color(0, 0, 0);
        let dashes = "- ".repeat(64);
        self.put(dashes.trim_end(), 8.0, MARGIN, self.y, Style::Regular);
    }

    fn question(&mut self, index: usize, question: &Question) {
        self.ensure_room(10.0);
        self.color(0, 0, 0);
        self.y -= 10.0;
        self.put(&format!("Questão {index}"), 12.0, MARGIN, self.y, Style::Bold);

        self.paragraph(
            &html_to_text(&question.enunciated),
            12.0,
            8.0,
            Style::Regular,
            (0, 0, 0),
        );
        self.gap(2.0);

        if let Some((letter, option)) = question.correct_option() {
            let mark = if self.fonts.unicode { "✔ " } else { "" };
            self.paragraph(
                &format!(
                    "{mark}Alternativa correta ({letter}): {}",
                    html_to_text(&option.text)
                ),
                12.0,
                8.0,
                Style::Bold,
                (0, 128, 0),
            );

            let feedback = html_to_text(&option.feedback);
            if !feedback.is_empty() {
                self.paragraph(
                    &format!("Justificativa: {feedback}"),
                    11.0,
                    7.0,
                    Style::Italic,
                    (0, 100, 0),
                );
            }
        }

        self.gap(6.0);
        self.separator();
        self.gap(6.0);
    }
}

/// Renders `set` to a PDF file at `path`.
///
/// # Errors
///
/// Returns `DocumentError::Malformed` if the content has no question list,
/// `DocumentError::Pdf` if rendering fails and `DocumentError::Io` if the
/// file cannot be written.
pub fn render_pdf(set: &ExerciseSet, path: &Path, fonts: &FontSource) -> Result<(), DocumentError> {
    let questions = set.questions()?;

    let (doc, page, layer) = PdfDocument::new(&set.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let loaded = Fonts::load(&doc, fonts)?;
    let first_layer = doc.get_page(page).get_layer(layer);

    {
        let mut writer = Writer::new(&doc, loaded, first_layer, &set.title);

        writer.ensure_room(10.0);
        writer.color(30, 30, 30);
        writer.y -= 10.0;
        writer.put_centered("Exercícios", 14.0, writer.y, Style::Bold);
        writer.gap(10.0);

        for (index, question) in questions.iter().enumerate() {
            writer.question(index + 1, question);
        }
        writer.footer();
    }

    let io_error = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;

    debug!(path = %path.display(), questions = questions.len(), "PDF written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_set() -> ExerciseSet {
        ExerciseSet {
            discipline: "Redes".to_string(),
            title: "Camada de enlace".to_string(),
            content: json!({
                "questions": [
                    {
                        "enunciated": "<p>Qual protocolo resolve endere&ccedil;os?</p>",
                        "options": [
                            {"text": "DNS", "isCorrect": false, "feedback": ""},
                            {"text": "ARP", "isCorrect": true, "feedback": "<p>Mapeia IP para MAC.</p>"}
                        ]
                    }
                ]
            }),
        }
    }

    #[test]
    fn test_render_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.pdf");

        render_pdf(&sample_set(), &path, &FontSource::Builtin).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_paginates_long_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        let mut set = sample_set();
        let question = set.content["questions"][0].clone();
        set.content["questions"] = json!(vec![question; 40]);

        render_pdf(&set, &path, &FontSource::Builtin).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_pdf_rejects_content_without_questions() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = sample_set();
        set.content = json!({"other": []});

        let err = render_pdf(&set, &dir.path().join("x.pdf"), &FontSource::Builtin).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }
}
