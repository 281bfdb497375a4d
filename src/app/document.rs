use ratatui::prelude::{Line, Span};

use crate::{
    domain::SessionId,
    grid::ProgramGrid,
    page::{Page, SectionBody},
    scroll_spy::Span as Extent,
};

use super::{
    program_view::{self, HitBox},
    ui_helpers, view_style,
};

/// The whole page laid out as lines, with the extent of each section and
/// the clickable session cells.
#[derive(Clone, Debug, Default)]
pub(super) struct Document {
    pub(super) lines: Vec<Line<'static>>,
    pub(super) sections: Vec<(String, Extent)>,
    pub(super) hits: Vec<HitBox>,
}

impl Document {
    pub(super) fn build(
        page: &Page,
        program: &ProgramGrid,
        width: u16,
        column_width: u16,
        focus: Option<SessionId>,
    ) -> Self {
        let mut document = Document::default();

        for section in &page.sections {
            let top = document.lines.len();
            document.lines.push(Line::from(Span::styled(
                format!("▍{}", section.title),
                view_style::heading_style(),
            )));
            document.lines.push(Line::default());

            match &section.body {
                SectionBody::Text { paragraphs } => {
                    for paragraph in paragraphs {
                        document.lines.extend(
                            ui_helpers::wrap_text(paragraph, width as usize)
                                .into_iter()
                                .map(Line::from),
                        );
                        document.lines.push(Line::default());
                    }
                }
                SectionBody::Program => {
                    let offset = document.lines.len();
                    let drawn = program_view::program_lines(program, width, column_width, focus);
                    document
                        .hits
                        .extend(drawn.hits.into_iter().map(|hit| hit.offset(offset)));
                    document.lines.extend(drawn.lines);
                }
            }

            let height = document.lines.len() - top;
            document
                .sections
                .push((section.id.clone(), Extent::new(top, height)));
        }

        document
    }

    pub(super) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(super) fn section_top(&self, id: &str) -> Option<usize> {
        self.sections
            .iter()
            .find(|(section, _)| section == id)
            .map(|(_, extent)| extent.top)
    }

    pub(super) fn section_extents(&self) -> impl Iterator<Item = (&str, Extent)> {
        self.sections
            .iter()
            .map(|(id, extent)| (id.as_str(), *extent))
    }

    pub(super) fn hit_at(&self, line: usize, x: u16) -> Option<SessionId> {
        self.hits
            .iter()
            .find(|hit| hit.contains(line, x))
            .map(|hit| hit.id)
    }

    pub(super) fn hit_for(&self, id: SessionId) -> Option<&HitBox> {
        self.hits.iter().find(|hit| hit.id == id)
    }
}
