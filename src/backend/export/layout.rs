//! PDF page layout.
//!
//! Turns a project into positioned text lines on A4 pages. Coordinates are
//! millimetres measured from the top-left corner; the renderer flips them
//! for PDF space. Keeping this pure lets the page-break rules be tested
//! without producing a document.

use crate::shared::{MemberView, Project};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const TOP_MM: f32 = 20.0;
const SECTION_LIMIT_MM: f32 = 260.0;
const LINE_LIMIT_MM: f32 = 270.0;
const WRAP_LIMIT_MM: f32 = 275.0;
/// Characters per description line at 9pt over ~150mm
const WRAP_CHARS: usize = 90;

/// One positioned line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub x: f32,
    /// Baseline distance from the top edge
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

impl DocumentLayout {
    /// All text in reading order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
    }
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP_MM,
        }
    }

    /// Start a new page when the cursor is past `limit`
    fn ensure_room(&mut self, limit: f32) {
        if self.y > limit {
            self.pages.push(Page::default());
            self.y = TOP_MM;
        }
    }

    fn text(&mut self, text: impl Into<String>, size: f32, x: f32, advance: f32) {
        let line = TextLine {
            text: text.into(),
            size,
            x,
            y: self.y,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
        self.y += advance;
    }

    fn skip(&mut self, mm: f32) {
        self.y += mm;
    }
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Lay out the project summary
pub fn layout_project(project: &Project, members: &[MemberView]) -> DocumentLayout {
    let mut cursor = Cursor::new();

    cursor.text(project.name.clone(), 20.0, 20.0, 10.0);
    if !project.description.trim().is_empty() {
        cursor.text(format!("Description: {}", project.description), 12.0, 20.0, 10.0);
    }
    let visibility = serde_json::to_value(project.visibility)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    cursor.text(format!("Visibility: {}", visibility), 10.0, 20.0, 5.0);
    cursor.text(
        format!("Created: {}", project.created_at.format("%Y-%m-%d")),
        10.0,
        20.0,
        15.0,
    );

    cursor.text("Members:", 14.0, 20.0, 7.0);
    for member in members {
        cursor.ensure_room(LINE_LIMIT_MM);
        let who = match &member.user {
            Some(user) => format!("{} ({})", user.name, user.email),
            None => member.user_id.to_string(),
        };
        cursor.text(format!("- {} - {}", who, member.role), 10.0, 25.0, 6.0);
    }
    cursor.skip(10.0);

    cursor.ensure_room(SECTION_LIMIT_MM);
    cursor.text("Boards:", 14.0, 20.0, 7.0);
    for board in &project.boards {
        cursor.ensure_room(SECTION_LIMIT_MM);
        cursor.text(board.name.clone(), 12.0, 25.0, 6.0);

        for column in &board.columns {
            cursor.ensure_room(SECTION_LIMIT_MM);
            cursor.text(format!("{}:", column.name), 10.0, 30.0, 5.0);

            if column.cards.is_empty() {
                cursor.text("(no cards)", 9.0, 35.0, 4.0);
            }
            for card in &column.cards {
                cursor.ensure_room(LINE_LIMIT_MM);
                cursor.text(format!("- {}", card.title), 9.0, 35.0, 4.0);
                for line in wrap_text(&card.description, WRAP_CHARS) {
                    cursor.ensure_room(WRAP_LIMIT_MM);
                    cursor.text(line, 9.0, 40.0, 4.0);
                }
            }
            cursor.skip(3.0);
        }
        cursor.skip(5.0);
    }

    DocumentLayout {
        title: project.name.clone(),
        pages: cursor.pages,
    }
}

/// File name for the exported PDF, non-alphanumerics replaced by `_`
pub fn export_filename(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.pdf", stem)
}
