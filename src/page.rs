use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, scroll_spy::NavLink, storage};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Text { paragraphs: Vec<String> },
    Program,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSection {
    pub id: String,
    pub title: String,
    pub body: SectionBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    pub label: String,
    pub href: String,
}

/// The scrollable document: a menu and its sections in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub menu: Vec<MenuLink>,
    pub sections: Vec<PageSection>,
}

impl Default for Page {
    fn default() -> Self {
        let text = |id: &str, title: &str, paragraphs: &[&str]| PageSection {
            id: id.to_string(),
            title: title.to_string(),
            body: SectionBody::Text {
                paragraphs: paragraphs.iter().map(ToString::to_string).collect(),
            },
        };
        let link = |label: &str, href: &str| MenuLink {
            label: label.to_string(),
            href: href.to_string(),
        };

        Page {
            title: "Programma".to_string(),
            menu: vec![
                link("Home", "#home"),
                link("Programma", "#program"),
                link("Info", "#info"),
            ],
            sections: vec![
                text(
                    "home",
                    "Benvenuti",
                    &["Calendario degli incontri. Scorri per consultare il programma."],
                ),
                PageSection {
                    id: "program".to_string(),
                    title: "Programma".to_string(),
                    body: SectionBody::Program,
                },
                text(
                    "info",
                    "Info",
                    &["Seleziona un incontro per vederne orario e dettagli."],
                ),
            ],
        }
    }
}

impl Page {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        storage::read_json(path)
    }

    /// Loads a page file when one is configured, otherwise the built-in page.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Page::default();
        };
        match Page::load(path) {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!(error = %error, "using built-in page");
                Page::default()
            }
        }
    }

    pub fn nav_links(&self) -> Vec<NavLink> {
        self.menu
            .iter()
            .map(|link| NavLink::new(link.label.clone(), link.href.clone()))
            .collect()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.id.as_str())
    }

    pub fn has_program(&self) -> bool {
        self.sections
            .iter()
            .any(|section| section.body == SectionBody::Program)
    }
}
