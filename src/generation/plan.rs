//! Article plan: the fixed five-section outline every description follows.

use crate::curriculum::Topic;
use serde::Serialize;
use std::fmt;

/// Body sections in their mandatory order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Technology,
    Processes,
    Applications,
    Intersections,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 5] = [
        SectionKind::Intro,
        SectionKind::Technology,
        SectionKind::Processes,
        SectionKind::Applications,
        SectionKind::Intersections,
    ];

    /// Bold heading placed above the section; the intro has none.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            SectionKind::Intro => None,
            SectionKind::Technology => Some("**Технологии и инструменты:**"),
            SectionKind::Processes => Some("**Процессы и методологии:**"),
            SectionKind::Applications => Some("**Практические применения:**"),
            SectionKind::Intersections => Some("**Междисциплинарные связи:**"),
        }
    }

    /// Sections that must carry at least one inline source link
    pub fn requires_link(self) -> bool {
        matches!(self, SectionKind::Technology | SectionKind::Applications)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Technology => "technology",
            SectionKind::Processes => "processes",
            SectionKind::Applications => "applications",
            SectionKind::Intersections => "intersections",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPlan {
    pub kind: SectionKind,
    pub key_points: Vec<String>,
}

/// Key points per section, always in [`SectionKind::ORDER`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePlan {
    pub title: String,
    pub sections: Vec<SectionPlan>,
}

impl ArticlePlan {
    pub fn key_points(&self, kind: SectionKind) -> &[String] {
        self.sections
            .iter()
            .find(|section| section.kind == kind)
            .map(|section| section.key_points.as_slice())
            .unwrap_or(&[])
    }
}

fn points(items: [&str; 3]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn plan_article(topic: &Topic) -> ArticlePlan {
    let sections = SectionKind::ORDER
        .iter()
        .map(|&kind| SectionPlan {
            kind,
            key_points: match kind {
                SectionKind::Intro => points([
                    "Определение и основные концепции",
                    "Историческое развитие и современное состояние",
                    "Ключевые принципы и подходы",
                ]),
                SectionKind::Technology => points([
                    "Основные инструменты и технологии",
                    "Программное обеспечение и платформы",
                    "Стандарты и спецификации",
                ]),
                SectionKind::Processes => points([
                    "Типичные рабочие процессы",
                    "Методологии и практики",
                    "Этапы и циклы работы",
                ]),
                SectionKind::Applications => points([
                    "Практические применения",
                    "Реальные примеры использования",
                    "Индустриальные кейсы",
                ]),
                SectionKind::Intersections => points([
                    "Связи с другими дисциплинами",
                    "Междисциплинарные аспекты",
                    "Смежные области знаний",
                ]),
            },
        })
        .collect();

    ArticlePlan {
        title: topic.title.clone(),
        sections,
    }
}
